use actix_web::{web, get, HttpResponse, Responder};
use humantime::format_duration;
use chrono::Utc;
use std::time::Duration;
use serde::Serialize;

use crate::{
    constants::START_TIME,
    limiter::rate_limiter::RateLimitStore,
    repositories::contact_message::ContactMessageRepository,
    AppState,
};

#[derive(Serialize, Clone)]
struct RateLimitStoreStatus {
    backend: &'static str,
    status: &'static str,
}

#[derive(Serialize, Clone)]
struct HealthCheckResponse {
    status: &'static str,
    uptime: String,
    timestamp: String,
    start_at: String,
    version: &'static str,
    database: &'static str,
    rate_limit_store: RateLimitStoreStatus,
}

fn availability<E>(result: Result<(), E>) -> &'static str {
    match result {
        Ok(_) => "OK",
        Err(_) => "Unavailable",
    }
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now_utc = Utc::now();
    let uptime_secs = now_utc.signed_duration_since(*START_TIME).num_seconds().max(0) as u64;

    let handler = &state.contact_handler;
    let database = availability(handler.contact_repo.check_connection().await);

    let store = handler.rate_limiter.store();
    let store_status = match store.check_connection().await {
        Ok(_) => "OK",
        Err(e) => {
            tracing::warn!("Rate limit store unavailable: {}", e);
            "Unavailable"
        }
    };

    HttpResponse::Ok().json(HealthCheckResponse {
        status: "healthy",
        uptime: format_duration(Duration::from_secs(uptime_secs)).to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        database,
        rate_limit_store: RateLimitStoreStatus {
            backend: store.backend(),
            status: store_status,
        },
    })
}
