use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

use crate::{errors::AppError, utils::get_client_ip::get_client_ip, AppState};

pub async fn submit_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: Result<web::Bytes, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    let client_ip = get_client_ip(&req);

    // An unreadable or oversized body still counts against the sender's limit.
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            state.contact_handler.check_rate_limit(&client_ip, Utc::now()).await?;
            tracing::warn!(client_ip = %client_ip, "Unreadable contact body: {}", e);
            return Err(AppError::InvalidPayload(e.to_string()));
        }
    };

    let response = state.contact_handler
        .submit_contact_message(&client_ip, &body).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Browser preflight. The cross-origin headers come from the route's middleware.
pub async fn contact_preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

pub async fn method_not_allowed() -> Result<HttpResponse, AppError> {
    Err(AppError::MethodNotAllowed)
}
