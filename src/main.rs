use std::{sync::Arc, time::Duration};

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use portfolio_contact::{
    background_task::start_rate_limit_sweep,
    db::postgres::{create_pool, run_migrations},
    graceful_shutdown::shutdown_signal,
    limiter::{
        rate_limiter::{InMemoryRateLimitStore, RateLimitStore},
        redis_store::RedisRateLimitStore,
    },
    repositories::{contact_message::ContactMessageRepository, sqlx_repo::SqlxContactMessageRepo},
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if matches!(AppEnvironment::current(), Ok(AppEnvironment::Production)) {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_rate_limit_store(config: &AppConfig) -> Arc<dyn RateLimitStore> {
    if let Some(url) = &config.redis_url {
        match RedisRateLimitStore::from_url(url) {
            Ok(store) => {
                tracing::info!("Using Redis rate limit store");
                return Arc::new(store);
            }
            Err(e) => tracing::error!("{}; falling back to in-memory rate limiting", e),
        }
    }

    let store = InMemoryRateLimitStore::new();
    tokio::spawn(start_rate_limit_sweep(
        store.clone(),
        config.rate_limit_window(),
        Duration::from_secs(config.rate_limit_sweep_interval_secs),
    ));
    tracing::info!("Using in-memory rate limit store");
    Arc::new(store)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {}", e);
            std::process::exit(1);
        }
    };

    if config.run_migrations {
        if let Err(e) = run_migrations(&pool).await {
            tracing::error!("Failed to run database migrations: {}", e);
            std::process::exit(1);
        }
    }

    let contact_repo: Arc<dyn ContactMessageRepository> = Arc::new(SqlxContactMessageRepo::new(pool));
    let rate_limit_store = build_rate_limit_store(&config);

    let app_state = web::Data::new(
        AppState::new(&config, contact_repo, rate_limit_store)
    );

    let server_addr = config.server_addr();

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(TracingLogger::default())
            .wrap(NormalizePath::trim())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
