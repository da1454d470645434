use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod client;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{db, limiter, utils};

use limiter::rate_limiter::{RateLimitStore, RateLimiter};
use repositories::contact_message::ContactMessageRepository;
use use_cases::contact::ContactHandler;

pub struct AppState {
    pub contact_handler: AppContactHandler,
}

pub type AppContactHandler = ContactHandler<Arc<dyn ContactMessageRepository>, Arc<dyn RateLimitStore>>;

impl AppState {
    pub fn new(
        config: &settings::AppConfig,
        contact_repo: Arc<dyn ContactMessageRepository>,
        rate_limit_store: Arc<dyn RateLimitStore>,
    ) -> Self {
        let rate_limiter = RateLimiter::new(
            rate_limit_store,
            config.rate_limit_max_submissions,
            config.rate_limit_window(),
        );

        AppState {
            contact_handler: ContactHandler::new(contact_repo, rate_limiter),
        }
    }
}
