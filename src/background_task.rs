use chrono::{TimeDelta, Utc};
use tokio::time::{interval, Duration};

use crate::limiter::rate_limiter::InMemoryRateLimitStore;

/// Periodically drops expired rate-limit records so the in-memory map stays bounded.
pub async fn start_rate_limit_sweep(store: InMemoryRateLimitStore, window: TimeDelta, every: Duration) {
    let mut interval = interval(every);

    loop {
        interval.tick().await;

        let removed = store.purge_expired(Utc::now(), window);
        if removed > 0 {
            tracing::debug!("Purged {} expired rate limit records ({} remaining)", removed, store.len());
        }
    }
}
