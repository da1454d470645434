use chrono::{DateTime, TimeDelta, Utc};
use portfolio_contact::limiter::{
    rate_limiter::{RateLimitDecision, RateLimitRecord, RateLimitStore, RateLimiter},
    redis_store::RedisRateLimitStore,
};
use uuid::Uuid;

/// Connects to the Redis named by `APP_REDIS_URL`. Tests return early when it
/// is unset so the suite still runs without a server.
async fn redis_store() -> Option<RedisRateLimitStore> {
    let url = std::env::var("APP_REDIS_URL").ok().filter(|url| !url.is_empty())?;
    let store = RedisRateLimitStore::from_url(&url).expect("Failed to create Redis pool");
    store.check_connection().await.expect("Failed to ping Redis");
    Some(store)
}

fn unique_key() -> String {
    format!("test-{}", Uuid::new_v4())
}

fn t0() -> DateTime<Utc> {
    // Millisecond precision, matching what the store keeps.
    DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap()
}

#[actix_rt::test]
async fn redis_limiter_allows_five_then_limits_then_resets() {
    let Some(store) = redis_store().await else {
        eprintln!("APP_REDIS_URL not set, skipping");
        return;
    };
    let window = TimeDelta::hours(1);
    let limiter = RateLimiter::new(store, 5, window);
    let key = unique_key();
    let start = t0();

    for expected in 1..=5 {
        assert_eq!(
            limiter.check(&key, start).await.unwrap(),
            RateLimitDecision::Allowed { count: expected }
        );
    }
    assert_eq!(
        limiter.check(&key, start + TimeDelta::minutes(30)).await.unwrap(),
        RateLimitDecision::Limited { reset_at: start + window }
    );

    let after = start + window + TimeDelta::seconds(1);
    assert_eq!(
        limiter.check(&key, after).await.unwrap(),
        RateLimitDecision::Allowed { count: 1 }
    );
    assert_eq!(
        limiter.store().get(&key).await.unwrap(),
        Some(RateLimitRecord::new(after))
    );
}

#[actix_rt::test]
async fn redis_increment_recreates_an_expired_key_with_a_window() {
    let Some(store) = redis_store().await else {
        eprintln!("APP_REDIS_URL not set, skipping");
        return;
    };
    let window = TimeDelta::hours(1);
    let key = unique_key();
    let now = t0();

    assert_eq!(store.get(&key).await.unwrap(), None);
    assert_eq!(store.increment(&key, now, window).await.unwrap(), 1);
    assert_eq!(
        store.get(&key).await.unwrap(),
        Some(RateLimitRecord { count: 1, window_start: now })
    );

    // An existing window start is left alone.
    let later = now + TimeDelta::minutes(10);
    assert_eq!(store.increment(&key, later, window).await.unwrap(), 2);
    assert_eq!(
        store.get(&key).await.unwrap(),
        Some(RateLimitRecord { count: 2, window_start: now })
    );
}

#[actix_rt::test]
async fn redis_reset_starts_a_fresh_window() {
    let Some(store) = redis_store().await else {
        eprintln!("APP_REDIS_URL not set, skipping");
        return;
    };
    let window = TimeDelta::hours(1);
    let key = unique_key();
    let now = t0();

    store.increment(&key, now, window).await.unwrap();
    store.increment(&key, now, window).await.unwrap();

    let restart = now + TimeDelta::hours(2);
    store.reset(&key, restart, window).await.unwrap();

    assert_eq!(store.get(&key).await.unwrap(), Some(RateLimitRecord::new(restart)));
}
