use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use crate::errors::AppError;

/// Submission counter for one source address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub count: u32,
    pub window_start: DateTime<Utc>,
}

impl RateLimitRecord {
    pub fn new(window_start: DateTime<Utc>) -> Self {
        RateLimitRecord { count: 1, window_start }
    }

    /// A window ends strictly after `window_start + window`.
    pub fn is_expired(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        self.window_end(window).is_some_and(|end| now > end)
    }

    pub fn window_end(&self, window: TimeDelta) -> Option<DateTime<Utc>> {
        self.window_start.checked_add_signed(window)
    }
}

/// Backing store for rate-limit records.
///
/// The limiter reads, then increments, without holding a lock across the two
/// calls. Concurrent requests from the same key may both pass the check.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, AppError>;

    /// Adds one to the record's count and returns the new count. A record that
    /// disappeared since `get` is recreated with a window starting at `now`.
    async fn increment(&self, key: &str, now: DateTime<Utc>, window: TimeDelta) -> Result<u32, AppError>;

    /// Starts a fresh window at `now` with a count of 1.
    async fn reset(&self, key: &str, now: DateTime<Utc>, window: TimeDelta) -> Result<(), AppError>;

    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl<T> RateLimitStore for Arc<T>
where
    T: RateLimitStore + ?Sized,
{
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, AppError> {
        (**self).get(key).await
    }

    async fn increment(&self, key: &str, now: DateTime<Utc>, window: TimeDelta) -> Result<u32, AppError> {
        (**self).increment(key, now, window).await
    }

    async fn reset(&self, key: &str, now: DateTime<Utc>, window: TimeDelta) -> Result<(), AppError> {
        (**self).reset(key, now, window).await
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { count: u32 },
    Limited { reset_at: DateTime<Utc> },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Fixed-window limiter: at most `max_submissions` per key per `window`.
/// The window restarts with the first hit after it expires.
pub struct RateLimiter<S> {
    store: S,
    max_submissions: u32,
    window: TimeDelta,
}

impl<S> RateLimiter<S>
where
    S: RateLimitStore,
{
    pub fn new(store: S, max_submissions: u32, window: TimeDelta) -> Self {
        RateLimiter { store, max_submissions, window }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn check(&self, key: &str, now: DateTime<Utc>) -> Result<RateLimitDecision, AppError> {
        match self.store.get(key).await? {
            Some(record) if !record.is_expired(now, self.window) => {
                if record.count >= self.max_submissions {
                    return Ok(RateLimitDecision::Limited {
                        reset_at: record.window_end(self.window).unwrap_or(DateTime::<Utc>::MAX_UTC),
                    });
                }
                let count = self.store.increment(key, now, self.window).await?;
                Ok(RateLimitDecision::Allowed { count })
            }
            _ => {
                self.store.reset(key, now, self.window).await?;
                Ok(RateLimitDecision::Allowed { count: 1 })
            }
        }
    }
}

/// Process-local store. Records vanish on restart.
#[derive(Clone, Default)]
pub struct InMemoryRateLimitStore {
    map: Arc<DashMap<String, RateLimitRecord>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drops every record whose window has ended. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>, window: TimeDelta) -> usize {
        let before = self.map.len();
        self.map.retain(|_, record| !record.is_expired(now, window));
        before.saturating_sub(self.map.len())
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    fn backend(&self) -> &'static str {
        "in-memory"
    }

    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, AppError> {
        Ok(self.map.get(key).map(|entry| *entry.value()))
    }

    async fn increment(&self, key: &str, now: DateTime<Utc>, _window: TimeDelta) -> Result<u32, AppError> {
        // The record may have been swept between `get` and here.
        let mut entry = self
            .map
            .entry(key.to_string())
            .or_insert_with(|| RateLimitRecord { count: 0, window_start: now });
        entry.count = entry.count.saturating_add(1);
        Ok(entry.count)
    }

    async fn reset(&self, key: &str, now: DateTime<Utc>, _window: TimeDelta) -> Result<(), AppError> {
        self.map.insert(key.to_string(), RateLimitRecord::new(now));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter<InMemoryRateLimitStore> {
        RateLimiter::new(InMemoryRateLimitStore::new(), 5, TimeDelta::hours(1))
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[tokio::test]
    async fn sixth_hit_within_window_is_limited() {
        let limiter = limiter();

        for expected in 1..=5 {
            let decision = limiter.check("1.2.3.4", t0() + TimeDelta::minutes(expected)).await.unwrap();
            assert_eq!(decision, RateLimitDecision::Allowed { count: expected as u32 });
        }

        let decision = limiter.check("1.2.3.4", t0() + TimeDelta::minutes(59)).await.unwrap();
        assert_eq!(decision, RateLimitDecision::Limited { reset_at: t0() + TimeDelta::minutes(1) + TimeDelta::hours(1) });
    }

    #[tokio::test]
    async fn window_resets_after_expiry() {
        let limiter = limiter();
        for _ in 0..5 {
            limiter.check("1.2.3.4", t0()).await.unwrap();
        }
        assert!(!limiter.check("1.2.3.4", t0()).await.unwrap().is_allowed());

        // Exactly at the boundary the window is still open.
        let at_boundary = t0() + TimeDelta::hours(1);
        assert!(!limiter.check("1.2.3.4", at_boundary).await.unwrap().is_allowed());

        let after = at_boundary + TimeDelta::seconds(1);
        assert_eq!(
            limiter.check("1.2.3.4", after).await.unwrap(),
            RateLimitDecision::Allowed { count: 1 }
        );
        assert_eq!(
            limiter.store().get("1.2.3.4").await.unwrap(),
            Some(RateLimitRecord::new(after))
        );
    }

    #[tokio::test]
    async fn keys_are_counted_independently() {
        let limiter = limiter();
        for _ in 0..5 {
            limiter.check("10.0.0.1", t0()).await.unwrap();
        }

        assert!(!limiter.check("10.0.0.1", t0()).await.unwrap().is_allowed());
        assert!(limiter.check("10.0.0.2", t0()).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn purge_drops_only_expired_records() {
        let store = InMemoryRateLimitStore::new();
        let window = TimeDelta::hours(1);
        store.reset("old", t0(), window).await.unwrap();
        store.reset("fresh", t0() + TimeDelta::minutes(90), window).await.unwrap();

        let removed = store.purge_expired(t0() + TimeDelta::minutes(120), window);

        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn increment_recreates_a_swept_record() {
        let store = InMemoryRateLimitStore::new();
        let window = TimeDelta::hours(1);

        assert_eq!(store.increment("gone", t0(), window).await.unwrap(), 1);
        assert_eq!(store.increment("gone", t0() + TimeDelta::minutes(5), window).await.unwrap(), 2);
        assert_eq!(
            store.get("gone").await.unwrap(),
            Some(RateLimitRecord { count: 2, window_start: t0() })
        );
    }
}
