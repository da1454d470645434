use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;

use crate::errors::AppError;
use crate::limiter::rate_limiter::{RateLimitRecord, RateLimitStore};

const COUNT_FIELD: &str = "count";
const WINDOW_START_FIELD: &str = "window_start_ms";

/// Redis-backed store shared by every instance pointing at the same server.
///
/// Each key is a hash `{count, window_start_ms}` that expires with its window.
#[derive(Clone)]
pub struct RedisRateLimitStore {
    pool: Pool,
    prefix: String,
}

impl RedisRateLimitStore {
    pub fn new(pool: Pool) -> Self {
        RedisRateLimitStore {
            pool,
            prefix: "rl:contact".to_string(),
        }
    }

    pub fn from_url(url: &str) -> Result<Self, AppError> {
        let pool = Config::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| AppError::InternalError(format!("Redis pool creation error: {}", e)))?;
        Ok(Self::new(pool))
    }

    // Addresses may contain ':' (IPv6), so encode before building the key.
    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, urlencoding::encode(key))
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, AppError> {
        let mut conn = self.pool.get().await?;
        let fields: HashMap<String, i64> = conn.hgetall(self.key(key)).await?;

        let count = fields.get(COUNT_FIELD).copied();
        let window_start = fields
            .get(WINDOW_START_FIELD)
            .and_then(|ms| DateTime::from_timestamp_millis(*ms));

        Ok(match (count, window_start) {
            (Some(count), Some(window_start)) => Some(RateLimitRecord {
                count: u32::try_from(count).unwrap_or(u32::MAX),
                window_start,
            }),
            _ => None,
        })
    }

    async fn increment(&self, key: &str, now: DateTime<Utc>, window: TimeDelta) -> Result<u32, AppError> {
        let mut conn = self.pool.get().await?;
        let redis_key = self.key(key);

        // If the key expired since `get`, HINCRBY alone would leave a hash with
        // no window start and no TTL.
        let (created, count): (i64, i64) = redis::pipe()
            .atomic()
            .hset_nx(&redis_key, WINDOW_START_FIELD, now.timestamp_millis())
            .hincr(&redis_key, COUNT_FIELD, 1)
            .query_async(&mut conn)
            .await?;

        if created == 1 {
            let _: () = conn.expire(&redis_key, key_ttl(window)).await?;
        }

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn reset(&self, key: &str, now: DateTime<Utc>, window: TimeDelta) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;
        let redis_key = self.key(key);

        redis::pipe()
            .atomic()
            .hset_multiple(
                &redis_key,
                &[(COUNT_FIELD, 1_i64), (WINDOW_START_FIELD, now.timestamp_millis())],
            )
            .ignore()
            .expire(&redis_key, key_ttl(window))
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;

        Ok(())
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(AppError::InternalError(format!("Unexpected PING reply: {}", pong)))
        }
    }
}

/// Keys live one second past the window so a read on the boundary still sees them.
fn key_ttl(window: TimeDelta) -> i64 {
    window.num_seconds().max(1) + 1
}
