use async_trait::async_trait;
use redis_utils::SharedConnectionManager;
use std::time::Duration;

use super::ExpiringStore;
use crate::error::{GuardError, Result};

/// Redis-backed expiring store.
///
/// Atomicity comes from Redis itself (INCR, SET EX); no in-process lock is
/// held across a round trip. Every command is bounded by `command_timeout`.
pub struct RedisStore {
    redis: SharedConnectionManager,
    command_timeout: Duration,
}

impl RedisStore {
    pub fn new(redis: SharedConnectionManager) -> Self {
        Self {
            redis,
            command_timeout: redis_utils::DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_command_timeout(redis: SharedConnectionManager, command_timeout: Duration) -> Self {
        Self {
            redis,
            command_timeout,
        }
    }

    fn store_err(err: redis_utils::CommandError) -> GuardError {
        GuardError::StoreUnavailable(err.to_string())
    }
}

// SET/EXPIRE take whole seconds; sub-second lifetimes still need a live entry
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl ExpiringStore for RedisStore {
    async fn incr(&self, key: &str, ttl: Duration) -> Result<u64> {
        let mut conn = self.redis.lock().await.clone();
        let count: u64 = redis_utils::with_timeout_at(self.command_timeout, async {
            redis::cmd("INCR").arg(key).query_async(&mut conn).await
        })
        .await
        .map_err(Self::store_err)?;

        // The TTL attaches when the increment created the key
        if count == 1 {
            let mut conn = self.redis.lock().await.clone();
            redis_utils::with_timeout_at(self.command_timeout, async {
                redis::cmd("EXPIRE")
                    .arg(key)
                    .arg(ttl_secs(ttl))
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
            .await
            .map_err(Self::store_err)?;
        }

        Ok(count)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.redis.lock().await.clone();
        redis_utils::with_timeout_at(self.command_timeout, async {
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(ttl_secs(ttl))
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await
        .map_err(Self::store_err)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.redis.lock().await.clone();
        redis_utils::with_timeout_at(self.command_timeout, async {
            redis::cmd("GET").arg(key).query_async(&mut conn).await
        })
        .await
        .map_err(Self::store_err)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.redis.lock().await.clone();
        redis_utils::with_timeout_at(self.command_timeout, async {
            redis::cmd("DEL")
                .arg(key)
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await
        .map_err(Self::store_err)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.redis.lock().await.clone();
        redis_utils::with_timeout_at(self.command_timeout, async {
            redis::cmd("EXISTS").arg(key).query_async(&mut conn).await
        })
        .await
        .map_err(Self::store_err)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let mut conn = self.redis.lock().await.clone();
        let remaining: i64 = redis_utils::with_timeout_at(self.command_timeout, async {
            redis::cmd("TTL").arg(key).query_async(&mut conn).await
        })
        .await
        .map_err(Self::store_err)?;

        // -2: key absent, -1: key without expiry (none of ours)
        if remaining > 0 {
            Ok(Some(Duration::from_secs(remaining as u64)))
        } else {
            Ok(None)
        }
    }
}
