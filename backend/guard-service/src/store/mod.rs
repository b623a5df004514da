/// Shared expiring store abstraction
///
/// The credential guard and revocation registry keep all cross-instance state
/// in a key-value store with per-key time-to-live. The store, not in-process
/// locking, provides the atomicity those components need, so every
/// implementation must make `incr` a single atomic operation.
///
/// ## Implementations
///
/// - `RedisStore`: production backend over a shared `ConnectionManager`,
///   every command bounded by a short timeout
/// - `MemoryStore`: process-local backend for tests and local development
use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Atomically increment the counter at `key`, returning the new value.
    ///
    /// The TTL applies only when the increment creates the key; later
    /// increments never refresh it.
    async fn incr(&self, key: &str, ttl: Duration) -> Result<u64>;

    /// Write `value` at `key`, replacing any prior entry and its TTL.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remaining lifetime of `key`, or `None` when the key is absent.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>>;
}
