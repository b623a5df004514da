use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::Client;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::warn;

/// Shared Redis connection manager guarded by a Tokio mutex.
pub type SharedConnectionManager = Arc<Mutex<ConnectionManager>>;

/// Default ceiling for a single Redis command round trip.
///
/// Kept short so a slow or partitioned Redis cannot stall request handling or
/// the telemetry sampler's tick.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Redis command timed out after {0:?}")]
    Elapsed(Duration),
    #[error("Redis command failed: {0}")]
    Command(#[from] redis::RedisError),
}

/// Redis connection pool.
///
/// Wraps a single multiplexed `ConnectionManager`; cloning the manager handle
/// is cheap and shares the underlying connection.
pub struct RedisPool {
    manager: SharedConnectionManager,
}

impl RedisPool {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).context("failed to construct Redis client")?;
        let connection_manager = ConnectionManager::new(client)
            .await
            .context("failed to initialize Redis connection manager")?;

        Ok(Self {
            manager: Arc::new(Mutex::new(connection_manager)),
        })
    }

    pub fn manager(&self) -> SharedConnectionManager {
        self.manager.clone()
    }
}

/// Execute a Redis command future with the default timeout.
pub async fn with_timeout<F, T>(future: F) -> std::result::Result<T, CommandError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    with_timeout_at(DEFAULT_COMMAND_TIMEOUT, future).await
}

/// Execute a Redis command future with an explicit timeout.
pub async fn with_timeout_at<F, T>(
    duration: Duration,
    future: F,
) -> std::result::Result<T, CommandError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match timeout(duration, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(CommandError::Command(err)),
        Err(_) => {
            warn!("Redis command exceeded {:?} timeout", duration);
            Err(CommandError::Elapsed(duration))
        }
    }
}
