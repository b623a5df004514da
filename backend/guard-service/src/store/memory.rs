use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use super::ExpiringStore;
use crate::error::{GuardError, Result};

/// In-memory expiring store for tests and local development.
///
/// Expiry is lazy: entries are dropped when a read or write finds them past
/// their deadline. Deadlines use the Tokio clock, so tests running under a
/// paused runtime drive expiry with `tokio::time::advance`.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpiringStore for MemoryStore {
    async fn incr(&self, key: &str, ttl: Duration) -> Result<u64> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(key) {
            if entry.expires_at > now {
                let count: u64 = entry.value.parse().map_err(|_| {
                    GuardError::StoreUnavailable(format!("non-numeric counter at {}", key))
                })?;
                let count = count + 1;
                entry.value = count.to_string();
                return Ok(count);
            }
        }

        entries.insert(
            key.to_string(),
            Entry {
                value: "1".to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(1)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(key) {
            if entry.expires_at > now {
                return Ok(Some(entry.value.clone()));
            }
            entries.remove(key);
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(key) {
            if entry.expires_at > now {
                return Ok(Some(entry.expires_at.saturating_duration_since(now)));
            }
            entries.remove(key);
        }
        Ok(None)
    }
}
