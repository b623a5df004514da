/// Failed-login throttling and timed lockout
///
/// Tracks consecutive failed logins per identity in the shared expiring store
/// and bars the identity once a threshold is crossed. Two keys per identity:
/// a failure counter and a lock marker, both carrying the lockout window as
/// TTL, so expiry is lazy and needs no background sweep.
///
/// ## Concurrency
///
/// The store's atomic increment decides which attempt crosses the threshold;
/// exactly the call that observes `count == threshold` writes the lock
/// marker, so racing attempts cannot both miss the transition and later
/// failures never refresh an existing lock.
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::config::GuardSettings;
use crate::error::Result;
use crate::store::ExpiringStore;

/// Lockout state of an identity as seen by the login path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LockState {
    Unlocked,
    Locked { retry_after_secs: u64 },
}

impl LockState {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockState::Locked { .. })
    }
}

pub struct CredentialGuard {
    store: Arc<dyn ExpiringStore>,
    config: GuardSettings,
}

impl CredentialGuard {
    pub fn new(store: Arc<dyn ExpiringStore>, config: GuardSettings) -> Self {
        Self { store, config }
    }

    /// Record a failed login attempt and report the resulting lock state.
    ///
    /// The counter's TTL equals the lockout window and is never refreshed, so
    /// a fresh lockout cycle begins cleanly once the window lapses.
    pub async fn record_failure(&self, identity: &str) -> Result<LockState> {
        let window = self.config.lockout_window();
        let count = self.store.incr(&fail_key(identity), window).await?;

        if count == u64::from(self.config.max_failures) {
            self.store
                .set_with_ttl(&lock_key(identity), "1", window)
                .await?;
            warn!(
                identity = %identity,
                failures = count,
                lockout_secs = window.as_secs(),
                "Account locked after repeated failed logins"
            );
            return Ok(LockState::Locked {
                retry_after_secs: window.as_secs(),
            });
        }

        // Attempts past the threshold report the live lock without touching it
        self.lock_marker(identity).await
    }

    /// Clear the failure counter and any lock. A successful login always
    /// resets state, even when a lock was about to lapse.
    pub async fn record_success(&self, identity: &str) -> Result<()> {
        self.store.delete(&fail_key(identity)).await?;
        self.store.delete(&lock_key(identity)).await
    }

    /// Read-only lockout check, called before credential verification so a
    /// locked identity's password is never inspected.
    ///
    /// When the store cannot be reached the configured policy applies:
    /// fail-open reports `Unlocked` with a warning, fail-closed surfaces the
    /// store error for the caller to map to a 5xx.
    pub async fn check_locked(&self, identity: &str) -> Result<LockState> {
        match self.lock_marker(identity).await {
            Ok(state) => Ok(state),
            Err(err) if self.config.fail_open => {
                warn!(
                    identity = %identity,
                    error = %err,
                    "Lockout check failed open, store unreachable"
                );
                Ok(LockState::Unlocked)
            }
            Err(err) => Err(err),
        }
    }

    async fn lock_marker(&self, identity: &str) -> Result<LockState> {
        match self.store.ttl(&lock_key(identity)).await? {
            Some(remaining) => Ok(LockState::Locked {
                retry_after_secs: ceil_secs(remaining),
            }),
            None => Ok(LockState::Unlocked),
        }
    }
}

fn fail_key(identity: &str) -> String {
    format!("guard:lockout:fail:{}", identity)
}

fn lock_key(identity: &str) -> String {
    format!("guard:lockout:lock:{}", identity)
}

// Round up so a lock never reports a retry window shorter than reality
fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuardError;
    use crate::store::MemoryStore;
    use tokio::time::advance;

    fn guard() -> CredentialGuard {
        CredentialGuard::new(Arc::new(MemoryStore::new()), GuardSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_locks_after_threshold_failures() {
        let guard = guard();

        for _ in 0..4 {
            let state = guard.record_failure("user@example.com").await.unwrap();
            assert_eq!(state, LockState::Unlocked);
        }

        let state = guard.record_failure("user@example.com").await.unwrap();
        assert_eq!(
            state,
            LockState::Locked {
                retry_after_secs: 900
            }
        );
        assert!(guard
            .check_locked("user@example.com")
            .await
            .unwrap()
            .is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn test_extra_failure_does_not_extend_lock() {
        let guard = guard();
        for _ in 0..5 {
            guard.record_failure("user@example.com").await.unwrap();
        }

        advance(Duration::from_secs(100)).await;
        let state = guard.record_failure("user@example.com").await.unwrap();
        // retry window still counts from the original lock
        assert_eq!(
            state,
            LockState::Locked {
                retry_after_secs: 800
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_counter_and_lock() {
        let guard = guard();
        for _ in 0..5 {
            guard.record_failure("user@example.com").await.unwrap();
        }

        guard.record_success("user@example.com").await.unwrap();
        assert_eq!(
            guard.check_locked("user@example.com").await.unwrap(),
            LockState::Unlocked
        );

        // counting starts over from zero
        let state = guard.record_failure("user@example.com").await.unwrap();
        assert_eq!(state, LockState::Unlocked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_expires_lazily() {
        let guard = guard();
        for _ in 0..5 {
            guard.record_failure("user@example.com").await.unwrap();
        }

        advance(Duration::from_secs(901)).await;
        assert_eq!(
            guard.check_locked("user@example.com").await.unwrap(),
            LockState::Unlocked
        );
    }

    struct UnreachableStore;

    #[async_trait::async_trait]
    impl ExpiringStore for UnreachableStore {
        async fn incr(&self, _: &str, _: Duration) -> Result<u64> {
            Err(GuardError::StoreUnavailable("connection refused".into()))
        }
        async fn set_with_ttl(&self, _: &str, _: &str, _: Duration) -> Result<()> {
            Err(GuardError::StoreUnavailable("connection refused".into()))
        }
        async fn get(&self, _: &str) -> Result<Option<String>> {
            Err(GuardError::StoreUnavailable("connection refused".into()))
        }
        async fn delete(&self, _: &str) -> Result<()> {
            Err(GuardError::StoreUnavailable("connection refused".into()))
        }
        async fn exists(&self, _: &str) -> Result<bool> {
            Err(GuardError::StoreUnavailable("connection refused".into()))
        }
        async fn ttl(&self, _: &str) -> Result<Option<Duration>> {
            Err(GuardError::StoreUnavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_check_fails_open_by_default() {
        let guard = CredentialGuard::new(Arc::new(UnreachableStore), GuardSettings::default());
        assert_eq!(
            guard.check_locked("user@example.com").await.unwrap(),
            LockState::Unlocked
        );
    }

    #[tokio::test]
    async fn test_check_fails_closed_when_configured() {
        let config = GuardSettings {
            fail_open: false,
            ..GuardSettings::default()
        };
        let guard = CredentialGuard::new(Arc::new(UnreachableStore), config);
        let err = guard.check_locked("user@example.com").await.unwrap_err();
        assert!(matches!(err, GuardError::StoreUnavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_identities_are_independent() {
        let guard = guard();
        for _ in 0..5 {
            guard.record_failure("a@example.com").await.unwrap();
        }

        assert!(guard.check_locked("a@example.com").await.unwrap().is_locked());
        assert_eq!(
            guard.check_locked("b@example.com").await.unwrap(),
            LockState::Unlocked
        );
    }
}
