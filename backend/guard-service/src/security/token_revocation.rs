/// Token revocation registry
///
/// Records token identifiers that must be rejected before their natural
/// expiry (logout, password change, account compromise). Entries live in the
/// shared expiring store with TTL equal to the token's remaining lifetime, so
/// the blacklist self-prunes and no cleanup pass exists.
///
/// Token identifiers are SHA-256-hashed before storage so raw identifiers
/// never appear in store dumps or logs.
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{GuardError, Result};
use crate::store::ExpiringStore;

pub struct RevocationRegistry {
    store: Arc<dyn ExpiringStore>,
}

impl RevocationRegistry {
    pub fn new(store: Arc<dyn ExpiringStore>) -> Self {
        Self { store }
    }

    /// Revoke a token for the remainder of its lifetime.
    ///
    /// A zero remaining lifetime is a no-op: the token is already expired and
    /// there is nothing to track. Revoking an already-revoked token is
    /// harmless.
    pub async fn revoke(&self, token_id: &str, remaining_lifetime: Duration) -> Result<()> {
        if remaining_lifetime.is_zero() {
            debug!("Skipping revocation of already expired token");
            return Ok(());
        }

        self.store
            .set_with_ttl(&token_key(token_id), "1", remaining_lifetime)
            .await?;

        info!(
            ttl_secs = remaining_lifetime.as_secs(),
            "Token revoked, blacklist entry expires with the token"
        );
        Ok(())
    }

    /// Existence check consulted on every authenticated request before the
    /// token's claims are honored. Store failures propagate; a token is never
    /// silently treated as not revoked.
    pub async fn is_revoked(&self, token_id: &str) -> Result<bool> {
        self.store.exists(&token_key(token_id)).await
    }

    /// Revoke every token a user holds by stamping a revocation instant.
    ///
    /// Tokens issued before the stamp are rejected by
    /// [`is_revoked_for_user`](Self::is_revoked_for_user); the stamp outlives
    /// the longest-lived token and then expires.
    pub async fn revoke_all_for_user(
        &self,
        user_id: &str,
        max_token_lifetime: Duration,
    ) -> Result<()> {
        let now_secs = Utc::now().timestamp();
        self.store
            .set_with_ttl(&user_key(user_id), &now_secs.to_string(), max_token_lifetime)
            .await?;

        warn!(user_id = %user_id, "All tokens revoked for user");
        Ok(())
    }

    /// Whether a token issued at `issued_at` falls under a revoke-all stamp.
    pub async fn is_revoked_for_user(
        &self,
        user_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<bool> {
        match self.store.get(&user_key(user_id)).await? {
            Some(stamp) => {
                let revoked_at: i64 = stamp.parse().map_err(|_| {
                    GuardError::StoreUnavailable("invalid revocation timestamp".to_string())
                })?;
                Ok(issued_at.timestamp() < revoked_at)
            }
            None => Ok(false),
        }
    }
}

fn token_key(token_id: &str) -> String {
    format!("guard:revoked:token:{}", hash_token_id(token_id))
}

fn user_key(user_id: &str) -> String {
    format!("guard:revoked:user:{}:ts", user_id)
}

/// Hex-encoded SHA-256 of a token identifier.
pub fn hash_token_id(token_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token_id.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tokio::time::advance;

    fn registry() -> RevocationRegistry {
        RevocationRegistry::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_hash_consistency() {
        assert_eq!(hash_token_id("token-1"), hash_token_id("token-1"));
        assert_ne!(hash_token_id("token-1"), hash_token_id("token-2"));
    }

    #[test]
    fn test_hash_length() {
        // SHA-256 produces 64 hex characters
        assert_eq!(hash_token_id("any-token").len(), 64);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revoked_until_natural_expiry() {
        let registry = registry();
        registry
            .revoke("jti-123", Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(registry.is_revoked("jti-123").await.unwrap());

        advance(Duration::from_secs(3601)).await;
        assert!(!registry.is_revoked("jti-123").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_token_revocation_is_noop() {
        let registry = registry();
        registry.revoke("jti-123", Duration::ZERO).await.unwrap();
        assert!(!registry.is_revoked("jti-123").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_revoke_is_idempotent() {
        let registry = registry();
        registry
            .revoke("jti-123", Duration::from_secs(60))
            .await
            .unwrap();
        registry
            .revoke("jti-123", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(registry.is_revoked("jti-123").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrevoked_token_passes() {
        let registry = registry();
        assert!(!registry.is_revoked("jti-unknown").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_revoke_all_rejects_earlier_tokens_only() {
        let registry = registry();
        registry
            .revoke_all_for_user("user-1", Duration::from_secs(7 * 24 * 3600))
            .await
            .unwrap();

        let before = Utc::now() - chrono::Duration::seconds(10);
        let after = Utc::now() + chrono::Duration::seconds(10);
        assert!(registry
            .is_revoked_for_user("user-1", before)
            .await
            .unwrap());
        assert!(!registry.is_revoked_for_user("user-1", after).await.unwrap());
        assert!(!registry
            .is_revoked_for_user("user-2", before)
            .await
            .unwrap());
    }
}
