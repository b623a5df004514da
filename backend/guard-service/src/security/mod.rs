/// Security module for login throttling and token revocation
///
/// Provides the two store-backed guards consulted by the login path and the
/// authenticated request gate:
/// - **credential_guard**: failed-login counting and timed lockout
/// - **token_revocation**: pre-expiry token blacklisting
pub mod credential_guard;
pub mod token_revocation;

pub use credential_guard::{CredentialGuard, LockState};
pub use token_revocation::RevocationRegistry;
