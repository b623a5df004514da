use thiserror::Error;

pub type Result<T> = std::result::Result<T, GuardError>;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account locked, retry after {retry_after_secs} seconds")]
    AccountLocked { retry_after_secs: u64 },

    #[error("Invalid, expired, or revoked token")]
    Unauthorized,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Shared store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid metric sample: {0}")]
    InvalidSample(String),
}

impl GuardError {
    /// HTTP status the consuming handler should respond with.
    pub fn status_code(&self) -> u16 {
        match self {
            GuardError::InvalidCredentials => 401,
            GuardError::AccountLocked { .. } => 429,
            GuardError::Unauthorized => 401,
            GuardError::Forbidden => 403,
            GuardError::StoreUnavailable(_) => 503,
            GuardError::InvalidSample(_) => 500,
        }
    }

    /// Stable error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            GuardError::InvalidCredentials => "INVALID_CREDENTIALS",
            GuardError::AccountLocked { .. } => "ACCOUNT_LOCKED",
            GuardError::Unauthorized => "UNAUTHORIZED",
            GuardError::Forbidden => "FORBIDDEN",
            GuardError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            GuardError::InvalidSample(_) => "INVALID_SAMPLE",
        }
    }

    /// Value for the `Retry-After` header on lockout responses.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            GuardError::AccountLocked { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}
