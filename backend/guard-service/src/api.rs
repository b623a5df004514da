//! Response envelope shared by the consuming HTTP handlers.
//!
//! Every endpoint wraps its payload in `{data, error, timestamp}` with
//! `error` null on success and `{code, message}` on failure. The HTTP status
//! itself comes from [`GuardError::status_code`](crate::error::GuardError).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::GuardError;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl From<&GuardError> for ApiError {
    fn from(error: &GuardError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn err(error: &GuardError) -> Self {
        Self {
            data: None,
            error: Some(ApiError::from(error)),
            timestamp: Utc::now(),
        }
    }
}
