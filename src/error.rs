//! Error types for the admission gate
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Gate Error Enum ==
/// Terminal failure outcomes surfaced to HTTP callers.
#[derive(Error, Debug)]
pub enum GateError {
    /// Caller exhausted its quota for the current window
    #[error("Rate limit exceeded")]
    Throttled {
        /// Unix milliseconds at which the window resets
        reset_at: u64,
    },

    /// A query parameter failed validation
    #[error("Invalid {field}: {reason}")]
    InvalidRequest { field: &'static str, reason: String },

    /// Backing collection failed; detail is logged, never returned
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Referenced coupon does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

impl GateError {
    /// Shorthand for a validation failure on `field`.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        GateError::InvalidRequest {
            field,
            reason: reason.into(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GateError::Throttled { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded".to_string())
            }
            GateError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            GateError::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch coupons".to_string(),
            ),
            GateError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Store Error Enum ==
/// Failures of the window and cache stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store could not be reached or the command failed
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Store refused the key or value
    #[error("Rejected by store: {0}")]
    Rejected(String),

    /// Store returned data that could not be interpreted
    #[error("Corrupt store data: {0}")]
    Corrupt(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

// == Source Error Enum ==
/// Failures of the backing coupon collection.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Collection could not be queried
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// Remote collection answered with a non-success status
    #[error("Source returned status {0}")]
    Status(u16),

    /// Remote collection answered with an unreadable body
    #[error("Source response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else {
            SourceError::Unavailable(err.to_string())
        }
    }
}
