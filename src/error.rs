//! Error types for the cache crate
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the caches and the HTTP layer.
///
/// Cache misses are not errors: lookups return `Option`. `NotFound` only
/// appears where a miss has to become a response.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Construction argument out of range (zero capacity, zero TTL)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing or empty key/value at an API boundary
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Background sweeper could not be started
    #[error("Sweeper unavailable: {0}")]
    SweeperUnavailable(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidArgument(_)
            | CacheError::InvalidReference(_)
            | CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::SweeperUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache crate.
pub type Result<T> = std::result::Result<T, CacheError>;
