//! Error types for the cache service
//!
//! `CacheError` is the cache engine's own taxonomy. `ApiError` is what the
//! HTTP layer returns, mapping each failure onto a status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Failures reported by the cache engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The key was the empty string
    #[error("key cannot be empty")]
    EmptyKey,

    /// A negative TTL was supplied
    #[error("ttl cannot be negative")]
    NegativeTtl,

    /// The key is not present in the index
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The key was present but its TTL had elapsed; it has been removed
    #[error("key expired: {0}")]
    KeyExpired(String),

    /// The operation requires at least one entry
    #[error("cache is empty")]
    EmptyCache,

    /// The index points at a recency-list slot that is missing or unlinked.
    /// Always an internal defect, never a caller error.
    #[error("node is missing for key: {0}")]
    NilNode(String),

    /// The caller's cancellation token fired
    #[error("operation cancelled")]
    Cancelled,
}

impl CacheError {
    /// Caller errors that retrying with the same input cannot fix.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, CacheError::EmptyKey | CacheError::NegativeTtl)
    }

    /// Expected outcomes that callers should treat as normal branches.
    pub fn is_state(&self) -> bool {
        matches!(
            self,
            CacheError::KeyNotFound(_) | CacheError::KeyExpired(_) | CacheError::EmptyCache
        )
    }

    /// Structural inconsistencies inside the engine.
    pub fn is_defect(&self) -> bool {
        matches!(self, CacheError::NilNode(_))
    }
}

/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;

// == API Error Enum ==
/// Errors surfaced by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Failure reported by the cache engine
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Request body could not be decoded or holds out-of-range fields
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Cache(err) if err.is_invalid_input() => StatusCode::BAD_REQUEST,
            ApiError::Cache(CacheError::KeyNotFound(_) | CacheError::KeyExpired(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string()
        }));

        (self.status(), body).into_response()
    }
}
