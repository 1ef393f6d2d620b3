//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming HTTP request bodies.

use chrono::TimeDelta;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

/// Request body for creating or updating an entry (POST /api/lru)
///
/// # Fields
/// - `key`: The cache key
/// - `value`: Any JSON value, stored as-is
/// - `ttl_seconds`: Optional TTL; absent or 0 selects the default TTL
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    #[serde(default)]
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl_seconds: Option<i64>,
}

impl CreateRequest {
    /// TTL to hand to the cache.
    ///
    /// Negative values pass through so the cache can reject them; values too
    /// large to represent are a malformed body.
    pub fn ttl(&self) -> Result<TimeDelta, ApiError> {
        match self.ttl_seconds {
            None => Ok(TimeDelta::zero()),
            Some(seconds) => TimeDelta::try_seconds(seconds).ok_or_else(|| {
                ApiError::InvalidBody(format!("ttl_seconds out of range: {seconds}"))
            }),
        }
    }
}
