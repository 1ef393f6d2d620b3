//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for reading one entry (GET /api/lru/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
    /// Expiry instant as Unix seconds
    pub expires_at: i64,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value, expires_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            value,
            expires_at: expires_at.timestamp(),
        }
    }
}

/// Response body for reading every entry (GET /api/lru)
///
/// `keys[i]` and `values[i]` belong to the same entry, most recently written
/// first.
#[derive(Debug, Clone, Serialize)]
pub struct GetAllResponse {
    pub keys: Vec<String>,
    pub values: Vec<Value>,
}

impl GetAllResponse {
    pub fn new(keys: Vec<String>, values: Vec<Value>) -> Self {
        Self { keys, values }
    }
}

/// Response body for deleting one entry (DELETE /api/lru/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// The key that was deleted
    pub key: String,
    /// The value it held
    pub value: Value,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
