//! LRU Cache Service - a bounded in-memory key/value cache
//!
//! Provides an LRU cache with per-entry TTL expiration, exposed over a small
//! JSON HTTP API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;

pub use api::{create_router, AppState};
pub use cache::LruCache;
pub use config::Config;
pub use error::{ApiError, CacheError};
