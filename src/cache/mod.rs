//! Cache Module
//!
//! Bounded in-memory cache with LRU eviction by write recency and lazy TTL
//! expiration.

mod entry;
mod lru;
mod recency;
mod stats;
mod store;


// Re-export public types
pub use entry::Entry;
pub use lru::LruCache;
pub use recency::{Handle, RecencyList};
pub use stats::{CacheStats, StatsCounters};
pub use store::{validate_key, validate_ttl, CacheStore};
