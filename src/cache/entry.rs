//! Cache Entry Module
//!
//! Defines a single cached item and its links into the recency list.

use chrono::{DateTime, TimeDelta, Utc};

use crate::cache::recency::Handle;

// == Cache Entry ==
/// One cached item.
///
/// `prev` and `next` are handles into the arena owned by the recency list;
/// an entry never owns its neighbours.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    /// Key under which the entry is indexed
    pub key: String,
    /// Opaque payload
    pub value: V,
    /// Absolute instant after which the entry is stale
    pub expires_at: DateTime<Utc>,
    pub(crate) prev: Option<Handle>,
    pub(crate) next: Option<Handle>,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates an unlinked entry.
    pub fn new(key: String, value: V, expires_at: DateTime<Utc>) -> Self {
        Self {
            key,
            value,
            expires_at,
            prev: None,
            next: None,
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now` is strictly past its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

// == Utility Functions ==
/// Computes `now + ttl`, clamping to the latest representable instant.
pub fn expiry_from(now: DateTime<Utc>, ttl: TimeDelta) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
