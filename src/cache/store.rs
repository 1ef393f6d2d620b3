//! Cache Store Module
//!
//! Unsynchronized cache engine: a key index over an arena recency list, with
//! LRU eviction by write recency and lazy TTL expiration.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::cache::entry::expiry_from;
use crate::cache::{CacheStats, Entry, Handle, RecencyList, StatsCounters};
use crate::error::{CacheError, Result};

// == Validation ==
/// Rejects the empty key.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::EmptyKey);
    }
    Ok(())
}

/// Rejects negative TTLs. Zero is valid and means "use the default".
pub fn validate_ttl(ttl: TimeDelta) -> Result<()> {
    if ttl < TimeDelta::zero() {
        return Err(CacheError::NegativeTtl);
    }
    Ok(())
}

/// Reports a broken index/list link loudly and turns it into an error.
fn nil_node(key: &str) -> CacheError {
    error!(key, "index refers to a recency-list node that is missing");
    CacheError::NilNode(key.to_string())
}

// == Cache Store ==
/// Bounded cache engine.
///
/// The index and the recency list are only ever changed together, so after
/// every public call:
/// - every indexed key addresses a live entry carrying that key,
/// - the list holds exactly the indexed entries, head = most recently written,
/// - the entry count never exceeds `capacity`.
///
/// Every method takes `now` explicitly; the synchronized [`LruCache`] facade
/// supplies the wall clock.
///
/// [`LruCache`]: crate::cache::LruCache
#[derive(Debug)]
pub struct CacheStore<V> {
    index: HashMap<String, Handle>,
    list: RecencyList<V>,
    stats: StatsCounters,
    capacity: NonZeroUsize,
    default_ttl: TimeDelta,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of live entries
    /// * `default_ttl` - TTL applied when a store passes a zero TTL
    pub fn new(capacity: NonZeroUsize, default_ttl: Duration) -> Self {
        Self {
            index: HashMap::with_capacity(capacity.get()),
            list: RecencyList::with_capacity(capacity.get()),
            stats: StatsCounters::new(),
            capacity,
            default_ttl: TimeDelta::from_std(default_ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Current occupancy, expired-but-unswept entries included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len(), self.capacity())
    }

    fn effective_ttl(&self, ttl: TimeDelta) -> TimeDelta {
        if ttl.is_zero() {
            self.default_ttl
        } else {
            ttl
        }
    }

    // == Store ==
    /// Inserts or overwrites `key`.
    ///
    /// Overwriting refreshes the value and expiry and moves the entry to the
    /// head without changing occupancy. Inserting a new key into a full store
    /// first evicts the tail.
    pub fn store(
        &mut self,
        key: String,
        value: V,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<()> {
        validate_key(&key)?;
        validate_ttl(ttl)?;

        let expires_at = expiry_from(now, self.effective_ttl(ttl));

        if let Some(&handle) = self.index.get(&key) {
            let entry = self.list.get_mut(handle).ok_or_else(|| nil_node(&key))?;
            entry.value = value;
            entry.expires_at = expires_at;
            return self.list.move_to_front(handle).ok_or_else(|| nil_node(&key));
        }

        if self.index.len() >= self.capacity.get() {
            self.evict_tail()?;
        }

        let handle = self.list.push_front(Entry::new(key.clone(), value, expires_at));
        self.index.insert(key, handle);
        Ok(())
    }

    fn evict_tail(&mut self) -> Result<()> {
        let entry = self.list.pop_back().ok_or_else(|| nil_node("<tail>"))?;
        if self.index.remove(&entry.key).is_none() {
            return Err(nil_node(&entry.key));
        }
        self.stats.record_eviction();
        debug!(key = %entry.key, "evicted least recently written entry");
        Ok(())
    }

    // == Evict ==
    /// Removes `key` and returns its value.
    pub fn evict(&mut self, key: &str) -> Result<V> {
        validate_key(key)?;

        let handle = *self
            .index
            .get(key)
            .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))?;
        self.remove(key, handle).map(|entry| entry.value)
    }

    // == Evict All ==
    /// Drops every entry.
    pub fn evict_all(&mut self) -> Result<()> {
        if self.index.is_empty() {
            return Err(CacheError::EmptyCache);
        }
        self.index.clear();
        self.list.clear();
        Ok(())
    }

    fn remove(&mut self, key: &str, handle: Handle) -> Result<Entry<V>> {
        self.index.remove(key);
        self.list.remove(handle).ok_or_else(|| nil_node(key))
    }

    /// Handle and expiry state for `key`, without touching counters.
    fn lookup(&self, key: &str, now: DateTime<Utc>) -> Result<(Handle, bool)> {
        let handle = *self
            .index
            .get(key)
            .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))?;
        let entry = self.list.get(handle).ok_or_else(|| nil_node(key))?;
        Ok((handle, entry.is_expired_at(now)))
    }
}

impl<V: Clone> CacheStore<V> {
    // == Peek ==
    /// Read-only fetch.
    ///
    /// Reports an expired entry as `KeyExpired` but leaves it in place; the
    /// caller must follow up with [`CacheStore::fetch`] under exclusive access
    /// to remove it. Does not promote the entry.
    pub fn peek(&self, key: &str, now: DateTime<Utc>) -> Result<(V, DateTime<Utc>)> {
        validate_key(key)?;

        match self.lookup(key, now) {
            Ok((_, true)) => Err(CacheError::KeyExpired(key.to_string())),
            Ok((handle, false)) => {
                let entry = self.list.get(handle).ok_or_else(|| nil_node(key))?;
                self.stats.record_hit();
                Ok((entry.value.clone(), entry.expires_at))
            }
            Err(err) => {
                if matches!(err, CacheError::KeyNotFound(_)) {
                    self.stats.record_miss();
                }
                Err(err)
            }
        }
    }

    // == Fetch ==
    /// Returns the value and expiry of `key`.
    ///
    /// An expired entry is removed from both index and list and reported as
    /// `KeyExpired`. Fetching never changes recency order.
    pub fn fetch(&mut self, key: &str, now: DateTime<Utc>) -> Result<(V, DateTime<Utc>)> {
        validate_key(key)?;

        match self.lookup(key, now) {
            Ok((handle, true)) => {
                self.remove(key, handle)?;
                self.stats.record_expiration();
                self.stats.record_miss();
                debug!(key, "removed expired entry on fetch");
                Err(CacheError::KeyExpired(key.to_string()))
            }
            Ok((handle, false)) => {
                let entry = self.list.get(handle).ok_or_else(|| nil_node(key))?;
                self.stats.record_hit();
                Ok((entry.value.clone(), entry.expires_at))
            }
            Err(err) => {
                if matches!(err, CacheError::KeyNotFound(_)) {
                    self.stats.record_miss();
                }
                Err(err)
            }
        }
    }

    // == Fetch All ==
    /// Returns all live keys and values, most recently written first.
    ///
    /// Expired entries met during the walk are removed. The token is checked
    /// before every node; on cancellation no partial result is returned,
    /// though entries already swept stay removed.
    pub fn fetch_all(
        &mut self,
        now: DateTime<Utc>,
        ctx: &CancellationToken,
    ) -> Result<(Vec<String>, Vec<V>)> {
        if self.index.is_empty() {
            return Err(CacheError::EmptyCache);
        }

        let mut keys = Vec::with_capacity(self.index.len());
        let mut values = Vec::with_capacity(self.index.len());
        let mut cursor = self.list.head();

        while let Some(handle) = cursor {
            if ctx.is_cancelled() {
                return Err(CacheError::Cancelled);
            }

            let entry = self.list.get(handle).ok_or_else(|| nil_node("<scan>"))?;
            cursor = entry.next;

            if entry.is_expired_at(now) {
                let key = entry.key.clone();
                self.remove(&key, handle)?;
                self.stats.record_expiration();
                debug!(key = %key, "removed expired entry during scan");
            } else {
                keys.push(entry.key.clone());
                values.push(entry.value.clone());
            }
        }

        Ok((keys, values))
    }
}

#[cfg(test)]
impl<V> CacheStore<V> {
    /// Keys from head to tail.
    pub(crate) fn recency_order(&self) -> Vec<String> {
        self.list.iter().map(|(_, entry)| entry.key.clone()).collect()
    }

    /// Panics if the index and the recency list disagree.
    pub(crate) fn assert_consistent(&self) {
        let walked: Vec<(Handle, &Entry<V>)> = self.list.iter().collect();

        assert_eq!(walked.len(), self.list.len(), "list length drifted");
        assert_eq!(walked.len(), self.index.len(), "index and list sizes differ");
        assert!(self.index.len() <= self.capacity.get(), "over capacity");

        for (handle, entry) in &walked {
            assert_eq!(self.index.get(&entry.key), Some(handle), "index mismatch");
        }
        if let Some((_, head)) = walked.first() {
            assert!(head.prev.is_none());
        }
        if let Some((handle, tail)) = walked.last() {
            assert!(tail.next.is_none());
            assert_eq!(self.list.tail(), Some(*handle));
        }
    }
}
