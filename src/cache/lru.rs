//! Synchronized LRU Cache
//!
//! Shares a [`CacheStore`] between concurrent callers behind one
//! reader-writer lock, and threads caller cancellation through every
//! operation.

use std::num::NonZeroUsize;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio_util::sync::CancellationToken;

use crate::cache::store::{validate_key, validate_ttl};
use crate::cache::{CacheStats, CacheStore};
use crate::error::{CacheError, Result};

/// Fails fast if the caller has already given up.
fn ensure_active(ctx: &CancellationToken) -> Result<()> {
    if ctx.is_cancelled() {
        return Err(CacheError::Cancelled);
    }
    Ok(())
}

// == LRU Cache ==
/// Thread-safe bounded TTL-LRU cache.
///
/// Store, Evict, EvictAll and FetchAll hold the write lock for the whole
/// call. Fetch reads under the shared lock and only takes the write lock when
/// it has to remove an expired entry. Waiting for either lock is abandoned as
/// soon as the caller's token is cancelled.
#[derive(Debug)]
pub struct LruCache<V> {
    store: RwLock<CacheStore<V>>,
}

impl<V> LruCache<V>
where
    V: Clone + Send + Sync,
{
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of live entries
    /// * `default_ttl` - TTL applied when a store passes a zero TTL
    pub fn new(capacity: NonZeroUsize, default_ttl: Duration) -> Self {
        Self {
            store: RwLock::new(CacheStore::new(capacity, default_ttl)),
        }
    }

    async fn read(&self, ctx: &CancellationToken) -> Result<RwLockReadGuard<'_, CacheStore<V>>> {
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(CacheError::Cancelled),
            guard = self.store.read() => Ok(guard),
        }
    }

    async fn write(&self, ctx: &CancellationToken) -> Result<RwLockWriteGuard<'_, CacheStore<V>>> {
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(CacheError::Cancelled),
            guard = self.store.write() => Ok(guard),
        }
    }

    // == Store ==
    /// Inserts or overwrites `key`. A zero `ttl` selects the default TTL.
    pub async fn store(
        &self,
        ctx: &CancellationToken,
        key: impl Into<String>,
        value: V,
        ttl: TimeDelta,
    ) -> Result<()> {
        ensure_active(ctx)?;
        let key = key.into();
        validate_key(&key)?;
        validate_ttl(ttl)?;

        let mut store = self.write(ctx).await?;
        store.store(key, value, ttl, Utc::now())
    }

    // == Fetch ==
    /// Returns the value and expiry instant of `key`.
    ///
    /// An expired entry is removed and reported as `KeyExpired`.
    pub async fn fetch(&self, ctx: &CancellationToken, key: &str) -> Result<(V, DateTime<Utc>)> {
        ensure_active(ctx)?;
        validate_key(key)?;

        {
            let store = self.read(ctx).await?;
            match store.peek(key, Utc::now()) {
                Err(CacheError::KeyExpired(_)) => {}
                other => return other,
            }
        }

        self.fetch_exclusive(ctx, key).await
    }

    /// Resolves `key` again under the write lock, removing it if still expired.
    ///
    /// Another caller may have removed or rewritten the key since the shared
    /// lock was released.
    async fn fetch_exclusive(
        &self,
        ctx: &CancellationToken,
        key: &str,
    ) -> Result<(V, DateTime<Utc>)> {
        let mut store = self.write(ctx).await?;
        store.fetch(key, Utc::now())
    }

    // == Fetch All ==
    /// Returns live keys and values, most recently written first.
    pub async fn fetch_all(&self, ctx: &CancellationToken) -> Result<(Vec<String>, Vec<V>)> {
        ensure_active(ctx)?;

        let mut store = self.write(ctx).await?;
        store.fetch_all(Utc::now(), ctx)
    }

    // == Evict ==
    /// Removes `key` and returns its value.
    pub async fn evict(&self, ctx: &CancellationToken, key: &str) -> Result<V> {
        ensure_active(ctx)?;
        validate_key(key)?;

        let mut store = self.write(ctx).await?;
        store.evict(key)
    }

    // == Evict All ==
    /// Drops every entry.
    pub async fn evict_all(&self, ctx: &CancellationToken) -> Result<()> {
        ensure_active(ctx)?;

        let mut store = self.write(ctx).await?;
        store.evict_all()
    }

    // == Introspection ==
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    /// Current occupancy, expired-but-unswept entries included.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn cache(capacity: usize, default_ttl: Duration) -> LruCache<String> {
        LruCache::new(NonZeroUsize::new(capacity).unwrap(), default_ttl)
    }

    #[tokio::test]
    async fn test_store_and_fetch() {
        let cache = cache(2, Duration::from_secs(60));
        let ctx = CancellationToken::new();
        let before = Utc::now();

        assert_ok!(cache.store(&ctx, "key1", "value1".to_string(), TimeDelta::zero()).await);

        let (value, expires_at) = cache.fetch(&ctx, "key1").await.unwrap();
        assert_eq!(value, "value1");
        assert!(expires_at >= before + TimeDelta::seconds(60));
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let cache = cache(2, Duration::from_secs(60));
        let ctx = CancellationToken::new();

        assert_eq!(
            cache.store(&ctx, "", "v".to_string(), TimeDelta::zero()).await,
            Err(CacheError::EmptyKey)
        );
        assert_eq!(
            cache.store(&ctx, "k", "v".to_string(), TimeDelta::seconds(-5)).await,
            Err(CacheError::NegativeTtl)
        );
        assert_eq!(cache.fetch(&ctx, "").await, Err(CacheError::EmptyKey));
        assert_eq!(cache.evict(&ctx, "").await, Err(CacheError::EmptyKey));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_default_ttl_expiry() {
        // capacity=1, default TTL=1ms
        let cache = cache(1, Duration::from_millis(1));
        let ctx = CancellationToken::new();

        cache
            .store(&ctx, "x", "v".to_string(), TimeDelta::zero())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(
            cache.fetch(&ctx, "x").await,
            Err(CacheError::KeyExpired("x".to_string()))
        );
        assert_eq!(
            cache.fetch(&ctx, "x").await,
            Err(CacheError::KeyNotFound("x".to_string()))
        );
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_fetch_all_skips_expired() {
        let cache = cache(3, Duration::from_secs(1));
        let ctx = CancellationToken::new();

        cache
            .store(&ctx, "x", "vx".to_string(), TimeDelta::milliseconds(500))
            .await
            .unwrap();
        cache
            .store(&ctx, "y", "vy".to_string(), TimeDelta::seconds(2))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;

        let (keys, values) = cache.fetch_all(&ctx).await.unwrap();
        assert_eq!(keys, vec!["y"]);
        assert_eq!(values, vec!["vy"]);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_cache_failures() {
        let cache = cache(3, Duration::from_secs(60));
        let ctx = CancellationToken::new();

        assert_eq!(cache.fetch_all(&ctx).await, Err(CacheError::EmptyCache));
        assert_eq!(cache.evict_all(&ctx).await, Err(CacheError::EmptyCache));
        assert_eq!(
            cache.evict(&ctx, "missing").await,
            Err(CacheError::KeyNotFound("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_evict_all_then_fetch() {
        let cache = cache(3, Duration::from_secs(60));
        let ctx = CancellationToken::new();

        for key in ["key1", "key2", "key3"] {
            cache
                .store(&ctx, key, format!("{key}-value"), TimeDelta::zero())
                .await
                .unwrap();
        }

        assert_ok!(cache.evict_all(&ctx).await);
        assert_eq!(
            cache.fetch(&ctx, "key1").await,
            Err(CacheError::KeyNotFound("key1".to_string()))
        );
        assert_eq!(cache.fetch_all(&ctx).await, Err(CacheError::EmptyCache));
    }

    #[tokio::test]
    async fn test_cancelled_token_has_no_side_effects() {
        let cache = cache(3, Duration::from_secs(60));
        let live = CancellationToken::new();
        cache
            .store(&live, "kept", "v".to_string(), TimeDelta::zero())
            .await
            .unwrap();

        let ctx = CancellationToken::new();
        ctx.cancel();

        // Cancellation wins over input validation
        assert_eq!(
            cache.store(&ctx, "", "v".to_string(), TimeDelta::zero()).await,
            Err(CacheError::Cancelled)
        );
        assert_eq!(
            cache.store(&ctx, "new", "v".to_string(), TimeDelta::zero()).await,
            Err(CacheError::Cancelled)
        );
        assert_eq!(cache.fetch(&ctx, "kept").await, Err(CacheError::Cancelled));
        assert_eq!(cache.fetch_all(&ctx).await, Err(CacheError::Cancelled));
        assert_eq!(cache.evict(&ctx, "kept").await, Err(CacheError::Cancelled));
        assert_eq!(cache.evict_all(&ctx).await, Err(CacheError::Cancelled));

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.fetch(&live, "kept").await.unwrap().0, "v");
    }

    #[tokio::test]
    async fn test_cancellation_while_waiting_for_lock() {
        let cache = Arc::new(cache(3, Duration::from_secs(60)));
        let ctx = CancellationToken::new();

        // Hold the write lock so the store call has to wait
        let guard = cache.store.write().await;

        let waiter = {
            let cache = cache.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move {
                cache
                    .store(&ctx, "blocked", "v".to_string(), TimeDelta::zero())
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        ctx.cancel();

        assert_eq!(waiter.await.unwrap(), Err(CacheError::Cancelled));
        drop(guard);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_fetch_judges_expiry_after_waiting_for_lock() {
        let cache = Arc::new(cache(3, Duration::from_secs(60)));
        let ctx = CancellationToken::new();

        cache
            .store(&ctx, "k", "v".to_string(), TimeDelta::milliseconds(100))
            .await
            .unwrap();

        // Entry is live when the fetch starts but expires while it waits
        let guard = cache.store.write().await;
        let waiter = {
            let cache = cache.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move { cache.fetch(&ctx, "k").await })
        };

        tokio::time::sleep(Duration::from_millis(300)).await;
        drop(guard);

        assert_eq!(
            waiter.await.unwrap(),
            Err(CacheError::KeyExpired("k".to_string()))
        );
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_fetch_keeps_entry_rewritten_after_expiry_seen() {
        let cache = cache(3, Duration::from_secs(60));
        let ctx = CancellationToken::new();

        cache
            .store(&ctx, "k", "stale".to_string(), TimeDelta::milliseconds(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        // The shared-lock pass sees the entry as expired...
        {
            let store = cache.store.read().await;
            assert_eq!(
                store.peek("k", Utc::now()),
                Err(CacheError::KeyExpired("k".to_string()))
            );
        }

        // ...then a writer replaces it before the write lock is taken
        cache
            .store(&ctx, "k", "fresh".to_string(), TimeDelta::zero())
            .await
            .unwrap();

        let (value, expires_at) = cache.fetch_exclusive(&ctx, "k").await.unwrap();
        assert_eq!(value, "fresh");
        assert!(expires_at > Utc::now());
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.fetch(&ctx, "k").await.unwrap().0, "fresh");
    }

    #[tokio::test]
    async fn test_fetch_exclusive_removes_entry_still_expired() {
        let cache = cache(3, Duration::from_secs(60));
        let ctx = CancellationToken::new();

        cache
            .store(&ctx, "k", "v".to_string(), TimeDelta::milliseconds(10))
            .await
            .unwrap();
        cache
            .store(&ctx, "other", "w".to_string(), TimeDelta::zero())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(
            cache.fetch_exclusive(&ctx, "k").await,
            Err(CacheError::KeyExpired("k".to_string()))
        );
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.stats().await.expirations, 1);
    }

    #[tokio::test]
    async fn test_evict_round_trip() {
        let cache = cache(3, Duration::from_secs(60));
        let ctx = CancellationToken::new();

        cache
            .store(&ctx, "k", "first".to_string(), TimeDelta::zero())
            .await
            .unwrap();
        cache
            .store(&ctx, "k", "second".to_string(), TimeDelta::zero())
            .await
            .unwrap();

        assert_eq!(cache.evict(&ctx, "k").await, Ok("second".to_string()));
        assert_err!(cache.evict(&ctx, "k").await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stores_respect_capacity() {
        let cache = Arc::new(cache(16, Duration::from_secs(60)));
        let ctx = CancellationToken::new();

        let mut handles = Vec::new();
        for worker in 0..8 {
            let cache = cache.clone();
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    let key = format!("w{worker}-k{i}");
                    cache
                        .store(&ctx, key.clone(), key, TimeDelta::zero())
                        .await
                        .unwrap();
                    let _ = cache.fetch(&ctx, &format!("w{worker}-k{}", i / 2)).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.len().await, 16);
        let (keys, values) = cache.fetch_all(&ctx).await.unwrap();
        assert_eq!(keys.len(), 16);
        assert_eq!(keys, values);

        let stats = cache.stats().await;
        assert_eq!(stats.evictions, 8 * 50 - 16);
    }
}
