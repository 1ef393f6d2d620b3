//! API Handlers
//!
//! HTTP request handlers that translate requests into cache operations.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cache::LruCache;
use crate::config::Config;
use crate::error::{ApiError, CacheError};
use crate::models::{
    CreateRequest, DeleteResponse, GetAllResponse, GetResponse, HealthResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache shared by every request
    pub cache: Arc<LruCache<Value>>,
    /// Cancelled when the server shuts down
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: LruCache<Value>, shutdown: CancellationToken) -> Self {
        Self {
            cache: Arc::new(cache),
            shutdown,
        }
    }

    /// Creates the cache described by the configuration.
    pub fn from_config(config: &Config, shutdown: CancellationToken) -> Self {
        Self::with_capacity(config.cache_size, config.default_cache_ttl, shutdown)
    }

    pub fn with_capacity(
        capacity: NonZeroUsize,
        default_ttl: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self::new(LruCache::new(capacity, default_ttl), shutdown)
    }

    /// Token for one request; fires when the server shuts down.
    fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}

/// Logs a failed cache operation at a level matching its kind.
fn reject(operation: &'static str, key: Option<&str>, err: CacheError) -> ApiError {
    let key = key.unwrap_or("-");
    if err.is_defect() {
        error!(operation, key, error = %err, "cache consistency failure");
    } else if err.is_state() {
        info!(operation, key, outcome = %err, "cache operation declined");
    } else if matches!(err, CacheError::Cancelled) {
        warn!(operation, key, "request cancelled");
    } else {
        warn!(operation, key, error = %err, "cache operation rejected");
    }
    ApiError::Cache(err)
}

/// Handler for POST /api/lru
///
/// Stores an entry. Responds 201 Created.
pub async fn create_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "invalid request body");
        ApiError::InvalidBody(rejection.body_text())
    })?;
    let ttl = req.ttl()?;

    let ctx = state.request_token();
    state
        .cache
        .store(&ctx, req.key.clone(), req.value, ttl)
        .await
        .map_err(|err| reject("store", Some(&req.key), err))?;

    info!(key = %req.key, "key added to cache");
    Ok(StatusCode::CREATED)
}

/// Handler for GET /api/lru/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>, ApiError> {
    let ctx = state.request_token();
    let (value, expires_at) = state
        .cache
        .fetch(&ctx, &key)
        .await
        .map_err(|err| reject("fetch", Some(&key), err))?;

    info!(key = %key, expires_at = %expires_at, "key retrieved from cache");
    Ok(Json(GetResponse::new(key, value, expires_at)))
}

/// Handler for GET /api/lru
///
/// An empty cache is answered with 204 No Content.
pub async fn get_all_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let ctx = state.request_token();
    match state.cache.fetch_all(&ctx).await {
        Ok((keys, values)) => {
            info!(count = keys.len(), "all keys retrieved from cache");
            Ok(Json(GetAllResponse::new(keys, values)).into_response())
        }
        Err(CacheError::EmptyCache) => {
            info!("cache is empty");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Err(err) => Err(reject("fetch_all", None, err)),
    }
}

/// Handler for DELETE /api/lru/:key
///
/// Responds with the removed value.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let ctx = state.request_token();
    let value = state
        .cache
        .evict(&ctx, &key)
        .await
        .map_err(|err| reject("evict", Some(&key), err))?;

    info!(key = %key, "key deleted from cache");
    Ok(Json(DeleteResponse::new(key, value)))
}

/// Handler for DELETE /api/lru
pub async fn delete_all_handler(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    let ctx = state.request_token();
    state
        .cache
        .evict_all(&ctx)
        .await
        .map_err(|err| reject("evict_all", None, err))?;

    info!("all keys deleted from cache");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
