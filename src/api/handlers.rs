//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. The storage
//! contract is synchronous, so every backend call runs on the blocking pool.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{open_backend, StorageBackend};
use crate::error::{CacheError, Result};
use crate::models::{
    ContainsResponse, DeleteResponse, FlushResponse, GetResponse, HealthResponse, SetRequest,
    SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The configured cache backend
    pub cache: Arc<dyn StorageBackend>,
}

impl AppState {
    /// Creates a new AppState around an opened backend.
    pub fn new(cache: Arc<dyn StorageBackend>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let cache = open_backend(&config.backend, None)?;
        Ok(Self::new(cache))
    }

    /// Runs `op` against the backend on the blocking thread pool.
    async fn with_cache<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&dyn StorageBackend) -> T + Send + 'static,
        T: Send + 'static,
    {
        let cache = self.cache.clone();
        tokio::task::spawn_blocking(move || op(cache.as_ref()))
            .await
            .map_err(|e| CacheError::Internal(format!("cache task failed: {}", e)))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl_seconds();
    let SetRequest { key, value, .. } = req;
    let response = SetResponse::new(key.as_str());
    state
        .with_cache(move |cache| cache.set(&key, value.into_bytes(), ttl))
        .await?;

    Ok(Json(response))
}

/// Handler for GET /get/:key
///
/// Retrieves a live value from the cache; misses are 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let lookup = key.clone();
    let value = state
        .with_cache(move |cache| cache.get(&lookup))
        .await?
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(
        key,
        String::from_utf8_lossy(&value).into_owned(),
    )))
}

/// Handler for DELETE /del/:key
///
/// Deleting an absent key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let target = key.clone();
    state.with_cache(move |cache| cache.delete(&target)).await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /contains/:key
///
/// Reports the backend's containment and expiry answers for a key.
pub async fn contains_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ContainsResponse>> {
    let lookup = key.clone();
    let (contains, expired) = state
        .with_cache(move |cache| (cache.contains(&lookup), cache.expired(&lookup)))
        .await?;

    Ok(Json(ContainsResponse {
        key,
        contains,
        expired,
    }))
}

/// Handler for POST /flush
pub async fn flush_handler(State(state): State<AppState>) -> Result<Json<FlushResponse>> {
    let flushed = state.with_cache(|cache| cache.flush()).await?;
    Ok(Json(FlushResponse { flushed }))
}

/// Handler for GET /stats
///
/// Returns current backend counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.diagnostics().snapshot();
    Json(StatsResponse::new(state.cache.to_string(), &stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
