//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{Cache, CacheStore, NoticeReceiver};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ApiResponse, EntryData, HealthResponse, ListedEntryData, SetData, SetRequest, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the cache instance
    pub cache: Cache,
    /// TTL applied when a SET request carries no expiration
    pub default_ttl: Duration,
}

impl AppState {
    pub fn new(cache: Cache, default_ttl: Duration) -> Self {
        Self { cache, default_ttl }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Returns the receiver the expiry reaper must be started with.
    pub fn from_config(config: &Config) -> (Self, NoticeReceiver) {
        let (cache, notices) = Cache::new(CacheStore::new(config.max_entries));
        (Self::new(cache, config.default_ttl_duration()), notices)
    }
}

/// Handler for GET /api/cache
///
/// Lists every live entry with its absolute expiration time.
pub async fn list_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<ListedEntryData>>> {
    let entries = state
        .cache
        .list()
        .await
        .into_iter()
        .map(ListedEntryData::from)
        .collect();

    Json(ApiResponse::ok("Cache retrieved", entries))
}

/// Handler for GET /api/cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<EntryData>>> {
    let value = state
        .cache
        .get(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(ApiResponse::ok(
        "Key found in cache",
        EntryData { key, value },
    )))
}

/// Handler for POST /api/cache
///
/// Stores a key-value pair, expiring after the requested or default TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<ApiResponse<SetData>>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidArgument(error_msg));
    }

    let ttl = req.ttl(state.default_ttl);
    let data = SetData {
        key: req.key.clone(),
        value: req.value.clone(),
        expiration: ttl.as_secs(),
    };
    state.cache.set(req.key, req.value, ttl).await?;

    Ok(Json(ApiResponse::ok("Key set in cache", data)))
}

/// Handler for DELETE /api/cache/:key
///
/// Succeeds whether or not the key was present.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ApiResponse<()>> {
    state.cache.delete(&key).await;

    Json(ApiResponse::message("Key deleted"))
}

/// Handler for GET /api/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
