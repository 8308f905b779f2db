//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::ExpiringCache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetRequest,
    SetResponse, SweepResponse,
};

/// Cache type served over HTTP.
pub type SharedCache = ExpiringCache<String, String>;

/// Application state shared across all handlers.
///
/// The expiring cache synchronizes internally, so handlers share it through
/// a plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<SharedCache>,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: SharedCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// With `background_sweep` enabled this must run inside a Tokio runtime.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = ExpiringCache::new(
            Duration::from_millis(config.default_ttl_ms),
            config.background_sweep,
        )?;
        Ok(Self::new(cache))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair with the request TTL or the cache default.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    req.validate()?;

    let (ttl, ttl_ms) = match req.ttl_ms {
        Some(ms) => (Duration::from_millis(ms), ms),
        None => {
            let ttl = state.cache.default_ttl();
            (ttl, u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX))
        }
    };

    state.cache.put_with_ttl(req.key.clone(), req.value, ttl);

    Ok(Json(SetResponse::new(req.key, ttl_ms)))
}

/// Handler for GET /get/:key
///
/// Retrieves a live value; expired entries are removed and reported as 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    validate_key(&key)?;

    let value = state
        .cache
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    validate_key(&key)?;

    if !state.cache.remove(&key) {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear();
    Json(ClearResponse::new())
}

/// Handler for POST /sweep
///
/// Runs an expiry pass immediately instead of waiting for the sweeper.
pub async fn sweep_handler(State(state): State<AppState>) -> Json<SweepResponse> {
    let removed = state.cache.remove_expired_entries();
    Json(SweepResponse { removed })
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.len()))
}
