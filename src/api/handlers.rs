//! API Handlers
//!
//! HTTP request handlers for each endpoint of the cache front end.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::config::Config;
use crate::consistent_hash::HashRing;
use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::models::{GetResponse, HealthResponse, OwnerResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups served by this node
    pub registry: Arc<GroupRegistry>,
    /// Ring of every node, built once at startup
    pub ring: Arc<HashRing>,
    /// This node's name on the ring
    pub node_name: String,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(registry: Arc<GroupRegistry>, ring: HashRing, node_name: impl Into<String>) -> Self {
        Self {
            registry,
            ring: Arc::new(ring),
            node_name: node_name.into(),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Places every configured peer on the ring.
    pub fn from_config(registry: Arc<GroupRegistry>, config: &Config) -> Self {
        let mut ring = HashRing::new(config.ring_replicas, None);
        ring.add(config.peer_list().as_slice());
        Self::new(registry, ring, config.node_name.clone())
    }
}

/// Handler for GET /api/:group/:key
///
/// Loads the value through the group. The loader may block, so the lookup
/// runs on the blocking pool. A loader reporting [`KeyNotFound`] answers
/// 404; any other loader failure answers 502.
///
/// [`KeyNotFound`]: crate::error::KeyNotFound
pub async fn get_handler(
    State(state): State<AppState>,
    Path((group_name, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    let group = state
        .registry
        .get_group(&group_name)
        .ok_or_else(|| CacheError::GroupNotFound(group_name.clone()))?;

    let lookup_key = key.clone();
    let value = tokio::task::spawn_blocking(move || group.get(&lookup_key))
        .await
        .map_err(|e| CacheError::Internal(e.to_string()))??;

    Ok(Json(GetResponse::new(group_name, key, &value)))
}

/// Handler for GET /owner/:key
///
/// Reports which node owns a key on the hash ring.
pub async fn owner_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<OwnerResponse>> {
    let node = state
        .ring
        .get(&key)
        .ok_or_else(|| CacheError::Internal("hash ring has no nodes".to_string()))?;
    debug!(key = %key, node, "ring lookup");

    Ok(Json(OwnerResponse::new(key.as_str(), node, &state.node_name)))
}

/// Handler for GET /stats/:group
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(group_name): Path<String>,
) -> Result<Json<StatsResponse>> {
    let group = state
        .registry
        .get_group(&group_name)
        .ok_or_else(|| CacheError::GroupNotFound(group_name.clone()))?;

    Ok(Json(StatsResponse::new(group_name, group.stats())))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
