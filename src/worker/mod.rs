//! Worker Node
//!
//! A worker owns a durable local key-value store and serves the client
//! read/write API.
//!
//! ## Core Mechanisms
//! - **Store**: one file per key, loaded into memory at start; writes are
//!   fsynced before acknowledgement.
//! - **Write Coordination**: any worker coordinates a PUT: map lookup,
//!   local write, concurrent fan-out, reply at quorum, detached tail.
//! - **Replication Receive / Pull**: idempotent durable writes pushed by
//!   coordinators or fetched from donors during recovery.
//! - **Heartbeat**: periodic liveness signal to the controller.

pub mod coordinator;
pub mod handlers;
pub mod heartbeat;
pub mod protocol;
pub mod pull;
pub mod store;

#[cfg(test)]
mod tests;

use crate::config::WorkerConfig;
use anyhow::Result;
use axum::routing::{get, post, put};
use axum::{Extension, Router};
use std::sync::Arc;
use store::KeyStore;
use tower_http::cors::CorsLayer;

/// Shared state behind every worker handler and the heartbeat emitter.
pub struct WorkerState {
    pub cfg: WorkerConfig,
    pub store: KeyStore,
    pub client: reqwest::Client,
}

impl WorkerState {
    /// Opens the data directory (loading persisted keys) and builds the
    /// shared state.
    pub async fn new(cfg: WorkerConfig) -> Result<Arc<Self>> {
        let store = KeyStore::open(&cfg.data_dir).await?;

        Ok(Arc::new(Self {
            cfg,
            store,
            client: reqwest::Client::new(),
        }))
    }
}

/// Worker HTTP surface. CORS is permissive for the browser console.
pub fn router(state: Arc<WorkerState>) -> Router {
    Router::new()
        .route(
            &format!("{}/:key", protocol::ENDPOINT_KV),
            put(handlers::handle_put)
                .get(handlers::handle_get)
                .delete(handlers::handle_delete),
        )
        .route(protocol::ENDPOINT_KEYS, get(handlers::handle_keys))
        .route(
            &format!("{}/:key", protocol::ENDPOINT_REPLICATE),
            post(handlers::handle_replicate),
        )
        .route(protocol::ENDPOINT_PULL, post(handlers::handle_pull))
        .route(protocol::ENDPOINT_HEALTH, get(handlers::handle_health))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}
