//! Controller Node
//!
//! The controller owns the cluster view: which workers exist, which are
//! live, and where every key's replicas belong.
//!
//! ## Core Mechanisms
//! - **Registry**: workers announce themselves with periodic heartbeats;
//!   entries are upserted on receipt and never deleted.
//! - **Placement**: a deterministic SHA-256-based mapping from key to an
//!   ordered replica set over the live membership.
//! - **Failure Detection**: a background sweep flips workers that missed
//!   the heartbeat window to down.
//! - **Recovery**: for every down transition, a dispatcher rebuilds the
//!   replica factor of affected keys by instructing surviving workers to
//!   pull from donors that still hold them.

pub mod detector;
pub mod handlers;
pub mod placement;
pub mod protocol;
pub mod recovery;
pub mod registry;
pub mod types;


use crate::config::ControllerConfig;
use axum::routing::{get, post};
use axum::{Extension, Router};
use dashmap::DashSet;
use registry::WorkerRegistry;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tower_http::cors::CorsLayer;
use types::WorkerId;

/// Shared state behind every controller handler and background task.
pub struct ControllerState {
    pub cfg: ControllerConfig,
    pub registry: WorkerRegistry,
    /// Down workers whose recovery has not yet completed a clean pass.
    pub recovery_pending: DashSet<WorkerId>,
    /// Guards against overlapping recovery passes.
    pub recovery_running: AtomicBool,
    pub client: reqwest::Client,
}

impl ControllerState {
    pub fn new(cfg: ControllerConfig) -> Arc<Self> {
        let registry = WorkerRegistry::new();

        // Optional demo pre-seed so mapping works before the first heartbeat.
        for (i, address) in cfg.seed_workers.iter().enumerate() {
            registry.heartbeat(WorkerId(format!("w{}", i)), address.clone());
        }

        Arc::new(Self {
            cfg,
            registry,
            recovery_pending: DashSet::new(),
            recovery_running: AtomicBool::new(false),
            client: reqwest::Client::new(),
        })
    }
}

/// Controller HTTP surface. CORS is permissive for the browser console.
pub fn router(state: Arc<ControllerState>) -> Router {
    Router::new()
        .route(protocol::ENDPOINT_HEALTH, get(handlers::handle_health))
        .route(protocol::ENDPOINT_MAP, get(handlers::handle_map))
        .route(protocol::ENDPOINT_WORKERS, get(handlers::handle_workers))
        .route(protocol::ENDPOINT_HEARTBEAT, post(handlers::handle_heartbeat))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}
