//! Controller API Handlers
//!
//! Translates the HTTP surface into registry calls. Mapping answers are
//! computed from a live-set snapshot; no handler holds registry state
//! across wire I/O.

use axum::Json;
use axum::extract::{Extension, Query};
use std::sync::Arc;

use super::ControllerState;
use super::protocol::{
    ControllerHealth, HeartbeatRequest, HeartbeatResponse, MapQuery, MapResponse, WorkerInfo,
};
use super::types::WorkerId;
use crate::error::KvError;

pub async fn handle_health(
    Extension(state): Extension<Arc<ControllerState>>,
) -> Json<ControllerHealth> {
    Json(ControllerHealth {
        status: "controller up".to_string(),
        workers_count: state.registry.live_count(),
    })
}

pub async fn handle_heartbeat(
    Extension(state): Extension<Arc<ControllerState>>,
    Json(req): Json<HeartbeatRequest>,
) -> Json<HeartbeatResponse> {
    tracing::debug!("Heartbeat from {} at {}", req.id, req.address);
    state.registry.heartbeat(WorkerId(req.id), req.address);
    Json(HeartbeatResponse { ok: true })
}

pub async fn handle_workers(
    Extension(state): Extension<Arc<ControllerState>>,
) -> Json<Vec<WorkerInfo>> {
    Json(state.registry.snapshot())
}

pub async fn handle_map(
    Extension(state): Extension<Arc<ControllerState>>,
    Query(query): Query<MapQuery>,
) -> Result<Json<MapResponse>, KvError> {
    let replicas = state.registry.map_key(&query.key, state.cfg.replicas)?;
    Ok(Json(MapResponse {
        key: query.key,
        replicas,
    }))
}
