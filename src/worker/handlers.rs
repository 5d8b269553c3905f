//! Worker API Handlers
//!
//! The bridge between the HTTP surface and the store/coordinator logic.
//! Errors surface through the shared taxonomy; handlers never leak a raw
//! internal error onto the wire.

use axum::Json;
use axum::extract::{Extension, Path};
use std::sync::Arc;

use super::protocol::{
    AckResponse, GetResponse, PullRequest, PullResponse, PutRequest, PutResponse, ReplicateRequest,
    WorkerHealth,
};
use super::{coordinator, pull, WorkerState};
use crate::error::KvError;

/// Client PUT: coordinated quorum write (or proxy to the primary).
pub async fn handle_put(
    Extension(state): Extension<Arc<WorkerState>>,
    Path(key): Path<String>,
    Json(req): Json<PutRequest>,
) -> Result<Json<PutResponse>, KvError> {
    coordinator::coordinate_put(&state, key, req.value)
        .await
        .map(Json)
}

/// Client GET: served from the local store only.
pub async fn handle_get(
    Extension(state): Extension<Arc<WorkerState>>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>, KvError> {
    match state.store.get(&key) {
        Some(value) => Ok(Json(GetResponse { value })),
        None => Err(KvError::NotFound),
    }
}

/// Local-only delete; not replicated.
pub async fn handle_delete(
    Extension(state): Extension<Arc<WorkerState>>,
    Path(key): Path<String>,
) -> Result<Json<AckResponse>, KvError> {
    state
        .store
        .remove(&key)
        .await
        .map_err(|e| KvError::StorageFailure(e.to_string()))?;
    Ok(Json(AckResponse { ok: true }))
}

pub async fn handle_keys(Extension(state): Extension<Arc<WorkerState>>) -> Json<Vec<String>> {
    Json(state.store.keys())
}

/// Replica write pushed by a coordinator. Success means the value is
/// durable here; redelivery is a no-op.
pub async fn handle_replicate(
    Extension(state): Extension<Arc<WorkerState>>,
    Path(key): Path<String>,
    Json(req): Json<ReplicateRequest>,
) -> Result<Json<AckResponse>, KvError> {
    state
        .store
        .put(&key, &req.value)
        .await
        .map_err(|e| KvError::StorageFailure(e.to_string()))?;
    Ok(Json(AckResponse { ok: true }))
}

/// Controller-issued pull instruction.
pub async fn handle_pull(
    Extension(state): Extension<Arc<WorkerState>>,
    Json(req): Json<PullRequest>,
) -> Json<PullResponse> {
    Json(pull::pull_batch(&state, &req.donor, &req.keys).await)
}

pub async fn handle_health(Extension(state): Extension<Arc<WorkerState>>) -> Json<WorkerHealth> {
    Json(WorkerHealth {
        status: "worker up".to_string(),
        stored_keys: state.store.len(),
    })
}
