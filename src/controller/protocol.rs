//! Controller wire contract.
//!
//! DTOs for the heartbeat, mapping, listing and health endpoints. Everything
//! is JSON over HTTP; addresses are base URLs as published by workers.

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Liveness signal posted periodically by every worker.
pub const ENDPOINT_HEARTBEAT: &str = "/heartbeat";
/// Replica-set query for a key.
pub const ENDPOINT_MAP: &str = "/map";
/// Registry listing with liveness.
pub const ENDPOINT_WORKERS: &str = "/workers";
/// Cheap health descriptor.
pub const ENDPOINT_HEALTH: &str = "/health";

// --- Data Transfer Objects ---

/// Body of a worker heartbeat.
#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    /// Stable worker identity.
    pub id: String,
    /// Base URL peers should dial.
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    pub ok: bool,
}

/// Query string of `/map`.
#[derive(Debug, Deserialize)]
pub struct MapQuery {
    pub key: String,
}

/// Ordered replica set for a key; the first address is the primary.
#[derive(Debug, Serialize, Deserialize)]
pub struct MapResponse {
    pub key: String,
    pub replicas: Vec<String>,
}

/// One row of the `/workers` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub id: String,
    pub address: String,
    pub live: bool,
    /// Unix-epoch milliseconds of the last heartbeat.
    pub last_heartbeat: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ControllerHealth {
    pub status: String,
    pub workers_count: usize,
}
