//! Worker wire contract.
//!
//! DTOs for the read/write API and the worker-to-worker replication and
//! pull traffic. Values travel as the JSON envelope `{"value": "..."}` and
//! keys as URL-encoded path segments.

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Read/write prefix; keys are appended as one encoded path segment.
pub const ENDPOINT_KV: &str = "/kv";
/// Listing of locally present keys.
pub const ENDPOINT_KEYS: &str = "/keys";
/// Replica write pushed by a PUT coordinator.
pub const ENDPOINT_REPLICATE: &str = "/replicate";
/// Batched pull instruction issued by the controller's recovery dispatcher.
pub const ENDPOINT_PULL: &str = "/pull";
/// Cheap health descriptor.
pub const ENDPOINT_HEALTH: &str = "/health";

// --- Data Transfer Objects ---

/// Body of a client PUT.
#[derive(Debug, Serialize, Deserialize)]
pub struct PutRequest {
    pub value: String,
}

/// Success reply of a coordinated PUT; `acks` counts durable copies
/// confirmed before the reply, including the coordinator's own write.
#[derive(Debug, Serialize, Deserialize)]
pub struct PutResponse {
    pub key: String,
    pub value: String,
    pub acks: usize,
}

/// Value envelope returned by GET and persisted on disk.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetResponse {
    pub value: String,
}

/// Replica write carried by `/replicate/{key}`. Idempotent on receipt.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReplicateRequest {
    pub value: String,
}

/// Plain acknowledgement used by replicate and delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
}

/// Batched pull instruction: fetch `keys` from the worker at `donor`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PullRequest {
    pub donor: String,
    pub keys: Vec<String>,
}

/// Best-effort batch summary; one key's failure never aborts the rest.
#[derive(Debug, Serialize, Deserialize)]
pub struct PullResponse {
    pub pulled: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkerHealth {
    pub status: String,
    pub stored_keys: usize,
}
