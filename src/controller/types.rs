use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Stable identifier of a worker.
/// This is what partitioning hashes against; the address is what peers dial.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub String);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One registry entry. Created on the first heartbeat and never deleted;
/// a down worker keeps its entry and is revived by any fresh heartbeat.
#[derive(Debug, Clone)]
pub struct WorkerEntry {
    /// Base URL the worker published in its heartbeat.
    pub address: String,
    /// Monotonic instant of the last heartbeat, used by the detector.
    pub last_seen: Instant,
    /// Wall-clock mirror of `last_seen` for the `/workers` listing.
    pub last_heartbeat_ms: u64,
    /// Liveness as judged by the failure detector.
    pub live: bool,
}

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
