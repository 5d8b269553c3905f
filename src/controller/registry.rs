//! Worker registry.
//!
//! Holds every worker that has ever heartbeated, with its address, last
//! heartbeat and liveness. Mutations are serialized by the concurrent map;
//! readers take snapshots and release them before any wire I/O.

use super::placement;
use super::protocol::WorkerInfo;
use super::types::{now_ms, WorkerEntry, WorkerId};
use crate::error::KvError;
use dashmap::DashMap;
use std::time::{Duration, Instant};

pub struct WorkerRegistry {
    entries: DashMap<WorkerId, WorkerEntry>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Heartbeat ingest: upsert the worker and mark it up.
    ///
    /// A previously-down worker is revived with no special action; it simply
    /// reappears in future mapping answers.
    pub fn heartbeat(&self, id: WorkerId, address: String) {
        let address = address.trim_end_matches('/').to_string();
        let mut entry = self.entries.entry(id).or_insert_with(|| WorkerEntry {
            address: address.clone(),
            last_seen: Instant::now(),
            last_heartbeat_ms: now_ms(),
            live: true,
        });
        entry.address = address;
        entry.last_seen = Instant::now();
        entry.last_heartbeat_ms = now_ms();
        entry.live = true;
    }

    /// Live workers as (id, address) pairs in canonical (sorted-by-id) order.
    pub fn live_workers(&self) -> Vec<(WorkerId, String)> {
        let mut live: Vec<(WorkerId, String)> = self
            .entries
            .iter()
            .filter(|entry| entry.value().live)
            .map(|entry| (entry.key().clone(), entry.value().address.clone()))
            .collect();
        live.sort_by(|a, b| a.0.cmp(&b.0));
        live
    }

    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.value().live).count()
    }

    /// Full listing for `/workers`, all entries including down ones.
    pub fn snapshot(&self) -> Vec<WorkerInfo> {
        let mut all: Vec<WorkerInfo> = self
            .entries
            .iter()
            .map(|entry| WorkerInfo {
                id: entry.key().0.clone(),
                address: entry.value().address.clone(),
                live: entry.value().live,
                last_heartbeat: entry.value().last_heartbeat_ms,
            })
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Replica-set addresses for a key over the current live membership.
    pub fn map_key(&self, key: &str, replicas: usize) -> Result<Vec<String>, KvError> {
        let live = self.live_workers();
        if live.is_empty() {
            return Err(KvError::NoWorkers);
        }

        let sorted_ids: Vec<WorkerId> = live.iter().map(|(id, _)| id.clone()).collect();
        let set = placement::replica_set(key, &sorted_ids, replicas);

        Ok(set
            .iter()
            .map(|id| {
                live.iter()
                    .find(|(lid, _)| lid == id)
                    .map(|(_, addr)| addr.clone())
                    .expect("replica set members come from the live list")
            })
            .collect())
    }

    /// Failure-detector sweep: flip every live entry that missed the timeout
    /// window to down and return the flipped identifiers. Entries are
    /// preserved; only the liveness flag changes.
    pub fn sweep(&self, timeout: Duration) -> Vec<WorkerId> {
        let now = Instant::now();
        let mut flipped = Vec::new();

        for mut entry in self.entries.iter_mut() {
            if entry.value().live && now.duration_since(entry.value().last_seen) > timeout {
                entry.value_mut().live = false;
                flipped.push(entry.key().clone());
            }
        }

        flipped
    }
}
