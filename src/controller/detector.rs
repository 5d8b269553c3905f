//! Heartbeat-driven failure detector.
//!
//! A crash-stop detector: any live worker whose last heartbeat is older
//! than `HEARTBEAT_TIMEOUT` is flipped to down within one `CHECK_INTERVAL`.
//! It cannot tell a crash from a partition; at prototype scale a false
//! positive only costs redundant re-replication.

use super::{recovery, ControllerState};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub fn spawn(state: Arc<ControllerState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.cfg.check_interval);

        loop {
            interval.tick().await;
            tick(&state);
        }
    })
}

/// One detector iteration: sweep timeouts, then (re-)dispatch recovery for
/// any worker still pending. The recovery pass runs detached so a slow pull
/// never stalls detection cadence.
pub fn tick(state: &Arc<ControllerState>) {
    let flipped = state.registry.sweep(state.cfg.heartbeat_timeout);

    for id in flipped {
        tracing::warn!("Worker {} missed the heartbeat window, marking down", id);
        state.recovery_pending.insert(id);
    }

    if !state.recovery_pending.is_empty() {
        let state = state.clone();
        tokio::spawn(async move {
            recovery::run(state).await;
        });
    }
}
