//! Heartbeat emitter.
//!
//! Posts `{id, address}` to the controller on start and every
//! `HEARTBEAT_INTERVAL` thereafter. Runs as its own task off the request
//! path; delivery failures are logged and ignored.

use super::WorkerState;
use crate::controller::protocol::{HeartbeatRequest, ENDPOINT_HEARTBEAT};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub fn spawn(state: Arc<WorkerState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let url = format!("{}{}", state.cfg.controller, ENDPOINT_HEARTBEAT);
        let payload = HeartbeatRequest {
            id: state.cfg.id.clone(),
            address: state.cfg.address.clone(),
        };
        let mut interval = tokio::time::interval(state.cfg.heartbeat_interval);

        loop {
            interval.tick().await;

            match state
                .client
                .post(url.clone())
                .json(&payload)
                .timeout(state.cfg.request_timeout)
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => {
                    tracing::debug!("Heartbeat delivered to {}", state.cfg.controller);
                }
                Ok(resp) => {
                    tracing::warn!("Heartbeat rejected with {}", resp.status());
                }
                Err(e) => {
                    tracing::warn!("Heartbeat to {} failed: {}", state.cfg.controller, e);
                }
            }
        }
    })
}
