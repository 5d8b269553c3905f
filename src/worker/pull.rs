//! Pull responder.
//!
//! Executes a controller-issued pull instruction: fetch each listed key
//! from the donor worker and write it locally with full durability. The
//! batch is best-effort; the summary reports how many keys landed.

use super::protocol::{GetResponse, PullResponse, ENDPOINT_KV};
use super::WorkerState;
use crate::net;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

pub async fn pull_batch(state: &Arc<WorkerState>, donor: &str, keys: &[String]) -> PullResponse {
    let donor = donor.trim_end_matches('/');
    let mut pulled = 0usize;
    let mut failed = 0usize;

    for key in keys {
        match fetch_value(&state.client, donor, key, state.cfg.request_timeout).await {
            Ok(Some(value)) => match state.store.put(key, &value).await {
                Ok(()) => pulled += 1,
                Err(e) => {
                    tracing::warn!("Failed to persist pulled key '{}': {}", key, e);
                    failed += 1;
                }
            },
            Ok(None) => {
                tracing::warn!("Donor {} no longer holds '{}'", donor, key);
                failed += 1;
            }
            Err(e) => {
                tracing::warn!("Pull of '{}' from {} failed: {}", key, donor, e);
                failed += 1;
            }
        }
    }

    tracing::info!("Pull from {} done: {} pulled, {} failed", donor, pulled, failed);

    PullResponse { pulled, failed }
}

async fn fetch_value(
    client: &reqwest::Client,
    donor: &str,
    key: &str,
    timeout: Duration,
) -> Result<Option<String>> {
    let url = format!("{}{}/{}", donor, ENDPOINT_KV, urlencoding::encode(key));
    let resp = net::get_with_backoff(client, url, timeout, 2).await?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !resp.status().is_success() {
        anyhow::bail!("donor returned {}", resp.status());
    }

    let body: GetResponse = resp.json().await?;
    Ok(Some(body.value))
}
