//! PUT coordinator.
//!
//! Any worker accepts a client PUT. The coordinator asks the controller for
//! the key's replica set, writes locally if it is a member, fans replicate
//! calls out to the rest concurrently, and replies as soon as `WRITE_QUORUM`
//! acknowledgements are in. Outstanding replicate calls keep running
//! detached until completion or their own deadline.
//!
//! A worker that is not in the replica set is a pure proxy: it forwards the
//! PUT to the primary and relays the result.

use super::protocol::{PutRequest, PutResponse, ReplicateRequest, ENDPOINT_KV, ENDPOINT_REPLICATE};
use super::WorkerState;
use crate::controller::protocol::{MapResponse, ENDPOINT_MAP};
use crate::error::{ErrorBody, KvError};
use std::sync::Arc;
use std::time::Duration;

pub async fn coordinate_put(
    state: &Arc<WorkerState>,
    key: String,
    value: String,
) -> Result<PutResponse, KvError> {
    let replicas = map_lookup(state, &key).await?;
    let is_replica = replicas
        .iter()
        .any(|addr| addr.trim_end_matches('/') == state.cfg.address);

    if !is_replica {
        tracing::debug!("Not a replica for '{}', proxying to primary", key);
        return forward_to_primary(state, &replicas[0], &key, &value).await;
    }

    // Local durable write counts as the first ack. A storage failure
    // abandons the PUT before any fan-out.
    state
        .store
        .put(&key, &value)
        .await
        .map_err(|e| KvError::StorageFailure(e.to_string()))?;

    let mut acks = 1usize;
    let need = state.cfg.write_quorum;

    let others: Vec<String> = replicas
        .iter()
        .map(|addr| addr.trim_end_matches('/').to_string())
        .filter(|addr| addr != &state.cfg.address)
        .collect();

    let (tx, mut rx) = tokio::sync::mpsc::channel::<bool>(others.len().max(1));
    for addr in others {
        let tx = tx.clone();
        let client = state.client.clone();
        let key = key.clone();
        let value = value.clone();
        let timeout = state.cfg.request_timeout;
        tokio::spawn(async move {
            let acked = replicate_to(&client, &addr, &key, &value, timeout).await;
            // After quorum the receiver is gone; the tail call still ran.
            let _ = tx.send(acked).await;
        });
    }
    drop(tx);

    while acks < need {
        match rx.recv().await {
            Some(true) => acks += 1,
            Some(false) => {}
            // Every outcome is in and quorum was not reached.
            None => break,
        }
    }

    if acks >= need {
        Ok(PutResponse { key, value, acks })
    } else {
        tracing::warn!("Quorum not met for '{}': {}/{} acks", key, acks, need);
        Err(KvError::QuorumNotMet { got: acks, need })
    }
}

/// Replica-set lookup on the controller. The coordinator performs no local
/// write when this fails.
async fn map_lookup(state: &Arc<WorkerState>, key: &str) -> Result<Vec<String>, KvError> {
    let url = format!(
        "{}{}?key={}",
        state.cfg.controller,
        ENDPOINT_MAP,
        urlencoding::encode(key)
    );

    let resp = state
        .client
        .get(url)
        .timeout(state.cfg.request_timeout)
        .send()
        .await
        .map_err(|e| KvError::MappingUnavailable(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        return match resp.json::<ErrorBody>().await {
            Ok(body) => Err(KvError::from_wire(body)),
            Err(_) => Err(KvError::MappingUnavailable(format!(
                "controller returned {}",
                status
            ))),
        };
    }

    let map: MapResponse = resp
        .json()
        .await
        .map_err(|e| KvError::MappingUnavailable(e.to_string()))?;

    if map.replicas.is_empty() {
        return Err(KvError::NoWorkers);
    }

    Ok(map.replicas)
}

async fn replicate_to(
    client: &reqwest::Client,
    addr: &str,
    key: &str,
    value: &str,
    timeout: Duration,
) -> bool {
    let url = format!("{}{}/{}", addr, ENDPOINT_REPLICATE, urlencoding::encode(key));
    let payload = ReplicateRequest {
        value: value.to_string(),
    };

    match client.post(url).json(&payload).timeout(timeout).send().await {
        Ok(resp) if resp.status().is_success() => true,
        Ok(resp) => {
            tracing::warn!("Replicate of '{}' to {} returned {}", key, addr, resp.status());
            false
        }
        Err(e) if e.is_timeout() => {
            tracing::warn!("Replicate of '{}' to {} timed out", key, addr);
            false
        }
        Err(e) => {
            tracing::warn!("Replicate of '{}' to {} failed: {}", key, addr, e);
            false
        }
    }
}

async fn forward_to_primary(
    state: &Arc<WorkerState>,
    primary: &str,
    key: &str,
    value: &str,
) -> Result<PutResponse, KvError> {
    let primary = primary.trim_end_matches('/');
    let url = format!("{}{}/{}", primary, ENDPOINT_KV, urlencoding::encode(key));
    let payload = PutRequest {
        value: value.to_string(),
    };

    // The proxied write contains a full fan-out on the primary, so it gets
    // a wider deadline than a single replicate call.
    let resp = state
        .client
        .put(url)
        .json(&payload)
        .timeout(state.cfg.request_timeout * 2)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                KvError::PeerTimeout(format!("primary {}", primary))
            } else {
                KvError::PeerUnreachable(format!("primary {}: {}", primary, e))
            }
        })?;

    if resp.status().is_success() {
        resp.json::<PutResponse>()
            .await
            .map_err(|e| KvError::PeerUnreachable(format!("primary {}: {}", primary, e)))
    } else {
        let status = resp.status();
        match resp.json::<ErrorBody>().await {
            Ok(body) => Err(KvError::from_wire(body)),
            Err(_) => Err(KvError::PeerUnreachable(format!(
                "primary {} returned {}",
                primary, status
            ))),
        }
    }
}
