//! Recovery dispatcher.
//!
//! Rebuilds the replica factor after a worker goes down. One pass unions
//! the key listings of every live worker, recomputes each key's ideal
//! replica set under the current membership, and instructs every ideal
//! member that lacks a key to pull it from a live donor that holds it.
//! Pull instructions are batched per (target, donor) pair.
//!
//! A pass is best-effort: failures are logged and the pass reruns on the
//! next detector tick until it completes cleanly. Idempotent writes make a
//! key pulled by two targets in parallel harmless.

use super::{placement, ControllerState};
use super::types::WorkerId;
use crate::net;
use crate::worker::protocol::{PullRequest, PullResponse, ENDPOINT_KEYS, ENDPOINT_PULL};
use anyhow::Result;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;

struct PassStats {
    keys: usize,
    dispatched: usize,
    failed_listings: usize,
    failed_pulls: usize,
}

impl PassStats {
    fn clean(&self) -> bool {
        self.failed_listings == 0 && self.failed_pulls == 0
    }
}

/// Runs one recovery pass if none is in flight. Pending workers are only
/// cleared after a pass with no listing or pull failures, so a deficit
/// observed on the next detector tick is retried.
pub async fn run(state: Arc<ControllerState>) {
    if state.recovery_running.swap(true, Ordering::SeqCst) {
        return;
    }

    let pending: Vec<WorkerId> = state
        .recovery_pending
        .iter()
        .map(|id| id.key().clone())
        .collect();

    if !pending.is_empty() {
        tracing::info!(
            "Starting recovery pass for {} down worker(s): {:?}",
            pending.len(),
            pending
        );

        match rebuild_replicas(&state).await {
            Ok(stats) if stats.clean() => {
                tracing::info!(
                    "Recovery pass complete: {} keys checked, {} pulls dispatched",
                    stats.keys,
                    stats.dispatched
                );
                for id in &pending {
                    state.recovery_pending.remove(id);
                }
            }
            Ok(stats) => {
                tracing::warn!(
                    "Recovery pass incomplete ({} listing failures, {} pull failures), retrying next tick",
                    stats.failed_listings,
                    stats.failed_pulls
                );
            }
            Err(e) => {
                tracing::warn!("Recovery pass failed: {}, retrying next tick", e);
            }
        }
    }

    state.recovery_running.store(false, Ordering::SeqCst);
}

async fn rebuild_replicas(state: &Arc<ControllerState>) -> Result<PassStats> {
    let live = state.registry.live_workers();
    if live.is_empty() {
        anyhow::bail!("no live workers to recover onto");
    }

    let timeout = state.cfg.request_timeout;
    let addresses: HashMap<WorkerId, String> = live.iter().cloned().collect();

    // Union of keys currently stored anywhere live, with their holders.
    let mut holders: HashMap<String, Vec<WorkerId>> = HashMap::new();
    let mut failed_listings = 0;

    for (id, addr) in &live {
        match fetch_keys(&state.client, addr, timeout).await {
            Ok(keys) => {
                tracing::debug!("{} keys listed by worker {}", keys.len(), id);
                for key in keys {
                    holders.entry(key).or_default().push(id.clone());
                }
            }
            Err(e) => {
                tracing::warn!("Key listing from {} failed: {}", id, e);
                failed_listings += 1;
            }
        }
    }

    let keys = holders.len();

    // Deficits against the ideal replica set, batched per (target, donor).
    // live_workers() is sorted by id, so it is already the canonical ring.
    let sorted_ids: Vec<WorkerId> = live.iter().map(|(id, _)| id.clone()).collect();
    let batches: HashMap<(WorkerId, String), Vec<String>> = {
        let mut batches: HashMap<(WorkerId, String), Vec<String>> = HashMap::new();
        let mut rng = rand::thread_rng();

        for (key, holding) in &holders {
            let ideal = placement::replica_set(key, &sorted_ids, state.cfg.replicas);
            for target in ideal {
                if holding.contains(&target) {
                    continue;
                }
                // Random donor spreads pull load across holders.
                let Some(donor) = holding.choose(&mut rng) else {
                    continue;
                };
                let donor_addr = addresses[donor].clone();
                batches
                    .entry((target, donor_addr))
                    .or_default()
                    .push(key.clone());
            }
        }
        batches
    };

    let mut dispatched = 0;
    let mut failed_pulls = 0;

    for ((target, donor_addr), keys) in batches {
        let target_addr = &addresses[&target];
        let count = keys.len();
        let payload = PullRequest {
            donor: donor_addr.clone(),
            keys,
        };

        tracing::info!(
            "Instructing {} to pull {} key(s) from {}",
            target,
            count,
            donor_addr
        );

        let url = format!("{}{}", target_addr, ENDPOINT_PULL);
        match net::post_json_with_backoff(&state.client, url, &payload, timeout, 2).await {
            Ok(resp) if resp.status().is_success() => match resp.json::<PullResponse>().await {
                Ok(summary) => {
                    dispatched += summary.pulled;
                    failed_pulls += summary.failed;
                }
                Err(e) => {
                    tracing::warn!("Unreadable pull summary from {}: {}", target, e);
                    failed_pulls += count;
                }
            },
            Ok(resp) => {
                tracing::warn!("Pull on {} returned {}", target, resp.status());
                failed_pulls += count;
            }
            Err(e) => {
                tracing::warn!("Pull on {} failed: {}", target, e);
                failed_pulls += count;
            }
        }
    }

    Ok(PassStats {
        keys,
        dispatched,
        failed_listings,
        failed_pulls,
    })
}

async fn fetch_keys(
    client: &reqwest::Client,
    addr: &str,
    timeout: std::time::Duration,
) -> Result<Vec<String>> {
    let url = format!("{}{}", addr, ENDPOINT_KEYS);
    let resp = net::get_with_backoff(client, url, timeout, 2).await?;
    if !resp.status().is_success() {
        anyhow::bail!("key listing returned {}", resp.status());
    }
    Ok(resp.json::<Vec<String>>().await?)
}
