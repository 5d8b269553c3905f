//! Outbound HTTP helpers.
//!
//! Transport failures (refused connections, timeouts) are retried a bounded
//! number of times; an HTTP response of any status counts as delivered and
//! is returned to the caller for interpretation. Retries back off linearly
//! with a proportional random jitter so concurrent retries spread out.

use anyhow::Result;
use rand::Rng;
use std::time::Duration;

pub async fn post_json_with_backoff<T: serde::Serialize>(
    client: &reqwest::Client,
    url: String,
    payload: &T,
    timeout: Duration,
    attempts: u32,
) -> Result<reqwest::Response> {
    send_with_backoff(client.post(url).json(payload).timeout(timeout), attempts).await
}

pub async fn get_with_backoff(
    client: &reqwest::Client,
    url: String,
    timeout: Duration,
    attempts: u32,
) -> Result<reqwest::Response> {
    send_with_backoff(client.get(url).timeout(timeout), attempts).await
}

/// Sends a request up to `attempts` times. The builder is cloned for every
/// retryable attempt; the last attempt consumes it, so its outcome is
/// returned as-is.
async fn send_with_backoff(
    request: reqwest::RequestBuilder,
    attempts: u32,
) -> Result<reqwest::Response> {
    for attempt in 1..attempts {
        // A builder with a streaming body cannot be cloned; send it once.
        let Some(retry) = request.try_clone() else {
            break;
        };

        match retry.send().await {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                tracing::debug!("Request attempt {} failed: {}, backing off", attempt, e);
                tokio::time::sleep(backoff_delay(attempt)).await;
            }
        }
    }

    Ok(request.send().await?)
}

/// Delay before the retry that follows `attempt` (1-based): a linearly
/// growing base plus up to the same amount of jitter.
fn backoff_delay(attempt: u32) -> Duration {
    let base = 100 * attempt as u64;
    Duration::from_millis(base + rand::thread_rng().gen_range(0..base))
}
