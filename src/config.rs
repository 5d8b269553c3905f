//! Environment-driven configuration for both node roles.
//!
//! Every knob has a default matching the reference deployment, so a bare
//! `--role worker --bind 127.0.0.1:8001` starts a usable node.

use std::path::PathBuf;
use std::time::Duration;

/// Controller-side settings.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Desired number of copies for each key (primary + backups).
    pub replicas: usize,
    /// A worker missing heartbeats for longer than this is marked down.
    pub heartbeat_timeout: Duration,
    /// Cadence of the failure detector.
    pub check_interval: Duration,
    /// Deadline for outbound recovery traffic (key listings, pulls).
    pub request_timeout: Duration,
    /// Optional comma-separated worker addresses to pre-seed the registry.
    pub seed_workers: Vec<String>,
}

impl ControllerConfig {
    pub fn from_env() -> Self {
        Self {
            replicas: env_parse("REPLICAS", 3),
            heartbeat_timeout: Duration::from_secs_f64(env_parse("HEARTBEAT_TIMEOUT", 6.0)),
            check_interval: Duration::from_secs_f64(env_parse("CHECK_INTERVAL", 2.0)),
            request_timeout: Duration::from_secs_f64(env_parse("REQUEST_TIMEOUT", 2.0)),
            seed_workers: std::env::var("WORKERS")
                .ok()
                .map(|raw| {
                    raw.split(',')
                        .map(|addr| addr.trim().trim_end_matches('/').to_string())
                        .filter(|addr| !addr.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Worker-side settings.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Base URL of the controller.
    pub controller: String,
    /// Base URL this worker publishes in heartbeats; peers dial it.
    pub address: String,
    /// Stable identity; partitioning hashes against it.
    pub id: String,
    /// Acks required before a PUT returns success.
    pub write_quorum: usize,
    /// Directory holding one file per key.
    pub data_dir: PathBuf,
    /// Deadline for every outbound HTTP call.
    pub request_timeout: Duration,
    /// Cadence of the heartbeat emitter.
    pub heartbeat_interval: Duration,
}

impl WorkerConfig {
    pub fn from_env() -> Self {
        let id = std::env::var("ID")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let data_dir = std::env::var("DATA_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("data_{}", id)));

        Self {
            controller: env_url("CONTROLLER", "http://localhost:8000"),
            address: env_url("ADDRESS", "http://localhost:8001"),
            id,
            write_quorum: env_parse("WRITE_QUORUM", 2),
            data_dir,
            request_timeout: Duration::from_secs_f64(env_parse("REQUEST_TIMEOUT", 2.0)),
            heartbeat_interval: Duration::from_secs_f64(env_parse("HEARTBEAT_INTERVAL", 2.0)),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_url(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
