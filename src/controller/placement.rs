//! Partition function and replica-set computation.
//!
//! Keys are digested with SHA-256 truncated to a `u64`; workers sorted by
//! identifier form the canonical ring. The primary index is `digest mod n`
//! and the replica set walks the ring cyclically. The function is a pure
//! function of (key, membership): every node that knows the same live set
//! computes the same placement with no coordination.
//!
//! Removing one worker shifts every primary assignment it hosted by exactly
//! one ring position, so keys whose backups survived still have a live
//! holder. Recovery relies on that property.

use super::types::WorkerId;
use sha2::{Digest, Sha256};

/// Stable digest of a key, reduced to an unsigned integer.
pub fn key_digest(key: &str) -> u64 {
    let hash = Sha256::digest(key.as_bytes());
    u64::from_be_bytes(hash[..8].try_into().expect("sha256 yields 32 bytes"))
}

/// Ring position of the primary for `key` among `n` workers.
pub fn primary_index(key: &str, n: usize) -> usize {
    (key_digest(key) % n as u64) as usize
}

/// Ordered replica set of length `min(replicas, |workers|)`.
///
/// `sorted_ids` must be the live worker identifiers in canonical (sorted)
/// order; an empty slice yields an empty set, which callers surface as
/// `NoWorkers`.
pub fn replica_set(key: &str, sorted_ids: &[WorkerId], replicas: usize) -> Vec<WorkerId> {
    if sorted_ids.is_empty() {
        return Vec::new();
    }

    let n = sorted_ids.len();
    let primary = primary_index(key, n);
    let count = replicas.min(n);

    (0..count)
        .map(|offset| sorted_ids[(primary + offset) % n].clone())
        .collect()
}
