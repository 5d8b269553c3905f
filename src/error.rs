//! Error taxonomy shared by the controller and the workers.
//!
//! Every error that crosses a node boundary is translated into one of these
//! kinds before it reaches the wire, and each kind carries a fixed HTTP
//! status. The JSON body is `{"error": <kind>, "detail": <message>}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic error kinds of the replication pipeline.
#[derive(Error, Debug)]
pub enum KvError {
    /// Mapping was requested but the live worker set is empty.
    #[error("no live workers available")]
    NoWorkers,

    /// The PUT coordinator could not reach the controller.
    #[error("controller unreachable: {0}")]
    MappingUnavailable(String),

    /// The local write happened but too few acks arrived before the deadline.
    #[error("write quorum not met: got {got}, need {need}")]
    QuorumNotMet { got: usize, need: usize },

    /// GET for a key this worker does not hold.
    #[error("key not found")]
    NotFound,

    /// The local durable write failed; the PUT is abandoned before fan-out.
    #[error("local storage failure: {0}")]
    StorageFailure(String),

    /// A replicate or pull target did not answer within the deadline.
    #[error("peer timed out: {0}")]
    PeerTimeout(String),

    /// A replicate or pull target refused the connection or errored.
    #[error("peer unreachable: {0}")]
    PeerUnreachable(String),
}

/// Wire shape of an error response. `acks`/`needed` are present only for
/// `QuorumNotMet`, so a proxying worker can relay the primary's true counts.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acks: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needed: Option<usize>,
}

impl KvError {
    pub fn status(&self) -> StatusCode {
        match self {
            KvError::NoWorkers => StatusCode::SERVICE_UNAVAILABLE,
            KvError::MappingUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            KvError::QuorumNotMet { .. } => StatusCode::SERVICE_UNAVAILABLE,
            KvError::NotFound => StatusCode::NOT_FOUND,
            KvError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            KvError::PeerTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            KvError::PeerUnreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable kind tag used in the wire body.
    pub fn kind(&self) -> &'static str {
        match self {
            KvError::NoWorkers => "NoWorkers",
            KvError::MappingUnavailable(_) => "MappingUnavailable",
            KvError::QuorumNotMet { .. } => "QuorumNotMet",
            KvError::NotFound => "NotFound",
            KvError::StorageFailure(_) => "StorageFailure",
            KvError::PeerTimeout(_) => "PeerTimeout",
            KvError::PeerUnreachable(_) => "PeerUnreachable",
        }
    }

    /// Rebuilds an error from a peer's wire body, e.g. when a proxied PUT
    /// relays the primary's failure. Unknown kinds collapse to
    /// `PeerUnreachable` so nothing foreign leaks through the taxonomy.
    pub fn from_wire(body: ErrorBody) -> Self {
        match body.error.as_str() {
            "NoWorkers" => KvError::NoWorkers,
            "MappingUnavailable" => KvError::MappingUnavailable(body.detail),
            "QuorumNotMet" => KvError::QuorumNotMet {
                got: body.acks.unwrap_or(0),
                need: body.needed.unwrap_or(0),
            },
            "NotFound" => KvError::NotFound,
            "StorageFailure" => KvError::StorageFailure(body.detail),
            "PeerTimeout" => KvError::PeerTimeout(body.detail),
            _ => KvError::PeerUnreachable(body.detail),
        }
    }
}

impl IntoResponse for KvError {
    fn into_response(self) -> Response {
        let (acks, needed) = match &self {
            KvError::QuorumNotMet { got, need } => (Some(*got), Some(*need)),
            _ => (None, None),
        };
        let body = ErrorBody {
            error: self.kind().to_string(),
            detail: self.to_string(),
            acks,
            needed,
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(KvError::NoWorkers.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(KvError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            KvError::StorageFailure("disk".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            KvError::QuorumNotMet { got: 1, need: 2 }.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_wire_roundtrip_preserves_quorum_counts() {
        let err = KvError::QuorumNotMet { got: 1, need: 2 };
        let body = ErrorBody {
            error: err.kind().to_string(),
            detail: err.to_string(),
            acks: Some(1),
            needed: Some(2),
        };

        match KvError::from_wire(body) {
            KvError::QuorumNotMet { got, need } => {
                assert_eq!(got, 1, "Relayed error must carry the primary's ack count");
                assert_eq!(need, 2);
            }
            other => panic!("Expected QuorumNotMet, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_collapses_to_peer_unreachable() {
        let body = ErrorBody {
            error: "SomethingElse".to_string(),
            detail: "boom".to_string(),
            acks: None,
            needed: None,
        };
        let rebuilt = KvError::from_wire(body);
        assert_eq!(rebuilt.kind(), "PeerUnreachable");
    }
}
