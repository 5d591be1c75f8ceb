use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::candidates::Candidate;

/// Status string the oracle uses for a confirmed address.
pub const VALID_STATUS: &str = "VALID";

/// Structured oracle response for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: String,
    pub payload: Value,
}

impl Verdict {
    /// Interprets a raw response body. Anything that is not an object with a
    /// string `status` field is rejected rather than read as "not valid".
    pub fn from_payload(payload: Value) -> Result<Self, VerificationError> {
        let status = payload
            .as_object()
            .and_then(|object| object.get("status"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| VerificationError::InvalidVerdict {
                reason: "response has no string `status` field".to_string(),
            })?;

        Ok(Self { status, payload })
    }

    pub fn is_valid(&self) -> bool {
        self.status == VALID_STATUS
    }
}

/// Why a single verification call did not produce a verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP {0}")]
    HttpStatus(u16),
    #[error("unreadable verdict: {reason}")]
    InvalidVerdict { reason: String },
}

/// The external verification capability.
#[async_trait]
pub trait VpaVerifier: Send + Sync {
    async fn verify(&self, candidate: &Candidate) -> Result<Verdict, VerificationError>;
}
