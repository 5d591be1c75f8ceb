use serde::Serialize;

use super::candidates::Candidate;
use super::verifier::{Verdict, VerificationError};

/// How verification of one candidate concluded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Valid { vpa: Candidate, verdict: Verdict },
    Invalid { vpa: Candidate, verdict: Verdict },
    Failed { vpa: Candidate, error: String },
}

impl Outcome {
    pub fn from_result(vpa: Candidate, result: Result<Verdict, VerificationError>) -> Self {
        match result {
            Ok(verdict) if verdict.is_valid() => Outcome::Valid { vpa, verdict },
            Ok(verdict) => Outcome::Invalid { vpa, verdict },
            Err(err) => Outcome::Failed {
                vpa,
                error: err.to_string(),
            },
        }
    }

    pub fn candidate(&self) -> &Candidate {
        match self {
            Outcome::Valid { vpa, .. }
            | Outcome::Invalid { vpa, .. }
            | Outcome::Failed { vpa, .. } => vpa,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// All outcomes of a scan in input order, plus the confirmed subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub scanned: usize,
    pub errored: usize,
    pub cancelled: bool,
    pub valid: Vec<Outcome>,
    pub outcomes: Vec<Outcome>,
}

impl BatchResult {
    pub fn empty() -> Self {
        Self::from_outcomes(Vec::new(), false)
    }

    pub(crate) fn from_outcomes(outcomes: Vec<Outcome>, cancelled: bool) -> Self {
        let valid: Vec<Outcome> = outcomes.iter().filter(|o| o.is_valid()).cloned().collect();
        let errored = outcomes.iter().filter(|o| o.is_failed()).count();

        Self {
            scanned: outcomes.len(),
            errored,
            cancelled,
            valid,
            outcomes,
        }
    }

    pub fn valid_candidates(&self) -> Vec<&Candidate> {
        self.valid.iter().map(Outcome::candidate).collect()
    }
}
