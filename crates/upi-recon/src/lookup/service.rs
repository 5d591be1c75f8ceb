use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::batch::verify_batch_with_cancel;
use super::candidates::{generate, Candidate, InvalidSeed, Seed};
use super::dictionary::{DictionaryError, SuffixStore};
use super::executor::WorkerBudget;
use super::outcome::BatchResult;
use super::verifier::{Verdict, VerificationError, VpaVerifier};

/// Composes the suffix store, candidate generator, and oracle.
pub struct LookupService<S: ?Sized, V: ?Sized> {
    suffixes: Arc<S>,
    verifier: Arc<V>,
    scan_deadline: Duration,
}

impl<S, V> LookupService<S, V>
where
    S: SuffixStore + ?Sized + 'static,
    V: VpaVerifier + ?Sized + 'static,
{
    pub fn new(suffixes: Arc<S>, verifier: Arc<V>, scan_deadline: Duration) -> Self {
        Self {
            suffixes,
            verifier,
            scan_deadline,
        }
    }

    /// Expands `phone` into candidates and verifies them under `budget`.
    ///
    /// Seed and dictionary problems are returned before any oracle call.
    /// When the scan deadline passes, outstanding work is cancelled and the
    /// partial result is returned with `cancelled` set. Dropping the returned
    /// future cancels every spawned worker.
    pub async fn scan_phone(
        &self,
        phone: &str,
        budget: WorkerBudget,
    ) -> Result<BatchResult, LookupError> {
        let seed = Seed::parse(phone)?;
        let dictionary = self.suffixes.load()?;
        let candidates = generate(&seed, &dictionary);
        info!(
            seed = %seed,
            candidates = candidates.len(),
            workers = budget.get(),
            "scanning phone number"
        );

        let cancel = CancellationToken::new();
        let _abort_on_drop = cancel.clone().drop_guard();

        let batch = verify_batch_with_cancel(
            candidates,
            budget,
            Arc::clone(&self.verifier),
            cancel.clone(),
        );
        tokio::pin!(batch);

        let deadline = tokio::time::sleep(self.scan_deadline);
        tokio::pin!(deadline);

        let result = tokio::select! {
            result = &mut batch => result,
            _ = &mut deadline => {
                warn!(
                    seed = %seed,
                    deadline = ?self.scan_deadline,
                    "scan deadline reached, cancelling"
                );
                cancel.cancel();
                batch.await
            }
        };

        Ok(result)
    }

    /// Single-address passthrough to the oracle.
    pub async fn verify_vpa(&self, vpa: &str) -> Result<Verdict, LookupError> {
        let vpa = vpa.trim();
        if !vpa.contains('@') {
            return Err(LookupError::InvalidVpa {
                vpa: vpa.to_string(),
            });
        }

        let candidate = Candidate::new(vpa);
        self.verifier
            .verify(&candidate)
            .await
            .map_err(|source| LookupError::Verification { candidate, source })
    }
}

/// Batch-level failures; per-candidate errors never surface here.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    InvalidSeed(#[from] InvalidSeed),
    #[error(transparent)]
    DictionaryUnavailable(#[from] DictionaryError),
    #[error("please provide a full VPA like user@bank (got '{vpa}')")]
    InvalidVpa { vpa: String },
    #[error("verification of {candidate} failed: {source}")]
    Verification {
        candidate: Candidate,
        #[source]
        source: VerificationError,
    },
}

impl LookupError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LookupError::InvalidSeed(_) | LookupError::InvalidVpa { .. } => {
                StatusCode::BAD_REQUEST
            }
            LookupError::DictionaryUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LookupError::Verification { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}
