use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::candidates::Candidate;
use super::executor::{BoundedExecutor, WorkerBudget};
use super::outcome::{BatchResult, Outcome};
use super::verifier::VpaVerifier;

const CANCELLED_REASON: &str = "cancelled before verification completed";
const ABORTED_REASON: &str = "verification task panicked";

/// Verifies every candidate under `budget` and waits for all of them.
/// Dropping the returned future cancels the calls still in flight.
pub async fn verify_batch<V>(
    candidates: Vec<Candidate>,
    budget: WorkerBudget,
    verifier: Arc<V>,
) -> BatchResult
where
    V: VpaVerifier + ?Sized + 'static,
{
    verify_batch_with_cancel(candidates, budget, verifier, CancellationToken::new()).await
}

/// Like [`verify_batch`], but stops claiming new candidates and drops
/// in-flight calls once `cancel` fires. Slots that never completed are
/// reported as failed and the result is flagged as cancelled.
pub async fn verify_batch_with_cancel<V>(
    candidates: Vec<Candidate>,
    budget: WorkerBudget,
    verifier: Arc<V>,
    cancel: CancellationToken,
) -> BatchResult
where
    V: VpaVerifier + ?Sized + 'static,
{
    if candidates.is_empty() {
        return BatchResult::empty();
    }

    let executor = BoundedExecutor::new(budget);
    let slots = executor
        .run(candidates.clone(), cancel.clone(), move |_, candidate: Candidate| {
            let verifier = Arc::clone(&verifier);
            async move {
                let result = verifier.verify(&candidate).await;
                if let Err(err) = &result {
                    warn!(vpa = %candidate, error = %err, "verification failed");
                }
                Outcome::from_result(candidate, result)
            }
        })
        .await;

    let cancelled = cancel.is_cancelled();
    let outcomes: Vec<Outcome> = candidates
        .into_iter()
        .zip(slots)
        .map(|(vpa, slot)| {
            slot.unwrap_or_else(|| Outcome::Failed {
                vpa,
                error: if cancelled {
                    CANCELLED_REASON.to_string()
                } else {
                    ABORTED_REASON.to_string()
                },
            })
        })
        .collect();

    let batch = BatchResult::from_outcomes(outcomes, cancelled);
    info!(
        scanned = batch.scanned,
        valid = batch.valid.len(),
        errored = batch.errored,
        cancelled = batch.cancelled,
        workers = budget.get(),
        "batch verification finished"
    );
    batch
}
