//! Fixed-size worker pool over an index-addressed work list.
//!
//! Workers share one atomic cursor and claim indices with `fetch_add` until
//! the list is drained. Every claimed index owns exactly one result slot, so
//! the output is always in input order no matter which call finished first.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Upper bound on concurrent workers regardless of what the caller asks for.
pub const MAX_WORKERS: usize = 10;
/// Used when the caller gives no usable limit.
pub const DEFAULT_WORKERS: usize = 4;

/// Effective worker count, always within `1..=MAX_WORKERS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerBudget(usize);

impl WorkerBudget {
    pub fn from_requested(requested: i64) -> Self {
        Self(requested.clamp(1, MAX_WORKERS as i64) as usize)
    }

    /// Reads a loosely typed `threads` value: numbers and numeric strings
    /// are clamped, fractions truncated, anything else falls back to the
    /// default.
    pub fn from_json(value: Option<&Value>) -> Self {
        let requested = match value {
            Some(Value::Number(number)) => number
                .as_i64()
                .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
            Some(Value::String(raw)) => raw.trim().parse::<f64>().ok().and_then(|f| {
                if f.is_finite() {
                    Some(f as i64)
                } else {
                    None
                }
            }),
            _ => None,
        };

        requested.map(Self::from_requested).unwrap_or_default()
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for WorkerBudget {
    fn default() -> Self {
        Self(DEFAULT_WORKERS)
    }
}

/// Runs one async job per item under a [`WorkerBudget`].
#[derive(Debug, Clone, Copy)]
pub struct BoundedExecutor {
    budget: WorkerBudget,
}

impl BoundedExecutor {
    pub fn new(budget: WorkerBudget) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> WorkerBudget {
        self.budget
    }

    /// Processes every item and returns one slot per item, in input order.
    ///
    /// A slot is `None` only when its item was never completed: the token
    /// was cancelled before or while it ran, or the job panicked. Each job
    /// runs as its own task, so a panic empties one slot and the worker moves
    /// on to the next index. Dropping the returned future cancels the batch.
    pub async fn run<T, R, F, Fut>(
        &self,
        items: Vec<T>,
        cancel: CancellationToken,
        job: F,
    ) -> Vec<Option<R>>
    where
        T: Clone + Send + Sync + 'static,
        R: Send + Sync + 'static,
        F: Fn(usize, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }

        let cancel = cancel.child_token();
        let _abort_on_drop = cancel.clone().drop_guard();

        let items = Arc::new(items);
        let slots: Arc<Vec<OnceLock<R>>> =
            Arc::new((0..total).map(|_| OnceLock::new()).collect());
        let cursor = Arc::new(AtomicUsize::new(0));
        let job = Arc::new(job);

        let worker_count = self.budget.get().min(total);
        debug!(total, workers = worker_count, "starting bounded batch");

        let handles: Vec<_> = (0..worker_count)
            .map(|worker| {
                let items = Arc::clone(&items);
                let slots = Arc::clone(&slots);
                let cursor = Arc::clone(&cursor);
                let job = Arc::clone(&job);
                let cancel = cancel.clone();

                tokio::spawn(async move {
                    let mut processed = 0usize;
                    loop {
                        if cancel.is_cancelled() {
                            break;
                        }

                        let index = cursor.fetch_add(1, Ordering::Relaxed);
                        if index >= items.len() {
                            break;
                        }

                        let item = items[index].clone();
                        let mut task = tokio::spawn((*job)(index, item));
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => {
                                task.abort();
                                break;
                            }
                            joined = &mut task => match joined {
                                Ok(output) => {
                                    if slots[index].set(output).is_err() {
                                        warn!(index, "result slot written twice");
                                    }
                                    processed += 1;
                                }
                                Err(err) => warn!(index, error = %err, "job terminated abnormally"),
                            },
                        }
                    }
                    debug!(worker, processed, "worker finished");
                })
            })
            .collect();

        for handle in handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "batch worker terminated abnormally");
            }
        }

        match Arc::try_unwrap(slots) {
            Ok(slots) => slots.into_iter().map(OnceLock::into_inner).collect(),
            Err(_) => {
                warn!("result slots still shared after all workers joined");
                (0..total).map(|_| None).collect()
            }
        }
    }
}
