use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::lookup::{
    Candidate, LookupService, StaticSuffixStore, SuffixDictionary, Verdict, VerificationError,
    VpaVerifier,
};

pub(super) fn dictionary() -> SuffixDictionary {
    SuffixDictionary::from_entries(["okicici", "oksbi"])
}

pub(super) fn large_dictionary(size: usize) -> SuffixDictionary {
    SuffixDictionary::from_entries((0..size).map(|i| format!("bank{i:02}")))
}

pub(super) fn verdict(status: &str) -> Verdict {
    Verdict::from_payload(json!({ "status": status })).expect("stub verdict")
}

/// Deterministic oracle: listed addresses are valid, everything else invalid.
#[derive(Default)]
pub(super) struct StubOracle {
    valid: HashSet<String>,
    failing: HashSet<String>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StubOracle {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn valid(mut self, vpa: &str) -> Self {
        self.valid.insert(vpa.to_string());
        self
    }

    pub(super) fn failing(mut self, vpa: &str) -> Self {
        self.failing.insert(vpa.to_string());
        self
    }

    pub(super) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub(super) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VpaVerifier for StubOracle {
    async fn verify(&self, candidate: &Candidate) -> Result<Verdict, VerificationError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(candidate.as_str().to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(candidate.as_str()) {
            return Err(VerificationError::Transport("connection reset".to_string()));
        }
        if self.valid.contains(candidate.as_str()) {
            Ok(verdict("VALID"))
        } else {
            Ok(verdict("INVALID"))
        }
    }
}

/// Oracle whose every call fails at the transport level.
pub(super) struct UnreachableOracle;

#[async_trait]
impl VpaVerifier for UnreachableOracle {
    async fn verify(&self, _candidate: &Candidate) -> Result<Verdict, VerificationError> {
        Err(VerificationError::Transport("connection refused".to_string()))
    }
}

/// Oracle that never answers; only cancellation ends its calls.
pub(super) struct HangingOracle;

#[async_trait]
impl VpaVerifier for HangingOracle {
    async fn verify(&self, _candidate: &Candidate) -> Result<Verdict, VerificationError> {
        std::future::pending::<()>().await;
        Err(VerificationError::Timeout)
    }
}

pub(super) fn build_service<V>(
    dictionary: SuffixDictionary,
    oracle: Arc<V>,
    deadline: Duration,
) -> Arc<LookupService<StaticSuffixStore, V>>
where
    V: VpaVerifier + 'static,
{
    Arc::new(LookupService::new(
        Arc::new(StaticSuffixStore::new(dictionary)),
        oracle,
        deadline,
    ))
}
