//! Phone-number scan: candidate generation, bounded verification, and the
//! HTTP surface that exposes them.

mod batch;
pub mod candidates;
pub mod dictionary;
pub mod executor;
pub mod fampay;
pub mod juspay;
pub mod outcome;
pub mod router;
pub mod service;
pub mod verifier;

#[cfg(test)]
mod tests;

pub use batch::{verify_batch, verify_batch_with_cancel};
pub use candidates::{generate, Candidate, InvalidSeed, Seed};
pub use dictionary::{
    DictionaryError, FileSuffixStore, StaticSuffixStore, SuffixDictionary, SuffixStore,
};
pub use executor::{BoundedExecutor, WorkerBudget, DEFAULT_WORKERS, MAX_WORKERS};
pub use fampay::{fampay_id, FamPayError, FamPayReply, FamPayVerifier};
pub use juspay::JuspayVerifier;
pub use outcome::{BatchResult, Outcome};
pub use router::{fampay_router, lookup_router};
pub use service::{LookupError, LookupService};
pub use verifier::{Verdict, VerificationError, VpaVerifier, VALID_STATUS};
