use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use upi_recon::config::LookupConfig;
use upi_recon::error::AppError;
use upi_recon::lookup::{FamPayVerifier, FileSuffixStore, JuspayVerifier, LookupService};

pub(crate) type ReconService = LookupService<FileSuffixStore, JuspayVerifier>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wires the file-backed suffix list and the Juspay client from config.
pub(crate) fn build_lookup_service(
    config: &LookupConfig,
    suffix_override: Option<PathBuf>,
) -> Result<Arc<ReconService>, AppError> {
    let suffix_file = suffix_override.unwrap_or_else(|| config.suffix_file.clone());
    let verifier = JuspayVerifier::from_config(config)?;

    Ok(Arc::new(LookupService::new(
        Arc::new(FileSuffixStore::new(suffix_file)),
        Arc::new(verifier),
        config.scan_deadline,
    )))
}

/// FamPay client for the `/lookup` proxy.
pub(crate) fn build_fampay_client(config: &LookupConfig) -> Result<Arc<FamPayVerifier>, AppError> {
    if config.fampay.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN is not set; FamPay lookups will be rejected upstream");
    }
    Ok(Arc::new(FamPayVerifier::new(&config.fampay)?))
}
