//! Subscriber setup for the service and the CLI.
//!
//! Per-candidate verification failures are logged at `warn` from the batch
//! module; a full scan can emit dozens of them, so that target gets its own
//! directive on top of the global level.

use thiserror::Error;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, TelemetryConfig};

/// Target of the per-candidate `warn!` lines.
pub const VERIFICATION_TARGET: &str = "upi_recon::lookup::batch";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("unable to install subscriber: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Filter built from configuration alone, ignoring `RUST_LOG`.
pub fn configured_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    let mut filter =
        EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::Filter {
            value: config.log_level.clone(),
            source,
        })?;

    if let Some(level) = &config.verification_log_level {
        let value = format!("{VERIFICATION_TARGET}={level}");
        let directive = value
            .parse::<Directive>()
            .map_err(|source| TelemetryError::Filter { value, source })?;
        filter = filter.add_directive(directive);
    }

    Ok(filter)
}

/// Installs the global subscriber. A set `RUST_LOG` replaces the configured
/// filter entirely.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => configured_filter(config)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(config.ansi);

    match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Full => builder.try_init(),
    }
    .map_err(TelemetryError::Subscriber)
}
