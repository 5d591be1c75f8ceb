use crate::infra::{build_fampay_client, build_lookup_service};
use clap::Args;
use std::path::PathBuf;
use upi_recon::config::AppConfig;
use upi_recon::error::AppError;
use upi_recon::lookup::{fampay_id, BatchResult, Outcome, WorkerBudget};

#[derive(Args, Debug)]
pub(crate) struct ScanArgs {
    /// Mobile number to scan (10 digits, optionally prefixed with 91)
    #[arg(long)]
    pub(crate) phone: String,
    /// Concurrent oracle calls (clamped to 1..=10)
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) threads: Option<i64>,
    /// Suffix list to use instead of the configured SUFFIX_FILE
    #[arg(long)]
    pub(crate) suffixes: Option<PathBuf>,
    /// Print the full result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct VerifyArgs {
    /// Full address to check, e.g. 9999999999@okicici
    #[arg(long)]
    pub(crate) vpa: String,
}

#[derive(Args, Debug)]
pub(crate) struct FamPayArgs {
    /// FamPay id to resolve, e.g. kumarchx@fam
    #[arg(long)]
    pub(crate) upi: String,
}

pub(crate) async fn run_scan(args: ScanArgs) -> Result<(), AppError> {
    let ScanArgs {
        phone,
        threads,
        suffixes,
        json,
    } = args;

    let config = AppConfig::load()?;
    let budget = threads
        .map(WorkerBudget::from_requested)
        .unwrap_or(config.lookup.default_workers);
    let service = build_lookup_service(&config.lookup, suffixes)?;

    let batch = service.scan_phone(&phone, budget).await?;

    if json {
        match serde_json::to_string_pretty(&batch) {
            Ok(body) => println!("{body}"),
            Err(err) => println!("Scan result unavailable as JSON: {err}"),
        }
    } else {
        render_batch(&phone, budget, &batch);
    }

    Ok(())
}

pub(crate) async fn run_verify(args: VerifyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_lookup_service(&config.lookup, None)?;

    let verdict = service.verify_vpa(&args.vpa).await?;
    println!("{} -> {}", args.vpa.trim(), verdict.status);
    match serde_json::to_string_pretty(&verdict.payload) {
        Ok(body) => println!("{body}"),
        Err(err) => println!("Oracle payload unavailable: {err}"),
    }

    Ok(())
}

pub(crate) async fn run_fampay_lookup(args: FamPayArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let client = build_fampay_client(&config.lookup)?;

    let reply = match fampay_id(Some(&args.upi)) {
        Ok(upi) => client.lookup(&upi).await,
        Err(err) => Err(err),
    };
    let (status, body) = match reply {
        Ok(reply) => (reply.status, reply.body),
        Err(err) => (err.status_code().as_u16(), err.body()),
    };

    println!("{} -> HTTP {status}", args.upi.trim());
    match serde_json::to_string_pretty(&body) {
        Ok(body) => println!("{body}"),
        Err(err) => println!("FamPay payload unavailable: {err}"),
    }

    Ok(())
}

fn render_batch(phone: &str, budget: WorkerBudget, batch: &BatchResult) {
    println!("UPI scan for {phone}");
    println!(
        "- Checked {} handles with {} workers ({} errors)",
        batch.scanned,
        budget.get(),
        batch.errored
    );
    if batch.cancelled {
        println!("- Scan deadline reached; unfinished handles are reported as errors");
    }

    if batch.valid.is_empty() {
        println!("\nNo registered addresses found");
    } else {
        println!("\nRegistered addresses:");
        for outcome in &batch.valid {
            println!("  - {}", outcome.candidate());
        }
    }

    let failures: Vec<_> = batch
        .outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            Outcome::Failed { vpa, error } => Some((vpa, error)),
            _ => None,
        })
        .collect();
    if !failures.is_empty() {
        println!("\nUnverified handles:");
        for (vpa, error) in failures {
            println!("  - {vpa}: {error}");
        }
    }
}
