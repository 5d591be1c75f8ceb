use crate::scan::{run_fampay_lookup, run_scan, run_verify, FamPayArgs, ScanArgs, VerifyArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use upi_recon::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "UPI Recon",
    about = "Find the UPI addresses registered to a mobile number",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Scan every known bank handle for a phone number
    Scan(ScanArgs),
    /// Check a single address against the oracle
    Verify(VerifyArgs),
    /// Resolve a FamPay id through the payout lookup
    Fampay(FamPayArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Scan(args) => run_scan(args).await,
        Command::Verify(args) => run_verify(args).await,
        Command::Fampay(args) => run_fampay_lookup(args).await,
    }
}
