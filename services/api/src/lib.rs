mod cli;
mod infra;
mod routes;
mod scan;
mod server;

use upi_recon::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
