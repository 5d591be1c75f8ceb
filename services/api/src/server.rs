use crate::cli::ServeArgs;
use crate::infra::{build_fampay_client, build_lookup_service, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use upi_recon::config::AppConfig;
use upi_recon::error::AppError;
use upi_recon::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let lookup_service = build_lookup_service(&config.lookup, None)?;
    let fampay = build_fampay_client(&config.lookup)?;

    let app = with_service_routes(lookup_service, fampay)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        oracle = %config.lookup.oracle_url,
        fampay = %config.lookup.fampay.endpoint,
        suffix_file = %config.lookup.suffix_file.display(),
        "upi recon service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
