use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use super::dictionary::SuffixStore;
use super::executor::WorkerBudget;
use super::fampay::{fampay_id, FamPayVerifier};
use super::outcome::Outcome;
use super::service::{LookupError, LookupService};
use super::verifier::VpaVerifier;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VerifyQuery {
    #[serde(default)]
    pub(crate) vpa: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyRequest {
    pub(crate) vpa: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScanRequest {
    #[serde(default)]
    pub(crate) phone: Option<Value>,
    #[serde(default)]
    pub(crate) threads: Option<Value>,
    #[serde(default)]
    pub(crate) include_outcomes: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FamPayLookup {
    #[serde(default)]
    pub(crate) upi: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScanResponse {
    pub(crate) scanned: usize,
    pub(crate) errored: usize,
    pub(crate) cancelled: bool,
    pub(crate) raw_count: usize,
    pub(crate) found: Vec<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) outcomes: Option<Vec<Outcome>>,
}

/// Router builder exposing the scan and single-address endpoints.
pub fn lookup_router<S, V>(service: Arc<LookupService<S, V>>) -> Router
where
    S: SuffixStore + ?Sized + 'static,
    V: VpaVerifier + ?Sized + 'static,
{
    Router::new()
        .route("/api", get(root_handler::<S, V>))
        .route(
            "/api/verify",
            get(verify_query_handler::<S, V>).post(verify_body_handler::<S, V>),
        )
        .route("/api/scan-phone", post(scan_handler::<S, V>))
        .with_state(service)
}

pub(crate) async fn root_handler<S, V>(
    State(service): State<Arc<LookupService<S, V>>>,
    Query(query): Query<VerifyQuery>,
) -> Response
where
    S: SuffixStore + ?Sized + 'static,
    V: VpaVerifier + ?Sized + 'static,
{
    match query.vpa {
        Some(vpa) => verify_response(&service, &vpa).await,
        None => Json(json!({
            "message": "UPI Recon API: use /api/verify?vpa=user@bank or POST /api/scan-phone",
            "example_verify": "/api/verify?vpa=9999999999@okicici",
        }))
        .into_response(),
    }
}

pub(crate) async fn verify_query_handler<S, V>(
    State(service): State<Arc<LookupService<S, V>>>,
    Query(query): Query<VerifyQuery>,
) -> Response
where
    S: SuffixStore + ?Sized + 'static,
    V: VpaVerifier + ?Sized + 'static,
{
    verify_response(&service, query.vpa.as_deref().unwrap_or_default()).await
}

pub(crate) async fn verify_body_handler<S, V>(
    State(service): State<Arc<LookupService<S, V>>>,
    Json(request): Json<VerifyRequest>,
) -> Response
where
    S: SuffixStore + ?Sized + 'static,
    V: VpaVerifier + ?Sized + 'static,
{
    verify_response(&service, &request.vpa).await
}

pub(crate) async fn scan_handler<S, V>(
    State(service): State<Arc<LookupService<S, V>>>,
    Json(request): Json<ScanRequest>,
) -> Response
where
    S: SuffixStore + ?Sized + 'static,
    V: VpaVerifier + ?Sized + 'static,
{
    let phone = match request.phone {
        Some(Value::String(raw)) if !raw.trim().is_empty() => raw,
        Some(Value::Number(number)) => number.to_string(),
        _ => {
            let payload = json!({ "error": "phone is required" });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };
    let budget = WorkerBudget::from_json(request.threads.as_ref());

    match service.scan_phone(&phone, budget).await {
        Ok(batch) => {
            let outcomes = request.include_outcomes.then(|| batch.outcomes.clone());
            let body = ScanResponse {
                scanned: batch.scanned,
                errored: batch.errored,
                cancelled: batch.cancelled,
                raw_count: batch.outcomes.len(),
                found: batch.valid,
                outcomes,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn verify_response<S, V>(service: &LookupService<S, V>, vpa: &str) -> Response
where
    S: SuffixStore + ?Sized + 'static,
    V: VpaVerifier + ?Sized + 'static,
{
    match service.verify_vpa(vpa).await {
        Ok(verdict) => {
            let payload = json!({
                "vpa": vpa.trim(),
                "status": verdict.status,
                "result": verdict.payload,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn error_response(err: LookupError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (err.status_code(), Json(payload)).into_response()
}

/// Router exposing the FamPay `/lookup` proxy.
pub fn fampay_router(client: Arc<FamPayVerifier>) -> Router {
    Router::new()
        .route("/lookup", get(fampay_query_handler).post(fampay_body_handler))
        .with_state(client)
}

pub(crate) async fn fampay_query_handler(
    State(client): State<Arc<FamPayVerifier>>,
    Query(query): Query<FamPayLookup>,
) -> Response {
    fampay_response(&client, query.upi.as_deref()).await
}

/// Bodies that are missing or not JSON are treated as carrying no id.
pub(crate) async fn fampay_body_handler(
    State(client): State<Arc<FamPayVerifier>>,
    body: Option<Json<FamPayLookup>>,
) -> Response {
    let upi = body.and_then(|Json(request)| request.upi);
    fampay_response(&client, upi.as_deref()).await
}

async fn fampay_response(client: &FamPayVerifier, raw: Option<&str>) -> Response {
    let reply = match fampay_id(raw) {
        Ok(upi) => client.lookup(&upi).await,
        Err(err) => Err(err),
    };

    match reply {
        Ok(reply) => {
            let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(reply.body)).into_response()
        }
        Err(err) => {
            if err.status_code().is_server_error() {
                warn!(error = %err, "fampay lookup failed");
            }
            (err.status_code(), Json(err.body())).into_response()
        }
    }
}
