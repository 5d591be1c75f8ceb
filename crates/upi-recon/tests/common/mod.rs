#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Json, Router};
use serde_json::{json, Value};

pub const STUB_AUTH_TOKEN: &str = "stub-token";

/// Local stand-in for the verify-vpa endpoint and the FamPay payout-add
/// endpoint.
///
/// Juspay handles decide the reply: `okicici` is valid, `broken` returns a
/// non-JSON body, `down` answers 503, `slow` stalls for two seconds, anything
/// else is invalid. FamPay ids: `kumarchx@fam` resolves, `maintenance@fam`
/// answers an HTML 502, `slowpoke@fam` stalls, anything else is a JSON 404.
pub struct StubOracleServer {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicUsize>,
}

impl StubOracleServer {
    pub async fn start() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/upi/verify-vpa", post(verify_vpa))
            .route("/txn/create/payout/add/", post(payout_add))
            .with_state(Arc::clone(&hits));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub oracle");
        let addr = listener.local_addr().expect("stub oracle address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub oracle serves");
        });

        Self { addr, hits }
    }

    pub fn url(&self) -> String {
        format!("http://{}/upi/verify-vpa", self.addr)
    }

    pub fn fampay_url(&self) -> String {
        format!("http://{}/txn/create/payout/add/", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn verify_vpa(
    State(hits): State<Arc<AtomicUsize>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);

    if form.get("merchant_id").map(String::as_str) != Some("milaap") {
        return (StatusCode::BAD_REQUEST, "unknown merchant").into_response();
    }

    let vpa = form.get("vpa").cloned().unwrap_or_default();
    let handle = vpa.rsplit('@').next().unwrap_or_default().to_string();
    match handle.as_str() {
        "okicici" => Json(json!({
            "vpa": vpa,
            "status": "VALID",
            "customer_name": "RAHUL SHARMA",
        }))
        .into_response(),
        "broken" => (StatusCode::OK, "<html>gateway page</html>").into_response(),
        "down" => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "vpa": vpa, "status": "VALID" })).into_response()
        }
        _ => Json(json!({ "vpa": vpa, "status": "INVALID" })).into_response(),
    }
}

async fn payout_add(
    State(hits): State<Arc<AtomicUsize>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);

    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
    if header("authorization") != Some(STUB_AUTH_TOKEN) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "unauthorized" })))
            .into_response();
    }
    if header("x-app-version") != Some("525") || header("x-platform") != Some("1") {
        return (StatusCode::BAD_REQUEST, Json(json!({ "detail": "unknown client" })))
            .into_response();
    }
    if payload["init_mode"] != "00" || payload["is_uploaded_from_gallery"] != false {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": "bad draft" })))
            .into_response();
    }

    let upi = payload["upi_string"]
        .as_str()
        .and_then(|raw| raw.strip_prefix("upi://pay?pa="))
        .unwrap_or_default()
        .to_string();
    match upi.as_str() {
        "kumarchx@fam" => Json(json!({
            "payee": { "name": "KUMAR CH", "vpa": upi },
            "kyc_verified": true,
        }))
        .into_response(),
        "maintenance@fam" => {
            (StatusCode::BAD_GATEWAY, "<html>upstream maintenance</html>").into_response()
        }
        "slowpoke@fam" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "payee": { "vpa": upi } })).into_response()
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({ "detail": "payee not found" })))
            .into_response(),
    }
}
