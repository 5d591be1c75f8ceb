mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{StubOracleServer, STUB_AUTH_TOKEN};
use upi_recon::config::FamPayConfig;
use upi_recon::lookup::{
    fampay_router, Candidate, FamPayError, FamPayVerifier, VerificationError, VpaVerifier,
};

fn config(server: &StubOracleServer, timeout: Duration) -> FamPayConfig {
    FamPayConfig {
        endpoint: server.fampay_url(),
        auth_token: Some(STUB_AUTH_TOKEN.to_string()),
        device_id: Some("stub-device".to_string()),
        request_timeout: timeout,
        ..FamPayConfig::default()
    }
}

fn client(server: &StubOracleServer) -> FamPayVerifier {
    FamPayVerifier::new(&config(server, Duration::from_secs(5))).expect("client builds")
}

async fn call(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn resolved_payee_is_returned_and_counts_as_valid() {
    let server = StubOracleServer::start().await;
    let client = client(&server);
    let upi = Candidate::from("kumarchx@fam");

    let reply = client.lookup(&upi).await.expect("reply");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["payee"]["name"], "KUMAR CH");

    let verdict = client.verify(&upi).await.expect("verdict");
    assert!(verdict.is_valid());
    assert_eq!(verdict.payload["payee"]["vpa"], "kumarchx@fam");
    assert_eq!(server.hits(), 2);
}

#[tokio::test]
async fn unknown_payee_keeps_the_upstream_status() {
    let server = StubOracleServer::start().await;
    let client = client(&server);
    let upi = Candidate::from("nobody@fam");

    let reply = client.lookup(&upi).await.expect("json reply");
    assert_eq!(reply.status, 404);
    assert_eq!(reply.body, json!({ "detail": "payee not found" }));

    let err = client.verify(&upi).await.expect_err("not a payee");
    assert_eq!(err, VerificationError::HttpStatus(404));
}

#[tokio::test]
async fn credentials_are_sent_with_every_call() {
    let server = StubOracleServer::start().await;
    let anonymous = FamPayConfig {
        auth_token: None,
        ..config(&server, Duration::from_secs(5))
    };
    let client = FamPayVerifier::new(&anonymous).expect("client builds");

    let reply = client
        .lookup(&Candidate::from("kumarchx@fam"))
        .await
        .expect("reply");
    assert_eq!(reply.status, 401);
}

#[tokio::test]
async fn non_json_error_page_is_reported_with_detail() {
    let server = StubOracleServer::start().await;
    let err = client(&server)
        .lookup(&Candidate::from("maintenance@fam"))
        .await
        .expect_err("html error page");

    match err {
        FamPayError::Upstream { status, detail } => {
            assert_eq!(status, 502);
            assert!(detail.contains("upstream maintenance"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = StubOracleServer::start().await;
    let client = FamPayVerifier::new(&config(&server, Duration::from_millis(200)))
        .expect("client builds");

    let err = client
        .verify(&Candidate::from("slowpoke@fam"))
        .await
        .expect_err("timeout");
    assert_eq!(err, VerificationError::Timeout);
}

#[tokio::test]
async fn lookup_route_proxies_get_and_post() {
    let server = StubOracleServer::start().await;
    let app = fampay_router(Arc::new(client(&server)));

    let (status, body) = call(
        app.clone(),
        Request::get("/lookup?upi=kumarchx@fam")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payee"]["name"], "KUMAR CH");

    let (status, body) = call(
        app,
        Request::post("/lookup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"upi":"nobody@fam"}"#))
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "payee not found");
}

#[tokio::test]
async fn lookup_route_rejects_other_handles_without_calling_upstream() {
    let server = StubOracleServer::start().await;
    let app = fampay_router(Arc::new(client(&server)));
    let expected = json!({ "error": "Valid UPI ID required (e.g., kumarchx@fam)" });

    let (status, body) = call(
        app.clone(),
        Request::get("/lookup?upi=kumarchx@ybl")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, expected);

    let (status, body) = call(
        app,
        Request::post("/lookup").body(Body::from("not json")).expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, expected);
    assert_eq!(server.hits(), 0);
}

#[tokio::test]
async fn lookup_route_maps_upstream_failures() {
    let server = StubOracleServer::start().await;
    let app = fampay_router(Arc::new(client(&server)));

    let (status, body) = call(
        app,
        Request::get("/lookup?upi=maintenance@fam")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "FamPay API returned error");
    assert_eq!(body["status"], 502);

    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("reserve port");
    let addr = listener.local_addr().expect("address");
    drop(listener);
    let unreachable = FamPayConfig {
        endpoint: format!("http://{addr}/txn/create/payout/add/"),
        request_timeout: Duration::from_secs(2),
        ..FamPayConfig::default()
    };
    let app = fampay_router(Arc::new(
        FamPayVerifier::new(&unreachable).expect("client builds"),
    ));

    let (status, body) = call(
        app,
        Request::get("/lookup?upi=kumarchx@fam")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Request failed");
    assert!(body["detail"].is_string());
}
