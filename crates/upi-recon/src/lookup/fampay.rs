//! FamPay payee lookup for `@fam` handles.
//!
//! FamPay resolves a handle through its payout-creation endpoint: posting a
//! `upi://pay` string returns the payee record, or an error body when the
//! handle is unknown.

use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT,
};
use serde_json::{json, Value};
use thiserror::Error;

use super::candidates::Candidate;
use super::verifier::{Verdict, VerificationError, VpaVerifier, VALID_STATUS};
use crate::config::FamPayConfig;

/// Marker every FamPay handle carries.
pub const FAMPAY_HANDLE: &str = "@fam";
const APP_VERSION: &str = "525";
const PLATFORM: &str = "1";

/// Upstream answer, passed back to callers as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct FamPayReply {
    pub status: u16,
    pub body: Value,
}

#[derive(Debug, Error)]
pub enum FamPayError {
    #[error("Valid UPI ID required (e.g., kumarchx@fam)")]
    InvalidUpi,
    #[error("FamPay API returned error")]
    Upstream { status: u16, detail: String },
    #[error("Request failed")]
    Request { detail: String, timed_out: bool },
}

impl FamPayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FamPayError::InvalidUpi => StatusCode::BAD_REQUEST,
            FamPayError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            FamPayError::Request { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            FamPayError::InvalidUpi => json!({ "error": self.to_string() }),
            FamPayError::Upstream { status, detail } => json!({
                "error": self.to_string(),
                "status": status,
                "detail": detail,
            }),
            FamPayError::Request { detail, .. } => json!({
                "error": self.to_string(),
                "detail": detail,
            }),
        }
    }
}

/// Accepts only ids that name a FamPay handle.
pub fn fampay_id(raw: Option<&str>) -> Result<Candidate, FamPayError> {
    match raw.map(str::trim) {
        Some(upi) if upi.contains(FAMPAY_HANDLE) => Ok(Candidate::new(upi)),
        _ => Err(FamPayError::InvalidUpi),
    }
}

/// Client for the FamPay payout-add endpoint.
#[derive(Debug, Clone)]
pub struct FamPayVerifier {
    client: reqwest::Client,
    endpoint: String,
}

impl FamPayVerifier {
    pub fn new(config: &FamPayConfig) -> Result<Self, VerificationError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(device_headers(config)?)
            .build()
            .map_err(|err| VerificationError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts the payout draft for `upi` and returns whatever FamPay answered.
    pub async fn lookup(&self, upi: &Candidate) -> Result<FamPayReply, FamPayError> {
        let payload = json!({
            "upi_string": format!("upi://pay?pa={upi}"),
            "init_mode": "00",
            "is_uploaded_from_gallery": false,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .body(payload.to_string())
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(request_failed)?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => Ok(FamPayReply {
                status: status.as_u16(),
                body,
            }),
            Err(_) if !status.is_success() => Err(FamPayError::Upstream {
                status: status.as_u16(),
                detail: String::from_utf8_lossy(&bytes).into_owned(),
            }),
            Err(err) => Err(FamPayError::Request {
                detail: format!("malformed JSON: {err}"),
                timed_out: false,
            }),
        }
    }
}

fn request_failed(err: reqwest::Error) -> FamPayError {
    FamPayError::Request {
        timed_out: err.is_timeout(),
        detail: err.to_string(),
    }
}

fn device_headers(config: &FamPayConfig) -> Result<HeaderMap, VerificationError> {
    let value = |raw: &str| {
        HeaderValue::from_str(raw).map_err(|err| {
            VerificationError::Transport(format!("bad FamPay header value: {err}"))
        })
    };

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, value(&config.device_details)?);
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=UTF-8"),
    );
    headers.insert(
        HeaderName::from_static("x-device-details"),
        value(&config.device_details)?,
    );
    headers.insert(
        HeaderName::from_static("x-app-version"),
        HeaderValue::from_static(APP_VERSION),
    );
    headers.insert(
        HeaderName::from_static("x-platform"),
        HeaderValue::from_static(PLATFORM),
    );
    if let Some(device_id) = &config.device_id {
        headers.insert(HeaderName::from_static("device-id"), value(device_id)?);
    }
    if let Some(token) = &config.auth_token {
        headers.insert(AUTHORIZATION, value(token)?);
    }

    Ok(headers)
}

/// A resolved payee counts as valid; FamPay error replies fail the candidate.
#[async_trait]
impl VpaVerifier for FamPayVerifier {
    async fn verify(&self, candidate: &Candidate) -> Result<Verdict, VerificationError> {
        let reply = self.lookup(candidate).await.map_err(|err| match err {
            FamPayError::Upstream { status, .. } => VerificationError::HttpStatus(status),
            FamPayError::Request {
                timed_out: true, ..
            } => VerificationError::Timeout,
            FamPayError::Request { detail, .. } => VerificationError::Transport(detail),
            FamPayError::InvalidUpi => VerificationError::InvalidVerdict {
                reason: FamPayError::InvalidUpi.to_string(),
            },
        })?;

        if !(200..300).contains(&reply.status) {
            return Err(VerificationError::HttpStatus(reply.status));
        }
        if !reply.body.is_object() {
            return Err(VerificationError::InvalidVerdict {
                reason: "payee record is not an object".to_string(),
            });
        }

        Ok(Verdict {
            status: VALID_STATUS.to_string(),
            payload: reply.body,
        })
    }
}
