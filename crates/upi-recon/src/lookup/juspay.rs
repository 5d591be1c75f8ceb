use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONNECTION;
use serde_json::Value;

use super::candidates::Candidate;
use super::verifier::{Verdict, VerificationError, VpaVerifier};
use crate::config::LookupConfig;

/// Checks addresses against the Juspay `verify-vpa` endpoint.
#[derive(Debug, Clone)]
pub struct JuspayVerifier {
    client: reqwest::Client,
    endpoint: String,
    merchant_id: String,
}

impl JuspayVerifier {
    pub fn new(
        endpoint: impl Into<String>,
        merchant_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VerificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| VerificationError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            merchant_id: merchant_id.into(),
        })
    }

    pub fn from_config(config: &LookupConfig) -> Result<Self, VerificationError> {
        Self::new(
            config.oracle_url.clone(),
            config.merchant_id.clone(),
            config.request_timeout,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport(err: reqwest::Error) -> VerificationError {
        if err.is_timeout() {
            VerificationError::Timeout
        } else {
            VerificationError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl VpaVerifier for JuspayVerifier {
    async fn verify(&self, candidate: &Candidate) -> Result<Verdict, VerificationError> {
        let form = [
            ("vpa", candidate.as_str()),
            ("merchant_id", self.merchant_id.as_str()),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONNECTION, "close")
            .form(&form)
            .send()
            .await
            .map_err(Self::map_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerificationError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(Self::map_transport)?;
        let payload: Value =
            serde_json::from_slice(&body).map_err(|err| VerificationError::InvalidVerdict {
                reason: format!("malformed JSON: {err}"),
            })?;

        Verdict::from_payload(payload)
    }
}
