use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

use crate::endpoint;
use crate::error::SubmissionError;
use crate::submission::SubmissionRequest;

/// HTTP client for the generation endpoint
///
/// One request per submission: no retries, no overall timeout.
pub struct GenerateClient {
    /// Shared HTTP client
    client: Client,
}

impl GenerateClient {
    /// Create a new HTTP client
    pub fn new(connect_timeout: u64) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout))
            .user_agent(concat!("presentify-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// POST the submission to `<base>/api/generate`.
    ///
    /// Returns the response only for 2xx statuses; anything else becomes
    /// [`SubmissionError::Rejected`] carrying the backend's explanation.
    pub async fn generate(
        &self,
        base: &str,
        request: SubmissionRequest,
    ) -> Result<Response, SubmissionError> {
        let url = endpoint::generate_url(base);
        tracing::debug!(
            method = "POST",
            url = %url,
            request = ?request,
            "Sending HTTP request"
        );

        let form = request.into_multipart()?;
        let response = match self.client.post(&url).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => {
                let error_kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connection_failed"
                } else if e.is_request() {
                    "request_error"
                } else {
                    "unknown"
                };
                tracing::warn!(
                    error_kind = error_kind,
                    error = %e,
                    url = %url,
                    "HTTP request error"
                );
                return Err(SubmissionError::Transport(e));
            }
        };

        let status = response.status();
        tracing::debug!(status = %status, "Received HTTP response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);

        tracing::warn!(
            status = status.as_u16(),
            url = %url,
            message = %message,
            "Generation request rejected"
        );

        Err(SubmissionError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Reduce a failed response to a human-readable message.
///
/// JSON bodies contribute their `detail` field (strings as-is, anything else
/// serialized), or the whole document when `detail` is missing. Bodies that
/// are not JSON fall back to the status text.
pub fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => match json.get("detail") {
            Some(serde_json::Value::String(detail)) if !detail.is_empty() => detail.clone(),
            Some(detail) if !is_falsy(detail) => detail.to_string(),
            _ => json.to_string(),
        },
        Err(_) => status_text(status),
    }
}

/// Reason phrase of a status, or its number when there is none
pub fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}

fn is_falsy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}
