//! Client for a running genscan-api server
//!
//! Retries transport failures and 5xx responses; 4xx responses are returned
//! immediately since repeating them cannot succeed.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use genscan_core::validation::mime_type_for_extension;
use genscan_core::DetectResponse;
use reqwest::{Client, StatusCode};

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerClient {
    client: Client,
    base_url: String,
}

enum AttemptError {
    Retryable(anyhow::Error),
    Fatal(anyhow::Error),
}

impl ServerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Status of `GET /health`.
    pub async fn health(&self) -> Result<StatusCode> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .context("Failed to reach server")?;
        Ok(response.status())
    }

    /// Upload the image at `path` to `/detect`, retrying per `policy`.
    pub async fn detect_file(
        &self,
        path: &Path,
        threshold: Option<f64>,
        policy: &RetryPolicy,
    ) -> Result<DetectResponse> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| mime_type_for_extension(&e.to_lowercase()))
            .unwrap_or("application/octet-stream");

        let attempts = policy.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.detect_once(&data, &filename, mime_type, threshold).await {
                Ok(response) => return Ok(response),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Retryable(e)) if attempt >= attempts => {
                    return Err(e.context(format!("All {} attempts failed", attempts)));
                }
                Err(AttemptError::Retryable(e)) => {
                    tracing::warn!(
                        attempt,
                        error = %e,
                        retry_in_secs = policy.delay.as_secs_f64(),
                        "Detection attempt failed, retrying"
                    );
                    tokio::time::sleep(policy.delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn detect_once(
        &self,
        data: &[u8],
        filename: &str,
        mime_type: &str,
        threshold: Option<f64>,
    ) -> Result<DetectResponse, AttemptError> {
        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime_type)
            .map_err(|e| AttemptError::Fatal(e.into()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut request = self
            .client
            .post(format!("{}/detect", self.base_url))
            .multipart(form);
        if let Some(threshold) = threshold {
            request = request.query(&[("threshold", threshold)]);
        }

        let response = request.send().await.map_err(|e| {
            AttemptError::Retryable(anyhow::Error::new(e).context("Failed to send request"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let err = anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            );
            return Err(if status.is_server_error() {
                AttemptError::Retryable(err)
            } else {
                AttemptError::Fatal(err)
            });
        }

        response.json().await.map_err(|e| {
            AttemptError::Fatal(anyhow::Error::new(e).context("Failed to parse response as JSON"))
        })
    }
}
