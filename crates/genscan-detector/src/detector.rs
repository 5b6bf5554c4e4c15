//! Detection entry point

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use genscan_core::validation::validate_threshold;
use genscan_core::{DetectionVerdict, DetectorConfig, SubmissionRequest};

use crate::client::{HttpVendorClient, VendorClient};
use crate::error::{DetectionResult, TransportError};
use crate::invoker::invoke;
use crate::normalizer::normalize;
use crate::strategy::{encoded_len, SubmissionPayload, SubmissionStrategy};
use crate::uploader::AssetUploader;

/// Runs one image through the vendor and returns its verdict.
///
/// Holds no per-call state, so a single instance is shared across concurrent requests.
#[derive(Clone)]
pub struct Detector {
    client: Arc<dyn VendorClient>,
    config: DetectorConfig,
}

impl Detector {
    pub fn new(client: Arc<dyn VendorClient>, config: DetectorConfig) -> Self {
        Self { client, config }
    }

    /// Detector backed by the reqwest vendor client.
    pub fn from_config(config: DetectorConfig) -> anyhow::Result<Self> {
        let client = HttpVendorClient::new(&config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Validate raw bytes and MIME type, then run [`Detector::detect`].
    pub async fn detect_bytes(
        &self,
        data: impl Into<Bytes>,
        mime_type: &str,
        threshold: f64,
    ) -> DetectionResult<DetectionVerdict> {
        validate_threshold(threshold)?;
        let request = SubmissionRequest::new(data, mime_type)?;
        self.detect(&request, threshold).await
    }

    pub async fn detect(
        &self,
        request: &SubmissionRequest,
        threshold: f64,
    ) -> DetectionResult<DetectionVerdict> {
        validate_threshold(threshold)?;

        let started = Instant::now();
        let encoded = encoded_len(request.size());
        let strategy = SubmissionStrategy::select(encoded, self.config.inline_limit_bytes);

        tracing::info!(
            strategy = strategy.as_str(),
            size = request.size(),
            encoded_len = encoded,
            mime_type = %request.mime_type(),
            "Submitting image for detection"
        );

        let payload = match strategy {
            SubmissionStrategy::Inline => {
                SubmissionPayload::inline(request.mime_type(), request.data())
            }
            SubmissionStrategy::AssetUpload => {
                let asset_id = AssetUploader::new(self.client.as_ref(), &self.config.asset_description)
                    .upload(request.mime_type(), request.data().clone())
                    .await?;
                SubmissionPayload::asset_ref(request.mime_type(), asset_id)
            }
        };

        let response = invoke(self.client.as_ref(), &payload).await?;
        let verdict = normalize(&response, threshold)?;

        tracing::info!(
            strategy = strategy.as_str(),
            score = verdict.raw_score(),
            threshold,
            is_flagged = verdict.is_flagged(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Detection completed"
        );

        Ok(verdict)
    }

    /// [`Detector::detect`] bounded by `timeout`.
    ///
    /// An elapsed budget drops the in-flight vendor call and surfaces as a
    /// retryable [`TransportError::Timeout`].
    pub async fn detect_with_timeout(
        &self,
        request: &SubmissionRequest,
        threshold: f64,
        timeout: Duration,
    ) -> DetectionResult<DetectionVerdict> {
        match tokio::time::timeout(timeout, self.detect(request, threshold)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_secs = timeout.as_secs_f64(), "Detection timed out");
                Err(TransportError::Timeout(timeout).into())
            }
        }
    }
}
