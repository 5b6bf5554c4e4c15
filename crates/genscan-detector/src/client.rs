//! Vendor HTTP client
//!
//! [`VendorClient`] is the seam between the detection flow and the vendor's
//! three endpoints (asset reservation, asset transfer, scoring). The reqwest
//! implementation lives here; tests substitute a mock.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use genscan_core::DetectorConfig;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::TransportError;
use crate::strategy::SubmissionPayload;

/// Header naming the asset referenced by a scoring request.
pub const ASSET_REFERENCES_HEADER: &str = "NVCF-INPUT-ASSET-REFERENCES";
/// Header carrying the asset description on the transfer PUT.
pub const ASSET_DESCRIPTION_HEADER: &str = "x-amz-meta-nvcf-asset-description";

/// Upload destination and opaque id returned by the reservation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReservation {
    pub upload_url: String,
    pub asset_id: String,
}

#[async_trait]
pub trait VendorClient: Send + Sync {
    /// Request an upload destination and asset id.
    async fn reserve_asset(
        &self,
        content_type: &str,
        description: &str,
    ) -> Result<AssetReservation, TransportError>;

    /// Send the raw bytes to a reserved destination.
    async fn transfer_asset(
        &self,
        reservation: &AssetReservation,
        content_type: &str,
        description: &str,
        data: Bytes,
    ) -> Result<(), TransportError>;

    /// Issue the scoring request and return the raw response body.
    async fn score(&self, payload: &SubmissionPayload) -> Result<String, TransportError>;
}

/// reqwest-backed [`VendorClient`].
pub struct HttpVendorClient {
    http_client: reqwest::Client,
    api_key: String,
    invoke_url: String,
    assets_url: String,
    reserve_timeout: Duration,
    transfer_timeout: Duration,
    score_timeout: Duration,
}

impl Debug for HttpVendorClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("HttpVendorClient")
            .field("invoke_url", &self.invoke_url)
            .field("assets_url", &self.assets_url)
            .finish()
    }
}

impl HttpVendorClient {
    pub fn new(config: &DetectorConfig) -> anyhow::Result<Self> {
        // Timeouts are applied per request since each phase has its own budget.
        let http_client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client for detection vendor")?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            invoke_url: config.invoke_url.clone(),
            assets_url: config.assets_url.clone(),
            reserve_timeout: config.reserve_timeout,
            transfer_timeout: config.transfer_timeout,
            score_timeout: config.score_timeout,
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<reqwest::Response, TransportError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout)
    } else {
        TransportError::Network(err.to_string())
    }
}

#[async_trait]
impl VendorClient for HttpVendorClient {
    async fn reserve_asset(
        &self,
        content_type: &str,
        description: &str,
    ) -> Result<AssetReservation, TransportError> {
        let request = self
            .http_client
            .post(&self.assets_url)
            .header("Content-Type", "application/json")
            .header("Authorization", self.bearer())
            .header("Accept", "application/json")
            .json(&json!({
                "contentType": content_type,
                "description": description,
            }));

        let response = self.send(request, self.reserve_timeout).await?;
        let text = response
            .text()
            .await
            .map_err(|e| classify(e, self.reserve_timeout))?;

        serde_json::from_str(&text).map_err(|e| TransportError::InvalidBody(e.to_string()))
    }

    async fn transfer_asset(
        &self,
        reservation: &AssetReservation,
        content_type: &str,
        description: &str,
        data: Bytes,
    ) -> Result<(), TransportError> {
        let request = self
            .http_client
            .put(&reservation.upload_url)
            .header("Content-Type", content_type)
            .header(ASSET_DESCRIPTION_HEADER, description)
            .body(data);

        self.send(request, self.transfer_timeout).await?;
        Ok(())
    }

    async fn score(&self, payload: &SubmissionPayload) -> Result<String, TransportError> {
        let mut request = self
            .http_client
            .post(&self.invoke_url)
            .header("Content-Type", "application/json")
            .header("Authorization", self.bearer())
            .header("Accept", "application/json")
            .json(&payload.body());

        if let Some(asset_id) = payload.asset_reference() {
            request = request.header(ASSET_REFERENCES_HEADER, asset_id);
        }

        let response = self.send(request, self.score_timeout).await?;
        tracing::debug!(status = %response.status(), "Detection vendor responded");

        response
            .text()
            .await
            .map_err(|e| classify(e, self.score_timeout))
    }
}
