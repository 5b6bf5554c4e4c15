//! Scripted in-memory vendor client

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::client::{AssetReservation, VendorClient};
use crate::error::TransportError;
use crate::strategy::SubmissionPayload;

const DEFAULT_SCORE_BODY: &str = r#"{"data":[{"is_ai_generated":0.0,"possible_sources":{}}]}"#;

/// Arguments of one `transfer_asset` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTransfer {
    pub upload_url: String,
    pub content_type: String,
    pub description: String,
    pub size: usize,
}

/// Vendor client with scripted replies and call counters.
pub struct MockVendorClient {
    reservation: AssetReservation,
    reserve_error: Option<TransportError>,
    transfer_error: Option<TransportError>,
    score_reply: Result<String, TransportError>,
    score_delay: Option<Duration>,
    reserve_calls: AtomicUsize,
    transfer_calls: AtomicUsize,
    score_calls: AtomicUsize,
    transfers: Mutex<Vec<RecordedTransfer>>,
    payloads: Mutex<Vec<SubmissionPayload>>,
}

impl Default for MockVendorClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVendorClient {
    pub fn new() -> Self {
        Self {
            reservation: AssetReservation {
                upload_url: "https://assets.mock/upload".to_string(),
                asset_id: "mock-asset".to_string(),
            },
            reserve_error: None,
            transfer_error: None,
            score_reply: Ok(DEFAULT_SCORE_BODY.to_string()),
            score_delay: None,
            reserve_calls: AtomicUsize::new(0),
            transfer_calls: AtomicUsize::new(0),
            score_calls: AtomicUsize::new(0),
            transfers: Mutex::new(Vec::new()),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reservation(mut self, upload_url: &str, asset_id: &str) -> Self {
        self.reservation = AssetReservation {
            upload_url: upload_url.to_string(),
            asset_id: asset_id.to_string(),
        };
        self
    }

    pub fn with_reserve_error(mut self, error: TransportError) -> Self {
        self.reserve_error = Some(error);
        self
    }

    pub fn with_transfer_error(mut self, error: TransportError) -> Self {
        self.transfer_error = Some(error);
        self
    }

    pub fn with_score_body(mut self, body: impl Into<String>) -> Self {
        self.score_reply = Ok(body.into());
        self
    }

    pub fn with_score_error(mut self, error: TransportError) -> Self {
        self.score_reply = Err(error);
        self
    }

    /// Delay every scoring reply, for timeout tests.
    pub fn with_score_delay(mut self, delay: Duration) -> Self {
        self.score_delay = Some(delay);
        self
    }

    pub fn reserve_calls(&self) -> usize {
        self.reserve_calls.load(Ordering::SeqCst)
    }

    pub fn transfer_calls(&self) -> usize {
        self.transfer_calls.load(Ordering::SeqCst)
    }

    pub fn score_calls(&self) -> usize {
        self.score_calls.load(Ordering::SeqCst)
    }

    /// Calls to any vendor endpoint.
    pub fn total_calls(&self) -> usize {
        self.reserve_calls() + self.transfer_calls() + self.score_calls()
    }

    pub fn last_transfer(&self) -> Option<RecordedTransfer> {
        self.transfers.lock().unwrap().last().cloned()
    }

    pub fn last_payload(&self) -> Option<SubmissionPayload> {
        self.payloads.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl VendorClient for MockVendorClient {
    async fn reserve_asset(
        &self,
        _content_type: &str,
        _description: &str,
    ) -> Result<AssetReservation, TransportError> {
        self.reserve_calls.fetch_add(1, Ordering::SeqCst);
        match &self.reserve_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.reservation.clone()),
        }
    }

    async fn transfer_asset(
        &self,
        reservation: &AssetReservation,
        content_type: &str,
        description: &str,
        data: Bytes,
    ) -> Result<(), TransportError> {
        self.transfer_calls.fetch_add(1, Ordering::SeqCst);
        self.transfers.lock().unwrap().push(RecordedTransfer {
            upload_url: reservation.upload_url.clone(),
            content_type: content_type.to_string(),
            description: description.to_string(),
            size: data.len(),
        });
        match &self.transfer_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn score(&self, payload: &SubmissionPayload) -> Result<String, TransportError> {
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload.clone());
        if let Some(delay) = self.score_delay {
            tokio::time::sleep(delay).await;
        }
        self.score_reply.clone()
    }
}
