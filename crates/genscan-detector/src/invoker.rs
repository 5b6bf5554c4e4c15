//! Scoring request
//!
//! Issues exactly one request and parses the body. Transport failures and
//! vendor rejections come back as [`DetectionError::Transport`]; a body that is
//! not JSON is a [`DetectionError::Schema`].

use serde_json::Value;

use crate::client::VendorClient;
use crate::error::{DetectionError, DetectionResult};
use crate::strategy::SubmissionPayload;

pub async fn invoke(client: &dyn VendorClient, payload: &SubmissionPayload) -> DetectionResult<Value> {
    let body = client.score(payload).await?;

    serde_json::from_str(&body).map_err(|e| {
        DetectionError::Schema(format!("response body is not valid JSON: {}", e))
    })
}
