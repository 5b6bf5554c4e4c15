//! Submission strategy selection and payload shapes
//!
//! The vendor accepts small images inline as a base64 data URI. Larger ones
//! must be staged through the asset service and referenced by id.

use base64::Engine;

/// How an image is delivered to the scoring endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStrategy {
    Inline,
    AssetUpload,
}

impl SubmissionStrategy {
    /// Inline when `encoded_len` is strictly below `inline_limit`, asset upload otherwise.
    pub fn select(encoded_len: usize, inline_limit: usize) -> Self {
        if encoded_len < inline_limit {
            SubmissionStrategy::Inline
        } else {
            SubmissionStrategy::AssetUpload
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStrategy::Inline => "inline",
            SubmissionStrategy::AssetUpload => "asset_upload",
        }
    }
}

/// Length of the padded standard base64 encoding of `raw_len` bytes.
pub fn encoded_len(raw_len: usize) -> usize {
    raw_len.div_ceil(3) * 4
}

/// Body and header material for one scoring request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPayload {
    Inline { data_uri: String },
    AssetRef { asset_id: String, data_uri: String },
}

impl SubmissionPayload {
    /// `data:<mime>;base64,<payload>`
    pub fn inline(mime_type: &str, data: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        SubmissionPayload::Inline {
            data_uri: format!("data:{};base64,{}", mime_type, encoded),
        }
    }

    /// `data:<mime>;asset_id,<id>`
    pub fn asset_ref(mime_type: &str, asset_id: impl Into<String>) -> Self {
        let asset_id = asset_id.into();
        SubmissionPayload::AssetRef {
            data_uri: format!("data:{};asset_id,{}", mime_type, asset_id),
            asset_id,
        }
    }

    /// Value placed in the request body's `input` array.
    pub fn input(&self) -> &str {
        match self {
            SubmissionPayload::Inline { data_uri } => data_uri,
            SubmissionPayload::AssetRef { data_uri, .. } => data_uri,
        }
    }

    /// Asset id for the `NVCF-INPUT-ASSET-REFERENCES` header, if any.
    pub fn asset_reference(&self) -> Option<&str> {
        match self {
            SubmissionPayload::Inline { .. } => None,
            SubmissionPayload::AssetRef { asset_id, .. } => Some(asset_id),
        }
    }

    pub fn strategy(&self) -> SubmissionStrategy {
        match self {
            SubmissionPayload::Inline { .. } => SubmissionStrategy::Inline,
            SubmissionPayload::AssetRef { .. } => SubmissionStrategy::AssetUpload,
        }
    }

    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({ "input": [self.input()] })
    }
}
