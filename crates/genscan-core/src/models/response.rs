use serde::{Deserialize, Serialize};

use super::verdict::{DetectionVerdict, SourceWeight};

/// JSON body returned by `POST /detect` on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectResponse {
    pub filename: String,
    pub is_ai_generated: bool,
    pub confidence: f64,
    pub confidence_score: f64,
    pub threshold: f64,
    pub status: String,
    pub message: String,
    pub top_sources: Vec<SourceWeight>,
    pub sources_message: String,
}

impl DetectResponse {
    pub fn from_verdict(filename: impl Into<String>, verdict: &DetectionVerdict) -> Self {
        Self {
            filename: filename.into(),
            is_ai_generated: verdict.is_flagged(),
            confidence: verdict.percentage(),
            confidence_score: verdict.score(),
            threshold: verdict.threshold(),
            status: "success".to_string(),
            message: verdict.message().to_string(),
            top_sources: verdict.top_sources().to_vec(),
            sources_message: verdict.sources_message().to_string(),
        }
    }
}
