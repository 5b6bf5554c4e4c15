//! Test helpers for detector tests
//!
//! [`MockVendorClient`] stands in for the vendor so the detection flow can be
//! exercised without network access. Enable the `test-utils` feature to use it
//! from other crates.

pub mod mock_client;

pub use mock_client::{MockVendorClient, RecordedTransfer};

/// A scoring reply with the given score and sources, in vendor shape.
pub fn score_body(score: f64, sources: &[(&str, f64)]) -> String {
    let sources: serde_json::Map<String, serde_json::Value> = sources
        .iter()
        .map(|(label, weight)| (label.to_string(), serde_json::json!(weight)))
        .collect();

    serde_json::json!({
        "data": [{
            "is_ai_generated": score,
            "possible_sources": sources,
        }]
    })
    .to_string()
}
