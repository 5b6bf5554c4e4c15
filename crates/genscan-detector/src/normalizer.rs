//! Result normalization
//!
//! Absent score or sources inside the result container is a valid low-signal
//! reply and defaults to zero / empty. A missing container, or fields of the
//! wrong type, is a schema error.

use genscan_core::{DetectionVerdict, SourceWeight};
use serde_json::Value;

use crate::error::{DetectionError, DetectionResult};

const SCORE_FIELD: &str = "is_ai_generated";
const SOURCES_FIELD: &str = "possible_sources";

/// Raw score and sources pulled from a vendor reply, in enumeration order.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorSignal {
    pub score: f64,
    pub sources: Vec<SourceWeight>,
}

pub fn extract_signal(response: &Value) -> DetectionResult<VendorSignal> {
    let result = response
        .get("data")
        .and_then(Value::as_array)
        .and_then(|data| data.first())
        .ok_or_else(|| DetectionError::Schema("response has no data[0] result".to_string()))?;

    let result = result
        .as_object()
        .ok_or_else(|| DetectionError::Schema("data[0] is not an object".to_string()))?;

    let score = match result.get(SCORE_FIELD) {
        None | Some(Value::Null) => 0.0,
        Some(value) => value
            .as_f64()
            .filter(|s| (0.0..=1.0).contains(s))
            .ok_or_else(|| {
                DetectionError::Schema(format!("{} is not a score in [0, 1]: {}", SCORE_FIELD, value))
            })?,
    };

    let sources = match result.get(SOURCES_FIELD) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(label, weight)| {
                weight
                    .as_f64()
                    .map(|w| SourceWeight::new(label.clone(), w))
                    .ok_or_else(|| {
                        DetectionError::Schema(format!(
                            "weight for source '{}' is not a number",
                            label
                        ))
                    })
            })
            .collect::<DetectionResult<Vec<_>>>()?,
        Some(other) => {
            return Err(DetectionError::Schema(format!(
                "{} is not an object: {}",
                SOURCES_FIELD, other
            )))
        }
    };

    Ok(VendorSignal { score, sources })
}

/// Extract the signal from `response` and derive the verdict against `threshold`.
pub fn normalize(response: &Value, threshold: f64) -> DetectionResult<DetectionVerdict> {
    let signal = extract_signal(response)?;
    Ok(DetectionVerdict::from_score(signal.score, signal.sources, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_full_response() {
        let response = json!({
            "data": [{
                "is_ai_generated": 0.02,
                "possible_sources": {"a": 0.5, "b": 0.3, "c": 0.1, "d": 0.05}
            }]
        });

        let verdict = normalize(&response, 0.016).unwrap();
        assert!(verdict.is_flagged());
        let labels: Vec<&str> = verdict.top_sources().iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);

        let verdict = normalize(&response, 0.03).unwrap();
        assert!(!verdict.is_flagged());
    }

    #[test]
    fn test_missing_score_defaults_to_zero() {
        let response = json!({"data": [{"possible_sources": {"x": 0.9}}]});
        let verdict = normalize(&response, 0.001).unwrap();
        assert_eq!(verdict.raw_score(), 0.0);
        assert!(!verdict.is_flagged());
        assert_eq!(verdict.top_sources().len(), 1);
    }

    #[test]
    fn test_empty_result_object() {
        let verdict = normalize(&json!({"data": [{}]}), 0.5).unwrap();
        assert_eq!(verdict.raw_score(), 0.0);
        assert!(verdict.sources().is_empty());
        assert_eq!(verdict.sources_message(), "Top sources: ");
    }

    #[test]
    fn test_source_order_preserved() {
        let response = json!({
            "data": [{"is_ai_generated": 0.7, "possible_sources": {"zeta": 0.2, "alpha": 0.2, "mid": 0.1}}]
        });
        let signal = extract_signal(&response).unwrap();
        let labels: Vec<&str> = signal.sources.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_missing_container_is_schema_error() {
        for response in [
            json!({}),
            json!({"data": []}),
            json!({"data": "nope"}),
            json!({"result": {"is_ai_generated": 0.9}}),
            json!({"data": [42]}),
        ] {
            let err = normalize(&response, 0.5).unwrap_err();
            assert!(matches!(err, DetectionError::Schema(_)), "{}", response);
        }
    }

    #[test]
    fn test_wrong_field_types_are_schema_errors() {
        for response in [
            json!({"data": [{"is_ai_generated": "high"}]}),
            json!({"data": [{"is_ai_generated": 1.5}]}),
            json!({"data": [{"possible_sources": ["a", "b"]}]}),
            json!({"data": [{"possible_sources": {"a": "lots"}}]}),
        ] {
            let err = normalize(&response, 0.5).unwrap_err();
            assert!(matches!(err, DetectionError::Schema(_)), "{}", response);
        }
    }
}
