//! Detection verdict derived from a vendor score
//!
//! Rounding and message formats are a compatibility contract with existing
//! callers: percentage to 2 decimals, score to 3 decimals, top 3 sources.

use serde::{Deserialize, Serialize};

/// Number of ranked sources reported in a verdict.
pub const TOP_SOURCES: usize = 3;

/// A source label and the vendor's weight for it. Serializes as `[label, weight]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceWeight(pub String, pub f64);

impl SourceWeight {
    pub fn new(label: impl Into<String>, weight: f64) -> Self {
        Self(label.into(), weight)
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn weight(&self) -> f64 {
        self.1
    }
}

/// Immutable verdict for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionVerdict {
    raw_score: f64,
    score: f64,
    percentage: f64,
    threshold: f64,
    is_flagged: bool,
    sources: Vec<SourceWeight>,
    top_sources: Vec<SourceWeight>,
    message: String,
    sources_message: String,
}

impl DetectionVerdict {
    /// Derive every verdict field from the raw vendor score.
    ///
    /// `sources` must be in the vendor's enumeration order; ranking ties keep that order.
    pub fn from_score(raw_score: f64, sources: Vec<SourceWeight>, threshold: f64) -> Self {
        let is_flagged = raw_score > threshold;
        let percentage = round_to(raw_score * 100.0, 2);
        let score = round_to(raw_score, 3);
        let top_sources = rank_sources(&sources, TOP_SOURCES);

        let message = format!(
            "This image is {} to be AI-generated with {}% confidence (threshold: {})",
            if is_flagged { "likely" } else { "unlikely" },
            format_decimal(percentage),
            format_decimal(threshold),
        );

        let listed = top_sources
            .iter()
            .map(|s| format!("{} ({:.2}%)", s.label(), s.weight() * 100.0))
            .collect::<Vec<_>>()
            .join(", ");
        let sources_message = format!("Top sources: {}", listed);

        Self {
            raw_score,
            score,
            percentage,
            threshold,
            is_flagged,
            sources,
            top_sources,
            message,
            sources_message,
        }
    }

    /// Score exactly as reported by the vendor.
    pub fn raw_score(&self) -> f64 {
        self.raw_score
    }

    /// Score rounded to 3 decimals.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// `score × 100` rounded to 2 decimals.
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// `raw_score > threshold`; equality is not flagged.
    pub fn is_flagged(&self) -> bool {
        self.is_flagged
    }

    /// All vendor sources, in enumeration order.
    pub fn sources(&self) -> &[SourceWeight] {
        &self.sources
    }

    pub fn top_sources(&self) -> &[SourceWeight] {
        &self.top_sources
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn sources_message(&self) -> &str {
        &self.sources_message
    }
}

/// Rank sources by descending weight and keep the first `limit`.
///
/// The sort is stable, so equal weights keep their enumeration order.
pub fn rank_sources(sources: &[SourceWeight], limit: usize) -> Vec<SourceWeight> {
    let mut ranked = sources.to_vec();
    ranked.sort_by(|a, b| b.weight().total_cmp(&a.weight()));
    ranked.truncate(limit);
    ranked
}

/// Round the exact binary value of `value` to `places` decimals.
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", places, value).parse().unwrap_or(value)
}

/// Shortest round-trip decimal form, keeping a trailing `.0` on integral values.
///
/// Values below 1e-4 or from 1e16 up switch to exponent form with a signed,
/// two-digit exponent (`1e-05`, `1.5e+16`).
pub fn format_decimal(value: f64) -> String {
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}
