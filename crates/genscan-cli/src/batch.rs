//! Directory batch detection with CSV output
//!
//! Images are processed one at a time with a fixed pause between them. A
//! failed image is written as an `ERROR` row and the batch continues.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use genscan_core::models::format_decimal;
use genscan_core::validation::{mime_type_for_extension, validate_extension};
use genscan_detector::Detector;

pub const CSV_HEADER: [&str; 3] = ["filename", "ai_generated_score", "is_ai_generated"];

/// Outcome for one image.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Scored { score: f64, is_flagged: bool },
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    pub filename: String,
    pub outcome: RowOutcome,
}

impl BatchRow {
    fn fields(&self) -> [String; 3] {
        let (score, verdict) = match &self.outcome {
            RowOutcome::Scored { score, is_flagged } => (
                format_decimal(*score),
                if *is_flagged { "Yes" } else { "No" }.to_string(),
            ),
            RowOutcome::Error => ("ERROR".to_string(), "ERROR".to_string()),
        };
        [self.filename.clone(), score, verdict]
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub flagged: usize,
    pub failed: usize,
}

/// Quote a CSV field when it contains a comma, quote, or line break.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Writes the header on creation and one line per [`BatchRow`].
pub struct CsvResultWriter<W: Write> {
    inner: W,
}

impl<W: Write> CsvResultWriter<W> {
    pub fn new(mut inner: W) -> std::io::Result<Self> {
        writeln!(inner, "{}", CSV_HEADER.join(","))?;
        Ok(Self { inner })
    }

    pub fn write_row(&mut self, row: &BatchRow) -> std::io::Result<()> {
        let line = row
            .fields()
            .iter()
            .map(|f| escape_field(f))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.inner, "{}", line)?;
        // Partial results survive an interrupted batch.
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Files directly inside `dir` whose extension is allowed, sorted by name.
pub fn collect_images(dir: &Path, allowed_extensions: &[String]) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if validate_extension(name, allowed_extensions).is_ok() {
            images.push(path);
        }
    }

    images.sort();
    Ok(images)
}

async fn detect_one(detector: &Detector, path: &Path, threshold: f64) -> Result<RowOutcome> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    let mime_type = mime_type_for_extension(&extension)
        .with_context(|| format!("No MIME type for extension '{}'", extension))?;

    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let verdict = detector.detect_bytes(data, mime_type, threshold).await?;

    Ok(RowOutcome::Scored {
        score: verdict.raw_score(),
        is_flagged: verdict.is_flagged(),
    })
}

/// Run every image through `detector`, writing one row per image.
pub async fn run_batch<W: Write>(
    detector: &Detector,
    images: &[PathBuf],
    threshold: f64,
    delay: Duration,
    writer: &mut CsvResultWriter<W>,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    for (index, path) in images.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!(filename = %filename, "Processing image");

        let outcome = match detect_one(detector, path, threshold).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(filename = %filename, error = %e, "Detection failed");
                RowOutcome::Error
            }
        };

        summary.processed += 1;
        match outcome {
            RowOutcome::Scored { is_flagged: true, .. } => summary.flagged += 1,
            RowOutcome::Error => summary.failed += 1,
            _ => {}
        }

        writer
            .write_row(&BatchRow { filename, outcome })
            .context("Failed to write CSV row")?;
    }

    Ok(summary)
}
