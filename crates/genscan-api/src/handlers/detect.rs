use std::sync::Arc;

use axum::{
    extract::multipart::{Multipart, MultipartRejection},
    extract::rejection::QueryRejection,
    extract::{Query, State},
    Json,
};
use genscan_core::validation::{validate_input, validate_threshold};
use genscan_core::{AppError, DetectResponse, SubmissionRequest};
use serde::Deserialize;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::StagedUpload;

#[derive(Debug, Deserialize)]
pub struct DetectQuery {
    pub threshold: Option<f64>,
}

/// Detect whether an uploaded image is AI-generated
///
/// Expects a multipart body with a single `file` field. The optional
/// `threshold` query parameter overrides the configured default.
///
/// # Errors
/// - `AppError::InvalidInput` - threshold out of range, unsupported or missing extension
/// - `AppError::BadRequest` - malformed multipart body or missing `file` field
/// - `AppError::PayloadTooLarge` - file exceeds the size limit
/// - upstream variants - vendor upload, transport or schema failures
#[tracing::instrument(
    skip(state, query, multipart),
    fields(request_id = %uuid::Uuid::new_v4(), operation = "detect")
)]
pub async fn detect(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DetectQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectResponse>, HttpAppError> {
    let Query(query) = query?;
    let threshold = query
        .threshold
        .unwrap_or(state.config.input.default_threshold);
    validate_threshold(threshold)?;

    let mut multipart = multipart?;
    let mut staged: Option<(StagedUpload, &'static str)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        if staged.is_some() {
            return Err(AppError::BadRequest(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            )
            .into());
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let mime_type = validate_input(&filename, threshold, &state.config.input.allowed_extensions)?;
        let extension = filename.rsplit('.').next().unwrap_or_default().to_lowercase();

        tracing::debug!(filename = %filename, mime_type, "Receiving upload");

        let upload = StagedUpload::stage(
            field,
            filename,
            &extension,
            state.config.input.max_file_size_bytes,
        )
        .await?;
        staged = Some((upload, mime_type));
    }

    let (staged, mime_type) =
        staged.ok_or_else(|| AppError::BadRequest("No file provided in field 'file'".to_string()))?;

    let data = staged.read_bytes().await?;
    let request = SubmissionRequest::new(data, mime_type)?;

    tracing::info!(
        filename = %staged.filename(),
        size = staged.size(),
        threshold,
        "Running detection"
    );

    let verdict = state
        .detector
        .detect_with_timeout(&request, threshold, state.config.detector.request_timeout)
        .await?;

    Ok(Json(DetectResponse::from_verdict(staged.filename(), &verdict)))
}
