//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that
//! converts into [`AppError`] becomes an `HttpAppError` and renders with a
//! consistent status, body and log line.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use genscan_core::{AppError, ErrorMetadata, LogLevel, ValidationError};
use genscan_detector::DetectionError;
use serde::{Deserialize, Serialize};

static HIDE_ERROR_DETAILS: AtomicBool = AtomicBool::new(false);

/// Hide `details` and `error_type` from every error response. Set once at startup.
pub fn set_hide_error_details(hide: bool) {
    HIDE_ERROR_DETAILS.store(hide, Ordering::Relaxed);
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: AppError lives in genscan-core).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<DetectionError> for HttpAppError {
    fn from(err: DetectionError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<QueryRejection> for HttpAppError {
    fn from(rejection: QueryRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid query parameters: {}",
            rejection.body_text()
        )))
    }
}

impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        HttpAppError(AppError::BadRequest(format!(
            "Expected a multipart/form-data body: {}",
            rejection.body_text()
        )))
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        let app = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::BadRequest(format!("Failed to read multipart: {}", err.body_text()))
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let hide_details = HIDE_ERROR_DETAILS.load(Ordering::Relaxed) || app_error.is_sensitive();

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse {
            error: app_error.client_message(),
            details: (!hide_details).then(|| app_error.detailed_message()),
            error_type: (!hide_details).then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genscan_detector::TransportError;
    use std::time::Duration;

    #[test]
    fn test_from_detection_timeout() {
        let err = DetectionError::Transport(TransportError::Timeout(Duration::from_secs(360)));
        let HttpAppError(app_err) = err.into();
        match app_err {
            AppError::UpstreamTimeout(msg) => assert!(msg.contains("timed out")),
            other => panic!("Expected UpstreamTimeout, got {:?}", other),
        }
    }

    #[test]
    fn test_from_validation_error() {
        let err = ValidationError::UnsupportedExtension {
            extension: "gif".to_string(),
            allowed: vec!["jpg".to_string(), "png".to_string()],
        };
        let HttpAppError(app_err) = err.into();
        match app_err {
            AppError::InvalidInput(msg) => {
                assert_eq!(msg, "Invalid file type '.gif'. Only jpg, png are supported.")
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    // Serializes tests that toggle the process-wide hiding flag.
    static HIDE_FLAG_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = HttpAppError(err).into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    #[tokio::test]
    async fn test_sensitive_error_hides_details() {
        let _guard = HIDE_FLAG_LOCK.lock().await;
        set_hide_error_details(false);

        let (status, body) = render(AppError::Internal("secret path /etc/keys".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(body.get("details").is_none());
        assert!(body.get("error_type").is_none());
        assert!(!body.to_string().contains("secret path"));

        let (_, body) = render(AppError::UpstreamTimeout("score call exceeded 120s".to_string())).await;
        assert_eq!(body["error_type"], "UpstreamTimeout");
        assert!(body["details"]
            .as_str()
            .is_some_and(|d| d.contains("score call exceeded 120s")));
    }

    #[tokio::test]
    async fn test_production_hides_details_for_every_error() {
        let _guard = HIDE_FLAG_LOCK.lock().await;
        set_hide_error_details(true);

        let (status, body) = render(AppError::UpstreamTimeout("score call exceeded 120s".to_string())).await;
        set_hide_error_details(false);

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"], "Detection service timed out");
        assert_eq!(body["code"], "UPSTREAM_TIMEOUT");
        assert_eq!(body["recoverable"], true);
        assert!(body.get("details").is_none());
        assert!(body.get("error_type").is_none());
    }

    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Detection service timed out".to_string(),
            details: None,
            error_type: None,
            code: "UPSTREAM_TIMEOUT".to_string(),
            recoverable: true,
            suggested_action: Some("Retry after a short delay".to_string()),
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["code"], "UPSTREAM_TIMEOUT");
        assert_eq!(json["recoverable"], true);
        assert!(json.get("details").is_none());
        assert!(json.get("error_type").is_none());
    }
}
