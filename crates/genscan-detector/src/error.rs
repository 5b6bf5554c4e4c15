//! Detection error taxonomy
//!
//! Each kind is distinguishable by the caller. None of them is fatal to the
//! process; every error is scoped to the single detection call.

use std::fmt;
use std::time::Duration;

use genscan_core::{AppError, ValidationError};
use thiserror::Error;

pub type DetectionResult<T> = Result<T, DetectionError>;

/// Phase of the two-step asset upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Reserve,
    Transfer,
}

impl fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadPhase::Reserve => write!(f, "reserve"),
            UploadPhase::Transfer => write!(f, "transfer"),
        }
    }
}

/// Failure talking to a vendor endpoint.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("vendor returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("unreadable response body: {0}")]
    InvalidBody(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Timeout(_) | TransportError::Network(_) => true,
            TransportError::Rejected { status, .. } => *status == 429 || *status >= 500,
            TransportError::InvalidBody(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("asset upload failed during {phase} phase: {source}")]
    Upload {
        phase: UploadPhase,
        #[source]
        source: TransportError,
    },

    #[error("detection request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("unexpected vendor response: {0}")]
    Schema(String),
}

impl DetectionError {
    /// Whether an external caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        match self {
            DetectionError::Validation(_) | DetectionError::Schema(_) => false,
            DetectionError::Upload { source, .. } => source.is_retryable(),
            DetectionError::Transport(source) => source.is_retryable(),
        }
    }
}

impl From<DetectionError> for AppError {
    fn from(err: DetectionError) -> Self {
        let retryable = err.is_retryable();
        match err {
            DetectionError::Validation(e) => AppError::InvalidInput(e.to_string()),
            e @ DetectionError::Upload { .. } => AppError::AssetUpload {
                message: e.to_string(),
                retryable,
            },
            DetectionError::Transport(e) => match e {
                TransportError::Timeout(_) => AppError::UpstreamTimeout(e.to_string()),
                TransportError::Network(_) => AppError::UpstreamUnavailable(e.to_string()),
                TransportError::Rejected { .. } => AppError::UpstreamRejected {
                    message: e.to_string(),
                    retryable,
                },
                TransportError::InvalidBody(_) => AppError::UpstreamSchema(e.to_string()),
            },
            DetectionError::Schema(msg) => AppError::UpstreamSchema(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genscan_core::ErrorMetadata;

    #[test]
    fn test_retryable_kinds() {
        assert!(DetectionError::Transport(TransportError::Timeout(Duration::from_secs(1))).is_retryable());
        assert!(DetectionError::Transport(TransportError::Network("reset".into())).is_retryable());
        assert!(DetectionError::Transport(TransportError::Rejected {
            status: 503,
            body: String::new()
        })
        .is_retryable());
        assert!(DetectionError::Transport(TransportError::Rejected {
            status: 429,
            body: String::new()
        })
        .is_retryable());
        assert!(!DetectionError::Transport(TransportError::Rejected {
            status: 401,
            body: String::new()
        })
        .is_retryable());
        assert!(!DetectionError::Schema("no data".into()).is_retryable());
        assert!(!DetectionError::Validation(ValidationError::ThresholdOutOfRange(2.0)).is_retryable());
    }

    #[test]
    fn test_upload_retryable_follows_source() {
        let err = DetectionError::Upload {
            phase: UploadPhase::Transfer,
            source: TransportError::Timeout(Duration::from_secs(300)),
        };
        assert!(err.is_retryable());

        let err = DetectionError::Upload {
            phase: UploadPhase::Reserve,
            source: TransportError::Rejected {
                status: 403,
                body: "forbidden".into(),
            },
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("reserve phase"));
    }

    #[test]
    fn test_app_error_mapping() {
        let cases: Vec<(DetectionError, u16, &str, bool)> = vec![
            (
                ValidationError::ThresholdOutOfRange(-1.0).into(),
                400,
                "INVALID_INPUT",
                false,
            ),
            (
                DetectionError::Upload {
                    phase: UploadPhase::Reserve,
                    source: TransportError::Network("refused".into()),
                },
                502,
                "ASSET_UPLOAD_FAILED",
                true,
            ),
            (
                DetectionError::Upload {
                    phase: UploadPhase::Reserve,
                    source: TransportError::Rejected {
                        status: 403,
                        body: "forbidden".into(),
                    },
                },
                502,
                "ASSET_UPLOAD_FAILED",
                false,
            ),
            (
                TransportError::Timeout(Duration::from_secs(5)).into(),
                504,
                "UPSTREAM_TIMEOUT",
                true,
            ),
            (
                TransportError::Network("dns".into()).into(),
                502,
                "UPSTREAM_UNAVAILABLE",
                true,
            ),
            (
                TransportError::Rejected {
                    status: 500,
                    body: "boom".into(),
                }
                .into(),
                502,
                "UPSTREAM_REJECTED",
                true,
            ),
            (
                TransportError::Rejected {
                    status: 429,
                    body: "slow down".into(),
                }
                .into(),
                502,
                "UPSTREAM_REJECTED",
                true,
            ),
            (
                TransportError::Rejected {
                    status: 401,
                    body: "bad key".into(),
                }
                .into(),
                502,
                "UPSTREAM_REJECTED",
                false,
            ),
            (
                DetectionError::Schema("missing data".into()),
                502,
                "UPSTREAM_SCHEMA_MISMATCH",
                false,
            ),
        ];

        for (err, status, code, recoverable) in cases {
            let retryable = err.is_retryable();
            let app: AppError = err.into();
            assert_eq!(app.http_status_code(), status);
            assert_eq!(app.error_code(), code);
            assert_eq!(app.is_recoverable(), recoverable, "{}", code);
            assert_eq!(app.is_recoverable(), retryable, "{}", code);
        }
    }
}
