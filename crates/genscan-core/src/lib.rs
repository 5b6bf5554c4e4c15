//! Genscan Core Library
//!
//! This crate provides the domain models, error types, configuration, and input
//! validation shared by the detector, the HTTP API and the operator tooling.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, DetectorConfig, InputConfig, ServerConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{DetectResponse, DetectionVerdict, SourceWeight, SubmissionRequest};
pub use validation::ValidationError;
