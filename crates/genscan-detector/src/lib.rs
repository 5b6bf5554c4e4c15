//! Genscan Detector
//!
//! Submits an image to the AI-generated-image detection vendor and turns the
//! vendor's reply into a [`genscan_core::DetectionVerdict`].
//!
//! The flow per call is linear: validate the threshold, pick a submission
//! strategy from the encoded size, upload the asset when needed, invoke the
//! scoring endpoint, then normalize the reply.

pub mod client;
pub mod detector;
pub mod error;
pub mod invoker;
pub mod normalizer;
pub mod strategy;
pub mod uploader;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

pub use client::{AssetReservation, HttpVendorClient, VendorClient};
pub use detector::Detector;
pub use error::{DetectionError, DetectionResult, TransportError, UploadPhase};
pub use strategy::{SubmissionPayload, SubmissionStrategy};
