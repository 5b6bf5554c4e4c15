//! Domain models
//!
//! Both entities are request-scoped: a [`SubmissionRequest`] is built per incoming
//! call and a [`DetectionVerdict`] is derived once from the vendor response.

pub mod response;
pub mod submission;
pub mod verdict;

pub use response::DetectResponse;
pub use submission::SubmissionRequest;
pub use verdict::{format_decimal, rank_sources, round_to, DetectionVerdict, SourceWeight};
