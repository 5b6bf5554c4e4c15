use bytes::Bytes;

use crate::validation::{validate_image_data, validate_mime_type, ValidationError};

/// Image bytes plus the MIME type declared for them.
///
/// Construction validates both, so a `SubmissionRequest` is always submittable.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    data: Bytes,
    mime_type: String,
}

impl SubmissionRequest {
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Result<Self, ValidationError> {
        let data = data.into();
        let mime_type = mime_type.into();
        validate_image_data(&data)?;
        validate_mime_type(&mime_type)?;

        Ok(Self { data, mime_type })
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size of the raw image in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
