//! Staging of uploaded files
//!
//! The uploaded field is streamed into a named temporary file. The file is
//! deleted when the [`StagedUpload`] is dropped, so every exit path of the
//! handler (success, error, timeout) releases it.

use axum::extract::multipart::Field;
use bytes::Bytes;
use genscan_core::AppError;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::error::HttpAppError;

pub struct StagedUpload {
    file: NamedTempFile,
    filename: String,
    size: usize,
}

impl StagedUpload {
    /// Stream `field` to a temp file, rejecting it once it exceeds `max_size` bytes.
    pub async fn stage(
        mut field: Field<'_>,
        filename: String,
        extension: &str,
        max_size: usize,
    ) -> Result<Self, HttpAppError> {
        let file = tempfile::Builder::new()
            .prefix("genscan-")
            .suffix(&format!(".{}", extension))
            .tempfile()
            .map_err(AppError::from)?;

        let mut writer = tokio::fs::File::from_std(file.reopen().map_err(AppError::from)?);
        let mut size = 0usize;

        while let Some(chunk) = field.chunk().await? {
            size += chunk.len();
            if size > max_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "File size exceeds maximum allowed size of {} MB",
                    max_size / 1024 / 1024
                ))
                .into());
            }
            writer.write_all(&chunk).await.map_err(AppError::from)?;
        }
        writer.flush().await.map_err(AppError::from)?;

        tracing::debug!(
            path = %file.path().display(),
            size,
            "Staged upload"
        );

        Ok(Self {
            file,
            filename,
            size,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub async fn read_bytes(&self) -> Result<Bytes, AppError> {
        let data = tokio::fs::read(self.file.path()).await?;
        Ok(Bytes::from(data))
    }
}
