//! Two-phase asset upload
//!
//! A failed transfer leaves its reservation unused on the vendor side. It is
//! not cleaned up; the orphaned asset id is logged instead.

use bytes::Bytes;

use crate::client::VendorClient;
use crate::error::{DetectionError, DetectionResult, UploadPhase};

pub struct AssetUploader<'a> {
    client: &'a dyn VendorClient,
    description: &'a str,
}

impl<'a> AssetUploader<'a> {
    pub fn new(client: &'a dyn VendorClient, description: &'a str) -> Self {
        Self {
            client,
            description,
        }
    }

    /// Reserve an asset, transfer `data` to it, and return the asset id.
    pub async fn upload(&self, content_type: &str, data: Bytes) -> DetectionResult<String> {
        let reservation = self
            .client
            .reserve_asset(content_type, self.description)
            .await
            .map_err(|source| DetectionError::Upload {
                phase: UploadPhase::Reserve,
                source,
            })?;

        tracing::debug!(
            asset_id = %reservation.asset_id,
            content_type = %content_type,
            "Reserved upload asset"
        );

        let size = data.len();
        if let Err(source) = self
            .client
            .transfer_asset(&reservation, content_type, self.description, data)
            .await
        {
            tracing::warn!(
                asset_id = %reservation.asset_id,
                error = %source,
                "Asset transfer failed; reservation left orphaned"
            );
            return Err(DetectionError::Upload {
                phase: UploadPhase::Transfer,
                source,
            });
        }

        tracing::debug!(asset_id = %reservation.asset_id, size, "Transferred asset");

        Ok(reservation.asset_id)
    }
}
