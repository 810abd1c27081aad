// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart image upload extraction shared by the vision endpoints

use axum::body::Bytes;
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use tracing::debug;

use super::errors::ApiError;

/// Name of the multipart part carrying the image
pub const IMAGE_FIELD: &str = "image";

/// The uploaded image file
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Filename as sent by the client (unsanitized)
    pub filename: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Extract the first `image` file part
    ///
    /// Parts without a filename are form values, not files, and are skipped.
    /// A request that is not multipart at all is reported the same way as a
    /// missing part.
    pub async fn from_request(
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Self, ApiError> {
        let mut multipart = multipart.map_err(|e| {
            debug!("Request body is not multipart: {}", e);
            ApiError::NoImageProvided
        })?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::MalformedUpload(e.to_string()))?
        {
            if field.name() != Some(IMAGE_FIELD) {
                continue;
            }
            let Some(filename) = field.file_name().map(str::to_string) else {
                continue;
            };
            if filename.is_empty() {
                return Err(ApiError::NoSelectedFile);
            }

            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::MalformedUpload(e.to_string()))?;
            debug!("Received upload {:?}: {} bytes", filename, bytes.len());

            return Ok(Self { filename, bytes });
        }

        Err(ApiError::NoImageProvided)
    }
}
