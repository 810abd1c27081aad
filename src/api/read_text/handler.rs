// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use std::time::Instant;
use tracing::{debug, info};

use super::response::ReadTextResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::ImageUpload;
use crate::vision::decode_image_bytes;

/// POST /read_text - Extract text from an image
///
/// The image is converted to grayscale and binarized with Otsu's method
/// before recognition.
///
/// # Request
/// Multipart form with an `image` file part.
///
/// # Response
/// - `text`: recognized text, trimmed; empty when nothing was read
///
/// # Errors
/// - 400 Bad Request: missing `image` part, empty filename, undecodable image
/// - 500 Internal Server Error: storing the upload or OCR failed
pub async fn read_text_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ReadTextResponse>, ApiError> {
    let start = Instant::now();
    let upload = ImageUpload::from_request(multipart).await?;

    let saved = state.uploads.save(&upload.filename, &upload.bytes).await?;
    debug!("Stored upload at {}", saved.display());

    let (image, image_info) = decode_image_bytes(&upload.bytes)?;
    debug!(
        "Decoded image: {}x{} {:?}, {} bytes",
        image_info.width, image_info.height, image_info.format, image_info.size_bytes
    );

    let models = state.models.clone();
    let text = tokio::task::spawn_blocking(move || models.read_text(&image))
        .await
        .map_err(|e| ApiError::InternalError(format!("OCR task failed: {}", e)))?
        .map_err(|e| ApiError::Inference(format!("{:#}", e)))?;

    info!(
        "OCR complete: {} chars, {}ms",
        text.chars().count(),
        start.elapsed().as_millis()
    );

    Ok(Json(ReadTextResponse { text }))
}
