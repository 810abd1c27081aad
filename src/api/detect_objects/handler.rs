// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use std::time::Instant;
use tracing::{debug, info};

use super::response::DetectObjectsResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::ImageUpload;
use crate::vision::decode_image_bytes;

/// POST /detect_objects - Locate objects in an image
///
/// # Request
/// Multipart form with an `image` file part.
///
/// # Response
/// - `objects`: detections with `label`, `confidence`, `position`
///   (`[x, y, width, height]` in pixels) and `distance`
///
/// # Errors
/// - 400 Bad Request: missing `image` part, empty filename, undecodable image
/// - 500 Internal Server Error: storing the upload or inference failed
pub async fn detect_objects_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectObjectsResponse>, ApiError> {
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
    let objects = tokio::task::spawn_blocking(move || models.detect(&image))
        .await
        .map_err(|e| ApiError::InternalError(format!("Detection task failed: {}", e)))?
        .map_err(|e| ApiError::Inference(format!("{:#}", e)))?;

    info!(
        "Object detection complete: {} objects, {}ms",
        objects.len(),
        start.elapsed().as_millis()
    );

    Ok(Json(DetectObjectsResponse::new(objects)))
}
