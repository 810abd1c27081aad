// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::vision::ImageError;

/// Body of every error response: `{"error": "<message>"}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// No multipart part named `image` carrying a filename
    #[error("No image provided")]
    NoImageProvided,

    /// The `image` part has an empty filename
    #[error("No selected file")]
    NoSelectedFile,

    /// The multipart stream could not be read
    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    #[error("Invalid image: {0}")]
    InvalidImage(#[from] ImageError),

    #[error("Failed to store upload: {0}")]
    Upload(#[from] std::io::Error),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NoImageProvided
            | ApiError::NoSelectedFile
            | ApiError::MalformedUpload(_)
            | ApiError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            ApiError::Upload(_) | ApiError::Inference(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {} ({})", self, status);
        } else {
            warn!("Request rejected: {} ({})", self, status);
        }

        (status, Json(self.to_response())).into_response()
    }
}
