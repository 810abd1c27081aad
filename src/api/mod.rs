// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect_objects;
pub mod errors;
pub mod http_server;
pub mod read_text;
pub mod upload;

pub use detect_objects::{detect_objects_handler, DetectObjectsResponse};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState, StatusResponse, INDEX_MESSAGE};
pub use read_text::{read_text_handler, ReadTextResponse};
pub use upload::{ImageUpload, IMAGE_FIELD};
