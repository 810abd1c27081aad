// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection API endpoint module
//!
//! Provides POST /detect_objects for locating objects in an uploaded image.

pub mod handler;
pub mod response;

pub use handler::detect_objects_handler;
pub use response::DetectObjectsResponse;
