// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the LifeLens backend

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "object-detection",
    "yolov3-onnx",
    "distance-estimate",
    "text-extraction",
    "otsu-binarization",
    "paddleocr-onnx",
    "multipart-upload",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("LifeLens Backend v{}", VERSION_NUMBER)
}
