// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection pipeline
//!
//! Components:
//! - `preprocessing` - 416x416 input blob
//! - `model` - YOLOv3 ONNX session
//! - `postprocess` - confidence filter, NMS and distance heuristic

pub mod model;
pub mod postprocess;
pub mod preprocessing;

use anyhow::Result;
use image::DynamicImage;
use ndarray::{Array2, Array4};
use tracing::debug;

use crate::vision::labels::LabelTable;

pub use model::YoloDetector;
pub use postprocess::{Detection, DetectionConfig, PixelBox};
pub use preprocessing::{preprocess_for_detector, DETECTOR_INPUT_SIZE};

/// Forward pass of a detection network
///
/// Returns one `[rows, 5 + classes]` matrix per output layer, rows being
/// `(cx, cy, w, h, objectness, class_scores...)` in normalized coordinates.
#[cfg_attr(test, mockall::automock)]
pub trait ObjectDetector: Send + Sync {
    fn forward(&self, input: &Array4<f32>) -> Result<Vec<Array2<f32>>>;
}

/// Run the detection pipeline on a decoded image
pub fn detect_objects(
    detector: &dyn ObjectDetector,
    labels: &LabelTable,
    config: &DetectionConfig,
    image: &DynamicImage,
) -> Result<Vec<Detection>> {
    let (width, height) = (image.width(), image.height());
    let input = preprocess_for_detector(image, config.input_size);
    let outputs = detector.forward(&input)?;

    let detections = postprocess::postprocess(&outputs, width, height, labels, config);
    debug!(
        "Detection on {}x{} image: {} objects",
        width,
        height,
        detections.len()
    );

    Ok(detections)
}
