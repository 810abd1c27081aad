// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - Object detection via YOLOv3 with a distance heuristic
//! - OCR (Optical Character Recognition) via Otsu binarization and PaddleOCR
//!
//! All inference runs on CPU through ONNX Runtime.

pub mod detection;
pub mod image_utils;
pub mod labels;
pub mod model_manager;
pub mod ocr;

pub use detection::{Detection, DetectionConfig, ObjectDetector, YoloDetector};
pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo};
pub use labels::LabelTable;
pub use model_manager::{VisionModelConfig, VisionModels};
pub use ocr::{PaddleOcrModel, TextRecognizer};
