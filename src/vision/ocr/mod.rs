// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction from images
//!
//! The page is converted to grayscale and binarized with a global Otsu
//! threshold before recognition. Recognition runs on CPU using PaddleOCR
//! ONNX models.
//!
//! Components:
//! - `threshold` - Grayscale conversion and Otsu binarization
//! - `detection` - Text region detection
//! - `recognition` - Text recognition from detected regions
//! - `preprocessing` - Image preprocessing for models
//! - `model` - Combined OCR engine

pub mod detection;
pub mod model;
pub mod preprocessing;
pub mod recognition;
pub mod threshold;

use anyhow::Result;
use image::{DynamicImage, GrayImage};
use tracing::debug;

pub use detection::{OcrDetectionModel, TextBox};
pub use model::{PaddleOcrModel, PaddleOcrPaths};
pub use recognition::{CharDictionary, OcrRecognitionModel, RecognizedText};
pub use threshold::{is_uniform, otsu_binarize, to_grayscale};

/// OCR engine over a binarized page
///
/// Lines are returned top-to-bottom joined with `\n`.
#[cfg_attr(test, mockall::automock)]
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, binarized: &GrayImage) -> Result<String>;
}

/// Grayscale, binarize with Otsu and recognize
///
/// A page with nothing left after binarization yields an empty string
/// without invoking the engine. The result is trimmed.
pub fn read_text(recognizer: &dyn TextRecognizer, image: &DynamicImage) -> Result<String> {
    let gray = to_grayscale(image);
    let binarized = otsu_binarize(&gray);

    if is_uniform(&binarized) {
        debug!(
            "Binarized {}x{} page is uniform, skipping recognition",
            binarized.width(),
            binarized.height()
        );
        return Ok(String::new());
    }

    let text = recognizer.recognize(&binarized)?;
    Ok(text.trim().to_string())
}
