// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR engine: text detection followed by per-line recognition

use anyhow::Result;
use image::{DynamicImage, GrayImage};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::detection::{OcrDetectionModel, TextBox};
use super::preprocessing::{
    preprocess_for_detection, preprocess_for_recognition, PreprocessInfo, OCR_INPUT_SIZE,
};
use super::recognition::OcrRecognitionModel;
use super::TextRecognizer;

/// Files expected in the OCR model directory
pub const DETECTION_MODEL_FILE: &str = "det_model.onnx";
pub const RECOGNITION_MODEL_FILE: &str = "rec_model.onnx";
pub const DICTIONARY_FILE: &str = "ppocr_keys_v1.txt";

/// Paths of the three PaddleOCR assets inside a model directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddleOcrPaths {
    pub detection_model: PathBuf,
    pub recognition_model: PathBuf,
    pub dictionary: PathBuf,
}

impl PaddleOcrPaths {
    pub fn in_dir<P: AsRef<Path>>(model_dir: P) -> Self {
        let dir = model_dir.as_ref();
        Self {
            detection_model: dir.join(DETECTION_MODEL_FILE),
            recognition_model: dir.join(RECOGNITION_MODEL_FILE),
            dictionary: dir.join(DICTIONARY_FILE),
        }
    }
}

/// PaddleOCR model for text extraction
///
/// Combines text detection and recognition models for end-to-end OCR.
#[derive(Debug)]
pub struct PaddleOcrModel {
    detector: OcrDetectionModel,
    recognizer: OcrRecognitionModel,
}

impl PaddleOcrModel {
    /// Load PaddleOCR models from the specified directory
    pub fn new<P: AsRef<Path>>(model_dir: P, intra_threads: usize) -> Result<Self> {
        let paths = PaddleOcrPaths::in_dir(model_dir);
        debug!("Loading PaddleOCR models: {:?}", paths);

        let detector = OcrDetectionModel::new(&paths.detection_model, intra_threads)?;
        let recognizer =
            OcrRecognitionModel::new(&paths.recognition_model, &paths.dictionary, intra_threads)?;

        Ok(Self {
            detector,
            recognizer,
        })
    }
}

/// Map a detected box back to an in-bounds crop of the original image
///
/// Returns `(x, y, width, height)`, or `None` when nothing of the box lies
/// inside the image.
pub fn crop_rect(text_box: &TextBox, info: &PreprocessInfo) -> Option<(u32, u32, u32, u32)> {
    let (x0, y0) = info.map_to_original(text_box.x, text_box.y);
    let (x1, y1) = info.map_to_original(
        text_box.x + text_box.width,
        text_box.y + text_box.height,
    );

    let max_w = info.original_width as f32;
    let max_h = info.original_height as f32;
    let left = x0.floor().clamp(0.0, max_w);
    let top = y0.floor().clamp(0.0, max_h);
    let right = x1.ceil().clamp(0.0, max_w);
    let bottom = y1.ceil().clamp(0.0, max_h);

    if right - left < 1.0 || bottom - top < 1.0 {
        return None;
    }

    Some((
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

impl TextRecognizer for PaddleOcrModel {
    fn recognize(&self, binarized: &GrayImage) -> Result<String> {
        let image = DynamicImage::ImageLuma8(binarized.clone());
        let info = PreprocessInfo::new(&image, OCR_INPUT_SIZE);

        let text_boxes = self.detector.detect(&preprocess_for_detection(&image))?;

        let mut lines = Vec::with_capacity(text_boxes.len());
        for text_box in &text_boxes {
            let Some((x, y, w, h)) = crop_rect(text_box, &info) else {
                continue;
            };
            let crop = image.crop_imm(x, y, w, h);
            let recognized = self
                .recognizer
                .recognize(&preprocess_for_recognition(&crop))?;

            if !recognized.is_empty() {
                debug!(
                    "Line at ({}, {}): {:.2} confidence",
                    x, y, recognized.confidence
                );
                lines.push(recognized.text);
            }
        }

        Ok(lines.join("\n"))
    }
}
