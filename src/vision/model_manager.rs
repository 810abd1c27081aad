// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision model context: the object detector, its label table and the OCR
//! engine, loaded once at startup and shared read-only by request handlers

use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::vision::detection::{self, Detection, DetectionConfig, ObjectDetector, YoloDetector};
use crate::vision::labels::LabelTable;
use crate::vision::ocr::{self, PaddleOcrModel, TextRecognizer};

/// Locations of the model assets
#[derive(Debug, Clone)]
pub struct VisionModelConfig {
    /// YOLOv3 ONNX graph
    pub detector_model: PathBuf,
    /// Class names, one per line
    pub labels_path: PathBuf,
    /// Directory holding the PaddleOCR detection/recognition models and dictionary
    pub ocr_model_dir: PathBuf,
    /// ONNX Runtime intra-op threads per session
    pub intra_threads: usize,
    pub detection: DetectionConfig,
}

impl Default for VisionModelConfig {
    fn default() -> Self {
        Self {
            detector_model: PathBuf::from("yolov3.onnx"),
            labels_path: PathBuf::from("coco.names"),
            ocr_model_dir: PathBuf::from("models/paddleocr-onnx"),
            intra_threads: 4,
            detection: DetectionConfig::default(),
        }
    }
}

/// Loaded models shared by all requests
///
/// Cloning is cheap; every component is reference counted.
#[derive(Clone)]
pub struct VisionModels {
    detector: Arc<dyn ObjectDetector>,
    labels: Arc<LabelTable>,
    recognizer: Arc<dyn TextRecognizer>,
    detection_config: DetectionConfig,
}

impl std::fmt::Debug for VisionModels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionModels")
            .field("labels", &self.labels.len())
            .field("detection_config", &self.detection_config)
            .finish_non_exhaustive()
    }
}

impl VisionModels {
    /// Load every model asset
    ///
    /// # Errors
    /// Any missing or malformed asset is an error; the service cannot start
    /// without all of them.
    pub fn load(config: &VisionModelConfig) -> Result<Self> {
        let labels = LabelTable::load(&config.labels_path)?;
        info!(
            "✅ Loaded {} class labels from {}",
            labels.len(),
            config.labels_path.display()
        );

        let detector = YoloDetector::new(&config.detector_model, config.intra_threads)
            .context("Failed to load object detector")?;
        info!(
            "✅ Object detector loaded from {}",
            config.detector_model.display()
        );

        let recognizer = PaddleOcrModel::new(&config.ocr_model_dir, config.intra_threads)
            .context("Failed to load OCR models")?;
        info!(
            "✅ PaddleOCR models loaded from {}",
            config.ocr_model_dir.display()
        );

        Ok(Self::from_parts(
            Arc::new(detector),
            labels,
            Arc::new(recognizer),
            config.detection,
        ))
    }

    /// Assemble a context from already constructed components
    pub fn from_parts(
        detector: Arc<dyn ObjectDetector>,
        labels: LabelTable,
        recognizer: Arc<dyn TextRecognizer>,
        detection_config: DetectionConfig,
    ) -> Self {
        Self {
            detector,
            labels: Arc::new(labels),
            recognizer,
            detection_config,
        }
    }

    /// Detect objects in a decoded image
    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        detection::detect_objects(
            self.detector.as_ref(),
            &self.labels,
            &self.detection_config,
            image,
        )
    }

    /// Extract text from a decoded image
    pub fn read_text(&self, image: &DynamicImage) -> Result<String> {
        ocr::read_text(self.recognizer.as_ref(), image)
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}
