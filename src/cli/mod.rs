// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::vision::{DetectionConfig, VisionModelConfig};

/// LifeLens backend server
#[derive(Parser, Debug, Clone)]
#[command(name = "lifelens-backend")]
#[command(version)]
#[command(about = "Object detection and text extraction over HTTP", long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "LIFELENS_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Directory uploaded images are stored in (created if absent)
    #[arg(long, env = "LIFELENS_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// YOLOv3 ONNX model
    #[arg(long, env = "LIFELENS_DETECTOR_MODEL", default_value = "yolov3.onnx")]
    pub detector_model: PathBuf,

    /// Class names for the detector, one per line
    #[arg(long, env = "LIFELENS_LABELS", default_value = "coco.names")]
    pub labels: PathBuf,

    /// Directory with det_model.onnx, rec_model.onnx and ppocr_keys_v1.txt
    #[arg(
        long,
        env = "LIFELENS_OCR_MODEL_DIR",
        default_value = "models/paddleocr-onnx"
    )]
    pub ocr_model_dir: PathBuf,

    /// ONNX Runtime intra-op threads per model session
    #[arg(long, env = "LIFELENS_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Maximum request body size in bytes (unlimited when unset)
    #[arg(long, env = "LIFELENS_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,
}

impl Cli {
    pub fn vision_config(&self) -> VisionModelConfig {
        VisionModelConfig {
            detector_model: self.detector_model.clone(),
            labels_path: self.labels.clone(),
            ocr_model_dir: self.ocr_model_dir.clone(),
            intra_threads: self.intra_threads,
            detection: DetectionConfig::default(),
        }
    }
}
