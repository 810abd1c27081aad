// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! Produces a per-pixel text probability map; connected regions above the
//! threshold become text boxes.

use anyhow::{Context, Result};
use ndarray::{Array4, ArrayView2, ArrayViewD, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Default probability threshold for text pixels
pub const DEFAULT_TEXT_THRESHOLD: f32 = 0.3;

/// Regions with fewer pixels than this are treated as noise
pub const MIN_REGION_PIXELS: usize = 10;

/// A detected text box in preprocessed image space
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Mean probability over the region's pixels
    pub confidence: f32,
}

/// PaddleOCR text detection model
pub struct OcrDetectionModel {
    /// ONNX Runtime session (running needs exclusive access)
    session: Mutex<Session>,
    /// Model input name
    input_name: String,
    /// Confidence threshold for text pixels
    confidence_threshold: f32,
}

impl std::fmt::Debug for OcrDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrDetectionModel")
            .field("input_name", &self.input_name)
            .field("confidence_threshold", &self.confidence_threshold)
            .finish_non_exhaustive()
    }
}

impl OcrDetectionModel {
    /// Load the OCR detection model from a file (det_model.onnx)
    pub fn new<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR detection model not found: {}", model_path.display());
        }

        info!("Loading OCR detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!(
                    "Failed to load OCR detection model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        info!("✅ OCR detection model loaded (CPU-only)");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            confidence_threshold: DEFAULT_TEXT_THRESHOLD,
        })
    }

    /// Run text detection on a preprocessed [1, 3, H, W] tensor
    pub fn detect(&self, input: &Array4<f32>) -> Result<Vec<TextBox>> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
        }
        let (input_height, input_width) = (shape[2], shape[3]);

        let input_value =
            Tensor::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("OCR detection session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let prob_map = probability_map(output_tensor)?;
        let scale_y = input_height as f32 / prob_map.nrows() as f32;
        let scale_x = input_width as f32 / prob_map.ncols() as f32;

        let text_boxes = extract_text_boxes(prob_map, self.confidence_threshold, scale_x, scale_y);
        debug!("Detected {} text regions", text_boxes.len());

        Ok(text_boxes)
    }
}

/// Reduce a `[1, 1, H, W]` or `[1, H, W]` output to its `[H, W]` map
pub fn probability_map(output: ArrayViewD<f32>) -> Result<ArrayView2<f32>> {
    let mut view = output;
    while view.ndim() > 2 {
        if view.shape()[0] != 1 {
            anyhow::bail!("Unexpected detection output shape: {:?}", view.shape());
        }
        view = view.index_axis_move(Axis(0), 0);
    }
    view.into_dimensionality::<Ix2>()
        .context("Detection output is not a 2-D probability map")
}

/// Group pixels above `threshold` into 4-connected regions
///
/// Returns bounding boxes scaled by `scale_x`/`scale_y`, ordered
/// top-to-bottom then left-to-right.
pub fn extract_text_boxes(
    prob_map: ArrayView2<f32>,
    threshold: f32,
    scale_x: f32,
    scale_y: f32,
) -> Vec<TextBox> {
    let (height, width) = prob_map.dim();
    let mut visited = vec![false; height * width];
    let mut text_boxes = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited[y * width + x] || prob_map[[y, x]] < threshold {
                continue;
            }

            let region = flood_fill(&prob_map, &mut visited, x, y, threshold);
            if region.count < MIN_REGION_PIXELS {
                continue;
            }

            text_boxes.push(TextBox {
                x: region.min_x as f32 * scale_x,
                y: region.min_y as f32 * scale_y,
                width: (region.max_x - region.min_x + 1) as f32 * scale_x,
                height: (region.max_y - region.min_y + 1) as f32 * scale_y,
                confidence: region.sum / region.count as f32,
            });
        }
    }

    text_boxes.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    text_boxes
}

struct Region {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    count: usize,
    sum: f32,
}

fn flood_fill(
    prob_map: &ArrayView2<f32>,
    visited: &mut [bool],
    start_x: usize,
    start_y: usize,
    threshold: f32,
) -> Region {
    let (height, width) = prob_map.dim();
    let mut stack = vec![(start_x, start_y)];
    let mut region = Region {
        min_x: start_x,
        max_x: start_x,
        min_y: start_y,
        max_y: start_y,
        count: 0,
        sum: 0.0,
    };

    while let Some((x, y)) = stack.pop() {
        let idx = y * width + x;
        if visited[idx] {
            continue;
        }
        let prob = prob_map[[y, x]];
        if prob < threshold {
            continue;
        }

        visited[idx] = true;
        region.count += 1;
        region.sum += prob;
        region.min_x = region.min_x.min(x);
        region.max_x = region.max_x.max(x);
        region.min_y = region.min_y.min(y);
        region.max_y = region.max_y.max(y);

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
    }

    region
}
