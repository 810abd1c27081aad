// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv3 detector backed by ONNX Runtime

use anyhow::{Context, Result};
use ndarray::{Array2, Array4, ArrayViewD, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use super::ObjectDetector;

/// YOLOv3 network exported to ONNX
///
/// Every graph output is treated as a detection layer whose rows are
/// `(cx, cy, w, h, objectness, class_scores...)`.
pub struct YoloDetector {
    /// ONNX Runtime session (running needs exclusive access)
    session: Mutex<Session>,
    /// Model input name
    input_name: String,
    /// Names of all detection output layers
    output_names: Vec<String>,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_name", &self.input_name)
            .field("output_names", &self.output_names)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load the detector from an ONNX file
    ///
    /// # Errors
    /// Returns error if the file is missing, ONNX Runtime cannot load it, or
    /// the graph has no outputs.
    pub fn new<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Detector model not found: {}", model_path.display());
        }

        info!("Loading detector model from {}", model_path.display());

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
                format!("Failed to load detector model from {}", model_path.display())
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .context("Detector model has no inputs")?;

        let output_names: Vec<String> = session
            .outputs
            .iter()
            .map(|output| output.name.clone())
            .collect();

        if output_names.is_empty() {
            anyhow::bail!("Detector model has no outputs: {}", model_path.display());
        }

        debug!(
            "Detector loaded - input: {}, outputs: {:?}",
            input_name, output_names
        );
        info!("✅ Detector model loaded ({} output layers)", output_names.len());

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_names,
        })
    }
}

/// Flatten one output layer into a `[rows, 5 + classes]` matrix
///
/// Accepts `[rows, values]` or `[1, rows, values]`.
pub fn output_rows(output: ArrayViewD<f32>) -> Result<Array2<f32>> {
    let view = match output.ndim() {
        2 => output,
        3 if output.shape()[0] == 1 => output.index_axis_move(Axis(0), 0),
        _ => anyhow::bail!("Unexpected detector output shape: {:?}", output.shape()),
    };

    let matrix = view
        .into_dimensionality::<Ix2>()
        .context("Detector output is not two-dimensional")?;

    Ok(matrix.to_owned())
}

impl ObjectDetector for YoloDetector {
    fn forward(&self, input: &Array4<f32>) -> Result<Vec<Array2<f32>>> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
        }

        let input_value =
            Tensor::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Detector session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Detector inference failed")?;

        let mut layers = Vec::with_capacity(self.output_names.len());
        for name in &self.output_names {
            let tensor = outputs[name.as_str()]
                .try_extract_array::<f32>()
                .with_context(|| format!("Failed to extract output tensor {}", name))?;
            let rows = output_rows(tensor)?;
            debug!("Output layer {}: {} candidate rows", name, rows.nrows());
            layers.push(rows);
        }

        Ok(layers)
    }
}
