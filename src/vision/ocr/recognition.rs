// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! Recognizes the text of one cropped line with greedy CTC decoding.

use anyhow::{Context, Result};
use ndarray::{Array4, ArrayView2, ArrayViewD, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use super::preprocessing::REC_INPUT_HEIGHT;

/// CTC blank token index
pub const BLANK_INDEX: usize = 0;

/// Recognized text with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean probability of the emitted characters (0.0 when nothing was read)
    pub confidence: f32,
}

impl RecognizedText {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Character dictionary for CTC decoding
///
/// Index 0 is the blank token; dictionary characters follow in file order and
/// a space is appended when the file has none.
#[derive(Debug, Clone, PartialEq)]
pub struct CharDictionary {
    chars: Vec<char>,
}

impl CharDictionary {
    pub fn parse(contents: &str) -> Self {
        let mut chars = vec!['\0'];
        for line in contents.lines() {
            if let Some(ch) = line.chars().next() {
                chars.push(ch);
            }
        }
        if !chars[1..].contains(&' ') {
            chars.push(' ');
        }
        Self { chars }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("OCR character dictionary not found: {}", path.display());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary: {}", path.display()))?;
        let dictionary = Self::parse(&contents);
        if dictionary.len() <= 2 {
            anyhow::bail!("OCR character dictionary is empty: {}", path.display());
        }
        Ok(dictionary)
    }

    pub fn get(&self, index: usize) -> Option<char> {
        if index == BLANK_INDEX {
            return None;
        }
        self.chars.get(index).copied()
    }

    /// Number of classes including the blank token
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.len() <= 1
    }
}

/// Greedy (best path) CTC decoding over a `[timesteps, classes]` matrix:
/// take the argmax per step, collapse repeats, drop blanks
pub fn ctc_greedy_decode(probs: ArrayView2<f32>, dictionary: &CharDictionary) -> RecognizedText {
    let mut text = String::new();
    let mut total = 0.0f32;
    let mut emitted = 0usize;
    let mut prev_index: Option<usize> = None;

    for step in probs.axis_iter(Axis(0)) {
        let (max_index, max_prob) = step.iter().copied().enumerate().fold(
            (BLANK_INDEX, f32::NEG_INFINITY),
            |best, (idx, p)| if p > best.1 { (idx, p) } else { best },
        );

        if max_index != BLANK_INDEX && Some(max_index) != prev_index {
            if let Some(ch) = dictionary.get(max_index) {
                text.push(ch);
                total += max_prob;
                emitted += 1;
            }
        }

        prev_index = (max_index != BLANK_INDEX).then_some(max_index);
    }

    let confidence = if emitted == 0 {
        0.0
    } else {
        (total / emitted as f32).clamp(0.0, 1.0)
    };

    RecognizedText { text, confidence }
}

/// PaddleOCR text recognition model
pub struct OcrRecognitionModel {
    /// ONNX Runtime session (running needs exclusive access)
    session: Mutex<Session>,
    dictionary: CharDictionary,
    input_name: String,
}

impl std::fmt::Debug for OcrRecognitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrRecognitionModel")
            .field("dictionary_size", &self.dictionary.len())
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OcrRecognitionModel {
    /// Load the recognition model (rec_model.onnx) and its dictionary
    pub fn new<P: AsRef<Path>>(model_path: P, dict_path: P, intra_threads: usize) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR recognition model not found: {}", model_path.display());
        }
        let dictionary = CharDictionary::load(dict_path)?;
        info!(
            "Loaded character dictionary with {} characters",
            dictionary.len()
        );

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
                    "Failed to load OCR recognition model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        info!("✅ OCR recognition model loaded (CPU-only)");

        Ok(Self {
            session: Mutex::new(session),
            dictionary,
            input_name,
        })
    }

    pub fn dictionary_size(&self) -> usize {
        self.dictionary.len()
    }

    /// Recognize text from a preprocessed [1, 3, 48, W] tensor
    pub fn recognize(&self, input: &Array4<f32>) -> Result<RecognizedText> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 || shape[2] != REC_INPUT_HEIGHT as usize || shape[3] < 4
        {
            anyhow::bail!(
                "Invalid input shape: {:?}, expected [1, 3, {}, W>=4]",
                shape,
                REC_INPUT_HEIGHT
            );
        }

        let input_value =
            Tensor::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("OCR recognition session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Recognition inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        debug!("Recognition output shape: {:?}", output_tensor.shape());

        let probs = sequence_probs(output_tensor)?;
        Ok(ctc_greedy_decode(probs, &self.dictionary))
    }
}

/// Reduce a `[1, T, C]` or `[T, C]` output to `[T, C]`
fn sequence_probs(output: ArrayViewD<f32>) -> Result<ArrayView2<f32>> {
    let view = match output.ndim() {
        2 => output,
        3 if output.shape()[0] == 1 => output.index_axis_move(Axis(0), 0),
        _ => anyhow::bail!("Unexpected recognition output shape: {:?}", output.shape()),
    };
    view.into_dimensionality::<Ix2>()
        .context("Recognition output is not two-dimensional")
}
