// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detector output post-processing
//!
//! Raw network rows are decoded into pixel-space candidates, filtered by
//! class confidence, de-duplicated with non-max suppression and annotated
//! with the distance heuristic.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::vision::labels::LabelTable;

/// Number of leading values in a row before the class scores
/// (center_x, center_y, width, height, objectness)
pub const ROW_HEADER_LEN: usize = 5;

/// Thresholds applied after inference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionConfig {
    /// Square network input size
    pub input_size: u32,
    /// A candidate is kept only if its best class score is strictly above this
    pub confidence_threshold: f32,
    /// NMS ignores boxes whose score is not strictly above this
    pub score_threshold: f32,
    /// A box is suppressed when its IoU with a kept box is strictly above this
    pub iou_threshold: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            input_size: super::preprocessing::DETECTOR_INPUT_SIZE,
            confidence_threshold: 0.5,
            score_threshold: 0.5,
            iou_threshold: 0.4,
        }
    }
}

/// Axis-aligned box in pixel coordinates (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelBox {
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &PixelBox) -> f32 {
        let x1 = self.x.max(other.x) as i64;
        let y1 = self.y.max(other.y) as i64;
        let x2 = (self.x as i64 + self.width as i64).min(other.x as i64 + other.width as i64);
        let y2 = (self.y as i64 + self.height as i64).min(other.y as i64 + other.height as i64);

        let intersection = (x2 - x1).max(0) * (y2 - y1).max(0);
        let union = self.area() + other.area() - intersection;

        if union > 0 {
            intersection as f32 / union as f32
        } else {
            0.0
        }
    }

    pub fn to_array(self) -> [i32; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

/// A decoded candidate that passed the confidence filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: PixelBox,
}

/// A detected object as reported to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    /// `[x, y, width, height]` in pixels
    pub position: [i32; 4],
    /// Inverse-area placeholder score, not a calibrated distance
    pub distance: f64,
}

/// Index and value of the highest class score (first index wins ties)
fn best_class(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (idx, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((idx, score)),
        })
}

/// Decode raw network rows into pixel-space candidates
///
/// Each row is `(cx, cy, w, h, objectness, class_scores...)` in normalized
/// coordinates. Pixel values truncate toward zero. Rows whose best class
/// score is not strictly above `confidence_threshold`, and boxes that end up
/// with no area, are dropped.
pub fn decode_candidates(
    outputs: &[Array2<f32>],
    image_width: u32,
    image_height: u32,
    confidence_threshold: f32,
) -> Vec<Candidate> {
    let width = image_width as f32;
    let height = image_height as f32;
    let mut candidates = Vec::new();

    for output in outputs {
        for row in output.rows() {
            if row.len() <= ROW_HEADER_LEN {
                continue;
            }
            let row: Vec<f32> = row.iter().copied().collect();

            let Some((class_id, confidence)) = best_class(&row[ROW_HEADER_LEN..]) else {
                continue;
            };
            if !(confidence > confidence_threshold) {
                continue;
            }

            let center_x = (row[0] * width) as i32;
            let center_y = (row[1] * height) as i32;
            let w = (row[2] * width) as i32;
            let h = (row[3] * height) as i32;

            if w <= 0 || h <= 0 {
                continue;
            }

            let x = (center_x as f32 - w as f32 / 2.0) as i32;
            let y = (center_y as f32 - h as f32 / 2.0) as i32;

            candidates.push(Candidate {
                class_id,
                confidence,
                bbox: PixelBox {
                    x,
                    y,
                    width: w,
                    height: h,
                },
            });
        }
    }

    candidates
}

/// Non-max suppression over all candidates
///
/// Candidates are visited by descending confidence (stable for ties). A
/// candidate is suppressed when its IoU with any already kept box is above
/// `iou_threshold`. Returns one flag per candidate, `true` for survivors.
pub fn non_max_suppression(
    candidates: &[Candidate],
    score_threshold: f32,
    iou_threshold: f32,
) -> Vec<bool> {
    let mut order: Vec<usize> = (0..candidates.len())
        .filter(|&i| candidates[i].confidence > score_threshold)
        .collect();
    order.sort_by(|&a, &b| {
        candidates[b]
            .confidence
            .partial_cmp(&candidates[a].confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept = vec![false; candidates.len()];
    let mut kept_order: Vec<usize> = Vec::new();

    for idx in order {
        let overlaps = kept_order
            .iter()
            .any(|&k| candidates[k].bbox.iou(&candidates[idx].bbox) > iou_threshold);
        if !overlaps {
            kept[idx] = true;
            kept_order.push(idx);
        }
    }

    kept
}

/// Inverse-area placeholder: image area over box area, rounded to 2 decimals
pub fn estimate_distance(bbox: &PixelBox, image_width: u32, image_height: u32) -> f64 {
    let image_area = image_width as f64 * image_height as f64;
    let box_area = bbox.area() as f64;
    if box_area <= 0.0 {
        return f64::INFINITY;
    }
    round2(image_area / box_area)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Full post-processing: decode, filter, suppress, label and score
///
/// Survivors are reported in their original candidate order.
pub fn postprocess(
    outputs: &[Array2<f32>],
    image_width: u32,
    image_height: u32,
    labels: &LabelTable,
    config: &DetectionConfig,
) -> Vec<Detection> {
    let candidates = decode_candidates(
        outputs,
        image_width,
        image_height,
        config.confidence_threshold,
    );
    let kept = non_max_suppression(&candidates, config.score_threshold, config.iou_threshold);

    candidates
        .iter()
        .zip(kept)
        .filter(|(_, keep)| *keep)
        .map(|(candidate, _)| Detection {
            label: labels.name_or_unknown(candidate.class_id).to_string(),
            confidence: candidate.confidence,
            position: candidate.bbox.to_array(),
            distance: estimate_distance(&candidate.bbox, image_width, image_height),
        })
        .collect()
}
