// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection response types

use serde::{Deserialize, Serialize};

use crate::vision::Detection;

/// Response from object detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectObjectsResponse {
    /// Surviving detections in network output order
    pub objects: Vec<Detection>,
}

impl DetectObjectsResponse {
    pub fn new(objects: Vec<Detection>) -> Self {
        Self { objects }
    }
}
