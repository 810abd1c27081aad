// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the YOLOv3 detector

use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;

/// Square input size expected by the detector network
pub const DETECTOR_INPUT_SIZE: u32 = 416;

/// Build the detector input blob
///
/// Steps:
/// 1. Stretch-resize to `input_size` x `input_size` (no letterboxing, no crop)
/// 2. Convert to RGB
/// 3. Scale pixel values by 1/255 into [0, 1]
/// 4. Lay out as NCHW tensor [1, 3, H, W]
pub fn preprocess_for_detector(image: &DynamicImage, input_size: u32) -> Array4<f32> {
    let resized = image.resize_exact(input_size, input_size, FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let size = input_size as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    tensor
}
