// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Grayscale conversion and Otsu binarization ahead of text recognition

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;

/// Foreground/background values of a binarized image
pub const BLACK: u8 = 0;
pub const WHITE: u8 = 255;

/// Convert to single-channel grayscale
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Binarize with a global Otsu threshold: `255 if pixel > level else 0`
pub fn otsu_binarize(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    binarize(gray, level)
}

/// Binarize with a fixed level
pub fn binarize(gray: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let Luma([value]) = *gray.get_pixel(x, y);
        Luma([if value > level { WHITE } else { BLACK }])
    })
}

/// True when every pixel has the same value (nothing to separate)
pub fn is_uniform(image: &GrayImage) -> bool {
    let mut pixels = image.pixels();
    match pixels.next() {
        Some(first) => pixels.all(|p| p == first),
        None => true,
    }
}
