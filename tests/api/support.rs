// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared fixtures: stub models, multipart bodies and response helpers
#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use image::{DynamicImage, GrayImage, ImageFormat, Rgb, RgbImage};
use lifelens_backend::{
    api::http_server::{create_app, AppState},
    storage::UploadStore,
    vision::{
        detection::{DetectionConfig, ObjectDetector},
        labels::LabelTable,
        ocr::TextRecognizer,
        VisionModels,
    },
};
use ndarray::{Array2, Array4};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub const BOUNDARY: &str = "lifelens-test-boundary";

/// Detector returning canned output rows
pub struct StubDetector {
    pub rows: Vec<Vec<f32>>,
}

impl ObjectDetector for StubDetector {
    fn forward(&self, _input: &Array4<f32>) -> Result<Vec<Array2<f32>>> {
        let width = self.rows.first().map_or(85, Vec::len);
        let flat: Vec<f32> = self.rows.iter().flatten().copied().collect();
        Ok(vec![Array2::from_shape_vec((self.rows.len(), width), flat)?])
    }
}

/// Recognizer returning canned text and counting calls
pub struct StubRecognizer {
    pub reply: std::result::Result<String, String>,
    pub calls: AtomicUsize,
}

impl StubRecognizer {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextRecognizer for StubRecognizer {
    fn recognize(&self, _binarized: &GrayImage) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(anyhow::Error::msg)
    }
}

/// Router over stub models, with uploads going to a fresh temp directory
pub struct TestApp {
    pub router: Router,
    pub recognizer: Arc<StubRecognizer>,
    pub upload_dir: TempDir,
}

pub fn test_app(detector_rows: Vec<Vec<f32>>, recognizer: StubRecognizer) -> TestApp {
    let upload_dir = TempDir::new().unwrap();
    let recognizer = Arc::new(recognizer);

    let models = VisionModels::from_parts(
        Arc::new(StubDetector {
            rows: detector_rows,
        }),
        LabelTable::parse("person\ndog\n"),
        recognizer.clone(),
        DetectionConfig::default(),
    );
    let state = AppState::new(models, UploadStore::new(upload_dir.path()));

    TestApp {
        router: create_app(state, None),
        recognizer,
        upload_dir,
    }
}

/// One multipart part: field name, optional filename, content
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub data: &'a [u8],
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let disposition = match part.filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                part.name, filename
            ),
            None => format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                part.name
            ),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Request with a single `image` file part
pub fn image_request(uri: &str, filename: &str, data: &[u8]) -> Request<Body> {
    multipart_request(
        uri,
        &[Part {
            name: "image",
            filename: Some(filename),
            data,
        }],
    )
}

pub fn png_bytes(image: RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn solid_png(width: u32, height: u32, value: u8) -> Vec<u8> {
    png_bytes(RgbImage::from_pixel(width, height, Rgb([value, value, value])))
}

/// Light page with a dark band in the middle
pub fn page_png() -> Vec<u8> {
    png_bytes(RgbImage::from_fn(60, 30, |x, _| {
        if (20..40).contains(&x) {
            Rgb([15, 15, 15])
        } else {
            Rgb([235, 235, 235])
        }
    }))
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
