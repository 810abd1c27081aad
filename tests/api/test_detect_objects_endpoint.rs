// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /detect_objects over a stub detector

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;
use tower::util::ServiceExt;

use super::support::{
    body_json, image_request, multipart_request, solid_png, test_app, Part, StubRecognizer,
};

const URI: &str = "/detect_objects";

/// (cx, cy, w, h, objectness, person, dog)
fn dog_in_the_middle() -> Vec<Vec<f32>> {
    vec![vec![0.5, 0.5, 0.5, 0.5, 0.9, 0.1, 0.95]]
}

#[tokio::test]
async fn test_detects_objects() {
    let app = test_app(dog_in_the_middle(), StubRecognizer::replying(""));
    let response = app
        .router
        .oneshot(image_request(URI, "photo.png", &solid_png(200, 100, 128)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let objects = body["objects"].as_array().unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0]["label"], "dog");
    assert_eq!(objects[0]["position"], json!([50, 25, 100, 50]));
    assert_eq!(objects[0]["distance"], 4.0);
    assert!((objects[0]["confidence"].as_f64().unwrap() - 0.95).abs() < 1e-6);
}

#[tokio::test]
async fn test_no_candidates_gives_empty_list() {
    // Best class score exactly at the threshold is not enough
    let rows = vec![vec![0.5, 0.5, 0.2, 0.2, 0.9, 0.5, 0.1]];
    let app = test_app(rows, StubRecognizer::replying(""));
    let response = app
        .router
        .oneshot(image_request(URI, "empty.png", &solid_png(64, 64, 0)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"objects": []}));
}

#[tokio::test]
async fn test_overlapping_boxes_collapse() {
    let rows = vec![
        vec![0.50, 0.50, 0.40, 0.40, 0.9, 0.8, 0.0],
        vec![0.51, 0.51, 0.40, 0.40, 0.9, 0.9, 0.0],
    ];
    let app = test_app(rows, StubRecognizer::replying(""));
    let response = app
        .router
        .oneshot(image_request(URI, "crowd.png", &solid_png(100, 100, 90)))
        .await
        .unwrap();

    let body = body_json(response).await;
    let objects = body["objects"].as_array().unwrap();
    assert_eq!(objects.len(), 1);
    assert!((objects[0]["confidence"].as_f64().unwrap() - 0.9).abs() < 1e-6);
}

#[tokio::test]
async fn test_missing_image_field() {
    let app = test_app(dog_in_the_middle(), StubRecognizer::replying(""));
    let request = multipart_request(
        URI,
        &[Part {
            name: "file",
            filename: Some("photo.png"),
            data: &solid_png(8, 8, 0),
        }],
    );
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "No image provided"}));
}

#[tokio::test]
async fn test_image_field_without_filename_is_not_a_file() {
    let app = test_app(dog_in_the_middle(), StubRecognizer::replying(""));
    let request = multipart_request(
        URI,
        &[Part {
            name: "image",
            filename: None,
            data: b"just text",
        }],
    );
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "No image provided"}));
}

#[tokio::test]
async fn test_empty_filename() {
    let app = test_app(dog_in_the_middle(), StubRecognizer::replying(""));
    let response = app
        .router
        .oneshot(image_request(URI, "", &solid_png(8, 8, 0)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "No selected file"}));
}

#[tokio::test]
async fn test_non_multipart_body() {
    let app = test_app(dog_in_the_middle(), StubRecognizer::replying(""));
    let request = Request::builder()
        .method(Method::POST)
        .uri(URI)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"image": "aGVsbG8="}"#))
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "No image provided"}));
}

#[tokio::test]
async fn test_undecodable_image() {
    let app = test_app(dog_in_the_middle(), StubRecognizer::replying(""));
    let response = app
        .router
        .oneshot(image_request(URI, "notes.txt", b"definitely not pixels"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid image:"));
}

#[tokio::test]
async fn test_upload_is_saved_under_sanitized_name() {
    let app = test_app(vec![], StubRecognizer::replying(""));
    let png = solid_png(16, 16, 200);
    let response = app
        .router
        .oneshot(image_request(URI, "../my photo.png", &png))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let saved = app.upload_dir.path().join("my_photo.png");
    assert_eq!(std::fs::read(saved).unwrap(), png);
}

#[tokio::test]
async fn test_first_image_part_wins() {
    let app = test_app(vec![], StubRecognizer::replying(""));
    let first = solid_png(4, 4, 10);
    let second = solid_png(4, 4, 250);
    let request = multipart_request(
        URI,
        &[
            Part {
                name: "image",
                filename: Some("first.png"),
                data: &first,
            },
            Part {
                name: "image",
                filename: Some("second.png"),
                data: &second,
            },
        ],
    );
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.upload_dir.path().join("first.png").exists());
    assert!(!app.upload_dir.path().join("second.png").exists());
}
