// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /read_text over a stub recognizer

use axum::http::StatusCode;
use serde_json::json;
use tower::util::ServiceExt;

use super::support::{
    body_json, image_request, multipart_request, page_png, solid_png, test_app, Part,
    StubRecognizer,
};

const URI: &str = "/read_text";

#[tokio::test]
async fn test_blank_image_reads_nothing() {
    let app = test_app(vec![], StubRecognizer::replying("should not be used"));
    let response = app
        .router
        .clone()
        .oneshot(image_request(URI, "blank.png", &solid_png(120, 80, 255)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"text": ""}));
    assert_eq!(app.recognizer.call_count(), 0);
}

#[tokio::test]
async fn test_text_is_trimmed() {
    let app = test_app(vec![], StubRecognizer::replying("\n  EXIT\nthis way \n"));
    let response = app
        .router
        .clone()
        .oneshot(image_request(URI, "sign.png", &page_png()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"text": "EXIT\nthis way"}));
    assert_eq!(app.recognizer.call_count(), 1);
}

#[tokio::test]
async fn test_missing_image_field() {
    let app = test_app(vec![], StubRecognizer::replying("text"));
    let request = multipart_request(
        URI,
        &[Part {
            name: "document",
            filename: Some("sign.png"),
            data: &page_png(),
        }],
    );
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "No image provided"}));
}

#[tokio::test]
async fn test_empty_filename() {
    let app = test_app(vec![], StubRecognizer::replying("text"));
    let response = app
        .router
        .oneshot(image_request(URI, "", &page_png()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "No selected file"}));
}

#[tokio::test]
async fn test_undecodable_image() {
    let app = test_app(vec![], StubRecognizer::replying("text"));
    let response = app
        .router
        .clone()
        .oneshot(image_request(URI, "sign.png", &[0x89, 0x50, 0x4E, 0x47, 0, 0]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid image:"));
    assert_eq!(app.recognizer.call_count(), 0);
}

#[tokio::test]
async fn test_ocr_failure_is_server_error() {
    let app = test_app(vec![], StubRecognizer::failing("engine offline"));
    let response = app
        .router
        .oneshot(image_request(URI, "sign.png", &page_png()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Inference failed: engine offline"})
    );
}
