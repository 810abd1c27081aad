// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Route registration and the fixed GET endpoints

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use lifelens_backend::api::INDEX_MESSAGE;
use tower::util::ServiceExt;

use super::support::{body_bytes, body_json, test_app, StubRecognizer};

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_index_returns_liveness_text() {
    let app = test_app(vec![], StubRecognizer::replying(""));
    let response = app.router.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body_bytes(response).await, INDEX_MESSAGE.as_bytes());
}

#[tokio::test]
async fn test_test_endpoint_json() {
    let app = test_app(vec![], StubRecognizer::replying(""));
    let response = app.router.oneshot(get("/test")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"status": "success", "message": "Backend is working"})
    );
}

#[tokio::test]
async fn test_vision_routes_reject_get() {
    for uri in ["/detect_objects", "/read_text"] {
        let app = test_app(vec![], StubRecognizer::replying(""));
        let response = app.router.oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", uri);
    }
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app(vec![], StubRecognizer::replying(""));
    let response = app.router.oneshot(get("/v1/ocr")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = test_app(vec![], StubRecognizer::replying(""));
    let request = Request::builder()
        .method(Method::GET)
        .uri("/test")
        .header("origin", "http://example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
