// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::detect_objects::detect_objects_handler;
use super::read_text::read_text_handler;
use crate::storage::UploadStore;
use crate::vision::VisionModels;

/// Text returned by `GET /`
pub const INDEX_MESSAGE: &str = "LifeLens Backend Server";

/// Shared handler state
#[derive(Clone, Debug)]
pub struct AppState {
    pub models: VisionModels,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(models: VisionModels, uploads: UploadStore) -> Self {
        Self { models, uploads }
    }
}

/// Body of `GET /test`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

/// Build the router
///
/// `max_upload_bytes` caps request bodies; `None` leaves them unlimited.
pub fn create_app(state: AppState, max_upload_bytes: Option<usize>) -> Router {
    let body_limit = match max_upload_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/test", get(test_handler))
        .route("/detect_objects", post(detect_objects_handler))
        .route("/read_text", post(read_text_handler))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn start_server(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;

    info!("🌐 HTTP server listening on http://{}", addr);
    info!("  GET  /               - Liveness");
    info!("  GET  /test           - Backend check");
    info!("  POST /detect_objects - Object detection (multipart `image`)");
    info!("  POST /read_text      - Text extraction (multipart `image`)");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("⏹️  Shutting down...");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}

async fn index_handler() -> &'static str {
    INDEX_MESSAGE
}

async fn test_handler() -> impl IntoResponse {
    Json(StatusResponse {
        status: "success".to_string(),
        message: "Backend is working".to_string(),
    })
}
