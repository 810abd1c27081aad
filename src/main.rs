// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use lifelens_backend::{
    api::{create_app, start_server, AppState},
    cli::Cli,
    storage::UploadStore,
    version,
    vision::VisionModels,
};
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    info!("🚀 Starting {}", version::get_version_string());
    info!("Features: {}", version::FEATURES.join(", "));

    let uploads = UploadStore::new(&cli.upload_dir);
    uploads.ensure_dir().await.with_context(|| {
        format!(
            "Failed to create upload directory {}",
            cli.upload_dir.display()
        )
    })?;

    let vision_config = cli.vision_config();
    let models = tokio::task::spawn_blocking(move || VisionModels::load(&vision_config))
        .await
        .context("Model loading task failed")??;
    info!("✅ Vision models ready ({} classes)", models.label_count());

    let app = create_app(AppState::new(models, uploads), cli.max_upload_bytes);
    start_server(cli.bind, app).await?;

    info!("👋 Goodbye!");
    Ok(())
}
