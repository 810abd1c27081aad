// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload Storage Module
//!
//! Persists uploaded images to a local directory under a sanitized name.
//! Files are written before processing and never cleaned up; an upload with
//! the same sanitized name overwrites the previous one.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Reduce a client supplied filename to a safe single path component
///
/// Keeps the last `/` or `\` separated component and folds it to ASCII
/// through NFKD (accented letters keep their base letter). Whitespace runs
/// become `_`, everything outside `[A-Za-z0-9_.-]` is dropped and leading and
/// trailing `.`/`_` are stripped. Returns an empty string when nothing survives.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let ascii: String = base.nfkd().filter(char::is_ascii).collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Local directory holding uploaded images
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory (and parents) if absent
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        info!("📁 Upload directory ready: {}", self.dir.display());
        Ok(())
    }

    /// Path an upload with this client filename would be stored at
    pub fn path_for(&self, filename: &str) -> PathBuf {
        let mut name = sanitize_filename(filename);
        if name.is_empty() {
            name = format!("upload-{}", Uuid::new_v4());
        }
        self.dir.join(name)
    }

    /// Write the upload, overwriting any file with the same sanitized name
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.path_for(filename);
        tokio::fs::write(&path, bytes).await?;
        debug!("💾 Saved upload {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}
