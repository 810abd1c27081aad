// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class label table for the object detector (e.g. `coco.names`)

use anyhow::{Context, Result};
use std::path::Path;

/// Label used when the network reports a class id the table does not cover
pub const UNKNOWN_LABEL: &str = "unknown";

/// Ordered list of class names, indexed by class id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    names: Vec<String>,
}

impl LabelTable {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Load a newline-separated label file; each line is trimmed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Label file not found: {}", path.display());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read label file {}", path.display()))?;

        let table = Self::parse(&contents);
        if table.is_empty() {
            anyhow::bail!("Label file {} contains no labels", path.display());
        }

        Ok(table)
    }

    /// Parse label file contents, one class name per line
    pub fn parse(contents: &str) -> Self {
        let mut names: Vec<String> = contents.lines().map(|line| line.trim().to_string()).collect();
        // A trailing newline must not add a phantom class
        while names.last().is_some_and(|name| name.is_empty()) {
            names.pop();
        }
        Self { names }
    }

    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    /// Name for a class id, falling back to [`UNKNOWN_LABEL`]
    pub fn name_or_unknown(&self, class_id: usize) -> &str {
        self.get(class_id).unwrap_or(UNKNOWN_LABEL)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
