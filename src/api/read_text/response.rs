// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction response types

use serde::{Deserialize, Serialize};

/// Response from text extraction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadTextResponse {
    /// Recognized text, lines joined with `\n`; empty when nothing was read
    pub text: String,
}
