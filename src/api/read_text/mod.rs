// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction API endpoint module
//!
//! Provides POST /read_text for reading the text in an uploaded image.

pub mod handler;
pub mod response;

pub use handler::read_text_handler;
pub use response::ReadTextResponse;
