// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Generation backend seam
//!
//! A [`Generator`] turns a prompt into response text. Everything above it
//! (retry, classification, extraction) lives in this crate.

use crate::error::GenerateError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Per-call generation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens
    pub max_output_tokens: Option<u32>,
    /// Handle of a previously cached repository context
    pub cached_content: Option<String>,
}

impl GenerationOptions {
    /// Options for `model` with no cache reference
    #[must_use]
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Default::default()
        }
    }

    /// Reference a cached context by handle
    #[must_use]
    pub fn with_cached_content(mut self, handle: impl Into<String>) -> Self {
        self.cached_content = Some(handle.into());
        self
    }
}

/// A black-box text generation capability
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a response for `prompt`
    ///
    /// # Errors
    ///
    /// Returns `GenerateError` for any backend failure; callers classify it.
    async fn generate(
        &self,
        prompt: &str,
        options: Option<&GenerationOptions>,
    ) -> Result<String, GenerateError>;
}
