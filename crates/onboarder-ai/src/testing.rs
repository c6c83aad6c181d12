// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test doubles for the generation seam
//!
//! [`ScriptedGenerator`] replays queued outcomes and records every call so
//! tests can assert on attempt counts, prompts and options.

use crate::error::GenerateError;
use crate::generator::{GenerationOptions, Generator};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Record of one generation call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Prompt text sent
    pub prompt: String,
    /// Options sent, if any
    pub options: Option<GenerationOptions>,
}

/// Generator returning scripted responses in order
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, GenerateError>>>,
    fallback: Option<Result<String, GenerateError>>,
    calls: AtomicUsize,
    recorded: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGenerator {
    /// Generator with an empty script
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    #[must_use]
    pub fn respond(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()))
    }

    /// Queue a failure
    #[must_use]
    pub fn fail(self, error: GenerateError) -> Self {
        self.push(Err(error))
    }

    /// Answer every call past the script with `text`
    #[must_use]
    pub fn always_respond(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(Ok(text.into()));
        self
    }

    /// Fail every call past the script with `error`
    #[must_use]
    pub fn always_fail(mut self, error: GenerateError) -> Self {
        self.fallback = Some(Err(error));
        self
    }

    /// Number of `generate` calls so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every call made so far, in order
    #[must_use]
    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.recorded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn push(self, outcome: Result<String, GenerateError>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome);
        self
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        options: Option<&GenerationOptions>,
    ) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.recorded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                prompt: prompt.to_string(),
                options: options.cloned(),
            });

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match scripted.or_else(|| self.fallback.clone()) {
            Some(outcome) => outcome,
            None => Err(GenerateError::new("scripted generator has no response left")),
        }
    }
}
