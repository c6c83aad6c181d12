// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Generator backed by an external command
//!
//! The prompt is written to the child's stdin and its stdout is the
//! response. A non-zero exit turns stderr into the error message so the
//! usual classification (429, unauthorized, ...) still applies.

use crate::error::GenerateError;
use crate::generator::{GenerationOptions, Generator};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Environment variable carrying the cache handle to the child
pub const CACHED_CONTENT_ENV: &str = "ONBOARDER_CACHED_CONTENT";

/// Environment variable carrying the model name to the child
pub const MODEL_ENV: &str = "ONBOARDER_MODEL";

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Runs a program per generation call
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandGenerator {
    /// Generator running `program` with `args`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Split a whitespace-separated command line into program and arguments
    ///
    /// Returns `None` for a blank command line.
    #[must_use]
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    /// Override the per-call timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Generator for CommandGenerator {
    async fn generate(
        &self,
        prompt: &str,
        options: Option<&GenerationOptions>,
    ) -> Result<String, GenerateError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(options) = options {
            if let Some(handle) = &options.cached_content {
                command.env(CACHED_CONTENT_ENV, handle);
            }
            if let Some(model) = &options.model {
                command.env(MODEL_ENV, model);
            }
        }

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GenerateError::new(format!("generator command not found: {}", self.program))
            } else {
                GenerateError::new(format!("failed to start {}: {e}", self.program))
            }
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| GenerateError::new("generator stdin unavailable"))?;
        let write = async move {
            stdin.write_all(prompt.as_bytes()).await?;
            stdin.shutdown().await
        };

        let run = async { tokio::join!(write, child.wait_with_output()) };
        let (written, output) = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| {
                GenerateError::new(format!(
                    "generator timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?;

        let output =
            output.map_err(|e| GenerateError::new(format!("generator failed to run: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("generator exited with {}", output.status)
            } else {
                stderr
            };
            return Err(GenerateError::new(message));
        }

        // A child that exits without reading all of stdin is fine if it succeeded
        if let Err(e) = written {
            debug!(error = %e, "Generator closed stdin early");
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
