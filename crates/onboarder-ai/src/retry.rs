// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Resilient generation client
//!
//! Wraps a [`Generator`] with failure classification and capped exponential
//! backoff. Rate-limit and auth failures are raised on the first occurrence.
//! Both the call and the backoff sleep race a cancellation token; a
//! cancelled call is never retried.

use crate::error::{AiError, AiErrorKind, GenerateError, classify};
use crate::generator::{GenerationOptions, Generator};
use crate::tokens::estimate_tokens;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first call
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,
    /// Growth factor applied per attempt
    pub multiplier: f64,
    /// Upper bound on any single delay, in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            multiplier: 2.0,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryConfig {
    /// Delay slept after the failed attempt with zero-based index `attempt`
    ///
    /// `min(initial * multiplier^attempt, max)`
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = self.initial_delay_ms as f64 * self.multiplier.powi(exponent);
        let capped = raw.min(self.max_delay_ms as f64);
        if capped.is_nan() || capped < 0.0 {
            return Duration::from_millis(self.max_delay_ms);
        }
        Duration::from_millis(capped as u64)
    }
}

/// Generation client with classification, backoff and cancellation
#[derive(Clone)]
pub struct ResilientClient {
    generator: Arc<dyn Generator>,
    config: RetryConfig,
}

impl ResilientClient {
    /// Wrap `generator` with `config`
    pub fn new(generator: Arc<dyn Generator>, config: RetryConfig) -> Self {
        Self { generator, config }
    }

    /// Active retry configuration
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Call the generator until it succeeds, fails terminally or is cancelled
    ///
    /// # Errors
    ///
    /// - `RateLimit` / `Auth` on the first such failure
    /// - `GenerationFailed` once transient failures exhaust `max_attempts`
    /// - `Cancelled` if `cancel` fires during a call or a backoff sleep
    pub async fn call(
        &self,
        prompt: &str,
        options: Option<&GenerationOptions>,
        cancel: &CancellationToken,
    ) -> Result<String, AiError> {
        let max_attempts = self.config.max_attempts.max(1);
        info!(
            chars = prompt.len(),
            estimated_tokens = estimate_tokens(prompt),
            cached = options.is_some_and(|o| o.cached_content.is_some()),
            "Sending generation request"
        );

        let mut last_error: Option<GenerateError> = None;

        for attempt in 0..max_attempts {
            if cancel.is_cancelled() {
                return Err(AiError::cancelled("generation cancelled before attempt"));
            }
            debug!(attempt = attempt + 1, max_attempts, "Calling generator");

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(AiError::cancelled("generation call cancelled"));
                }
                result = self.generator.generate(prompt, options) => result,
            };

            let err = match outcome {
                Ok(text) => return Ok(text),
                Err(err) => err,
            };

            let kind = classify(&err);
            if !kind.is_retryable() {
                warn!(error = %err, %kind, "Generation failed, not retrying");
                return Err(AiError::new(kind, err.message.clone()).with_source(err));
            }
            warn!(error = %err, attempt = attempt + 1, max_attempts, "Generation attempt failed");

            if attempt + 1 < max_attempts {
                let delay = self.config.delay_for_attempt(attempt);
                info!(delay_ms = delay.as_millis() as u64, "Backing off before retry");
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        return Err(AiError::cancelled("interrupted during retry backoff")
                            .with_source(err));
                    }
                    () = tokio::time::sleep(delay) => {}
                }
            }
            last_error = Some(err);
        }

        error!(max_attempts, "Generation retries exhausted");
        let failure = AiError::new(
            AiErrorKind::GenerationFailed,
            format!("Failed to call API after {max_attempts} attempts"),
        );
        Err(match last_error {
            Some(err) => failure.with_source(err),
            None => failure,
        })
    }
}
