// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for onboarder-ai
//!
//! Generation failures are a single [`AiError`] tagged with an
//! [`AiErrorKind`]. Retry and propagation decisions switch on the kind.

use std::fmt;
use thiserror::Error;

/// Failure reported by a generation backend
///
/// Backends report failures as plain messages, optionally with an HTTP-like
/// status code. Classification happens in [`classify`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GenerateError {
    /// Human-readable failure message
    pub message: String,
    /// Status code, when the backend exposes one
    pub status: Option<u16>,
}

impl GenerateError {
    /// Failure carrying only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Failure carrying a status code
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }
}

/// Category of a generation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiErrorKind {
    /// Quota or rate limit hit; never retried
    RateLimit,
    /// Credentials rejected; never retried
    Auth,
    /// Any other backend failure; retried with backoff
    Transient,
    /// Retries exhausted on transient failures
    GenerationFailed,
    /// The call succeeded but produced no usable content
    ParseFailure,
    /// The caller cancelled the call or its backoff
    Cancelled,
}

impl AiErrorKind {
    /// Whether a failure of this kind may be retried
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient)
    }
}

impl fmt::Display for AiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RateLimit => "rate limit",
            Self::Auth => "authentication",
            Self::Transient => "transient",
            Self::GenerationFailed => "generation failed",
            Self::ParseFailure => "response parse",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Tagged error for every AI-facing failure
#[derive(Debug, Error)]
#[error("{kind} error: {message}")]
pub struct AiError {
    /// Failure category
    pub kind: AiErrorKind,
    /// Description of what failed
    pub message: String,
    /// Underlying cause, if any
    #[source]
    pub source: Option<GenerateError>,
}

impl AiError {
    /// Create an error without an underlying cause
    pub fn new(kind: AiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the backend failure that caused this error
    #[must_use]
    pub fn with_source(mut self, source: GenerateError) -> Self {
        self.source = Some(source);
        self
    }

    /// Shorthand for a cancellation error
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(AiErrorKind::Cancelled, message)
    }

    /// Shorthand for a response that could not be reduced to content
    pub fn parse_failure(message: impl Into<String>) -> Self {
        Self::new(AiErrorKind::ParseFailure, message)
    }
}

const RATE_LIMIT_MARKERS: [&str; 3] = ["429", "rate limit", "quota exceeded"];
const AUTH_MARKERS: [&str; 4] = ["401", "unauthorized", "invalid api key", "authentication"];

/// Classify a backend failure
///
/// Status codes win over message text. Message matching is
/// case-insensitive and checks rate-limit markers before auth markers.
#[must_use]
pub fn classify(error: &GenerateError) -> AiErrorKind {
    match error.status {
        Some(429) => return AiErrorKind::RateLimit,
        Some(401) => return AiErrorKind::Auth,
        _ => {}
    }

    let message = error.message.to_lowercase();
    if RATE_LIMIT_MARKERS.iter().any(|m| message.contains(m)) {
        AiErrorKind::RateLimit
    } else if AUTH_MARKERS.iter().any(|m| message.contains(m)) {
        AiErrorKind::Auth
    } else {
        AiErrorKind::Transient
    }
}
