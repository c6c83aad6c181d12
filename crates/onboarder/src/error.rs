// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Run errors
//!
//! Every fatal condition of a run surfaces as one [`RunError`]. A failing
//! generation stage carries the documents finished before it so they can
//! still be written out.

use crate::pipeline::DocumentResult;
use crate::template::TemplateError;
use onboarder_ai::{AiError, AiErrorKind};
use onboarder_git::GitError;
use std::fmt;
use thiserror::Error;

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum RunError {
    /// Clone, fetch or checkout failed
    #[error("Repository access failed: {0}")]
    RepoAccess(#[source] GitError),

    /// History walk, diff or file listing failed
    #[error("Repository analysis failed: {0}")]
    Analysis(#[source] GitError),

    /// A generation stage failed
    #[error("Generation of '{stage}' failed: {source}")]
    Generation {
        /// Document type of the failing stage
        stage: String,
        /// Classified failure
        #[source]
        source: AiError,
        /// Documents finished before the failure
        completed: DocumentResult,
    },

    /// A template was missing or unreadable
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking task panicked or was aborted
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The run was cancelled before generation started
    #[error("Run cancelled")]
    Cancelled,
}

/// Flat classification of a [`RunError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Repository could not be reached or checked out
    RepoAccess,
    /// Repository could not be analysed
    Analysis,
    /// Generator quota exhausted
    RateLimit,
    /// Generator rejected the credentials
    Auth,
    /// Generation failed after retries
    GenerationFailed,
    /// Response held no usable document
    ParseFailure,
    /// Run was cancelled
    Cancelled,
    /// Template problem
    Template,
    /// Local I/O problem
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RepoAccess => "repo_access",
            Self::Analysis => "analysis",
            Self::RateLimit => "rate_limit",
            Self::Auth => "auth",
            Self::GenerationFailed => "generation_failed",
            Self::ParseFailure => "parse_failure",
            Self::Cancelled => "cancelled",
            Self::Template => "template",
            Self::Io => "io",
        };
        f.write_str(label)
    }
}

impl RunError {
    /// Flat kind of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RepoAccess(_) => ErrorKind::RepoAccess,
            Self::Analysis(_) => ErrorKind::Analysis,
            Self::Generation { source, .. } => match source.kind {
                AiErrorKind::RateLimit => ErrorKind::RateLimit,
                AiErrorKind::Auth => ErrorKind::Auth,
                AiErrorKind::ParseFailure => ErrorKind::ParseFailure,
                AiErrorKind::Cancelled => ErrorKind::Cancelled,
                AiErrorKind::Transient | AiErrorKind::GenerationFailed => {
                    ErrorKind::GenerationFailed
                }
            },
            Self::Template(_) => ErrorKind::Template,
            Self::Io(_) | Self::Task(_) => ErrorKind::Io,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Documents finished before a stage failure
    #[must_use]
    pub fn completed(&self) -> Option<&DocumentResult> {
        match self {
            Self::Generation { completed, .. } => Some(completed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_generation_kind_follows_ai_kind() {
        let cases = [
            (AiErrorKind::RateLimit, ErrorKind::RateLimit),
            (AiErrorKind::Auth, ErrorKind::Auth),
            (AiErrorKind::ParseFailure, ErrorKind::ParseFailure),
            (AiErrorKind::Cancelled, ErrorKind::Cancelled),
            (AiErrorKind::GenerationFailed, ErrorKind::GenerationFailed),
            (AiErrorKind::Transient, ErrorKind::GenerationFailed),
        ];
        for (ai_kind, expected) in cases {
            let err = RunError::Generation {
                stage: "README.md".to_string(),
                source: AiError::new(ai_kind, "boom"),
                completed: DocumentResult::default(),
            };
            assert_eq!(err.kind(), expected, "{ai_kind}");
        }
    }

    #[test]
    fn test_completed_documents_exposed() {
        let mut completed = DocumentResult::default();
        completed.insert("AI Context", "ctx");
        let err = RunError::Generation {
            stage: "README.md".to_string(),
            source: AiError::new(AiErrorKind::RateLimit, "429"),
            completed,
        };
        assert_eq!(err.completed().map(DocumentResult::len), Some(1));
        assert!(err.to_string().contains("README.md"));
        assert!(RunError::Cancelled.completed().is_none());
    }

    #[test]
    fn test_repo_access_kind() {
        let err = RunError::RepoAccess(GitError::BranchNotFound {
            branch: "nope".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::RepoAccess);
        assert_eq!(err.kind().to_string(), "repo_access");
    }
}
