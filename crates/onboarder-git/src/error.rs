// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for onboarder-git

use thiserror::Error;

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    /// Error from git2 library
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// Repository not found at the specified path
    #[error("Repository not found: {path}")]
    RepositoryNotFound {
        /// The path that was searched for a repository
        path: String,
    },

    /// Cloning a remote repository failed
    #[error("Failed to clone {url}: {source}")]
    Clone {
        /// The remote URL being cloned
        url: String,
        /// Underlying git2 failure
        #[source]
        source: git2::Error,
    },

    /// The requested branch exists neither locally nor on `origin`
    #[error("Branch not found: {branch}")]
    BranchNotFound {
        /// The branch name that could not be resolved
        branch: String,
    },

    /// Invalid commit reference (branch, tag, or SHA)
    #[error("Invalid commit reference: {reference}")]
    InvalidReference {
        /// The reference string that could not be resolved
        reference: String,
    },

    /// Filesystem failure while preparing a working directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
