// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Repository handle and snapshot queries
//!
//! [`GitRepo`] wraps a `git2::Repository` and exposes the read-oriented
//! operations the analysis needs: HEAD metadata, remotes, branch and tag
//! listings, and the file listing at HEAD.

use crate::error::GitError;
use chrono::{DateTime, TimeZone, Utc};
use git2::{BranchType, ObjectType, Repository, TreeWalkMode, TreeWalkResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Check whether a path looks like a test file or lives in a test directory
#[must_use]
pub fn is_test_path(path: &str) -> bool {
    path.to_ascii_lowercase().contains("test")
}

/// Convert a git timestamp to UTC
pub(crate) fn to_utc(time: git2::Time) -> DateTime<Utc> {
    Utc.timestamp_opt(time.seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// The commit HEAD points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadInfo {
    /// Full commit id
    pub commit: String,
    /// First line of the commit message
    pub message: String,
    /// Commit time
    pub time: DateTime<Utc>,
}

/// A configured remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInfo {
    /// Remote name, e.g. `origin`
    pub name: String,
    /// Fetch URL if one is configured
    pub url: Option<String>,
}

/// A git repository wrapper for commit analysis
pub struct GitRepo {
    pub(crate) repo: Repository,
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if the path is not a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Get the working directory path (None for bare repos)
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Short name of the checked-out branch, if HEAD is on a branch
    #[must_use]
    pub fn current_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        if !head.is_branch() {
            return None;
        }
        head.shorthand().map(str::to_string)
    }

    /// Get the HEAD commit SHA
    ///
    /// # Errors
    ///
    /// Returns `GitError` if HEAD cannot be resolved.
    pub fn head_sha(&self) -> Result<String, GitError> {
        let head = self.repo.head()?;
        let oid = head.target().ok_or_else(|| GitError::InvalidReference {
            reference: "HEAD".to_string(),
        })?;
        Ok(oid.to_string())
    }

    /// Commit id, subject and time of HEAD
    ///
    /// # Errors
    ///
    /// Returns `GitError` if HEAD is unborn or does not point at a commit.
    pub fn head_info(&self) -> Result<HeadInfo, GitError> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(HeadInfo {
            commit: commit.id().to_string(),
            message: commit.summary().unwrap_or("").to_string(),
            time: to_utc(commit.committer().when()),
        })
    }

    /// All configured remotes with their URLs
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the repository config cannot be read.
    pub fn remotes(&self) -> Result<Vec<RemoteInfo>, GitError> {
        let names = self.repo.remotes()?;
        let mut remotes = Vec::with_capacity(names.len());
        for name in names.iter().flatten() {
            let remote = self.repo.find_remote(name)?;
            remotes.push(RemoteInfo {
                name: name.to_string(),
                url: remote.url().map(str::to_string),
            });
        }
        Ok(remotes)
    }

    /// Full reference names of every local and remote-tracking branch, sorted
    ///
    /// # Errors
    ///
    /// Returns `GitError` if references cannot be listed.
    pub fn branch_refs(&self) -> Result<Vec<String>, GitError> {
        let mut names = Vec::new();
        for entry in self.repo.branches(None)? {
            let (branch, kind) = entry?;
            if let Some(name) = branch.get().name() {
                // Symbolic origin/HEAD is not a branch of its own
                if kind == BranchType::Remote && name.ends_with("/HEAD") {
                    continue;
                }
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Full reference names of every tag, sorted
    ///
    /// # Errors
    ///
    /// Returns `GitError` if tags cannot be listed.
    pub fn tag_refs(&self) -> Result<Vec<String>, GitError> {
        let mut names: Vec<String> = self
            .repo
            .tag_names(None)?
            .iter()
            .flatten()
            .map(|name| format!("refs/tags/{name}"))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Every file path in the HEAD tree, sorted
    ///
    /// Test files are dropped unless `include_tests` is set.
    ///
    /// # Errors
    ///
    /// Returns `GitError` if HEAD cannot be resolved to a tree.
    pub fn files_at_head(&self, include_tests: bool) -> Result<Vec<String>, GitError> {
        let tree = self.repo.head()?.peel_to_tree()?;
        let mut files = Vec::new();

        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(ObjectType::Blob)
                && let Some(name) = entry.name()
            {
                let path = format!("{root}{name}");
                if include_tests || !is_test_path(&path) {
                    files.push(path);
                }
            }
            TreeWalkResult::Ok
        })?;

        files.sort();
        Ok(files)
    }
}
