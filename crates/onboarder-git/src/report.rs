// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Repository report aggregate
//!
//! A [`RepositoryReport`] is assembled once per run by a [`ReportBuilder`]
//! and is read-only afterwards. Hotspots are derived from the commit list at
//! build time.

use crate::analyzer::AnalysisLimits;
use crate::commit::CommitRecord;
use crate::error::GitError;
use crate::hotspots::Hotspots;
use crate::repo::{GitRepo, HeadInfo, RemoteInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Everything learned about a repository in one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryReport {
    /// Repository URL as given by the caller
    pub url: String,
    /// Checked-out branch, if HEAD is on one
    pub branch: Option<String>,
    /// Working directory of the clone
    pub workdir: PathBuf,
    /// HEAD commit, absent for an unborn HEAD
    pub head: Option<HeadInfo>,
    /// Configured remotes
    pub remotes: Vec<RemoteInfo>,
    /// Branch reference names, sorted
    pub branches: Vec<String>,
    /// Tag reference names, sorted
    pub tags: Vec<String>,
    /// File paths at HEAD, sorted
    pub files: Vec<String>,
    /// Analysed commits, newest first
    pub commits: Vec<CommitRecord>,
    /// Churn per path
    pub hotspots: Hotspots,
    /// When the analysis finished
    pub generated_at: DateTime<Utc>,
}

impl RepositoryReport {
    /// Run the full analysis against an opened repository
    ///
    /// # Errors
    ///
    /// Returns `GitError` if metadata, file listing or history walk fails.
    pub fn collect(
        repo: &GitRepo,
        url: &str,
        limits: &AnalysisLimits,
        include_tests: bool,
    ) -> Result<Self, GitError> {
        let report = ReportBuilder::new(url)
            .with_metadata(repo)?
            .with_files(repo.files_at_head(include_tests)?)
            .with_commits(repo.walk_commits(limits)?)
            .build(Utc::now());

        info!(
            url,
            files = report.files.len(),
            commits = report.commits.len(),
            hotspots = report.hotspots.len(),
            "Repository analysis complete"
        );
        Ok(report)
    }
}

/// Staged builder for [`RepositoryReport`], scoped to one run
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    url: String,
    branch: Option<String>,
    workdir: PathBuf,
    head: Option<HeadInfo>,
    remotes: Vec<RemoteInfo>,
    branches: Vec<String>,
    tags: Vec<String>,
    files: Vec<String>,
    commits: Vec<CommitRecord>,
}

impl ReportBuilder {
    /// Start a report for `url`
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Fill branch, workdir, HEAD, remotes, branches and tags from `repo`
    ///
    /// # Errors
    ///
    /// Returns `GitError` if remotes or references cannot be listed.
    pub fn with_metadata(mut self, repo: &GitRepo) -> Result<Self, GitError> {
        self.branch = repo.current_branch();
        self.workdir = repo.workdir().map(PathBuf::from).unwrap_or_default();
        self.head = repo.head_info().ok();
        self.remotes = repo.remotes()?;
        self.branches = repo.branch_refs()?;
        self.tags = repo.tag_refs()?;
        Ok(self)
    }

    /// Override the branch label
    #[must_use]
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    /// Set the file listing at HEAD
    #[must_use]
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    /// Set the analysed commits, newest first
    #[must_use]
    pub fn with_commits(mut self, commits: Vec<CommitRecord>) -> Self {
        self.commits = commits;
        self
    }

    /// Finish the report, aggregating hotspots from the commits
    #[must_use]
    pub fn build(self, generated_at: DateTime<Utc>) -> RepositoryReport {
        let hotspots = Hotspots::aggregate(&self.commits);
        RepositoryReport {
            url: self.url,
            branch: self.branch,
            workdir: self.workdir,
            head: self.head,
            remotes: self.remotes,
            branches: self.branches,
            tags: self.tags,
            files: self.files,
            commits: self.commits,
            hotspots,
            generated_at,
        }
    }
}
