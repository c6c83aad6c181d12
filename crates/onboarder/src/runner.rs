// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Run orchestration
//!
//! A run clones the repository into a fresh working directory, analyses it,
//! builds the context payload, writes the analysis artifacts and, for a full
//! run, drives the document pipeline and saves the documents. The checkout
//! is removed afterwards unless configured otherwise.

use crate::context::{ContextSections, RepositoryContextBuilder};
use crate::error::RunError;
use crate::output::{DebugSink, write_documents, write_git_report};
use crate::pipeline::{DocumentPipeline, DocumentResult, PipelineInput};
use crate::template::TemplateSet;
use onboarder_ai::RepositoryIdentity;
use onboarder_git::{AnalysisLimits, Credentials, GitRepo, RepositoryReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

// ============================================================================
// Request and Settings
// ============================================================================

/// Entry contract of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Repository to clone
    pub repo_url: String,
    /// Branch to check out; the remote default when `None`
    pub branch: Option<String>,
    /// Keep test files in the file listing and source corpus
    pub include_tests: bool,
    /// Language every document should be written in
    pub target_language: Option<String>,
}

impl RunRequest {
    /// Request for `repo_url` on its default branch
    #[must_use]
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            branch: None,
            include_tests: false,
            target_language: None,
        }
    }

    /// Check out `branch`
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Include or exclude test files
    #[must_use]
    pub fn with_tests(mut self, include_tests: bool) -> Self {
        self.include_tests = include_tests;
        self
    }

    /// Request documents in `language`
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = Some(language.into());
        self
    }
}

/// Where and how a run works
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Parent of the per-run checkout directories
    pub workdir: PathBuf,
    /// Documents and analysis artifacts land here
    pub output_dir: PathBuf,
    /// Side channel for payload sections
    pub debug: DebugSink,
    /// History walk limits
    pub limits: AnalysisLimits,
    /// Credentials for clone and fetch
    pub credentials: Option<Credentials>,
    /// Leave the checkout on disk after the run
    pub keep_workdir: bool,
}

impl RunSettings {
    /// Settings with default limits and no credentials
    #[must_use]
    pub fn new(workdir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            output_dir: output_dir.into(),
            debug: DebugSink::disabled(),
            limits: AnalysisLimits::default(),
            credentials: None,
            keep_workdir: false,
        }
    }
}

/// Result of the analysis half of a run
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Immutable repository report
    pub report: RepositoryReport,
    /// Rendered payload sections
    pub sections: ContextSections,
    /// Full repository context payload
    pub payload: String,
    /// Cache identity of the repository
    pub identity: RepositoryIdentity,
    /// Checkout the analysis ran against
    pub checkout: PathBuf,
}

// ============================================================================
// Runner
// ============================================================================

/// Drives analysis and generation for one request at a time
pub struct Runner {
    settings: RunSettings,
    templates: Arc<TemplateSet>,
}

impl Runner {
    /// Runner over `settings` and `templates`
    pub fn new(settings: RunSettings, templates: Arc<TemplateSet>) -> Self {
        Self {
            settings,
            templates,
        }
    }

    /// Active settings
    #[must_use]
    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Clone, analyse and build the payload, writing the analysis artifacts
    ///
    /// The checkout is removed before returning unless `keep_workdir` is set.
    ///
    /// # Errors
    ///
    /// - `RunError::RepoAccess` if clone, fetch or checkout fails
    /// - `RunError::Analysis` if the history walk or listing fails
    /// - `RunError::Cancelled` if `cancel` fired
    /// - `RunError::Io` if the artifacts cannot be written
    pub async fn analyze(
        &self,
        request: &RunRequest,
        cancel: &CancellationToken,
    ) -> Result<Analysis, RunError> {
        if cancel.is_cancelled() {
            return Err(RunError::Cancelled);
        }

        let checkout = self.settings.workdir.join(Uuid::new_v4().to_string());
        let outcome = self.analyze_in(&checkout, request, cancel).await;

        if !self.settings.keep_workdir {
            remove_checkout(&checkout).await;
        }
        outcome
    }

    async fn analyze_in(
        &self,
        checkout: &Path,
        request: &RunRequest,
        cancel: &CancellationToken,
    ) -> Result<Analysis, RunError> {
        info!(
            url = %request.repo_url,
            branch = request.branch.as_deref().unwrap_or("<default>"),
            checkout = %checkout.display(),
            "Starting repository analysis"
        );

        let report = {
            let url = request.repo_url.clone();
            let branch = request.branch.clone();
            let include_tests = request.include_tests;
            let credentials = self.settings.credentials.clone();
            let limits = self.settings.limits.clone();
            let dest = checkout.to_path_buf();

            tokio::task::spawn_blocking(move || -> Result<RepositoryReport, RunError> {
                let repo =
                    GitRepo::open_or_clone(&url, &dest, branch.as_deref(), credentials.as_ref())
                        .map_err(RunError::RepoAccess)?;
                if let Some(branch) = branch.as_deref() {
                    repo.fetch_checkout_pull(branch, credentials.as_ref())
                        .map_err(RunError::RepoAccess)?;
                }
                RepositoryReport::collect(&repo, &url, &limits, include_tests)
                    .map_err(RunError::Analysis)
            })
            .await??
        };

        if cancel.is_cancelled() {
            return Err(RunError::Cancelled);
        }

        let (report, sections, payload) = {
            let templates = Arc::clone(&self.templates);
            let root = checkout.to_path_buf();
            let include_tests = request.include_tests;

            tokio::task::spawn_blocking(
                move || -> Result<(RepositoryReport, ContextSections, String), RunError> {
                    let builder = RepositoryContextBuilder::new(&templates)?;
                    let sections = builder.sections(&report, &root, include_tests);
                    let payload = builder.render(&report, &sections);
                    Ok((report, sections, payload))
                },
            )
            .await??
        };
        info!(
            chars = payload.chars().count(),
            files = report.files.len(),
            commits = report.commits.len(),
            "Repository context payload built"
        );

        write_git_report(&self.settings.output_dir, &report)?;
        self.settings.debug.write_payload(&sections, &payload);

        Ok(Analysis {
            identity: RepositoryIdentity::from_url(&request.repo_url),
            report,
            sections,
            payload,
            checkout: checkout.to_path_buf(),
        })
    }

    /// Analyse, generate every document and save them
    ///
    /// When a stage fails, documents finished before it are still written
    /// before the error is returned.
    ///
    /// # Errors
    ///
    /// Any [`RunError`] from analysis or generation, or `RunError::Io` if the
    /// documents cannot be written.
    pub async fn run(
        &self,
        pipeline: &DocumentPipeline,
        request: &RunRequest,
        cancel: &CancellationToken,
    ) -> Result<DocumentResult, RunError> {
        let analysis = self.analyze(request, cancel).await?;

        let input = PipelineInput {
            report: &analysis.report,
            payload: &analysis.payload,
            identity: &analysis.identity,
            target_language: request.target_language.as_deref(),
        };

        match pipeline.run(&input, cancel).await {
            Ok(documents) => {
                write_documents(&self.settings.output_dir, &documents)?;
                Ok(documents)
            }
            Err(err) => {
                if let Some(completed) = err.completed()
                    && !completed.is_empty()
                {
                    match write_documents(&self.settings.output_dir, completed) {
                        Ok(paths) => warn!(
                            saved = paths.len(),
                            dir = %self.settings.output_dir.display(),
                            "Saved documents completed before the failure"
                        ),
                        Err(e) => error!(error = %e, "Failed to save completed documents"),
                    }
                }
                Err(err)
            }
        }
    }
}

async fn remove_checkout(checkout: &Path) {
    match tokio::fs::remove_dir_all(checkout).await {
        Ok(()) => debug!(checkout = %checkout.display(), "Removed checkout"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(checkout = %checkout.display(), error = %e, "Failed to remove checkout"),
    }
}
