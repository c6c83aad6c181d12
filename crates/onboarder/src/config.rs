// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the onboarder CLI
//!
//! This module parses command-line flags (with `ONBOARDER_*` environment
//! fallbacks) and turns them into the explicit settings structs the library
//! constructors take.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use onboarder_ai::cache::{DEFAULT_MIN_TOKENS, DEFAULT_MODEL};
use onboarder_ai::{CacheConfig, CommandGenerator, GenerationOptions, RetryConfig};
use onboarder_git::analyzer::{
    DEFAULT_MAX_CHANGED_FILES, DEFAULT_MAX_COMMITS, DEFAULT_MAX_PATCH_CHARS,
};
use onboarder_git::sync::DEFAULT_USERNAME;
use onboarder_git::{AnalysisLimits, Credentials};

use crate::output::DebugSink;
use crate::runner::{RunRequest, RunSettings};
use crate::template::{TemplateError, TemplateSet};

/// Default cache lifetime in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Default output directory, relative to the current directory
pub const DEFAULT_OUTPUT_DIR: &str = "onboarder-output";

/// Onboarder - onboarding documentation from git history and source
#[derive(Parser, Debug, Clone)]
#[command(name = "onboarder")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run (defaults to a full documentation run)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// URL or local path of the repository to analyse
    #[arg(short, long, env = "ONBOARDER_REPO_URL")]
    pub repo_url: Option<String>,

    /// Branch to check out (defaults to the remote's default branch)
    #[arg(short, long, env = "ONBOARDER_BRANCH")]
    pub branch: Option<String>,

    /// Keep test files in the file listing and source corpus
    #[arg(long, default_value = "false")]
    pub include_tests: bool,

    /// Language the documents should be written in
    #[arg(short, long, env = "ONBOARDER_LANGUAGE")]
    pub language: Option<String>,

    /// Directory holding per-run checkouts
    ///
    /// Defaults to the platform cache directory under `onboarder/repos`.
    #[arg(short, long, env = "ONBOARDER_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Directory documents and analysis reports are written to
    #[arg(short, long, env = "ONBOARDER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Directory for prompts, raw outputs and payload sections
    #[arg(long, env = "ONBOARDER_DEBUG_DIR")]
    pub debug_dir: Option<PathBuf>,

    /// Directory with template files overriding the built-in ones
    #[arg(long, env = "ONBOARDER_TEMPLATES")]
    pub templates: Option<PathBuf>,

    /// Maximum number of commits to analyse (0 = unlimited)
    #[arg(long, default_value_t = DEFAULT_MAX_COMMITS)]
    pub max_commits: usize,

    /// Maximum file changes recorded per commit (0 = unlimited)
    #[arg(long, default_value_t = DEFAULT_MAX_CHANGED_FILES)]
    pub max_changed_files: usize,

    /// Attach a patch snippet to each analysed commit
    #[arg(long, default_value = "false")]
    pub include_patch: bool,

    /// Maximum patch snippet length in characters (0 = unlimited)
    #[arg(long, default_value_t = DEFAULT_MAX_PATCH_CHARS)]
    pub max_patch_chars: usize,

    /// Command that reads a prompt on stdin and writes the response to stdout
    ///
    /// Example: `--generator "gemini -m gemini-2.5-pro"`
    #[arg(short, long, env = "ONBOARDER_GENERATOR")]
    pub generator: Option<String>,

    /// Model identifier passed to the generator
    #[arg(long, env = "ONBOARDER_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature passed to the generator
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Upper bound on generated tokens passed to the generator
    #[arg(long)]
    pub max_output_tokens: Option<u32>,

    /// Lifetime of cached repository contexts in seconds
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    /// Attempts per generation call, first try included
    #[arg(long, default_value_t = 3)]
    pub retry_max_attempts: u32,

    /// Delay before the first retry in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub retry_initial_delay_ms: u64,

    /// Backoff multiplier between retries
    #[arg(long, default_value_t = 2.0)]
    pub retry_multiplier: f64,

    /// Longest delay between retries in milliseconds
    #[arg(long, default_value_t = 30_000)]
    pub retry_max_delay_ms: u64,

    /// Username sent with the git token
    #[arg(long, env = "ONBOARDER_GIT_USERNAME", default_value = DEFAULT_USERNAME)]
    pub git_username: String,

    /// Token for cloning private repositories
    ///
    /// Prefer the environment variable over the flag.
    #[arg(long, env = "ONBOARDER_GIT_TOKEN", hide_env_values = true)]
    pub git_token: Option<String>,

    /// Abort the whole run after this many seconds
    #[arg(long, env = "ONBOARDER_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Review the generated documents in a final validation step
    #[arg(long = "validate", default_value = "false")]
    pub validate_output: bool,

    /// Leave the checkout on disk after the run
    #[arg(long, default_value = "false")]
    pub keep_workdir: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Analyse the repository and write the reports without generating documents
    ///
    /// Writes `git_report.md` and `git_report.json` to the output directory.
    Analyze,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: None,
            repo_url: None,
            branch: None,
            include_tests: false,
            language: None,
            workdir: None,
            output: None,
            debug_dir: None,
            templates: None,
            max_commits: DEFAULT_MAX_COMMITS,
            max_changed_files: DEFAULT_MAX_CHANGED_FILES,
            include_patch: false,
            max_patch_chars: DEFAULT_MAX_PATCH_CHARS,
            generator: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_output_tokens: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            retry_max_attempts: 3,
            retry_initial_delay_ms: 1000,
            retry_multiplier: 2.0,
            retry_max_delay_ms: 30_000,
            git_username: DEFAULT_USERNAME.to_string(),
            git_token: None,
            timeout_secs: None,
            validate_output: false,
            keep_workdir: false,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Checkout parent directory, using a default if not specified
    ///
    /// Default location is platform-specific:
    /// - macOS: ~/Library/Caches/onboarder/repos
    /// - Linux: ~/.cache/onboarder/repos
    /// - Windows: %LOCALAPPDATA%\onboarder\repos
    #[must_use]
    pub fn workdir_path(&self) -> PathBuf {
        self.workdir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("onboarder")
                .join("repos")
        })
    }

    /// Output directory, [`DEFAULT_OUTPUT_DIR`] if not specified
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// History walk limits
    #[must_use]
    pub fn analysis_limits(&self) -> AnalysisLimits {
        AnalysisLimits {
            max_commits: self.max_commits,
            max_changed_files: self.max_changed_files,
            include_patch: self.include_patch,
            max_patch_chars: self.max_patch_chars,
        }
    }

    /// Retry parameters for generation calls
    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.retry_max_attempts,
            initial_delay_ms: self.retry_initial_delay_ms,
            multiplier: self.retry_multiplier,
            max_delay_ms: self.retry_max_delay_ms,
        }
    }

    /// Context cache settings
    #[must_use]
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache_ttl_secs),
            model: self.model.clone(),
            min_tokens: DEFAULT_MIN_TOKENS,
        }
    }

    /// Base options sent with every generation call
    #[must_use]
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            ..GenerationOptions::for_model(&self.model)
        }
    }

    /// Clone credentials, present only when a token is configured
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        self.git_token
            .as_ref()
            .filter(|token| !token.is_empty())
            .map(|token| Credentials::token(token).with_username(&self.git_username))
    }

    /// Overall run deadline
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Run settings derived from the flags
    #[must_use]
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            workdir: self.workdir_path(),
            output_dir: self.output_path(),
            debug: self.debug_sink(),
            limits: self.analysis_limits(),
            credentials: self.credentials(),
            keep_workdir: self.keep_workdir,
        }
    }

    /// Debug side channel, disabled without `--debug-dir`
    #[must_use]
    pub fn debug_sink(&self) -> DebugSink {
        DebugSink::new(self.debug_dir.clone())
    }

    /// The run's entry request
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRepoUrl` if no repository was given.
    pub fn run_request(&self) -> Result<RunRequest, ConfigError> {
        let url = self
            .repo_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingRepoUrl)?;

        Ok(RunRequest {
            repo_url: url.to_string(),
            branch: self.branch.clone().filter(|b| !b.trim().is_empty()),
            include_tests: self.include_tests,
            target_language: self.language.clone(),
        })
    }

    /// Built-in templates with any overrides applied
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` if the override directory cannot be read.
    pub fn template_set(&self) -> Result<TemplateSet, TemplateError> {
        match &self.templates {
            Some(dir) => TemplateSet::with_overrides(dir),
            None => Ok(TemplateSet::embedded()),
        }
    }

    /// Command-line generation backend
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingGenerator` if no command is configured
    /// and `ConfigError::InvalidGenerator` if it is blank.
    pub fn command_generator(&self) -> Result<CommandGenerator, ConfigError> {
        let line = self
            .generator
            .as_deref()
            .ok_or(ConfigError::MissingGenerator)?;
        CommandGenerator::from_command_line(line)
            .ok_or_else(|| ConfigError::InvalidGenerator(line.to_string()))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No repository URL is given
    /// - A full run has no generator command
    /// - The retry parameters cannot produce a schedule
    /// - The template directory is specified but doesn't exist
    /// - The output directory cannot be created
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.run_request()?;

        if self.command.is_none() {
            self.command_generator()?;
        }

        if self.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidRetry(
                "max attempts must be at least 1".to_string(),
            ));
        }
        if !self.retry_multiplier.is_finite() || self.retry_multiplier < 1.0 {
            return Err(ConfigError::InvalidRetry(format!(
                "multiplier must be a finite number >= 1.0, got {}",
                self.retry_multiplier
            )));
        }

        if let Some(ref dir) = self.templates
            && !dir.is_dir()
        {
            return Err(ConfigError::TemplateDirNotFound(dir.clone()));
        }

        let output = self.output_path();
        if !output.exists() {
            std::fs::create_dir_all(&output)
                .map_err(|e| ConfigError::OutputDirectoryCreateFailed(output.clone(), e))?;
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No repository given
    #[error("No repository URL given (use --repo-url or ONBOARDER_REPO_URL)")]
    MissingRepoUrl,

    /// Full run without a generation backend
    #[error("No generator command given (use --generator or ONBOARDER_GENERATOR)")]
    MissingGenerator,

    /// Generator command could not be parsed
    #[error("Invalid generator command: {0:?}")]
    InvalidGenerator(String),

    /// Retry parameters out of range
    #[error("Invalid retry configuration: {0}")]
    InvalidRetry(String),

    /// Template directory not found
    #[error("Template directory not found: {0}")]
    TemplateDirNotFound(PathBuf),

    /// Failed to create output directory
    #[error("Failed to create output directory {0}: {1}")]
    OutputDirectoryCreateFailed(PathBuf, std::io::Error),
}
