// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! onboarder library
//!
//! Turns a git repository into onboarding documentation: the history is
//! analysed into a report, the report and source files are rendered into one
//! repository context payload, and a fixed table of generation stages turns
//! that payload into documents.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use onboarder::prelude::*;
//! use onboarder_ai::{ResilientClient, RetryConfig, testing::ScriptedGenerator};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), RunError> {
//! let templates = Arc::new(TemplateSet::embedded());
//! let generator = Arc::new(ScriptedGenerator::new().always_respond("# Document"));
//! let pipeline = DocumentPipeline::new(
//!     ResilientClient::new(generator, RetryConfig::default()),
//!     Arc::clone(&templates),
//! );
//! let runner = Runner::new(RunSettings::new("/tmp/work", "/tmp/docs"), templates);
//! let request = RunRequest::new("https://github.com/acme/widgets.git");
//! let documents = runner.run(&pipeline, &request, &CancellationToken::new()).await?;
//! println!("{} documents", documents.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod markdown;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod runner;
pub mod template;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::context::RepositoryContextBuilder;
    pub use crate::error::{ErrorKind, RunError};
    pub use crate::output::DebugSink;
    pub use crate::pipeline::{DocumentPipeline, DocumentResult, PipelineInput, STAGES, StageSpec};
    pub use crate::runner::{Analysis, RunRequest, RunSettings, Runner};
    pub use crate::template::TemplateSet;
}
