// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Document generation pipeline
//!
//! A fixed table of [`StageSpec`]s is run in order by one generic loop. Each
//! stage obtains a context reference (a cache handle, or the full payload
//! when caching is unavailable), renders its prompt, calls the resilient
//! client, extracts the document, applies an optional pure post-process and
//! records the result under its document type.
//!
//! Stages never see each other's output. The only ordering effect is that
//! later stages reuse a cache entry created by an earlier one.

use crate::context::directory_tree;
use crate::error::RunError;
use crate::output::DebugSink;
use crate::prompt::{ContextReference, build_prompt};
use crate::template::{
    AI_CONTEXT_TEMPLATE, CONTEXT_FILE_PROMPT_TEMPLATE, DDD_REFACTORING_TEMPLATE,
    DICTIONARY_TEMPLATE, DOCUMENT_PROMPT_TEMPLATE, JUDGE_TEMPLATE, QUALITY_ASSESSMENT_TEMPLATE,
    README_TEMPLATE, REFACTORING_TEMPLATE, TemplateSet, render,
};
use onboarder_ai::{
    AiError, AiErrorKind, CacheHandle, ContextCache, GenerationOptions, RepositoryIdentity,
    ResilientClient, extract_document,
};
use onboarder_git::RepositoryReport;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Pure transformation applied to a stage's extracted document
pub type PostProcess = fn(&str, &RepositoryReport) -> String;

/// Document type of the optional validation step
pub const VALIDATION_REPORT: &str = "Validation Report";

const VALIDATION_SLUG: &str = "validation_report";

/// One row of the stage table
#[derive(Debug, Clone, Copy)]
pub struct StageSpec {
    /// Key the document is stored under
    pub document_type: &'static str,
    /// Short name used for debug file names
    pub slug: &'static str,
    /// Wrapper template name
    pub prompt_template: &'static str,
    /// Document structure template name
    pub document_template: &'static str,
    /// Optional post-process
    pub post_process: Option<PostProcess>,
}

/// The documents produced by a full run, in order
pub const STAGES: [StageSpec; 6] = [
    StageSpec {
        document_type: "AI Context",
        slug: "context_file",
        prompt_template: CONTEXT_FILE_PROMPT_TEMPLATE,
        document_template: AI_CONTEXT_TEMPLATE,
        post_process: Some(append_project_structure),
    },
    StageSpec {
        document_type: "README.md",
        slug: "readme_file",
        prompt_template: DOCUMENT_PROMPT_TEMPLATE,
        document_template: README_TEMPLATE,
        post_process: None,
    },
    StageSpec {
        document_type: "Refactorings",
        slug: "refactoring_file",
        prompt_template: DOCUMENT_PROMPT_TEMPLATE,
        document_template: REFACTORING_TEMPLATE,
        post_process: None,
    },
    StageSpec {
        document_type: "DDD Refactoring",
        slug: "ddd_refactoring_file",
        prompt_template: DOCUMENT_PROMPT_TEMPLATE,
        document_template: DDD_REFACTORING_TEMPLATE,
        post_process: None,
    },
    StageSpec {
        document_type: "Quality Assessment",
        slug: "quality_assessment",
        prompt_template: DOCUMENT_PROMPT_TEMPLATE,
        document_template: QUALITY_ASSESSMENT_TEMPLATE,
        post_process: None,
    },
    StageSpec {
        document_type: "Dictionary",
        slug: "dictionary",
        prompt_template: DOCUMENT_PROMPT_TEMPLATE,
        document_template: DICTIONARY_TEMPLATE,
        post_process: None,
    },
];

/// Append a `## Project Structure` section with the full file tree
#[must_use]
pub fn append_project_structure(document: &str, report: &RepositoryReport) -> String {
    let tree = directory_tree(&report.files);
    let mut out = String::with_capacity(document.len() + tree.len() + 40);
    out.push_str(document);
    if !document.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("\n## Project Structure\n\n```\n");
    out.push_str(&tree);
    out.push_str("```\n");
    out
}

// ============================================================================
// Document Result
// ============================================================================

/// Generated documents keyed by document type, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentResult {
    documents: Vec<(String, String)>,
}

impl DocumentResult {
    /// Store `content` under `key`, replacing in place if the key exists
    pub fn insert(&mut self, key: impl Into<String>, content: impl Into<String>) {
        let key = key.into();
        let content = content.into();
        match self.documents.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = content,
            None => self.documents.push((key, content)),
        }
    }

    /// Content stored under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.documents
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Document types in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|(k, _)| k.as_str())
    }

    /// `(key, content)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.documents.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when no document was produced
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents joined for review, each under a `--- Document: key ---` header
    #[must_use]
    pub fn aggregate(&self) -> String {
        let mut out = String::new();
        for (key, content) in self.iter() {
            out.push_str("--- Document: ");
            out.push_str(key);
            out.push_str(" ---\n");
            out.push_str(content);
            out.push_str("\n\n");
        }
        out
    }
}

// ============================================================================
// Progress Reporting
// ============================================================================

/// Callback for pipeline progress
pub type ProgressCallback = Box<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Pipeline progress events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A stage is about to call the generator
    StageStarted {
        /// Document type
        stage: String,
        /// Zero-based position in the stage table
        index: usize,
        /// Number of stages
        total: usize,
    },
    /// A stage stored its document
    StageCompleted {
        /// Document type
        stage: String,
        /// Characters in the stored document
        chars: usize,
    },
    /// Caching is unavailable; prompts carry the full payload from now on
    ContextFallback {
        /// Why no cache handle could be produced
        reason: String,
    },
}

// ============================================================================
// Pipeline
// ============================================================================

/// What a pipeline run reads
#[derive(Debug, Clone, Copy)]
pub struct PipelineInput<'a> {
    /// Completed analysis, read-only
    pub report: &'a RepositoryReport,
    /// Repository context payload
    pub payload: &'a str,
    /// Cache identity of the repository
    pub identity: &'a RepositoryIdentity,
    /// Requested response language
    pub target_language: Option<&'a str>,
}

/// Runs the stage table against one repository context
pub struct DocumentPipeline {
    client: ResilientClient,
    templates: Arc<TemplateSet>,
    cache: Option<Arc<ContextCache>>,
    stages: Vec<StageSpec>,
    options: GenerationOptions,
    debug: DebugSink,
    validate: bool,
    progress: Option<ProgressCallback>,
}

impl DocumentPipeline {
    /// Pipeline over the standard stage table with no caching
    pub fn new(client: ResilientClient, templates: Arc<TemplateSet>) -> Self {
        Self {
            client,
            templates,
            cache: None,
            stages: STAGES.to_vec(),
            options: GenerationOptions::default(),
            debug: DebugSink::disabled(),
            validate: false,
            progress: None,
        }
    }

    /// Reference cached context instead of resending the payload
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<ContextCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the stage table
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<StageSpec>) -> Self {
        self.stages = stages;
        self
    }

    /// Base options sent with every call
    #[must_use]
    pub fn with_generation_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Write prompts and outputs to a debug sink
    #[must_use]
    pub fn with_debug(mut self, debug: DebugSink) -> Self {
        self.debug = debug;
        self
    }

    /// Run the validation step after the stages
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Set a progress callback
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Debug sink in use
    #[must_use]
    pub fn debug_sink(&self) -> &DebugSink {
        &self.debug
    }

    fn report(&self, event: ProgressEvent) {
        if let Some(callback) = &self.progress {
            callback(&event);
        }
    }

    /// Generate every document for `input`
    ///
    /// # Errors
    ///
    /// - `RunError::Template` if a stage template is missing, before any call
    /// - `RunError::Generation` for the first failing stage, carrying the
    ///   documents completed before it
    pub async fn run(
        &self,
        input: &PipelineInput<'_>,
        cancel: &CancellationToken,
    ) -> Result<DocumentResult, RunError> {
        self.check_templates()?;

        let mut result = DocumentResult::default();
        let mut cache_unavailable = false;
        let total = self.stages.len();

        for (index, stage) in self.stages.iter().enumerate() {
            self.report(ProgressEvent::StageStarted {
                stage: stage.document_type.to_string(),
                index,
                total,
            });
            info!(stage = stage.document_type, index = index + 1, total, "Generating document");

            let outcome = self
                .run_stage(stage, input, &mut cache_unavailable, cancel)
                .await;
            let content = match outcome {
                Ok(content) => content,
                Err(source) => {
                    warn!(
                        stage = stage.document_type,
                        completed = result.len(),
                        error = %source,
                        "Stage failed"
                    );
                    return Err(RunError::Generation {
                        stage: stage.document_type.to_string(),
                        source,
                        completed: result,
                    });
                }
            };

            self.report(ProgressEvent::StageCompleted {
                stage: stage.document_type.to_string(),
                chars: content.chars().count(),
            });
            result.insert(stage.document_type, content);
        }

        if self.validate {
            match self
                .run_validation(&result, input, &mut cache_unavailable, cancel)
                .await
            {
                Ok(Some(report)) => result.insert(VALIDATION_REPORT, report),
                Ok(None) => {}
                Err(source) => {
                    return Err(RunError::Generation {
                        stage: VALIDATION_REPORT.to_string(),
                        source,
                        completed: result,
                    });
                }
            }
        }

        info!(documents = result.len(), "Document generation complete");
        Ok(result)
    }

    fn check_templates(&self) -> Result<(), RunError> {
        for stage in &self.stages {
            self.templates.get(stage.prompt_template)?;
            self.templates.get(stage.document_template)?;
        }
        if self.validate {
            self.templates.get(DOCUMENT_PROMPT_TEMPLATE)?;
            self.templates.get(JUDGE_TEMPLATE)?;
        }
        Ok(())
    }

    /// Cache handle for this call, or `None` to embed the payload
    async fn context_handle(
        &self,
        input: &PipelineInput<'_>,
        cache_unavailable: &mut bool,
        cancel: &CancellationToken,
    ) -> Result<Option<CacheHandle>, AiError> {
        let Some(cache) = &self.cache else {
            return Ok(None);
        };
        if *cache_unavailable {
            return Ok(None);
        }

        let ensured = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(AiError::cancelled("cancelled while preparing cached context"));
            }
            ensured = cache.ensure(input.identity, input.payload) => ensured,
        };

        match ensured {
            Ok(handle) => Ok(Some(handle)),
            Err(reason) => {
                warn!(
                    identity = %input.identity,
                    reason = %reason,
                    "Context cache unavailable, sending full payload"
                );
                *cache_unavailable = true;
                self.report(ProgressEvent::ContextFallback {
                    reason: reason.to_string(),
                });
                Ok(None)
            }
        }
    }

    /// Render, call, extract; shared by the stages and the validation step
    async fn generate(
        &self,
        slug: &str,
        wrapper: &str,
        document_template: &str,
        input: &PipelineInput<'_>,
        cache_unavailable: &mut bool,
        cancel: &CancellationToken,
    ) -> Result<String, AiError> {
        let handle = self
            .context_handle(input, cache_unavailable, cancel)
            .await?;

        let (context, options) = match &handle {
            Some(handle) => (
                ContextReference::Cached(&handle.name),
                self.options.clone().with_cached_content(&handle.name),
            ),
            None => (ContextReference::Inline(input.payload), self.options.clone()),
        };

        let prompt = build_prompt(wrapper, document_template, context, input.target_language);
        self.debug.write(&format!("{slug}_prompt_debug.txt"), &prompt);

        let raw = self.client.call(&prompt, Some(&options), cancel).await?;
        extract_document(&raw)
    }

    async fn run_stage(
        &self,
        stage: &StageSpec,
        input: &PipelineInput<'_>,
        cache_unavailable: &mut bool,
        cancel: &CancellationToken,
    ) -> Result<String, AiError> {
        let wrapper = self.template(stage.prompt_template)?;
        let document_template = self.template(stage.document_template)?;

        let document = self
            .generate(
                stage.slug,
                wrapper,
                document_template,
                input,
                cache_unavailable,
                cancel,
            )
            .await?;

        let document = match stage.post_process {
            Some(post_process) => post_process(&document, input.report),
            None => document,
        };
        self.debug
            .write(&format!("generated_{}_debug.md", stage.slug), &document);
        Ok(document)
    }

    async fn run_validation(
        &self,
        documents: &DocumentResult,
        input: &PipelineInput<'_>,
        cache_unavailable: &mut bool,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, AiError> {
        if documents.is_empty() {
            warn!("No documents generated, skipping validation");
            return Ok(None);
        }
        info!(documents = documents.len(), "Validating generated documents");

        let wrapper = self.template(DOCUMENT_PROMPT_TEMPLATE)?;
        let instructions = render(
            self.template(JUDGE_TEMPLATE)?,
            &[("GENERATED_DOCUMENTATION", &documents.aggregate())],
        );

        let report = self
            .generate("judge", wrapper, &instructions, input, cache_unavailable, cancel)
            .await?;
        self.debug
            .write(&format!("generated_{VALIDATION_SLUG}_debug.md"), &report);
        Ok(Some(report))
    }

    fn template(&self, name: &str) -> Result<&str, AiError> {
        // Presence is checked by `check_templates` before any call
        self.templates
            .get(name)
            .map_err(|e| AiError::new(AiErrorKind::GenerationFailed, e.to_string()))
    }
}
