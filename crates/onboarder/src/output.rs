// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Persisted output
//!
//! Documents land one file per document type. Analysis artifacts and the
//! optional debug side channel are written alongside.

use crate::context::ContextSections;
use crate::markdown::render_git_report;
use crate::pipeline::DocumentResult;
use onboarder_git::RepositoryReport;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const MARKDOWN_SUFFIX: &str = ".md";
const FALLBACK_STEM: &str = "DOCUMENT";

/// Markdown analysis report file name
pub const GIT_REPORT_MARKDOWN: &str = "git_report.md";
/// JSON analysis report file name
pub const GIT_REPORT_JSON: &str = "git_report.json";

/// File name for a document type key
///
/// Upper-cases the key, turns spaces into underscores, drops anything
/// outside `[A-Z0-9_.]` and ensures a `.md` suffix (checked
/// case-insensitively, written lower-case).
#[must_use]
pub fn document_file_name(key: &str) -> String {
    let cleaned: String = key
        .to_uppercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '_' || *c == '.')
        .collect();

    let stem = if cleaned.to_ascii_lowercase().ends_with(MARKDOWN_SUFFIX) {
        &cleaned[..cleaned.len() - MARKDOWN_SUFFIX.len()]
    } else {
        cleaned.as_str()
    };

    if stem.is_empty() {
        format!("{FALLBACK_STEM}{MARKDOWN_SUFFIX}")
    } else {
        format!("{stem}{MARKDOWN_SUFFIX}")
    }
}

/// Write every document into `dir` in insertion order
///
/// # Errors
///
/// Returns the first I/O error; files written before it stay on disk.
pub fn write_documents(dir: &Path, documents: &DocumentResult) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(documents.len());
    for (key, content) in documents.iter() {
        let path = dir.join(document_file_name(key));
        std::fs::write(&path, content)?;
        debug!(document = key, path = %path.display(), "Document written");
        written.push(path);
    }

    info!(dir = %dir.display(), documents = written.len(), "Documents saved");
    Ok(written)
}

/// Write `git_report.md` and `git_report.json` into `dir`
///
/// # Errors
///
/// Returns an I/O error if the directory or either file cannot be written.
pub fn write_git_report(dir: &Path, report: &RepositoryReport) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(GIT_REPORT_MARKDOWN), render_git_report(report))?;

    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
    std::fs::write(dir.join(GIT_REPORT_JSON), json)?;

    info!(dir = %dir.display(), "Analysis report written");
    Ok(())
}

// ============================================================================
// Debug side channel
// ============================================================================

/// Best-effort writer for intermediate artifacts
///
/// Disabled when no directory is configured. Failures are logged and never
/// returned.
#[derive(Debug, Clone, Default)]
pub struct DebugSink {
    dir: Option<PathBuf>,
}

impl DebugSink {
    /// Sink writing into `dir`, or a no-op sink for `None`
    #[must_use]
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Sink that writes nothing
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Target directory, if enabled
    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Write `content` to `name` inside the debug directory
    pub fn write(&self, name: &str, content: &str) {
        let Some(dir) = &self.dir else {
            return;
        };
        let path = dir.join(name);
        let result = std::fs::create_dir_all(dir).and_then(|()| std::fs::write(&path, content));
        match result {
            Ok(()) => debug!(path = %path.display(), "Debug file written"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to write debug file"),
        }
    }

    /// Write the payload sections and the assembled payload
    pub fn write_payload(&self, sections: &ContextSections, payload: &str) {
        self.write("DIRECTORY_TREE_PAYLOAD.txt", &sections.directory_tree);
        self.write("HOTSPOTS_PAYLOAD.txt", &sections.hotspots);
        self.write("COMMIT_HISTORY_PAYLOAD.txt", &sections.commit_history);
        self.write("REPOSITORY_CONTEXT_PAYLOAD.txt", payload);
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: file names use only the allowed alphabet and end in .md
        #[test]
        fn prop_file_name_alphabet(key in ".{0,60}") {
            let name = document_file_name(&key);
            prop_assert!(name.ends_with(".md"));
            let stem = &name[..name.len() - 3];
            prop_assert!(!stem.is_empty());
            prop_assert!(stem.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '.'));
        }

        /// Property: deriving a name from a derived name changes nothing
        #[test]
        fn prop_file_name_idempotent(key in "[A-Za-z0-9 ._-]{1,40}") {
            let once = document_file_name(&key);
            prop_assert_eq!(document_file_name(&once), once.clone());
        }
    }
}
