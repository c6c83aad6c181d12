// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Prompt templates
//!
//! Templates use `$NAME$` placeholders, where `NAME` is upper-case ASCII,
//! digits and underscores. Rendering is a single left-to-right pass: text
//! substituted for a placeholder is never scanned again, so repository
//! content containing `$...$` cannot inject further substitutions.
//!
//! Every template ships embedded in the binary. A [`TemplateSet`] can load
//! replacements file-by-file from a directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const DELIMITER: char = '$';

// ============================================================================
// Template names
// ============================================================================

/// Repository context payload
pub const REPOSITORY_CONTEXT_TEMPLATE: &str = "repository-context.xml";
/// Generic stage prompt wrapper
pub const DOCUMENT_PROMPT_TEMPLATE: &str = "document-prompt.md";
/// Prompt wrapper for the agent context file
pub const CONTEXT_FILE_PROMPT_TEMPLATE: &str = "context-file-prompt.md";
/// AI context document structure
pub const AI_CONTEXT_TEMPLATE: &str = "ai-context.md";
/// README document structure
pub const README_TEMPLATE: &str = "readme.md";
/// Refactoring notes structure
pub const REFACTORING_TEMPLATE: &str = "refactoring.md";
/// Domain model refactoring structure
pub const DDD_REFACTORING_TEMPLATE: &str = "ddd-refactoring.md";
/// Quality assessment structure
pub const QUALITY_ASSESSMENT_TEMPLATE: &str = "quality-assessment.md";
/// Dictionary structure
pub const DICTIONARY_TEMPLATE: &str = "dictionary.md";
/// Validation report instructions
pub const JUDGE_TEMPLATE: &str = "judge-validation.md";

const EMBEDDED: [(&str, &str); 10] = [
    (
        REPOSITORY_CONTEXT_TEMPLATE,
        include_str!("../prompts/repository-context.xml"),
    ),
    (
        DOCUMENT_PROMPT_TEMPLATE,
        include_str!("../prompts/document-prompt.md"),
    ),
    (
        CONTEXT_FILE_PROMPT_TEMPLATE,
        include_str!("../prompts/context-file-prompt.md"),
    ),
    (AI_CONTEXT_TEMPLATE, include_str!("../prompts/ai-context.md")),
    (README_TEMPLATE, include_str!("../prompts/readme.md")),
    (REFACTORING_TEMPLATE, include_str!("../prompts/refactoring.md")),
    (
        DDD_REFACTORING_TEMPLATE,
        include_str!("../prompts/ddd-refactoring.md"),
    ),
    (
        QUALITY_ASSESSMENT_TEMPLATE,
        include_str!("../prompts/quality-assessment.md"),
    ),
    (DICTIONARY_TEMPLATE, include_str!("../prompts/dictionary.md")),
    (JUDGE_TEMPLATE, include_str!("../prompts/judge-validation.md")),
];

/// Template loading errors
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template registered under the name
    #[error("Template not found: {0}")]
    NotFound(String),

    /// Override directory is missing or not a directory
    #[error("Template directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Override file could not be read
    #[error("Failed to read template {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Rendering
// ============================================================================

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

/// Substitute `$NAME$` placeholders in one pass
///
/// Placeholders with no matching entry in `values` are left as written, as
/// is any `$` that does not open a well-formed placeholder.
#[must_use]
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(DELIMITER) {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let substituted = after.find(DELIMITER).and_then(|end| {
            let name = &after[..end];
            if !is_placeholder_name(name) {
                return None;
            }
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });

        match substituted {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push(DELIMITER);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

// ============================================================================
// Template Set
// ============================================================================

/// Named templates, embedded defaults plus optional overrides
#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates: HashMap<&'static str, String>,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::embedded()
    }
}

impl TemplateSet {
    /// Templates compiled into the binary
    #[must_use]
    pub fn embedded() -> Self {
        Self {
            templates: EMBEDDED
                .iter()
                .map(|(name, content)| (*name, (*content).to_string()))
                .collect(),
        }
    }

    /// Embedded templates with any same-named file in `dir` taking precedence
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` if `dir` is not a directory or an override
    /// file cannot be read.
    pub fn with_overrides(dir: &Path) -> Result<Self, TemplateError> {
        if !dir.is_dir() {
            return Err(TemplateError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut set = Self::embedded();
        for (name, _) in EMBEDDED {
            let path = dir.join(name);
            if !path.is_file() {
                continue;
            }
            let content = std::fs::read_to_string(&path)
                .map_err(|source| TemplateError::Read { path: path.clone(), source })?;
            debug!(template = name, path = %path.display(), "Loaded template override");
            set.templates.insert(name, content);
        }

        info!(dir = %dir.display(), "Template overrides applied");
        Ok(set)
    }

    /// Template text by name
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::NotFound` for an unknown name.
    pub fn get(&self, name: &str) -> Result<&str, TemplateError> {
        self.templates
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    /// Replace or add a template
    pub fn set(&mut self, name: &'static str, content: impl Into<String>) {
        self.templates.insert(name, content.into());
    }

    /// Drop a template
    pub fn remove(&mut self, name: &str) {
        self.templates.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_render_substitutes_known_placeholders() {
        let out = render("Hello $NAME$, on $BRANCH$.", &[("NAME", "world"), ("BRANCH", "main")]);
        assert_eq!(out, "Hello world, on main.");
    }

    #[test]
    fn test_render_is_single_pass() {
        let out = render("$A$ and $B$", &[("A", "$B$"), ("B", "b")]);
        assert_eq!(out, "$B$ and b");
    }

    #[test]
    fn test_render_leaves_unknown_and_malformed() {
        assert_eq!(render("$UNKNOWN$", &[("A", "a")]), "$UNKNOWN$");
        assert_eq!(render("costs $5 and $A$", &[("A", "a")]), "costs $5 and a");
        assert_eq!(render("trailing $", &[]), "trailing $");
        assert_eq!(render("$lower$", &[("lower", "x")]), "$lower$");
    }

    #[test]
    fn test_render_repeated_placeholder() {
        assert_eq!(render("$X$-$X$", &[("X", "1")]), "1-1");
    }

    #[test]
    fn test_embedded_templates_present() {
        let set = TemplateSet::embedded();
        for (name, _) in EMBEDDED {
            assert!(!set.get(name).expect("embedded").is_empty(), "{name}");
        }
        assert!(
            set.get(REPOSITORY_CONTEXT_TEMPLATE)
                .expect("payload")
                .contains("$SOURCE_CODE_CORPUS$")
        );
        assert!(
            set.get(DOCUMENT_PROMPT_TEMPLATE)
                .expect("prompt")
                .contains("$REPOSITORY_CONTEXT$")
        );
        assert!(set.get(JUDGE_TEMPLATE).expect("judge").contains("$GENERATED_DOCUMENTATION$"));
    }

    #[test]
    fn test_unknown_template() {
        let err = TemplateSet::embedded().get("nope.md").expect_err("missing");
        assert!(matches!(err, TemplateError::NotFound(name) if name == "nope.md"));
    }

    #[test]
    fn test_overrides_replace_by_file_name() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join(README_TEMPLATE), "custom readme").expect("write");
        std::fs::write(dir.path().join("unrelated.md"), "ignored").expect("write");

        let set = TemplateSet::with_overrides(dir.path()).expect("overrides");
        assert_eq!(set.get(README_TEMPLATE).expect("readme"), "custom readme");
        assert_eq!(
            set.get(DICTIONARY_TEMPLATE).expect("dictionary"),
            TemplateSet::embedded().get(DICTIONARY_TEMPLATE).expect("embedded")
        );
        assert!(set.get("unrelated.md").is_err());
    }

    #[test]
    fn test_overrides_missing_directory() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("nope");
        assert!(matches!(
            TemplateSet::with_overrides(&missing),
            Err(TemplateError::DirectoryNotFound(_))
        ));
    }
}
