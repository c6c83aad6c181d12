// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Prompt construction
//!
//! A stage prompt is a wrapper template with three placeholders: the
//! repository context (full payload, or a pointer to cached content), the
//! document structure template and an optional response-language line.

use crate::context::xml_escape;
use crate::template::render;

/// How the repository context reaches the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextReference<'a> {
    /// Full payload embedded in the prompt
    Inline(&'a str),
    /// Payload held by the cache store under this handle name
    Cached(&'a str),
}

/// Line instructing the model to answer in `language`
///
/// Empty when no language is requested.
#[must_use]
pub fn language_instruction(language: Option<&str>) -> String {
    match language.map(str::trim) {
        Some(language) if !language.is_empty() => {
            format!("- IMPORTANT: Response MUST be in {language} language")
        }
        _ => String::new(),
    }
}

/// Stand-in block telling the model the context lives in cached content
#[must_use]
pub fn cached_context_block(name: &str) -> String {
    format!(
        "<cached_repository_context name=\"{}\">\nRepository context is available in cached content.\n</cached_repository_context>",
        xml_escape(name)
    )
}

/// Render a stage prompt
///
/// `wrapper` holds the `REPOSITORY_CONTEXT`, `DOCUMENTATION_TEMPLATE` and
/// `LANGUAGE_INSTRUCTION` placeholders; `document_template` describes the
/// document to produce.
#[must_use]
pub fn build_prompt(
    wrapper: &str,
    document_template: &str,
    context: ContextReference<'_>,
    language: Option<&str>,
) -> String {
    let context = match context {
        ContextReference::Inline(payload) => payload.to_string(),
        ContextReference::Cached(name) => cached_context_block(name),
    };
    let instruction = language_instruction(language);

    render(
        wrapper,
        &[
            ("REPOSITORY_CONTEXT", &context),
            ("DOCUMENTATION_TEMPLATE", document_template),
            ("LANGUAGE_INSTRUCTION", &instruction),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    const WRAPPER: &str = "CTX[$REPOSITORY_CONTEXT$]\nDOC[$DOCUMENTATION_TEMPLATE$]\n$LANGUAGE_INSTRUCTION$";

    #[test]
    fn test_inline_context() {
        let prompt = build_prompt(
            WRAPPER,
            "# Readme",
            ContextReference::Inline("<payload/>"),
            None,
        );
        assert_eq!(prompt, "CTX[<payload/>]\nDOC[# Readme]\n");
    }

    #[test]
    fn test_cached_context() {
        let prompt = build_prompt(
            WRAPPER,
            "# Readme",
            ContextReference::Cached("cachedContents/7"),
            Some("Polish"),
        );
        assert_eq!(
            prompt,
            "CTX[<cached_repository_context name=\"cachedContents/7\">\nRepository context is available in cached content.\n</cached_repository_context>]\nDOC[# Readme]\n- IMPORTANT: Response MUST be in Polish language"
        );
        assert!(!prompt.contains("<payload/>"));
    }

    #[test]
    fn test_language_instruction() {
        assert_eq!(language_instruction(None), "");
        assert_eq!(language_instruction(Some("  ")), "");
        assert_eq!(
            language_instruction(Some(" German ")),
            "- IMPORTANT: Response MUST be in German language"
        );
    }

    #[test]
    fn test_payload_placeholders_not_expanded() {
        let prompt = build_prompt(
            WRAPPER,
            "doc",
            ContextReference::Inline("$DOCUMENTATION_TEMPLATE$"),
            None,
        );
        assert_eq!(prompt, "CTX[$DOCUMENTATION_TEMPLATE$]\nDOC[doc]\n");
    }
}
