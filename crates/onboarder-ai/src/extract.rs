// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Response extraction
//!
//! Models often wrap a document in a scratch `<analysis>` block and a code
//! fence. [`clean_response`] peels one layer of each.

use crate::error::AiError;

const ANALYSIS_START: &str = "<analysis>";
const ANALYSIS_END: &str = "</analysis>";
const FENCE: &str = "```";

/// Fence openings recognised, most specific first
const FENCE_OPENINGS: [&str; 3] = ["```markdown", "```json", FENCE];

/// Strip a leading analysis block and one layer of code fence
///
/// Text without either wrapper is returned trimmed and otherwise unchanged.
#[must_use]
pub fn clean_response(raw: &str) -> String {
    let mut text = raw.trim();

    if text.starts_with(ANALYSIS_START)
        && let Some(end) = text.find(ANALYSIS_END)
    {
        text = text[end + ANALYSIS_END.len()..].trim();
    }

    for opening in FENCE_OPENINGS {
        if !text.starts_with(opening) {
            continue;
        }
        let start = opening.len();
        if let Some(end) = text.rfind(FENCE)
            && end > start
        {
            return text[start..end].trim().to_string();
        }
    }

    text.to_string()
}

/// Clean `raw` and require non-empty content
///
/// # Errors
///
/// Returns a `ParseFailure` error when nothing usable remains.
pub fn extract_document(raw: &str) -> Result<String, AiError> {
    let cleaned = clean_response(raw);
    if cleaned.is_empty() {
        return Err(AiError::parse_failure(
            "response contained no document content",
        ));
    }
    Ok(cleaned)
}
