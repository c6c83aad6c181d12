// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Rough token estimate for diagnostics

/// Average characters per token assumed by [`estimate_tokens`]
pub const CHARS_PER_TOKEN: f64 = 3.5;

/// Estimate the token count of `text` as characters / 3.5, rounded
///
/// Only used for logging. Nothing retries, truncates or rejects based on it.
#[must_use]
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as f64 / CHARS_PER_TOKEN).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens(&"x".repeat(35)), 10);
        assert_eq!(estimate_tokens(&"x".repeat(6)), 2);
    }
}
