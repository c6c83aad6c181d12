// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit records and per-file diff statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of characters kept in a short commit id
pub const SHORT_ID_LEN: usize = 8;

/// Truncate a commit id to its short form
#[must_use]
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Name, email and timestamp of a commit author or committer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// When the commit was authored or committed
    pub time: DateTime<Utc>,
}

/// Kind of change applied to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// File created
    Added,
    /// File contents changed
    Modified,
    /// File removed
    Deleted,
    /// File moved, possibly with edits
    Renamed,
    /// File copied from another path
    Copied,
}

impl ChangeKind {
    /// Upper-case label used in reports
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Added => "ADD",
            Self::Modified => "MODIFY",
            Self::Deleted => "DELETE",
            Self::Renamed => "RENAME",
            Self::Copied => "COPY",
        }
    }
}

impl From<git2::Delta> for ChangeKind {
    fn from(delta: git2::Delta) -> Self {
        match delta {
            git2::Delta::Added | git2::Delta::Untracked => Self::Added,
            git2::Delta::Deleted => Self::Deleted,
            git2::Delta::Renamed => Self::Renamed,
            git2::Delta::Copied => Self::Copied,
            _ => Self::Modified,
        }
    }
}

/// A single file difference between a commit and its first parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// What happened to the file
    pub kind: ChangeKind,
    /// Path before the change (absent for additions)
    pub old_path: Option<String>,
    /// Path after the change (absent for deletions)
    pub new_path: Option<String>,
    /// Lines added across all hunks
    pub lines_added: usize,
    /// Lines deleted across all hunks
    pub lines_deleted: usize,
}

impl FileChange {
    /// Canonical path of the change: the new path, or the old path for deletions
    ///
    /// Returns `None` when neither side carries a non-blank path.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.new_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| self.old_path.as_deref().filter(|p| !p.trim().is_empty()))
    }

    /// Lines added plus lines deleted
    #[must_use]
    pub fn churn(&self) -> usize {
        self.lines_added + self.lines_deleted
    }
}

/// Commit-wide line statistics
///
/// Totals always cover every file difference of the commit, even when the
/// recorded change list has been truncated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Number of file differences in the commit
    pub files_changed: usize,
    /// Total lines added
    pub lines_added: usize,
    /// Total lines deleted
    pub lines_deleted: usize,
    /// `lines_added + lines_deleted`
    pub lines_total: usize,
}

impl DiffStats {
    /// Stats for a commit with no parent
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build stats from raw counts, deriving the total
    #[must_use]
    pub fn new(files_changed: usize, lines_added: usize, lines_deleted: usize) -> Self {
        Self {
            files_changed,
            lines_added,
            lines_deleted,
            lines_total: lines_added + lines_deleted,
        }
    }
}

/// A commit analysed against its first parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full commit id (40 hex characters)
    pub id: String,
    /// First eight characters of the id
    pub short_id: String,
    /// Author identity and time
    pub author: Person,
    /// Committer identity and time
    pub committer: Person,
    /// First line of the message
    pub short_message: String,
    /// Complete message
    pub full_message: String,
    /// Parent commit ids, first parent first
    pub parents: Vec<String>,
    /// Commit-wide diff statistics
    pub stats: DiffStats,
    /// Per-file changes, possibly truncated
    pub changes: Vec<FileChange>,
    /// Unified diff snippet, present only when patches were requested
    pub patch: Option<String>,
}

impl CommitRecord {
    /// Validate that a SHA is a valid 40-character hex string
    #[must_use]
    pub fn is_valid_sha(sha: &str) -> bool {
        sha.len() == 40 && sha.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Check if this is a merge commit (has multiple parents)
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Check if this is a root commit (has no parents)
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    fn person() -> Person {
        Person {
            name: "Test Author".to_string(),
            email: "test@example.com".to_string(),
            time: Utc.with_ymd_and_hms(2026, 1, 17, 2, 33, 6).unwrap(),
        }
    }

    fn sample_record() -> CommitRecord {
        CommitRecord {
            id: "1945ab9c752534e733c38ba0109dc3b741f0a6eb".to_string(),
            short_id: "1945ab9c".to_string(),
            author: person(),
            committer: person(),
            short_message: "feat: add hotspots".to_string(),
            full_message: "feat: add hotspots\n\nDetailed description here.".to_string(),
            parents: vec!["c460aeb7fb2d109c17e43de0ce681faec0b7374d".to_string()],
            stats: DiffStats::new(1, 5, 2),
            changes: vec![FileChange {
                kind: ChangeKind::Modified,
                old_path: Some("a.txt".to_string()),
                new_path: Some("a.txt".to_string()),
                lines_added: 5,
                lines_deleted: 2,
            }],
            patch: None,
        }
    }

    #[test]
    fn test_short_id_takes_eight_chars() {
        assert_eq!(short_id("1945ab9c752534e733c38ba0109dc3b741f0a6eb"), "1945ab9c");
    }

    #[test]
    fn test_short_id_handles_short_input() {
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id(""), "");
    }

    #[test]
    fn test_diff_stats_total() {
        let stats = DiffStats::new(3, 10, 4);
        assert_eq!(stats.lines_total, 14);
        assert_eq!(DiffStats::empty(), DiffStats::new(0, 0, 0));
    }

    #[test]
    fn test_file_change_path_prefers_new_path() {
        let change = FileChange {
            kind: ChangeKind::Renamed,
            old_path: Some("old.rs".to_string()),
            new_path: Some("new.rs".to_string()),
            lines_added: 1,
            lines_deleted: 1,
        };
        assert_eq!(change.path(), Some("new.rs"));
    }

    #[test]
    fn test_file_change_path_falls_back_for_deletion() {
        let change = FileChange {
            kind: ChangeKind::Deleted,
            old_path: Some("gone.rs".to_string()),
            new_path: None,
            lines_added: 0,
            lines_deleted: 9,
        };
        assert_eq!(change.path(), Some("gone.rs"));
        assert_eq!(change.churn(), 9);
    }

    #[test]
    fn test_file_change_blank_paths_unresolvable() {
        let change = FileChange {
            kind: ChangeKind::Modified,
            old_path: Some("  ".to_string()),
            new_path: Some(String::new()),
            lines_added: 1,
            lines_deleted: 0,
        };
        assert_eq!(change.path(), None);
    }

    #[test]
    fn test_change_kind_from_delta() {
        assert_eq!(ChangeKind::from(git2::Delta::Added), ChangeKind::Added);
        assert_eq!(ChangeKind::from(git2::Delta::Deleted), ChangeKind::Deleted);
        assert_eq!(ChangeKind::from(git2::Delta::Renamed), ChangeKind::Renamed);
        assert_eq!(ChangeKind::from(git2::Delta::Typechange), ChangeKind::Modified);
        assert_eq!(ChangeKind::Copied.label(), "COPY");
    }

    #[test]
    fn test_is_merge_and_root() {
        let mut record = sample_record();
        assert!(!record.is_merge());
        assert!(!record.is_root());

        record.parents.push("b".repeat(40));
        assert!(record.is_merge());

        record.parents.clear();
        assert!(record.is_root());
    }

    #[test]
    fn test_record_json_format() {
        let record = sample_record();
        let json = serde_json::to_string_pretty(&record).expect("serialize");
        assert!(json.contains("\"short_id\": \"1945ab9c\""));
        assert!(json.contains("\"kind\": \"modified\""));
        assert!(json.contains("2026-01-17"));
    }

    #[test]
    fn test_is_valid_sha() {
        assert!(CommitRecord::is_valid_sha(
            "ABCDEF1234567890abcdef1234567890abcdef12"
        ));
        assert!(!CommitRecord::is_valid_sha("1945ab9"));
        assert!(!CommitRecord::is_valid_sha(
            "1945ab9c752534e733c38ba0109dc3b741f0a6eg"
        ));
    }
}
