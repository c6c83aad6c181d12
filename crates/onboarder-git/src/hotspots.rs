// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Per-file churn aggregation
//!
//! Hotspots are rebuilt from scratch on every analysis run. Entries keep the
//! order in which paths were first seen; [`Hotspots::ranked`] orders them by
//! descending churn and leaves ties in discovery order.

use crate::commit::{CommitRecord, FileChange};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cumulative change statistics for one path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    /// Number of analysed commits touching the path
    pub commits: usize,
    /// Lines added across those commits
    pub lines_added: usize,
    /// Lines deleted across those commits
    pub lines_deleted: usize,
}

impl FileStats {
    /// Churn score: lines added plus lines deleted
    #[must_use]
    pub fn churn(&self) -> usize {
        self.lines_added + self.lines_deleted
    }
}

/// A path with its accumulated stats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotspot {
    /// Canonical file path
    pub path: String,
    /// Accumulated statistics
    pub stats: FileStats,
}

/// Insertion-ordered map from path to [`FileStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Hotspot>", into = "Vec<Hotspot>")]
pub struct Hotspots {
    entries: Vec<Hotspot>,
    index: HashMap<String, usize>,
}

impl Hotspots {
    /// Aggregate every file change of every commit
    #[must_use]
    pub fn aggregate(commits: &[CommitRecord]) -> Self {
        let mut hotspots = Self::default();
        for change in commits.iter().flat_map(|commit| &commit.changes) {
            hotspots.record(change);
        }
        hotspots
    }

    /// Add one file change, skipping changes without a resolvable path
    pub fn record(&mut self, change: &FileChange) {
        let Some(path) = change.path() else {
            return;
        };

        let slot = match self.index.get(path) {
            Some(&slot) => slot,
            None => {
                self.entries.push(Hotspot {
                    path: path.to_string(),
                    stats: FileStats::default(),
                });
                self.index.insert(path.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let stats = &mut self.entries[slot].stats;
        stats.commits += 1;
        stats.lines_added += change.lines_added;
        stats.lines_deleted += change.lines_deleted;
    }

    /// Stats for `path`, if it was touched
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FileStats> {
        self.index.get(path).map(|&slot| &self.entries[slot].stats)
    }

    /// Number of distinct paths
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no path was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &Hotspot> {
        self.entries.iter()
    }

    /// Entries by descending churn, ties in discovery order
    #[must_use]
    pub fn ranked(&self) -> Vec<&Hotspot> {
        let mut ranked: Vec<&Hotspot> = self.entries.iter().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.stats.churn().cmp(&a.stats.churn()));
        ranked
    }
}

impl From<Vec<Hotspot>> for Hotspots {
    fn from(entries: Vec<Hotspot>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(slot, entry)| (entry.path.clone(), slot))
            .collect();
        Self { entries, index }
    }
}

impl From<Hotspots> for Vec<Hotspot> {
    fn from(hotspots: Hotspots) -> Self {
        hotspots.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::ChangeKind;
    use similar_asserts::assert_eq;

    fn change(path: &str, added: usize, deleted: usize) -> FileChange {
        FileChange {
            kind: ChangeKind::Modified,
            old_path: Some(path.to_string()),
            new_path: Some(path.to_string()),
            lines_added: added,
            lines_deleted: deleted,
        }
    }

    #[test]
    fn test_record_accumulates() {
        let mut hotspots = Hotspots::default();
        hotspots.record(&change("a.rs", 5, 2));
        hotspots.record(&change("a.rs", 1, 0));

        assert_eq!(
            hotspots.get("a.rs"),
            Some(&FileStats {
                commits: 2,
                lines_added: 6,
                lines_deleted: 2,
            })
        );
        assert_eq!(hotspots.get("a.rs").map(FileStats::churn), Some(8));
    }

    #[test]
    fn test_deletion_uses_old_path() {
        let mut hotspots = Hotspots::default();
        hotspots.record(&FileChange {
            kind: ChangeKind::Deleted,
            old_path: Some("gone.rs".to_string()),
            new_path: None,
            lines_added: 0,
            lines_deleted: 7,
        });
        assert_eq!(hotspots.get("gone.rs").map(|s| s.lines_deleted), Some(7));
    }

    #[test]
    fn test_unresolvable_path_skipped() {
        let mut hotspots = Hotspots::default();
        hotspots.record(&FileChange {
            kind: ChangeKind::Modified,
            old_path: None,
            new_path: None,
            lines_added: 3,
            lines_deleted: 3,
        });
        assert!(hotspots.is_empty());
    }

    #[test]
    fn test_ranked_ties_keep_discovery_order() {
        let mut hotspots = Hotspots::default();
        hotspots.record(&change("first.rs", 2, 0));
        hotspots.record(&change("big.rs", 50, 0));
        hotspots.record(&change("second.rs", 1, 1));

        let order: Vec<&str> = hotspots.ranked().iter().map(|h| h.path.as_str()).collect();
        assert_eq!(order, vec!["big.rs", "first.rs", "second.rs"]);
    }

    #[test]
    fn test_serde_keeps_order_and_index() {
        let mut hotspots = Hotspots::default();
        hotspots.record(&change("z.rs", 1, 0));
        hotspots.record(&change("a.rs", 1, 0));

        let json = serde_json::to_string(&hotspots).expect("serialize");
        let restored: Hotspots = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, hotspots);
        assert!(restored.get("a.rs").is_some());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::commit::{ChangeKind, DiffStats};
    use chrono::Utc;
    use proptest::prelude::*;

    fn record(changes: Vec<FileChange>) -> CommitRecord {
        let person = crate::commit::Person {
            name: "p".to_string(),
            email: "p@example.com".to_string(),
            time: Utc::now(),
        };
        CommitRecord {
            id: "a".repeat(40),
            short_id: "a".repeat(8),
            author: person.clone(),
            committer: person,
            short_message: String::new(),
            full_message: String::new(),
            parents: vec!["b".repeat(40)],
            stats: DiffStats::empty(),
            changes,
            patch: None,
        }
    }

    fn change_strategy() -> impl Strategy<Value = FileChange> {
        ("[abc]\\.rs", 0usize..100, 0usize..100).prop_map(|(path, added, deleted)| FileChange {
            kind: ChangeKind::Modified,
            old_path: Some(path.clone()),
            new_path: Some(path),
            lines_added: added,
            lines_deleted: deleted,
        })
    }

    proptest! {
        /// Property: churn per path equals the sum of churn over its changes
        #[test]
        fn prop_churn_is_sum_of_changes(
            commits in proptest::collection::vec(proptest::collection::vec(change_strategy(), 0..5), 0..10)
        ) {
            let records: Vec<CommitRecord> = commits.into_iter().map(record).collect();
            let hotspots = Hotspots::aggregate(&records);

            for entry in hotspots.iter() {
                let expected: usize = records
                    .iter()
                    .flat_map(|r| &r.changes)
                    .filter(|c| c.path() == Some(entry.path.as_str()))
                    .map(FileChange::churn)
                    .sum();
                prop_assert_eq!(entry.stats.churn(), expected);
            }
        }

        /// Property: ranking is non-increasing in churn
        #[test]
        fn prop_ranked_non_increasing(changes in proptest::collection::vec(change_strategy(), 0..30)) {
            let hotspots = Hotspots::aggregate(&[record(changes)]);
            let ranked = hotspots.ranked();
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].stats.churn() >= pair[1].stats.churn());
            }
        }
    }
}
