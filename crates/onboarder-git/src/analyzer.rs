// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit history analysis
//!
//! Walks history newest-first and diffs every commit against its first
//! parent only. Merge commits are not diffed against their other parents.

use crate::commit::{ChangeKind, CommitRecord, DiffStats, FileChange, Person, short_id};
use crate::error::GitError;
use crate::repo::{GitRepo, to_utc};
use git2::{Diff, DiffFindOptions, DiffFormat, DiffOptions, Patch, Sort};
use std::path::Path;
use tracing::debug;

/// Appended to a patch snippet that was cut short
pub const TRUNCATION_MARKER: &str = "\n...[truncated]...\n";

/// Default cap on analysed commits
pub const DEFAULT_MAX_COMMITS: usize = 200;

/// Default cap on recorded file changes per commit
pub const DEFAULT_MAX_CHANGED_FILES: usize = 200;

/// Default cap on patch snippet length, in characters
pub const DEFAULT_MAX_PATCH_CHARS: usize = 4000;

/// Limits applied while walking history
///
/// A limit of `0` means unlimited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisLimits {
    /// Maximum number of commits to analyse
    pub max_commits: usize,
    /// Maximum number of file changes recorded per commit
    pub max_changed_files: usize,
    /// Attach a unified diff snippet to each commit
    pub include_patch: bool,
    /// Maximum patch snippet length in characters
    pub max_patch_chars: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            max_commits: DEFAULT_MAX_COMMITS,
            max_changed_files: DEFAULT_MAX_CHANGED_FILES,
            include_patch: false,
            max_patch_chars: DEFAULT_MAX_PATCH_CHARS,
        }
    }
}

impl AnalysisLimits {
    /// Analyse no more than `n` commits
    #[must_use]
    pub fn latest(n: usize) -> Self {
        Self {
            max_commits: n,
            ..Default::default()
        }
    }

    /// Record at most `n` file changes per commit
    #[must_use]
    pub fn with_max_changed_files(mut self, n: usize) -> Self {
        self.max_changed_files = n;
        self
    }

    /// Attach patch snippets truncated to `max_chars`
    #[must_use]
    pub fn with_patch(mut self, max_chars: usize) -> Self {
        self.include_patch = true;
        self.max_patch_chars = max_chars;
        self
    }
}

/// Cut `patch` to `max_chars` characters and append [`TRUNCATION_MARKER`]
///
/// `max_chars == 0` disables truncation.
#[must_use]
pub fn truncate_patch(patch: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return patch.to_string();
    }
    match patch.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &patch[..cut]),
        None => patch.to_string(),
    }
}

fn person(signature: &git2::Signature<'_>) -> Person {
    Person {
        name: signature.name().unwrap_or("Unknown").to_string(),
        email: signature.email().unwrap_or("").to_string(),
        time: to_utc(signature.when()),
    }
}

fn path_string(path: Option<&Path>) -> Option<String> {
    path.map(|p| p.to_string_lossy().into_owned())
}

/// Added and deleted line counts of the `idx`-th delta
fn line_counts(diff: &Diff<'_>, idx: usize) -> Result<(usize, usize), GitError> {
    // Binary and unchanged deltas have no patch
    match Patch::from_diff(diff, idx)? {
        Some(patch) => {
            let (_context, added, deleted) = patch.line_stats()?;
            Ok((added, deleted))
        }
        None => Ok((0, 0)),
    }
}

fn render_patch(diff: &Diff<'_>) -> Result<String, GitError> {
    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if matches!(origin, '+' | '-' | ' ') {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;
    Ok(text)
}

impl GitRepo {
    /// Walk history from HEAD, newest first, and analyse each commit
    ///
    /// # Errors
    ///
    /// Any repository error aborts the whole walk.
    pub fn walk_commits(&self, limits: &AnalysisLimits) -> Result<Vec<CommitRecord>, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME | Sort::TOPOLOGICAL)?;
        revwalk.push_head()?;

        let limit = match limits.max_commits {
            0 => usize::MAX,
            n => n,
        };

        let mut records = Vec::new();
        for oid in revwalk.take(limit) {
            let commit = self.repo.find_commit(oid?)?;
            records.push(self.analyze_commit(&commit, limits)?);
        }

        debug!(count = records.len(), "Analysed commit history");
        Ok(records)
    }

    fn analyze_commit(
        &self,
        commit: &git2::Commit<'_>,
        limits: &AnalysisLimits,
    ) -> Result<CommitRecord, GitError> {
        let id = commit.id().to_string();

        let (stats, changes, patch) = if commit.parent_count() == 0 {
            (DiffStats::empty(), Vec::new(), None)
        } else {
            self.diff_first_parent(commit, limits)?
        };

        Ok(CommitRecord {
            short_id: short_id(&id).to_string(),
            id,
            author: person(&commit.author()),
            committer: person(&commit.committer()),
            short_message: commit.summary().unwrap_or("").to_string(),
            full_message: commit.message().unwrap_or("").to_string(),
            parents: commit.parent_ids().map(|p| p.to_string()).collect(),
            stats,
            changes,
            patch,
        })
    }

    fn diff_first_parent(
        &self,
        commit: &git2::Commit<'_>,
        limits: &AnalysisLimits,
    ) -> Result<(DiffStats, Vec<FileChange>, Option<String>), GitError> {
        let parent_tree = commit.parent(0)?.tree()?;
        let tree = commit.tree()?;

        let mut opts = DiffOptions::new();
        let mut diff =
            self.repo
                .diff_tree_to_tree(Some(&parent_tree), Some(&tree), Some(&mut opts))?;

        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find))?;

        let files_changed = diff.deltas().len();
        let keep = match limits.max_changed_files {
            0 => files_changed,
            n => n.min(files_changed),
        };

        // Totals cover every delta; only the recorded list is capped
        let mut lines_added = 0;
        let mut lines_deleted = 0;
        let mut changes = Vec::with_capacity(keep);

        for idx in 0..files_changed {
            let (added, deleted) = line_counts(&diff, idx)?;
            lines_added += added;
            lines_deleted += deleted;

            if idx >= keep {
                continue;
            }
            let Some(delta) = diff.get_delta(idx) else {
                continue;
            };
            let kind = ChangeKind::from(delta.status());
            changes.push(FileChange {
                kind,
                old_path: match kind {
                    ChangeKind::Added => None,
                    _ => path_string(delta.old_file().path()),
                },
                new_path: match kind {
                    ChangeKind::Deleted => None,
                    _ => path_string(delta.new_file().path()),
                },
                lines_added: added,
                lines_deleted: deleted,
            });
        }

        let patch = if limits.include_patch {
            Some(truncate_patch(&render_patch(&diff)?, limits.max_patch_chars))
        } else {
            None
        };

        Ok((
            DiffStats::new(files_changed, lines_added, lines_deleted),
            changes,
            patch,
        ))
    }
}
