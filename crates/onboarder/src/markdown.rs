// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Human-readable analysis report (`git_report.md`)

use chrono::{DateTime, SecondsFormat, Utc};
use onboarder_git::{CommitRecord, RepositoryReport};
use std::fmt::Write as _;

/// Files listed before the listing is cut short
pub const MAX_LISTED_FILES: usize = 300;

fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn inline(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

fn code(text: &str) -> String {
    text.replace('`', "\\`")
}

/// Render the analysis report as Markdown
#[must_use]
pub fn render_git_report(report: &RepositoryReport) -> String {
    let mut out = String::new();

    out.push_str("# Git Report\n\n");
    let _ = writeln!(out, "- Generated at (UTC): **{}**\n", timestamp(report.generated_at));

    out.push_str("## Repository\n\n");
    let _ = writeln!(out, "- URL: **{}**", report.url);
    let _ = writeln!(out, "- Branch: **{}**", report.branch.as_deref().unwrap_or(""));
    let _ = writeln!(out, "- Workdir: `{}`\n", report.workdir.display());

    if !report.remotes.is_empty() {
        out.push_str("### Remotes\n\n");
        for remote in &report.remotes {
            let _ = writeln!(
                out,
                "- {}: `{}`",
                remote.name,
                code(remote.url.as_deref().unwrap_or("-"))
            );
        }
        out.push('\n');
    }

    out.push_str("## HEAD\n\n");
    match &report.head {
        Some(head) => {
            let _ = writeln!(out, "- Commit: `{}`", head.commit);
            let _ = writeln!(out, "- Time: **{}**", timestamp(head.time));
            let _ = writeln!(out, "- Message: {}\n", inline(&head.message));
        }
        None => out.push_str("- Commit: `-`\n\n"),
    }

    out.push_str("## Files at HEAD\n\n");
    let _ = writeln!(out, "- Total: **{}**\n", report.files.len());
    for file in report.files.iter().take(MAX_LISTED_FILES) {
        let _ = writeln!(out, "- `{}`", code(file));
    }
    if report.files.len() > MAX_LISTED_FILES {
        let _ = writeln!(
            out,
            "\n_... truncated ({} more files)_",
            report.files.len() - MAX_LISTED_FILES
        );
    }

    out.push_str("\n## Commits\n\n");
    for commit in &report.commits {
        render_commit(&mut out, commit);
    }

    out
}

fn render_commit(out: &mut String, commit: &CommitRecord) {
    let _ = writeln!(out, "### {} - {}\n", commit.short_id, inline(&commit.short_message));
    let _ = writeln!(
        out,
        "- Author: **{}** <{}>",
        inline(&commit.author.name),
        inline(&commit.author.email)
    );
    let _ = writeln!(out, "- Author time: **{}**", timestamp(commit.author.time));
    let _ = writeln!(
        out,
        "- Committer: **{}** <{}>",
        inline(&commit.committer.name),
        inline(&commit.committer.email)
    );
    let _ = writeln!(out, "- Committer time: **{}**\n", timestamp(commit.committer.time));

    let _ = writeln!(
        out,
        "**Diff stats**: files={}, + {}, - {}\n",
        commit.stats.files_changed, commit.stats.lines_added, commit.stats.lines_deleted
    );

    if !commit.changes.is_empty() {
        out.push_str("| Type | Path | + | - |\n");
        out.push_str("|---|---|---:|---:|\n");
        for change in &commit.changes {
            let _ = writeln!(
                out,
                "| {} | `{}` | {} | {} |",
                change.kind.label(),
                code(change.path().unwrap_or("")),
                change.lines_added,
                change.lines_deleted
            );
        }
        out.push('\n');
    }

    if let Some(patch) = &commit.patch {
        out.push_str("<details><summary>Patch</summary>\n\n```diff\n");
        out.push_str(patch);
        out.push_str("\n```\n</details>\n\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use onboarder_git::{ChangeKind, DiffStats, FileChange, Person, ReportBuilder};

    fn sample_commit() -> CommitRecord {
        let time = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).single().expect("time");
        let person = Person {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            time,
        };
        CommitRecord {
            id: "abcdef0123456789abcdef0123456789abcdef01".to_string(),
            short_id: "abcdef01".to_string(),
            author: person.clone(),
            committer: person,
            short_message: "Split\nparser".to_string(),
            full_message: "Split\nparser".to_string(),
            parents: vec!["1".repeat(40)],
            stats: DiffStats::new(1, 4, 1),
            changes: vec![FileChange {
                kind: ChangeKind::Deleted,
                old_path: Some("old`name.rs".to_string()),
                new_path: None,
                lines_added: 4,
                lines_deleted: 1,
            }],
            patch: Some("-a\n+b".to_string()),
        }
    }

    #[test]
    fn test_commit_section() {
        let report = ReportBuilder::new("https://example.com/a/b")
            .with_commits(vec![sample_commit()])
            .build(Utc.with_ymd_and_hms(2026, 2, 3, 0, 0, 0).single().expect("time"));
        let md = render_git_report(&report);

        assert!(md.starts_with("# Git Report\n\n- Generated at (UTC): **2026-02-03T00:00:00Z**"));
        assert!(md.contains("### abcdef01 - Split parser\n"));
        assert!(md.contains("**Diff stats**: files=1, + 4, - 1"));
        assert!(md.contains("| DELETE | `old\\`name.rs` | 4 | 1 |"));
        assert!(md.contains("```diff\n-a\n+b\n```"));
        assert!(md.contains("- Commit: `-`"));
    }

    #[test]
    fn test_file_listing_is_capped() {
        let files: Vec<String> = (0..MAX_LISTED_FILES + 5).map(|i| format!("f{i}.rs")).collect();
        let report = ReportBuilder::new("u").with_files(files).build(Utc::now());
        let md = render_git_report(&report);

        assert!(md.contains("- Total: **305**"));
        assert!(md.contains("- `f299.rs`"));
        assert!(!md.contains("- `f300.rs`"));
        assert!(md.contains("_... truncated (5 more files)_"));
    }
}
