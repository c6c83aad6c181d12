// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Repository context payload
//!
//! Renders a [`RepositoryReport`] and the checked-out files into the single
//! text blob every generation stage is grounded on: directory tree, hotspot
//! table, commit digest and source corpus, wrapped in the payload template.

use crate::template::{REPOSITORY_CONTEXT_TEMPLATE, TemplateError, TemplateSet, render};
use chrono::SecondsFormat;
use onboarder_git::{CommitRecord, Hotspots, RepositoryReport, is_test_path};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info};

/// Branch label used when the report has none
pub const DEFAULT_BRANCH: &str = "main";

/// Project name used when none can be derived from the URL
pub const UNKNOWN_PROJECT: &str = "unknown-project";

const INDENT: &str = "  ";

/// Escape text for XML content and attribute values
#[must_use]
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Last path segment of a repository URL, `.git` stripped
///
/// Falls back to [`UNKNOWN_PROJECT`] for blank or unparseable input.
#[must_use]
pub fn project_name(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);

    match url.rfind(['/', ':']) {
        Some(idx) if idx + 1 < url.len() => url[idx + 1..].to_string(),
        Some(_) => UNKNOWN_PROJECT.to_string(),
        None if url.is_empty() => UNKNOWN_PROJECT.to_string(),
        None => url.to_string(),
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Default)]
struct DirNode {
    children: BTreeMap<String, DirNode>,
}

impl DirNode {
    fn insert(&mut self, path: &str) {
        let mut node = self;
        for part in path.split('/').filter(|part| !part.is_empty()) {
            node = node.children.entry(part.to_string()).or_default();
        }
    }

    fn render(&self, depth: usize, out: &mut String) {
        for (name, child) in &self.children {
            out.push_str(&INDENT.repeat(depth));
            out.push_str(name);
            if !child.children.is_empty() {
                out.push('/');
            }
            out.push('\n');
            child.render(depth + 1, out);
        }
    }
}

/// Render `files` as a nested, sorted tree
///
/// Top-level entries sit at depth 0, each level indents by two spaces and
/// directories carry a `/` suffix. Every line ends with a newline.
#[must_use]
pub fn directory_tree(files: &[String]) -> String {
    let mut root = DirNode::default();
    for file in files {
        root.insert(file);
    }
    let mut out = String::new();
    root.render(0, &mut out);
    out
}

/// One `<file path=".." churn_score=".." />` line per hotspot, highest churn first
#[must_use]
pub fn hotspots_section(hotspots: &Hotspots) -> String {
    let mut out = String::new();
    for hotspot in hotspots.ranked() {
        let _ = writeln!(
            out,
            "<file path=\"{}\" churn_score=\"{}\" />",
            xml_escape(&hotspot.path),
            hotspot.stats.churn()
        );
    }
    out
}

/// One `<commit date='..'>message</commit>` line per commit, in report order
#[must_use]
pub fn commit_history_section(commits: &[CommitRecord]) -> String {
    let mut out = String::new();
    for commit in commits {
        let _ = writeln!(
            out,
            "<commit date='{}'>{}</commit>",
            commit.committer.time.to_rfc3339_opts(SecondsFormat::Secs, true),
            xml_escape(&commit.short_message)
        );
    }
    out
}

/// Full text of every readable file under `root`, each wrapped with its path
///
/// Test files are skipped unless `include_tests`. Files that are missing or
/// not valid UTF-8 are skipped.
#[must_use]
pub fn source_corpus_section(root: &Path, files: &[String], include_tests: bool) -> String {
    let mut out = String::new();
    let mut skipped = 0usize;

    for file in files {
        if !include_tests && is_test_path(file) {
            continue;
        }
        match std::fs::read_to_string(root.join(file)) {
            Ok(content) => {
                let _ = write!(
                    out,
                    "<file path=\"{}\">\n{content}\n</file>\n\n",
                    xml_escape(file)
                );
            }
            Err(e) => {
                skipped += 1;
                debug!(path = %file, error = %e, "Skipping unreadable file");
            }
        }
    }

    if skipped > 0 {
        debug!(skipped, "Files left out of the source corpus");
    }
    out
}

// ============================================================================
// Builder
// ============================================================================

/// Rendered payload sections, kept for debugging output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextSections {
    /// Directory tree, unescaped
    pub directory_tree: String,
    /// Hotspot lines
    pub hotspots: String,
    /// Commit digest lines
    pub commit_history: String,
    /// Wrapped source files
    pub source_corpus: String,
}

/// Assembles the repository context payload
#[derive(Debug, Clone)]
pub struct RepositoryContextBuilder<'a> {
    template: &'a str,
}

impl<'a> RepositoryContextBuilder<'a> {
    /// Builder using the payload template from `templates`
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::NotFound` if the payload template is missing.
    pub fn new(templates: &'a TemplateSet) -> Result<Self, TemplateError> {
        Ok(Self {
            template: templates.get(REPOSITORY_CONTEXT_TEMPLATE)?,
        })
    }

    /// Builder over an explicit template
    #[must_use]
    pub fn from_template(template: &'a str) -> Self {
        Self { template }
    }

    /// Render every section for `report`, reading sources under `root`
    #[must_use]
    pub fn sections(
        &self,
        report: &RepositoryReport,
        root: &Path,
        include_tests: bool,
    ) -> ContextSections {
        ContextSections {
            directory_tree: directory_tree(&report.files),
            hotspots: hotspots_section(&report.hotspots),
            commit_history: commit_history_section(&report.commits),
            source_corpus: source_corpus_section(root, &report.files, include_tests),
        }
    }

    /// Substitute pre-rendered sections into the payload template
    #[must_use]
    pub fn render(&self, report: &RepositoryReport, sections: &ContextSections) -> String {
        let project = xml_escape(&project_name(&report.url));
        let branch = xml_escape(report.branch.as_deref().unwrap_or(DEFAULT_BRANCH));
        let timestamp = report
            .generated_at
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let tree = xml_escape(&sections.directory_tree);

        render(
            self.template,
            &[
                ("PROJECT_NAME", &project),
                ("ANALYSIS_TIMESTAMP", &timestamp),
                ("BRANCH", &branch),
                ("DIRECTORY_TREE", &tree),
                ("HOTSPOTS", &sections.hotspots),
                ("COMMIT_HISTORY", &sections.commit_history),
                ("SOURCE_CODE_CORPUS", &sections.source_corpus),
            ],
        )
    }

    /// Build the complete payload
    #[must_use]
    pub fn build(&self, report: &RepositoryReport, root: &Path, include_tests: bool) -> String {
        let sections = self.sections(report, root, include_tests);
        let payload = self.render(report, &sections);
        info!(
            files = report.files.len(),
            commits = report.commits.len(),
            chars = payload.chars().count(),
            "Repository context built"
        );
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use onboarder_git::{ChangeKind, DiffStats, FileChange, Person, ReportBuilder};
    use similar_asserts::assert_eq;
    use tempfile::TempDir;

    fn commit(message: &str, changes: Vec<FileChange>) -> CommitRecord {
        let time = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single().expect("time");
        let person = Person {
            name: "A".to_string(),
            email: "a@example.com".to_string(),
            time,
        };
        CommitRecord {
            id: "0123456789abcdef0123456789abcdef01234567".to_string(),
            short_id: "01234567".to_string(),
            author: person.clone(),
            committer: person,
            short_message: message.to_string(),
            full_message: message.to_string(),
            parents: Vec::new(),
            stats: DiffStats::empty(),
            changes,
            patch: None,
        }
    }

    fn modified(path: &str, added: usize, deleted: usize) -> FileChange {
        FileChange {
            kind: ChangeKind::Modified,
            old_path: Some(path.to_string()),
            new_path: Some(path.to_string()),
            lines_added: added,
            lines_deleted: deleted,
        }
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape(r#"a<b>&"c"'d'"#), "a&lt;b&gt;&amp;&quot;c&quot;&apos;d&apos;");
        assert_eq!(xml_escape("plain"), "plain");
    }

    #[test]
    fn test_project_name() {
        assert_eq!(project_name("https://github.com/acme/widgets.git"), "widgets");
        assert_eq!(project_name("https://github.com/acme/widgets/"), "widgets");
        assert_eq!(project_name("git@github.com:widgets.git"), "widgets");
        assert_eq!(project_name("/tmp/local-repo"), "local-repo");
        assert_eq!(project_name("widgets"), "widgets");
        assert_eq!(project_name(""), UNKNOWN_PROJECT);
        assert_eq!(project_name("   "), UNKNOWN_PROJECT);
        assert_eq!(project_name("https://"), UNKNOWN_PROJECT);
    }

    #[test]
    fn test_directory_tree() {
        let files = vec![
            "src/main.rs".to_string(),
            "Cargo.toml".to_string(),
            "src/util/mod.rs".to_string(),
            "README.md".to_string(),
        ];
        assert_eq!(
            directory_tree(&files),
            "Cargo.toml\nREADME.md\nsrc/\n  main.rs\n  util/\n    mod.rs\n"
        );
        assert_eq!(directory_tree(&[]), "");
    }

    #[test]
    fn test_hotspots_section_ranked() {
        let commits = vec![
            commit("one", vec![modified("a.rs", 1, 1)]),
            commit("two", vec![modified("b\"x.rs", 10, 0)]),
        ];
        let hotspots = Hotspots::aggregate(&commits);
        assert_eq!(
            hotspots_section(&hotspots),
            "<file path=\"b&quot;x.rs\" churn_score=\"10\" />\n<file path=\"a.rs\" churn_score=\"2\" />\n"
        );
    }

    #[test]
    fn test_commit_history_section() {
        let commits = vec![commit("Fix <parser> & lexer", Vec::new())];
        assert_eq!(
            commit_history_section(&commits),
            "<commit date='2026-01-02T03:04:05Z'>Fix &lt;parser&gt; &amp; lexer</commit>\n"
        );
    }

    #[test]
    fn test_source_corpus_skips_tests_and_binary() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("lib.rs"), "fn main() {}").expect("write");
        std::fs::write(dir.path().join("lib_test.rs"), "#[test]").expect("write");
        std::fs::write(dir.path().join("logo.bin"), [0xff_u8, 0xfe, 0x00]).expect("write");
        let files = vec![
            "lib.rs".to_string(),
            "lib_test.rs".to_string(),
            "logo.bin".to_string(),
            "missing.rs".to_string(),
        ];

        assert_eq!(
            source_corpus_section(dir.path(), &files, false),
            "<file path=\"lib.rs\">\nfn main() {}\n</file>\n\n"
        );
        let with_tests = source_corpus_section(dir.path(), &files, true);
        assert!(with_tests.contains("<file path=\"lib_test.rs\">\n#[test]\n</file>"));
    }

    #[test]
    fn test_render_substitutes_metadata() {
        let generated_at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("time");
        let report = ReportBuilder::new("https://example.com/acme/a&b.git")
            .with_files(vec!["x.rs".to_string()])
            .build(generated_at);
        let builder = RepositoryContextBuilder::from_template(
            "$PROJECT_NAME$|$BRANCH$|$ANALYSIS_TIMESTAMP$|$DIRECTORY_TREE$",
        );
        let sections = ContextSections {
            directory_tree: directory_tree(&report.files),
            ..Default::default()
        };
        assert_eq!(
            builder.render(&report, &sections),
            "a&amp;b|main|2026-03-01T12:00:00Z|x.rs\n"
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("a.rs"), "// $SOURCE_CODE_CORPUS$").expect("write");
        let report = ReportBuilder::new("https://example.com/acme/demo")
            .with_branch(Some("dev".to_string()))
            .with_files(vec!["a.rs".to_string()])
            .with_commits(vec![commit("init", vec![modified("a.rs", 3, 0)])])
            .build(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().expect("time"));

        let templates = TemplateSet::embedded();
        let builder = RepositoryContextBuilder::new(&templates).expect("template");
        let first = builder.build(&report, dir.path(), false);
        let second = builder.build(&report, dir.path(), false);
        assert_eq!(first, second);
        assert!(first.contains("<project_name>demo</project_name>"));
        assert!(first.contains("<branch>dev</branch>"));
        assert!(first.contains("// $SOURCE_CODE_CORPUS$"));
        assert!(first.contains("<file path=\"a.rs\" churn_score=\"3\" />"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: escaped text contains no raw markup characters
        #[test]
        fn prop_escape_removes_markup(text in ".{0,200}") {
            let escaped = xml_escape(&text);
            prop_assert!(!escaped.contains(['<', '>', '"', '\'']));
        }

        /// Property: every file name appears once in the tree
        #[test]
        fn prop_tree_lists_every_file(names in proptest::collection::btree_set("[a-z]{1,8}", 1..20)) {
            let files: Vec<String> = names.iter().map(|n| format!("dir/{n}.rs")).collect();
            let tree = directory_tree(&files);
            prop_assert_eq!(tree.lines().count(), files.len() + 1);
            for name in &names {
                let line = format!("  {name}.rs");
                prop_assert!(tree.lines().any(|l| l == line));
            }
        }
    }
}
