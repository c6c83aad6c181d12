// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! onboarder-git: commit history analysis for repo-onboarder
//!
//! This library crate clones or opens a repository, walks its history
//! newest-first, diffs each commit against its first parent and aggregates
//! per-file churn into hotspots.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use onboarder_git::{AnalysisLimits, GitRepo, RepositoryReport};
//!
//! let repo = GitRepo::open(".").expect("open repo");
//! let report = RepositoryReport::collect(&repo, "https://example.com/a/b.git",
//!     &AnalysisLimits::latest(50), false).expect("analyse");
//!
//! for hotspot in report.hotspots.ranked().iter().take(5) {
//!     println!("{} {}", hotspot.path, hotspot.stats.churn());
//! }
//! ```

pub mod analyzer;
pub mod commit;
pub mod error;
pub mod hotspots;
pub mod repo;
pub mod report;
pub mod sync;

pub use analyzer::{AnalysisLimits, TRUNCATION_MARKER, truncate_patch};
pub use commit::{ChangeKind, CommitRecord, DiffStats, FileChange, Person};
pub use error::GitError;
pub use hotspots::{FileStats, Hotspot, Hotspots};
pub use repo::{GitRepo, HeadInfo, RemoteInfo, is_test_path};
pub use report::{ReportBuilder, RepositoryReport};
pub use sync::Credentials;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analyzer::AnalysisLimits;
    pub use crate::commit::{CommitRecord, FileChange};
    pub use crate::error::GitError;
    pub use crate::hotspots::{FileStats, Hotspots};
    pub use crate::repo::GitRepo;
    pub use crate::report::RepositoryReport;
    pub use crate::sync::Credentials;
}
