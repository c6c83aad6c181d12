// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! CLI parsing tests
//!
//! These tests verify flag parsing, the `analyze` subcommand and how the
//! parsed flags turn into run settings.

use clap::Parser;
use onboarder::config::{Command, Config};
use similar_asserts::assert_eq;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

fn parse(args: &[&str]) -> Config {
    let mut argv = vec!["onboarder"];
    argv.extend_from_slice(args);
    Config::try_parse_from(argv).expect("parse should succeed")
}

// ============================================================================
// Run request flags
// ============================================================================

#[test]
fn test_short_flags() {
    let config = parse(&[
        "-r",
        "https://github.com/acme/widgets",
        "-b",
        "develop",
        "-l",
        "Polish",
        "-o",
        "/tmp/docs",
        "-w",
        "/tmp/work",
    ]);
    assert_eq!(config.repo_url.as_deref(), Some("https://github.com/acme/widgets"));
    assert_eq!(config.branch.as_deref(), Some("develop"));
    assert_eq!(config.language.as_deref(), Some("Polish"));
    assert_eq!(config.output_path(), PathBuf::from("/tmp/docs"));
    assert_eq!(config.workdir_path(), PathBuf::from("/tmp/work"));
}

#[test]
fn test_run_request_from_flags() {
    let config = parse(&[
        "--repo-url",
        "  https://github.com/acme/widgets  ",
        "--branch",
        "  ",
        "--include-tests",
    ]);
    let request = config.run_request().expect("request");
    assert_eq!(request.repo_url, "https://github.com/acme/widgets");
    assert_eq!(request.branch, None, "blank branch means the default branch");
    assert!(request.include_tests);
    assert_eq!(request.target_language, None);
}

#[test]
fn test_include_tests_value_syntax_not_supported() {
    let result = Config::try_parse_from(["onboarder", "--include-tests=true"]);
    assert!(result.is_err());
}

// ============================================================================
// Analysis and generation flags
// ============================================================================

#[test]
fn test_analysis_limit_flags() {
    let config = parse(&[
        "--max-commits",
        "10",
        "--max-changed-files",
        "5",
        "--include-patch",
        "--max-patch-chars",
        "100",
    ]);
    let limits = config.analysis_limits();
    assert_eq!(limits.max_commits, 10);
    assert_eq!(limits.max_changed_files, 5);
    assert!(limits.include_patch);
    assert_eq!(limits.max_patch_chars, 100);
}

#[test]
fn test_generation_flags() {
    let config = parse(&[
        "-g",
        "llm --model x",
        "--model",
        "gemini-test",
        "--temperature",
        "0.2",
        "--max-output-tokens",
        "2048",
        "--cache-ttl-secs",
        "120",
    ]);
    assert_eq!(config.command_generator().expect("generator").program(), "llm");

    let options = config.generation_options();
    assert_eq!(options.model.as_deref(), Some("gemini-test"));
    assert_eq!(options.temperature, Some(0.2));
    assert_eq!(options.max_output_tokens, Some(2048));
    assert_eq!(options.cached_content, None);

    let cache = config.cache_config();
    assert_eq!(cache.ttl, Duration::from_secs(120));
    assert_eq!(cache.model, "gemini-test");
}

#[test]
fn test_retry_flags() {
    let config = parse(&[
        "--retry-max-attempts",
        "5",
        "--retry-initial-delay-ms",
        "10",
        "--retry-multiplier",
        "3",
        "--retry-max-delay-ms",
        "100",
    ]);
    let retry = config.retry_config();
    assert_eq!(retry.max_attempts, 5);
    assert_eq!(retry.initial_delay_ms, 10);
    assert_eq!(retry.multiplier, 3.0);
    assert_eq!(retry.max_delay_ms, 100);
}

#[test]
fn test_credentials_from_flags() {
    let config = parse(&["--git-token", "secret", "--git-username", "bot"]);
    let credentials = config.credentials().expect("credentials");
    assert_eq!(credentials.username, "bot");
    assert_eq!(credentials.token, "secret");
}

#[test]
fn test_run_flags() {
    let config = parse(&["--timeout-secs", "90", "--validate", "--keep-workdir"]);
    assert_eq!(config.timeout(), Some(Duration::from_secs(90)));
    assert!(config.validate_output);

    let settings = config.run_settings();
    assert!(settings.keep_workdir);
    assert!(settings.debug.dir().is_none());
}

#[test]
fn test_debug_dir_flag() {
    let config = parse(&["--debug-dir", "/tmp/debug"]);
    assert_eq!(
        config.run_settings().debug.dir(),
        Some(PathBuf::from("/tmp/debug").as_path())
    );
}

// ============================================================================
// Subcommands
// ============================================================================

#[test]
fn test_no_subcommand_is_full_run() {
    let config = parse(&["-r", "https://github.com/acme/widgets"]);
    assert_eq!(config.command, None);
}

#[test]
fn test_analyze_subcommand() {
    let config = parse(&["-r", "https://github.com/acme/widgets", "analyze"]);
    assert_eq!(config.command, Some(Command::Analyze));
}

#[test]
fn test_analyze_does_not_need_generator() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let output = dir.path().join("out");
    let mut config = parse(&["-r", "https://github.com/acme/widgets", "analyze"]);
    config.output = Some(output.clone());

    config.validate().expect("analyze needs no generator");
    assert!(output.is_dir());
}

#[test]
fn test_unknown_subcommand_rejected() {
    let result = Config::try_parse_from(["onboarder", "publish"]);
    assert!(result.is_err());
}

// ============================================================================
// Logging flags
// ============================================================================

#[test]
fn test_default_log_level() {
    assert_eq!(parse(&[]).log_level(), Level::INFO);
}

#[test]
fn test_verbose_short_flag() {
    let config = parse(&["-v"]);
    assert!(config.verbose);
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_quiet_short_flag() {
    let config = parse(&["-q"]);
    assert!(config.quiet);
    assert_eq!(config.log_level(), Level::WARN);
}

#[test]
fn test_verbose_wins_over_quiet() {
    let config = parse(&["-v", "-q"]);
    assert_eq!(config.log_level(), Level::DEBUG);
}
