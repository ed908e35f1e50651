//! Argument vectors for the runner.
//!
//! The builders only produce the tokens after the launcher prefix
//! (`npx vitest` by default); [`RunnerConfig`](crate::RunnerConfig) supplies
//! the prefix.

use vitrun_core::{Reporter, RunOptions, WatchOptions};

pub const RUN_SUBCOMMAND: &str = "run";
pub const WATCH_SUBCOMMAND: &str = "watch";
pub const EXCLUDE_FLAG: &str = "--exclude";
pub const COVERAGE_FLAG: &str = "--coverage";
pub const PASS_WITH_NO_TESTS_FLAG: &str = "--passWithNoTests";
pub const REPORTER_FLAG: &str = "--reporter";

/// Reporter always appended so the output carries a parseable report.
pub const MACHINE_REPORTER: Reporter = Reporter::Json;

/// Build the arguments for a one-shot run.
///
/// Order: `run`, include patterns, `--exclude` pairs, `--coverage`,
/// `--passWithNoTests`, the caller's `--reporter`, then the machine reporter.
pub fn build_run_args(options: &RunOptions) -> Vec<String> {
    let mut args = vec![RUN_SUBCOMMAND.to_string()];

    args.extend(options.include_patterns().iter().cloned());

    for pattern in options.exclude_patterns() {
        args.push(EXCLUDE_FLAG.to_string());
        args.push(pattern.clone());
    }

    if options.coverage_enabled() {
        args.push(COVERAGE_FLAG.to_string());
    }

    if options.pass_with_no_tests_enabled() {
        args.push(PASS_WITH_NO_TESTS_FLAG.to_string());
    }

    // Asking for json explicitly is already satisfied by the trailing pair.
    if let Some(reporter) = options.reporter.filter(|r| *r != MACHINE_REPORTER) {
        args.push(REPORTER_FLAG.to_string());
        args.push(reporter.as_str().to_string());
    }

    args.push(REPORTER_FLAG.to_string());
    args.push(MACHINE_REPORTER.as_str().to_string());

    args
}

/// Build the arguments for watch mode: `watch` followed by include patterns.
pub fn build_watch_args(options: &WatchOptions) -> Vec<String> {
    let mut args = vec![WATCH_SUBCOMMAND.to_string()];
    args.extend(options.include_patterns().iter().cloned());
    args
}
