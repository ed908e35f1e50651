//! Coverage summary lookup.
//!
//! The json reporter does not carry coverage numbers. When the project is set
//! up with istanbul's `json-summary` coverage reporter, the totals land in
//! `coverage/coverage-summary.json` under the working directory.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use vitrun_core::CoverageSummary;

const SUMMARY_PATH: &[&str] = &["coverage", "coverage-summary.json"];

/// Filesystem timestamps can be coarser than the run itself.
const MTIME_SLACK: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct SummaryFile {
    total: Totals,
}

#[derive(Debug, Deserialize)]
struct Totals {
    lines: Metric,
    branches: Metric,
    functions: Metric,
    statements: Metric,
}

#[derive(Debug, Deserialize)]
struct Metric {
    // istanbul writes "Unknown" when there is nothing to measure
    pct: Value,
}

impl Metric {
    fn percent(&self) -> f64 {
        self.pct.as_f64().unwrap_or(0.0)
    }
}

pub(crate) fn summary_path(cwd: &Path) -> PathBuf {
    SUMMARY_PATH.iter().fold(cwd.to_path_buf(), |p, s| p.join(s))
}

/// Read the coverage totals written during a run that started at `started`.
///
/// Returns `None` if the file is missing, older than the run, or malformed.
pub(crate) async fn read_summary(cwd: &Path, started: SystemTime) -> Option<CoverageSummary> {
    let path = summary_path(cwd);

    let modified = tokio::fs::metadata(&path).await.ok()?.modified().ok()?;
    if modified + MTIME_SLACK < started {
        debug!(path = %path.display(), "Ignoring coverage summary from an earlier run");
        return None;
    }

    let contents = tokio::fs::read_to_string(&path).await.ok()?;
    parse_summary(&contents)
}

fn parse_summary(contents: &str) -> Option<CoverageSummary> {
    match serde_json::from_str::<SummaryFile>(contents) {
        Ok(file) => Some(CoverageSummary {
            lines: file.total.lines.percent(),
            branches: file.total.branches.percent(),
            functions: file.total.functions.percent(),
            statements: file.total.statements.percent(),
        }),
        Err(e) => {
            debug!(error = %e, "Coverage summary did not parse");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = r#"{
        "total": {
            "lines": {"total": 10, "covered": 8, "skipped": 0, "pct": 80},
            "statements": {"total": 12, "covered": 9, "skipped": 0, "pct": 75},
            "functions": {"total": 0, "covered": 0, "skipped": 0, "pct": "Unknown"},
            "branches": {"total": 4, "covered": 1, "skipped": 0, "pct": 25.5}
        },
        "/repo/src/a.ts": {}
    }"#;

    #[test]
    fn test_parse_summary() {
        let summary = parse_summary(SUMMARY).unwrap();
        assert_eq!(summary.lines, 80.0);
        assert_eq!(summary.statements, 75.0);
        assert_eq!(summary.functions, 0.0);
        assert_eq!(summary.branches, 25.5);
    }

    #[test]
    fn test_parse_summary_malformed() {
        assert!(parse_summary("{}").is_none());
        assert!(parse_summary("not json").is_none());
    }

    #[tokio::test]
    async fn test_read_summary_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("coverage")).unwrap();
        std::fs::write(summary_path(dir.path()), SUMMARY).unwrap();

        let started = SystemTime::now() - Duration::from_secs(60);
        let summary = read_summary(dir.path(), started).await.unwrap();
        assert_eq!(summary.lines, 80.0);
    }

    #[tokio::test]
    async fn test_read_summary_ignores_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("coverage")).unwrap();
        std::fs::write(summary_path(dir.path()), SUMMARY).unwrap();

        let started = SystemTime::now() + Duration::from_secs(3600);
        assert!(read_summary(dir.path(), started).await.is_none());
    }

    #[tokio::test]
    async fn test_read_summary_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_summary(dir.path(), SystemTime::now()).await.is_none());
    }
}
