//! Structured report extraction from runner output.
//!
//! The json reporter prints one object describing the whole run, but it can be
//! surrounded by arbitrary log lines. The scanner below walks brace depth
//! (ignoring braces inside string literals) to find the first complete object
//! with a top-level `success` field, and everything that cannot be parsed
//! degrades to a verdict based on the exit code alone.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use vitrun_core::RunResult;

use crate::process::ProcessOutput;

/// Top-level key that identifies the run report among other JSON objects.
const SUCCESS_KEY: &str = "success";

/// The same key as it appears in JSON text.
pub const DISCRIMINATOR: &str = "\"success\"";

/// The subset of the json reporter's output we read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport {
    success: Option<bool>,
    num_passed_tests: Option<u64>,
    num_failed_tests: Option<u64>,
    num_pending_tests: Option<u64>,
    start_time: Option<f64>,
}

/// Build a [`RunResult`] from captured runner output, using the current time
/// for the duration.
pub fn extract(output: &ProcessOutput) -> RunResult {
    let now_ms = chrono::Utc::now().timestamp_millis();
    extract_result(&output.stdout, output.exit_code, now_ms)
}

/// Build a [`RunResult`] from `text` and `exit_code`. Never fails.
pub fn extract_result(text: &str, exit_code: i32, now_ms: i64) -> RunResult {
    let Some(candidate) = find_report(text) else {
        debug!(exit_code, "No structured report in runner output");
        return degraded(exit_code);
    };

    match serde_json::from_str::<JsonReport>(candidate) {
        Ok(report) => from_report(report, exit_code, now_ms),
        Err(e) => {
            warn!(error = %e, exit_code, "Runner report did not parse, using exit code");
            degraded(exit_code)
        }
    }
}

/// Verdict derived only from the exit code.
pub fn degraded(exit_code: i32) -> RunResult {
    let success = exit_code == 0;
    RunResult {
        success,
        passed: 0,
        failed: if success { 0 } else { 1 },
        skipped: 0,
        duration: 0,
        coverage: None,
    }
}

fn from_report(report: JsonReport, exit_code: i32, now_ms: i64) -> RunResult {
    let duration = match report.start_time {
        Some(start) if start > 0.0 => (now_ms as f64 - start).max(0.0) as u64,
        _ => 0,
    };

    RunResult {
        success: report.success.unwrap_or(exit_code == 0),
        passed: report.num_passed_tests.unwrap_or(0),
        failed: report.num_failed_tests.unwrap_or(0),
        skipped: report.num_pending_tests.unwrap_or(0),
        duration,
        coverage: None,
    }
}

/// Find the first balanced `{...}` substring that is the run report.
///
/// Candidates are taken in order of their opening brace. A candidate is the
/// report when it parses as a JSON object with a top-level `success` key, or
/// when it is not valid JSON but mentions [`DISCRIMINATOR`]; the latter is
/// returned unrepaired so the caller degrades. Any other balanced object is
/// skipped whole, and an opening brace that never closes is skipped alone.
pub fn find_report(text: &str) -> Option<&str> {
    let mut cursor = 0;

    for (start, end) in brace_spans(text.as_bytes()) {
        let Some(end) = end else { continue };
        if start < cursor {
            continue;
        }

        let candidate = &text[start..=end];
        if is_report(candidate) {
            return Some(candidate);
        }
        cursor = end + 1;
    }

    None
}

fn is_report(candidate: &str) -> bool {
    match serde_json::from_str::<Map<String, Value>>(candidate) {
        Ok(object) => object.contains_key(SUCCESS_KEY),
        Err(_) => candidate.contains(DISCRIMINATOR),
    }
}

/// Every `{` in `bytes` with the index of its closing `}`, in order of the
/// opening brace. Unclosed braces map to `None`.
///
/// One pass with a stack of open braces. Quotes only open string literals
/// inside an object, so stray quotes in surrounding log text are ignored.
/// Every delimiter is ASCII, so all indices are char boundaries.
fn brace_spans(bytes: &[u8]) -> Vec<(usize, Option<usize>)> {
    let mut spans: Vec<(usize, Option<usize>)> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (index, &byte) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' if !open.is_empty() => in_string = true,
            b'{' => {
                open.push(spans.len());
                spans.push((index, None));
            }
            b'}' => {
                if let Some(span) = open.pop() {
                    spans[span].1 = Some(index);
                }
            }
            _ => {}
        }
    }

    spans
}
