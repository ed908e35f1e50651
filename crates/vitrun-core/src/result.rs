//! Output records for the run and watch procedures.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::WatchStatus;

/// Coverage percentages for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CoverageSummary {
    pub lines: f64,
    pub branches: f64,
    pub functions: f64,
    pub statements: f64,
}

/// Outcome of a `vitest run` invocation.
///
/// Counts come from the runner's own report. They are not required to add up
/// to any external total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunResult {
    /// Whether the run succeeded.
    pub success: bool,

    /// Number of passed tests.
    pub passed: u64,

    /// Number of failed tests.
    pub failed: u64,

    /// Number of skipped (pending) tests.
    pub skipped: u64,

    /// Elapsed time in milliseconds.
    pub duration: u64,

    /// Coverage summary, when coverage was collected and readable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageSummary>,
}

/// Outcome of starting `vitest watch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WatchResult {
    /// Process id of the watcher, zero if the OS did not report one.
    pub pid: u32,

    /// Lifecycle status.
    pub status: WatchStatus,
}

impl WatchResult {
    /// A freshly started watcher.
    pub fn started(pid: u32) -> Self {
        Self {
            pid,
            status: WatchStatus::Started,
        }
    }
}
