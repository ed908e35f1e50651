//! Vitest executor tying argument building, process execution, and report
//! extraction together.

use std::path::PathBuf;
use std::time::SystemTime;

use tracing::info;
use vitrun_core::{RunOptions, RunResult, WatchOptions, WatchResult};

use crate::args::{build_run_args, build_watch_args};
use crate::config::RunnerConfig;
use crate::coverage;
use crate::error::RunnerError;
use crate::extract;
use crate::process;
use crate::watch;

/// Executor for vitest runs and watchers.
///
/// Holds only launch configuration; every call spawns its own process, so a
/// single executor can serve any number of concurrent calls.
///
/// # Example
///
/// ```rust,no_run
/// use vitrun_core::WatchOptions;
/// use vitrun_runner::{RunnerConfig, VitestExecutor};
///
/// async fn start() -> Result<(), Box<dyn std::error::Error>> {
///     let executor = VitestExecutor::new(
///         RunnerConfig::new("pnpm").with_base_args(["exec", "vitest"]),
///     );
///
///     let watcher = executor
///         .watch(&WatchOptions::default().with_include(["src/"]))
///         .await?;
///     println!("Watcher pid: {}", watcher.pid);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct VitestExecutor {
    config: RunnerConfig,
}

impl VitestExecutor {
    /// Create a new executor with the given launch configuration.
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Launch configuration in use.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the suite once and report the outcome.
    ///
    /// Only a runner that could not be started (or observed) is an error.
    /// Failing tests and unparseable output both produce a `RunResult`.
    pub async fn run(&self, options: &RunOptions) -> Result<RunResult, RunnerError> {
        let cwd = resolve_cwd(options.cwd.as_deref())?;
        let argv = self.config.argv(&build_run_args(options));

        info!(
            program = %self.config.program,
            cwd = %cwd.display(),
            args = ?argv,
            "Starting vitest run"
        );

        let started = SystemTime::now();
        let output = process::run_captured(&self.config.program, &argv, &cwd).await?;
        let mut result = extract::extract(&output);

        if options.coverage_enabled() {
            result.coverage = coverage::read_summary(&cwd, started).await;
        }

        info!(
            success = result.success,
            passed = result.passed,
            failed = result.failed,
            skipped = result.skipped,
            duration_ms = result.duration,
            "Vitest run finished"
        );

        Ok(result)
    }

    /// Start a detached watcher and return immediately.
    pub async fn watch(&self, options: &WatchOptions) -> Result<WatchResult, RunnerError> {
        let cwd = resolve_cwd(options.cwd.as_deref())?;
        let argv = self.config.argv(&build_watch_args(options));

        info!(
            program = %self.config.program,
            cwd = %cwd.display(),
            args = ?argv,
            "Starting vitest watch"
        );

        let pid = watch::spawn_detached(&self.config.program, &argv, &cwd)?;
        Ok(WatchResult::started(pid))
    }
}

fn resolve_cwd(cwd: Option<&str>) -> Result<PathBuf, RunnerError> {
    match cwd {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => std::env::current_dir().map_err(RunnerError::WorkingDirectory),
    }
}
