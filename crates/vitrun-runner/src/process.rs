//! Child process execution with captured output.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::error::RunnerError;

/// Exit code reported when the process was terminated by a signal.
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// What the runner left behind once it exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Everything written to stdout, lossily decoded as UTF-8.
    pub stdout: String,

    /// Exit code, or [`SIGNAL_EXIT_CODE`] if the process had none.
    pub exit_code: i32,
}

impl ProcessOutput {
    /// Create a new `ProcessOutput`.
    pub fn new(stdout: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code,
        }
    }

    /// Check if the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Run `program` with `args` in `cwd` and wait for it to exit.
///
/// Stdin is closed, stdout is collected, and stderr is drained into the log.
/// The child is killed if the returned future is dropped before completion,
/// so wrapping this in `tokio::time::timeout` bounds the process lifetime.
pub async fn run_captured(
    program: &str,
    args: &[String],
    cwd: &Path,
) -> Result<ProcessOutput, RunnerError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!("Full command: {:?}", cmd);

    let mut child = cmd.spawn().map_err(|source| {
        error!(program = %program, cwd = %cwd.display(), error = %source, "Failed to spawn runner");
        RunnerError::Spawn {
            program: program.to_string(),
            source,
        }
    })?;

    info!(pid = ?child.id(), program = %program, "Runner process spawned");

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| RunnerError::Capture("Failed to get stdout".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RunnerError::Capture("Failed to get stderr".to_string()))?;

    // Drain stderr concurrently so a chatty runner never blocks on a full pipe.
    let stderr_task = tokio::spawn(async move {
        let mut reader = BufReader::new(stderr);
        let mut line = String::new();
        let mut lines = 0usize;
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    lines += 1;
                    let trimmed = line.trim_end();
                    if !trimmed.is_empty() {
                        debug!(stderr = %trimmed, "Runner stderr");
                    }
                }
                Err(e) => {
                    debug!(error = %e, "Stopped reading runner stderr");
                    break;
                }
            }
        }
        lines
    });

    let mut buf = Vec::new();
    stdout
        .read_to_end(&mut buf)
        .await
        .map_err(|e| RunnerError::Capture(e.to_string()))?;

    let status = child.wait().await.map_err(RunnerError::Wait)?;
    let stderr_lines = stderr_task.await.unwrap_or_default();

    let exit_code = status.code().unwrap_or(SIGNAL_EXIT_CODE);
    info!(
        exit_code = exit_code,
        success = status.success(),
        stdout_bytes = buf.len(),
        stderr_lines = stderr_lines,
        "Runner process exited"
    );

    Ok(ProcessOutput::new(
        String::from_utf8_lossy(&buf).into_owned(),
        exit_code,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_output_success() {
        assert!(ProcessOutput::new("", 0).success());
        assert!(!ProcessOutput::new("", 1).success());
        assert!(!ProcessOutput::new("", SIGNAL_EXIT_CODE).success());
    }

    #[cfg(unix)]
    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stdout_and_exit_code() {
        let cwd = std::env::temp_dir();
        let output = run_captured("sh", &sh("echo hello; echo oops 1>&2; exit 3"), &cwd)
            .await
            .unwrap();

        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.exit_code, 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();

        let output = run_captured("sh", &sh("cat marker.txt"), dir.path())
            .await
            .unwrap();
        assert_eq!(output.stdout, "here");
        assert!(output.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_large_output_on_both_streams() {
        let script = "i=0; while [ $i -lt 20000 ]; do echo out-$i; echo err-$i 1>&2; i=$((i+1)); done";
        let output = run_captured("sh", &sh(script), &std::env::temp_dir())
            .await
            .unwrap();

        assert_eq!(output.stdout.lines().count(), 20000);
        assert!(output.stdout.lines().all(|l| l.starts_with("out-")));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let err = run_captured(
            "vitrun-definitely-not-a-real-binary",
            &[],
            &std::env::temp_dir(),
        )
        .await
        .unwrap_err();

        assert!(err.is_spawn_failure());
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_directory_is_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = run_captured("sh", &sh("true"), &missing).await.unwrap_err();
        assert!(err.is_spawn_failure());
    }
}
