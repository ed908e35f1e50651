//! Detached watcher processes.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{error, info};

use crate::error::RunnerError;

#[cfg(windows)]
const DETACHED_PROCESS: u32 = 0x0000_0008;
#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

/// Start `program` with `args` in `cwd`, detached from this process group,
/// and return its pid without waiting on it.
///
/// All stdio is null. The child is deliberately not killed when its handle is
/// dropped, so the watcher outlives the request that started it. A pid of
/// zero means the OS did not report one.
pub fn spawn_detached(program: &str, args: &[String], cwd: &Path) -> Result<u32, RunnerError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false);

    #[cfg(unix)]
    cmd.process_group(0);

    #[cfg(windows)]
    cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);

    let child = cmd.spawn().map_err(|source| {
        error!(program = %program, cwd = %cwd.display(), error = %source, "Failed to spawn watcher");
        RunnerError::Spawn {
            program: program.to_string(),
            source,
        }
    })?;

    let pid = child.id().unwrap_or(0);
    info!(pid = pid, program = %program, cwd = %cwd.display(), "Watcher started");

    Ok(pid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_returns_before_child_exits() {
        let args = vec!["-c".to_string(), "sleep 5".to_string()];
        let started = std::time::Instant::now();

        let pid = spawn_detached("sh", &args, &std::env::temp_dir()).unwrap();

        assert!(pid > 0);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_child_runs_in_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let args = vec!["-c".to_string(), "touch started.txt".to_string()];

        spawn_detached("sh", &args, dir.path()).unwrap();

        let marker = dir.path().join("started.txt");
        for _ in 0..50 {
            if marker.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let err = spawn_detached("vitrun-definitely-not-a-real-binary", &[], &std::env::temp_dir())
            .unwrap_err();
        assert!(err.is_spawn_failure());
    }
}
