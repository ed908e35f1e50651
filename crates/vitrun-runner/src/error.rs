//! Error types for runner execution.

use std::io;

use thiserror::Error;

/// Errors that can occur while launching or waiting on the runner.
///
/// A runner that starts and reports failing tests is not an error; only a
/// process that could not be created or observed ends up here.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The runner process could not be created.
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The current directory could not be resolved.
    #[error("Failed to resolve working directory: {0}")]
    WorkingDirectory(#[source] io::Error),

    /// Waiting for the runner to exit failed.
    #[error("Failed to wait for runner process: {0}")]
    Wait(#[source] io::Error),

    /// Reading the runner's output streams failed.
    #[error("Failed to capture runner output: {0}")]
    Capture(String),
}

impl RunnerError {
    /// Returns true if the process never started.
    pub fn is_spawn_failure(&self) -> bool {
        matches!(self, Self::Spawn { .. } | Self::WorkingDirectory(_))
    }
}
