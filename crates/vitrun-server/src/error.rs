//! Error types for procedure registration and calls.

use thiserror::Error;
use vitrun_core::{CoreError, ValidationError};
use vitrun_runner::RunnerError;

/// Errors surfaced by a procedure call.
///
/// Anything the runner can recover from (failing tests, unreadable output)
/// is already folded into the procedure's result and never reaches here.
#[derive(Debug, Error)]
pub enum ProcedureError {
    /// No procedure is registered under the requested path.
    #[error("Procedure not found: {0}")]
    NotFound(String),

    /// Input or output did not match the declared schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The runner could not be started or observed.
    #[error(transparent)]
    Runner(#[from] RunnerError),

    /// The call exceeded the configured deadline and its process was killed.
    #[error("Run timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
}

impl ProcedureError {
    /// Stable machine-readable code for responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(e) if e.is_input() => "INVALID_INPUT",
            Self::Validation(_) => "INVALID_OUTPUT",
            Self::Runner(e) if e.is_spawn_failure() => "SPAWN_FAILED",
            Self::Runner(_) => "RUNNER_FAILED",
            Self::Timeout { .. } => "TIMEOUT",
        }
    }
}

/// Errors raised while registering procedures.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The path is already taken, or appears twice in one batch.
    #[error("Procedure already registered: {0}")]
    DuplicatePath(String),

    /// A procedure path could not be constructed.
    #[error(transparent)]
    InvalidPath(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let input = ProcedureError::from(ValidationError::Input {
            path: "vitest.run".to_string(),
            message: "bad".to_string(),
        });
        assert_eq!(input.code(), "INVALID_INPUT");

        let output = ProcedureError::from(ValidationError::Output {
            path: "vitest.run".to_string(),
            message: "bad".to_string(),
        });
        assert_eq!(output.code(), "INVALID_OUTPUT");

        let spawn = ProcedureError::from(RunnerError::Spawn {
            program: "npx".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(spawn.code(), "SPAWN_FAILED");

        let capture = ProcedureError::from(RunnerError::Capture("closed".to_string()));
        assert_eq!(capture.code(), "RUNNER_FAILED");

        assert_eq!(ProcedureError::Timeout { timeout_ms: 5_000 }.code(), "TIMEOUT");
        assert_eq!(ProcedureError::NotFound("x.y".to_string()).code(), "NOT_FOUND");
    }
}
