//! Core domain errors.

use thiserror::Error;

/// Core domain errors for vitrun.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A procedure path did not have the `namespace.name` shape.
    #[error("Invalid procedure path: {0}")]
    InvalidProcedurePath(String),
}

/// A value failed the declared schema at the procedure boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The caller's input was rejected before the handler ran.
    #[error("Invalid input for '{path}': {message}")]
    Input { path: String, message: String },

    /// The handler's output was rejected after it ran.
    #[error("Invalid output from '{path}': {message}")]
    Output { path: String, message: String },
}

impl ValidationError {
    /// The procedure path the failure belongs to.
    pub fn path(&self) -> &str {
        match self {
            Self::Input { path, .. } | Self::Output { path, .. } => path,
        }
    }

    /// Returns true if the failure happened on the input side.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input { .. })
    }
}
