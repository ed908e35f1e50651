//! vitrun Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Process spawning
//! - Network/HTTP
//! - Runtime specifics
//!
//! Everything here describes the inputs and outputs of the `vitest run` and
//! `vitest watch` procedures and the identifiers used to address them.

pub mod error;
pub mod ids;
pub mod options;
pub mod result;
pub mod status;

// Re-export commonly used types
pub use error::{CoreError, ValidationError};
pub use ids::{CallId, ProcedurePath};
pub use options::{Reporter, RunOptions, WatchOptions};
pub use result::{CoverageSummary, RunResult, WatchResult};
pub use status::WatchStatus;
