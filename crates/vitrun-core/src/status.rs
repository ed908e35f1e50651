//! Lifecycle status of a watch process.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle status reported by `vitest watch`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    /// The watcher process was spawned.
    #[default]
    Started,
    /// The watcher process is no longer running.
    Stopped,
}
