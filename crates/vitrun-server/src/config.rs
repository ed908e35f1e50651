//! Server configuration.

use std::time::Duration;

use vitrun_runner::RunnerConfig;

/// Default HTTP/MCP bind address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:50060";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server bind address.
    pub bind_addr: String,

    /// How the runner is launched.
    pub runner: RunnerConfig,

    /// Deadline for a single `vitest run` call. `None` waits indefinitely.
    pub run_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR.to_string(),
            runner: RunnerConfig::default(),
            run_timeout: None,
        }
    }
}
