//! Vitest execution for vitrun
//!
//! This crate turns [`RunOptions`](vitrun_core::RunOptions) and
//! [`WatchOptions`](vitrun_core::WatchOptions) into runner invocations:
//!
//! - [`args`] builds the argument vector
//! - [`process`] spawns the runner and captures its output
//! - [`extract`] turns captured output into a [`RunResult`](vitrun_core::RunResult)
//! - [`watch`] starts a detached watcher
//!
//! # Example
//!
//! ```rust,no_run
//! use vitrun_core::RunOptions;
//! use vitrun_runner::VitestExecutor;
//!
//! async fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let executor = VitestExecutor::default();
//!     let result = executor
//!         .run(&RunOptions::default().with_coverage(true))
//!         .await?;
//!
//!     println!("{} passed, {} failed", result.passed, result.failed);
//!     Ok(())
//! }
//! ```

pub mod args;
mod config;
mod coverage;
mod error;
mod executor;
pub mod extract;
pub mod process;
pub mod watch;

// Re-export main types
pub use config::RunnerConfig;
pub use error::RunnerError;
pub use executor::VitestExecutor;
pub use process::ProcessOutput;
