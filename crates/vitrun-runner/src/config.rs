//! Runner launch configuration.

#[cfg(windows)]
const DEFAULT_PROGRAM: &str = "npx.cmd";
#[cfg(not(windows))]
const DEFAULT_PROGRAM: &str = "npx";

const DEFAULT_BASE_ARGS: &[&str] = &["vitest"];

/// How to launch the runner: the program plus the arguments placed before
/// the subcommand (`npx vitest run ...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Program to execute, looked up on PATH when not absolute.
    pub program: String,

    /// Arguments inserted before the builder's tokens.
    pub base_args: Vec<String>,
}

impl RunnerConfig {
    /// Launch `program` directly, with no leading arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
        }
    }

    /// Set the leading arguments.
    pub fn with_base_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Full argv tail: base arguments followed by `args`.
    pub fn argv(&self, args: &[String]) -> Vec<String> {
        self.base_args.iter().chain(args).cloned().collect()
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM).with_base_args(DEFAULT_BASE_ARGS.iter().copied())
    }
}
