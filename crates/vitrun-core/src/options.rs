//! Input records for the run and watch procedures.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Report format the caller asked the runner to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Reporter {
    Default,
    Verbose,
    Json,
    Junit,
}

impl Reporter {
    /// Convert reporter to the token the runner expects.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Json => "json",
            Self::Junit => "junit",
        }
    }
}

/// Options for a single `vitest run` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    /// Working directory. Defaults to the current directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    /// Test file patterns to include, passed as positional arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,

    /// Patterns to exclude, one `--exclude` flag each.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    /// Accepted for compatibility; the run path never watches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,

    /// Enable coverage collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<bool>,

    /// Report format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<Reporter>,

    /// Succeed when no test files are found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_with_no_tests: Option<bool>,
}

impl RunOptions {
    /// Builder method to set the working directory.
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Builder method to set include patterns.
    pub fn with_include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Builder method to set exclude patterns.
    pub fn with_exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Builder method to toggle coverage.
    pub fn with_coverage(mut self, enabled: bool) -> Self {
        self.coverage = Some(enabled);
        self
    }

    /// Builder method to set the reporter.
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Builder method to toggle `passWithNoTests`.
    pub fn with_pass_with_no_tests(mut self, enabled: bool) -> Self {
        self.pass_with_no_tests = Some(enabled);
        self
    }

    /// Include patterns, empty when unset.
    pub fn include_patterns(&self) -> &[String] {
        self.include.as_deref().unwrap_or_default()
    }

    /// Exclude patterns, empty when unset.
    pub fn exclude_patterns(&self) -> &[String] {
        self.exclude.as_deref().unwrap_or_default()
    }

    /// Returns true if coverage was requested.
    pub fn coverage_enabled(&self) -> bool {
        self.coverage.unwrap_or(false)
    }

    /// Returns true if `passWithNoTests` was requested.
    pub fn pass_with_no_tests_enabled(&self) -> bool {
        self.pass_with_no_tests.unwrap_or(false)
    }
}

/// Options for starting `vitest watch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WatchOptions {
    /// Working directory. Defaults to the current directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    /// Test file patterns to watch, passed as positional arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
}

impl WatchOptions {
    /// Builder method to set the working directory.
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Builder method to set include patterns.
    pub fn with_include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Include patterns, empty when unset.
    pub fn include_patterns(&self) -> &[String] {
        self.include.as_deref().unwrap_or_default()
    }
}
