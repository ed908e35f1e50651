//! Identifiers for procedures and individual calls.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

/// Unique identifier for a single procedure call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(String);

impl CallId {
    /// Generate a new random CallId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-segment address of a procedure, e.g. `vitest.run`.
///
/// The first segment groups procedures (and becomes the CLI subcommand), the
/// second names the operation within the group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProcedurePath {
    namespace: String,
    name: String,
}

impl ProcedurePath {
    /// Create a path from its two segments.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self, CoreError> {
        let namespace = namespace.into();
        let name = name.into();
        if !is_valid_segment(&namespace) || !is_valid_segment(&name) {
            return Err(CoreError::InvalidProcedurePath(format!("{namespace}.{name}")));
        }
        Ok(Self { namespace, name })
    }

    /// The grouping segment (`vitest`).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The operation segment (`run`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Both segments in order.
    pub fn segments(&self) -> [&str; 2] {
        [&self.namespace, &self.name]
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl fmt::Display for ProcedurePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl FromStr for ProcedurePath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((namespace, name)) => Self::new(namespace, name),
            None => Err(CoreError::InvalidProcedurePath(s.to_string())),
        }
    }
}

impl TryFrom<String> for ProcedurePath {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ProcedurePath> for String {
    fn from(path: ProcedurePath) -> Self {
        path.to_string()
    }
}
