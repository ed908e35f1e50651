//! Procedure definitions: path, validators, metadata, handler.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use vitrun_core::{CallId, ProcedurePath, ValidationError};

use super::schema::{JsonObject, Schema};
use crate::error::ProcedureError;

// ============================================================================
// Metadata
// ============================================================================

/// Type of a CLI-facing argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    String,
    Boolean,
    Array,
}

/// One CLI-facing argument of a procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ArgType,
    pub description: String,
}

/// How a procedure's result is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
}

/// Human-facing description of a procedure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcedureMeta {
    pub description: String,
    pub args: Vec<ArgMeta>,
    /// Single-letter aliases, e.g. `c` -> `coverage`.
    pub shorts: BTreeMap<char, String>,
    pub output: OutputFormat,
}

impl ProcedureMeta {
    /// Create metadata with a description and no arguments.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Builder method to add an argument.
    pub fn with_arg(
        mut self,
        name: impl Into<String>,
        kind: ArgType,
        description: impl Into<String>,
    ) -> Self {
        self.args.push(ArgMeta {
            name: name.into(),
            kind,
            description: description.into(),
        });
        self
    }

    /// Builder method to add a shorthand alias.
    pub fn with_short(mut self, short: char, name: impl Into<String>) -> Self {
        self.shorts.insert(short, name.into());
        self
    }

    /// Shorthand registered for the argument `name`, if any.
    pub fn short_for(&self, name: &str) -> Option<char> {
        self.shorts
            .iter()
            .find(|(_, target)| target.as_str() == name)
            .map(|(short, _)| *short)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Per-call context handed to handlers.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Identifier used to correlate log lines of one call.
    pub call_id: CallId,

    /// Free-form metadata from the caller (e.g. which front end).
    pub metadata: JsonObject,
}

impl CallContext {
    /// Create a context with a fresh call id.
    pub fn new() -> Self {
        Self {
            call_id: CallId::generate(),
            metadata: JsonObject::new(),
        }
    }

    /// Builder method to add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Typed procedure implementation.
///
/// Handlers receive input that already passed the input validator and trust
/// it; the registry validates their output before it leaves the boundary.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    type Input: DeserializeOwned + JsonSchema + Send;
    type Output: Serialize + DeserializeOwned + JsonSchema + Send;

    async fn call(
        &self,
        input: Self::Input,
        ctx: &CallContext,
    ) -> Result<Self::Output, ProcedureError>;
}

/// Handler with its types erased behind JSON values.
#[async_trait]
trait ErasedHandler: Send + Sync {
    async fn call(
        &self,
        path: &ProcedurePath,
        input: Value,
        ctx: &CallContext,
    ) -> Result<Value, ProcedureError>;
}

struct Validated<H: Handler> {
    input: Schema<H::Input>,
    output: Schema<H::Output>,
    handler: H,
}

#[async_trait]
impl<H: Handler> ErasedHandler for Validated<H> {
    async fn call(
        &self,
        path: &ProcedurePath,
        input: Value,
        ctx: &CallContext,
    ) -> Result<Value, ProcedureError> {
        let input = self
            .input
            .parse(input)
            .map_err(|message| ValidationError::Input {
                path: path.to_string(),
                message,
            })?;

        let output = self.handler.call(input, ctx).await?;

        let invalid_output = |message: String| ValidationError::Output {
            path: path.to_string(),
            message,
        };
        let value = serde_json::to_value(&output).map_err(|e| invalid_output(e.to_string()))?;
        self.output.parse(value.clone()).map_err(invalid_output)?;

        Ok(value)
    }
}

// ============================================================================
// Procedure
// ============================================================================

/// A registered unit: `{path, input, output, meta, handler}`.
#[derive(Clone)]
pub struct Procedure {
    path: ProcedurePath,
    meta: ProcedureMeta,
    input_schema: Arc<JsonObject>,
    output_schema: Arc<JsonObject>,
    handler: Arc<dyn ErasedHandler>,
}

impl Procedure {
    /// Assemble a procedure from its parts.
    pub fn new<H: Handler>(
        path: ProcedurePath,
        input: Schema<H::Input>,
        output: Schema<H::Output>,
        meta: ProcedureMeta,
        handler: H,
    ) -> Self {
        Self {
            path,
            meta,
            input_schema: input.json_schema(),
            output_schema: output.json_schema(),
            handler: Arc::new(Validated {
                input,
                output,
                handler,
            }),
        }
    }

    pub fn path(&self) -> &ProcedurePath {
        &self.path
    }

    pub fn meta(&self) -> &ProcedureMeta {
        &self.meta
    }

    pub fn input_schema(&self) -> Arc<JsonObject> {
        self.input_schema.clone()
    }

    pub fn output_schema(&self) -> Arc<JsonObject> {
        self.output_schema.clone()
    }

    /// Validate `input`, run the handler, and validate its output.
    pub async fn call(&self, input: Value, ctx: &CallContext) -> Result<Value, ProcedureError> {
        self.handler.call(&self.path, input, ctx).await
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedure")
            .field("path", &self.path)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}
