//! Procedure registry.
//!
//! Procedures are plain records registered in batches. Once the registry is
//! shared (behind an `Arc`) it is never mutated again.

mod procedure;
mod schema;

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use tracing::{info, warn};
use vitrun_core::ProcedurePath;

use crate::error::{ProcedureError, RegistryError};

pub use procedure::{
    ArgMeta, ArgType, CallContext, Handler, OutputFormat, Procedure, ProcedureMeta,
};
pub use schema::{JsonObject, Schema};

/// Registered procedures, keyed and ordered by path.
#[derive(Debug, Default)]
pub struct ProcedureRegistry {
    procedures: BTreeMap<ProcedurePath, Procedure>,
}

impl ProcedureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a batch of procedures.
    ///
    /// The batch is all-or-nothing: a path that is already registered, or
    /// that appears twice in `procedures`, rejects the whole batch.
    pub fn register_procedures(
        &mut self,
        procedures: impl IntoIterator<Item = Procedure>,
    ) -> Result<(), RegistryError> {
        let batch: Vec<Procedure> = procedures.into_iter().collect();

        let mut seen = HashSet::new();
        for procedure in &batch {
            let path = procedure.path();
            if self.procedures.contains_key(path) || !seen.insert(path.clone()) {
                return Err(RegistryError::DuplicatePath(path.to_string()));
            }
        }

        for procedure in batch {
            info!(path = %procedure.path(), "Registered procedure");
            self.procedures.insert(procedure.path().clone(), procedure);
        }

        Ok(())
    }

    /// Look up a procedure by path.
    pub fn get(&self, path: &ProcedurePath) -> Option<&Procedure> {
        self.procedures.get(path)
    }

    /// All procedures in path order.
    pub fn procedures(&self) -> impl Iterator<Item = &Procedure> {
        self.procedures.values()
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Call the procedure at `path` with untyped input.
    pub async fn call(
        &self,
        path: &ProcedurePath,
        input: Value,
        ctx: &CallContext,
    ) -> Result<Value, ProcedureError> {
        let Some(procedure) = self.get(path) else {
            warn!(path = %path, call_id = %ctx.call_id, "Unknown procedure");
            return Err(ProcedureError::NotFound(path.to_string()));
        };

        info!(path = %path, call_id = %ctx.call_id, "Calling procedure");

        let result = procedure.call(input, ctx).await;
        match &result {
            Ok(_) => info!(path = %path, call_id = %ctx.call_id, "Procedure completed"),
            Err(e) => warn!(
                path = %path,
                call_id = %ctx.call_id,
                code = e.code(),
                error = %e,
                "Procedure failed"
            ),
        }

        result
    }
}
