//! Typed validators backed by serde and JSON Schema.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A JSON object, as used for schemas and tool arguments.
pub type JsonObject = serde_json::Map<String, Value>;

/// Validator for one side of a procedure boundary.
///
/// `parse` deserializes a JSON value into `T` and reports the first problem
/// serde finds. The JSON Schema is generated from the same type so the
/// advertised shape and the enforced shape cannot drift.
pub struct Schema<T> {
    json_schema: Arc<JsonObject>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned + JsonSchema> Schema<T> {
    /// Build the validator for `T`.
    pub fn new() -> Self {
        let json_schema = match serde_json::to_value(schemars::schema_for!(T)) {
            Ok(Value::Object(map)) => map,
            _ => JsonObject::new(),
        };
        Self {
            json_schema: Arc::new(json_schema),
            _marker: PhantomData,
        }
    }

    /// Deserialize `value` into `T`.
    ///
    /// Never panics; callers decide whether an `Err` rejects the call.
    pub fn parse(&self, value: Value) -> Result<T, String> {
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    /// The JSON Schema describing `T`.
    pub fn json_schema(&self) -> Arc<JsonObject> {
        self.json_schema.clone()
    }
}

impl<T: DeserializeOwned + JsonSchema> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vitrun_core::{RunOptions, RunResult};

    #[test]
    fn test_parse_valid_input() {
        let schema = Schema::<RunOptions>::new();
        let options = schema
            .parse(json!({ "coverage": true, "exclude": ["dist/**"] }))
            .unwrap();
        assert!(options.coverage_enabled());
        assert_eq!(options.exclude_patterns(), ["dist/**"]);
    }

    #[test]
    fn test_parse_reports_problem() {
        let schema = Schema::<RunOptions>::new();
        let err = schema.parse(json!({ "reporter": "tap" })).unwrap_err();
        assert!(err.contains("tap"));

        let err = schema.parse(json!({ "include": "not-a-list" })).unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn test_json_schema_lists_fields() {
        let schema = Schema::<RunOptions>::new().json_schema();
        let properties = schema["properties"].as_object().unwrap();
        for field in ["cwd", "include", "exclude", "coverage", "reporter", "passWithNoTests"] {
            assert!(properties.contains_key(field), "missing {field}");
        }

        let schema = Schema::<RunResult>::new().json_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("success")));
        assert!(!required.contains(&json!("coverage")));
    }
}
