//! The `vitest run` and `vitest watch` procedures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;
use vitrun_core::{ProcedurePath, RunOptions, RunResult, WatchOptions, WatchResult};
use vitrun_runner::VitestExecutor;

use crate::config::ServerConfig;
use crate::error::{ProcedureError, RegistryError};
use crate::registry::{
    ArgType, CallContext, Handler, Procedure, ProcedureMeta, ProcedureRegistry, Schema,
};

/// Namespace both procedures live under.
pub const NAMESPACE: &str = "vitest";

/// Handler for `vitest.run`.
pub struct RunHandler {
    executor: Arc<VitestExecutor>,
    timeout: Option<Duration>,
}

impl RunHandler {
    pub fn new(executor: Arc<VitestExecutor>, timeout: Option<Duration>) -> Self {
        Self { executor, timeout }
    }
}

#[async_trait]
impl Handler for RunHandler {
    type Input = RunOptions;
    type Output = RunResult;

    async fn call(
        &self,
        input: RunOptions,
        ctx: &CallContext,
    ) -> Result<RunResult, ProcedureError> {
        let run = self.executor.run(&input);

        let Some(limit) = self.timeout else {
            return Ok(run.await?);
        };

        // Dropping the run future kills the child.
        match tokio::time::timeout(limit, run).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                let timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                warn!(call_id = %ctx.call_id, timeout_ms, "Vitest run timed out");
                Err(ProcedureError::Timeout { timeout_ms })
            }
        }
    }
}

/// Handler for `vitest.watch`.
pub struct WatchHandler {
    executor: Arc<VitestExecutor>,
}

impl WatchHandler {
    pub fn new(executor: Arc<VitestExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Handler for WatchHandler {
    type Input = WatchOptions;
    type Output = WatchResult;

    async fn call(
        &self,
        input: WatchOptions,
        _ctx: &CallContext,
    ) -> Result<WatchResult, ProcedureError> {
        Ok(self.executor.watch(&input).await?)
    }
}

fn run_meta() -> ProcedureMeta {
    ProcedureMeta::new("Run vitest tests")
        .with_arg("cwd", ArgType::String, "Working directory")
        .with_arg("include", ArgType::Array, "Test file patterns to include")
        .with_arg("exclude", ArgType::Array, "Test file patterns to exclude")
        .with_arg("coverage", ArgType::Boolean, "Enable coverage")
        .with_arg(
            "reporter",
            ArgType::String,
            "Reporter (default, verbose, json, junit)",
        )
        .with_arg(
            "passWithNoTests",
            ArgType::Boolean,
            "Pass when no tests are found",
        )
        .with_short('c', "coverage")
}

fn watch_meta() -> ProcedureMeta {
    ProcedureMeta::new("Start vitest in watch mode")
        .with_arg("cwd", ArgType::String, "Working directory")
        .with_arg("include", ArgType::Array, "Test file patterns to include")
}

/// The two vitest procedures, sharing one executor.
pub fn vitest_procedures(config: &ServerConfig) -> Result<Vec<Procedure>, RegistryError> {
    let executor = Arc::new(VitestExecutor::new(config.runner.clone()));

    Ok(vec![
        Procedure::new(
            ProcedurePath::new(NAMESPACE, "run")?,
            Schema::new(),
            Schema::new(),
            run_meta(),
            RunHandler::new(executor.clone(), config.run_timeout),
        ),
        Procedure::new(
            ProcedurePath::new(NAMESPACE, "watch")?,
            Schema::new(),
            Schema::new(),
            watch_meta(),
            WatchHandler::new(executor),
        ),
    ])
}

/// Build a registry holding every procedure this server exposes.
pub fn build_registry(config: &ServerConfig) -> Result<ProcedureRegistry, RegistryError> {
    let mut registry = ProcedureRegistry::new();
    registry.register_procedures(vitest_procedures(config)?)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vitrun_runner::RunnerConfig;

    fn path(name: &str) -> ProcedurePath {
        ProcedurePath::new(NAMESPACE, name).unwrap()
    }

    #[cfg(unix)]
    fn fake_config(script: &str) -> ServerConfig {
        ServerConfig {
            runner: RunnerConfig::new("sh").with_base_args(["-c", script, "vitest"]),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_registry_exposes_both_procedures() {
        let registry = build_registry(&ServerConfig::default()).unwrap();
        let paths: Vec<String> = registry.procedures().map(|p| p.path().to_string()).collect();
        assert_eq!(paths, ["vitest.run", "vitest.watch"]);

        let run = registry.get(&path("run")).unwrap();
        assert_eq!(run.meta().description, "Run vitest tests");
        assert_eq!(run.meta().short_for("coverage"), Some('c'));
        assert_eq!(run.meta().args.len(), 6);

        let watch = registry.get(&path("watch")).unwrap();
        let names: Vec<&str> = watch.meta().args.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["cwd", "include"]);
    }

    #[test]
    fn test_registering_twice_is_rejected() {
        let config = ServerConfig::default();
        let mut registry = build_registry(&config).unwrap();
        let err = registry
            .register_procedures(vitest_procedures(&config).unwrap())
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicatePath(_)));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_reporter_is_rejected() {
        let registry = build_registry(&ServerConfig::default()).unwrap();
        let err = registry
            .call(&path("run"), json!({ "reporter": "tap" }), &CallContext::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_returns_parsed_result() {
        let registry = build_registry(&fake_config(
            r#"echo '{"success":true,"numPassedTests":4,"numFailedTests":0,"numPendingTests":1}'"#,
        ))
        .unwrap();

        let output = registry
            .call(&path("run"), json!({}), &CallContext::new())
            .await
            .unwrap();

        assert_eq!(output["success"], true);
        assert_eq!(output["passed"], 4);
        assert_eq!(output["skipped"], 1);
        assert!(output.get("coverage").is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_exceeding_deadline_times_out() {
        let config = ServerConfig {
            run_timeout: Some(Duration::from_millis(100)),
            ..fake_config("sleep 5")
        };
        let registry = build_registry(&config).unwrap();

        let err = registry
            .call(&path("run"), json!({}), &CallContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcedureError::Timeout { timeout_ms: 100 }));
        assert_eq!(err.code(), "TIMEOUT");
        assert_eq!(err.to_string(), "Run timed out after 100 ms");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_watch_returns_started() {
        let registry = build_registry(&fake_config("sleep 1")).unwrap();
        let output = registry
            .call(&path("watch"), json!({ "include": ["tests/a.spec"] }), &CallContext::new())
            .await
            .unwrap();

        assert_eq!(output["status"], "started");
        assert!(output["pid"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let config = ServerConfig {
            runner: RunnerConfig::new("vitrun-definitely-not-a-real-binary"),
            ..ServerConfig::default()
        };
        let registry = build_registry(&config).unwrap();
        let cwd = std::env::temp_dir().to_string_lossy().into_owned();

        for name in ["run", "watch"] {
            let err = registry
                .call(&path(name), json!({ "cwd": cwd }), &CallContext::new())
                .await
                .unwrap_err();
            assert_eq!(err.code(), "SPAWN_FAILED", "{name}");
        }
    }
}
