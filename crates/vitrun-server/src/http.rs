//! HTTP JSON API over the procedure registry.
//!
//! Provides endpoints for:
//! - Health check (`/health`)
//! - Procedure discovery (`GET /v1/procedures`)
//! - Procedure calls (`POST /v1/procedures/{namespace}/{name}`)

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vitrun_core::ProcedurePath;

use crate::error::ProcedureError;
use crate::registry::{CallContext, JsonObject, ProcedureMeta, ProcedureRegistry};

// ============================================================================
// Request / response types
// ============================================================================

/// Body of a procedure call.
#[derive(Debug, Deserialize)]
pub struct CallRequest {
    /// Procedure input. Missing params mean an empty object.
    #[serde(default = "empty_params")]
    pub params: Value,
}

fn empty_params() -> Value {
    Value::Object(JsonObject::new())
}

/// Generic procedure response wrapper.
#[derive(Debug, Serialize)]
pub struct ProcedureResponse {
    /// Procedure output on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error details on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ProcedureResponse {
    pub fn ok(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn err(code: &str, message: &str) -> Self {
        Self {
            result: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// Error details.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error code.
    pub code: String,

    /// Human-readable error message.
    pub message: String,
}

/// One entry of the procedure listing.
#[derive(Debug, Serialize)]
pub struct ProcedureInfo {
    pub path: String,
    pub meta: ProcedureMeta,
    pub input: Arc<JsonObject>,
    pub output: Arc<JsonObject>,
}

/// Response for the procedure listing.
#[derive(Debug, Serialize)]
pub struct ListProceduresResponse {
    pub procedures: Vec<ProcedureInfo>,
}

/// HTTP status for a failed call.
pub fn status_for(error: &ProcedureError) -> StatusCode {
    match error {
        ProcedureError::NotFound(_) => StatusCode::NOT_FOUND,
        ProcedureError::Validation(_) => StatusCode::BAD_REQUEST,
        ProcedureError::Runner(e) if e.is_spawn_failure() => StatusCode::BAD_GATEWAY,
        ProcedureError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ProcedureError::Runner(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ============================================================================
// Router
// ============================================================================

/// Create the HTTP router.
pub fn create_router(registry: Arc<ProcedureRegistry>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/v1/procedures", get(list_procedures))
        .route("/v1/procedures/:namespace/:name", post(call_procedure))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(registry)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_procedures(State(registry): State<Arc<ProcedureRegistry>>) -> impl IntoResponse {
    let procedures = registry
        .procedures()
        .map(|p| ProcedureInfo {
            path: p.path().to_string(),
            meta: p.meta().clone(),
            input: p.input_schema(),
            output: p.output_schema(),
        })
        .collect();

    Json(ListProceduresResponse { procedures })
}

async fn call_procedure(
    State(registry): State<Arc<ProcedureRegistry>>,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<CallRequest>,
) -> impl IntoResponse {
    let Ok(path) = ProcedurePath::new(namespace.as_str(), name.as_str()) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ProcedureResponse::err(
                "NOT_FOUND",
                &format!("Procedure not found: {namespace}.{name}"),
            )),
        );
    };

    let ctx = CallContext::new().with_metadata("source", "http");
    match registry.call(&path, request.params, &ctx).await {
        Ok(output) => (StatusCode::OK, Json(ProcedureResponse::ok(output))),
        Err(e) => (
            status_for(&e),
            Json(ProcedureResponse::err(e.code(), &e.to_string())),
        ),
    }
}
