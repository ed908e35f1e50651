//! MCP (Model Context Protocol) server implementation.
//!
//! Every registered procedure becomes one MCP tool named after its path
//! (`vitest.run`, `vitest.watch`), with the procedure's input schema.

use std::sync::Arc;

use axum::Router;
use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
    },
    ErrorData as McpError, RoleServer, ServerHandler,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;
use vitrun_core::ProcedurePath;

use crate::error::ProcedureError;
use crate::http::ErrorBody;
use crate::registry::{CallContext, JsonObject, ProcedureRegistry};

/// MCP server exposing the procedure registry as tools.
#[derive(Clone)]
pub struct VitrunMcpServer {
    registry: Arc<ProcedureRegistry>,
}

impl VitrunMcpServer {
    /// Create a new MCP server over the given registry.
    pub fn new(registry: Arc<ProcedureRegistry>) -> Self {
        Self { registry }
    }

    /// One tool per registered procedure.
    pub fn tools(&self) -> Vec<Tool> {
        self.registry
            .procedures()
            .map(|p| {
                Tool::new(
                    p.path().to_string(),
                    p.meta().description.clone(),
                    p.input_schema(),
                )
            })
            .collect()
    }

    /// Call the tool `name` with `arguments`.
    ///
    /// Unknown tools are protocol errors. Procedure failures are returned as
    /// error tool results carrying the machine code.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let Ok(path) = name.parse::<ProcedurePath>() else {
            return Err(McpError::invalid_params(format!("Unknown tool: {name}"), None));
        };

        let input = Value::Object(arguments.unwrap_or_default());
        let ctx = CallContext::new().with_metadata("source", "mcp");

        match self.registry.call(&path, input, &ctx).await {
            Ok(output) => {
                let text = serde_json::to_string_pretty(&output)
                    .unwrap_or_else(|_| output.to_string());
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(ProcedureError::NotFound(_)) => Err(McpError::invalid_params(
                format!("Unknown tool: {name}"),
                None,
            )),
            Err(e) => {
                let body = ErrorBody {
                    code: e.code().to_string(),
                    message: e.to_string(),
                };
                let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| e.to_string());
                Ok(CallToolResult::error(vec![Content::text(text)]))
            }
        }
    }
}

impl ServerHandler for VitrunMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: rmcp::model::Implementation {
                name: "vitrun".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                website_url: None,
                icons: None,
            },
            instructions: Some(
                "vitrun MCP Server - Run vitest suites. \
                 Use vitest.run for a one-shot run with a JSON summary, \
                 and vitest.watch to start a detached watcher."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(&request.name, request.arguments).await
    }
}

// ============================================================================
// HTTP Server Setup
// ============================================================================

/// Create an axum Router serving MCP over the Streamable HTTP transport at `/mcp`.
pub fn create_mcp_router(registry: Arc<ProcedureRegistry>, ct: CancellationToken) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(VitrunMcpServer::new(registry.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            cancellation_token: ct,
            ..Default::default()
        },
    );

    info!("MCP server initialized with Streamable HTTP transport");

    Router::new().nest_service("/mcp", service)
}
