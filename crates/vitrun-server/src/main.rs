//! vitrun - run vitest as structured procedures from the command line, over
//! HTTP, or over MCP.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vitrun_core::ProcedurePath;

use vitrun_server::cli::{Cli, Invocation};
use vitrun_server::http::{create_router, ProcedureResponse};
use vitrun_server::mcp::create_mcp_router;
use vitrun_server::{build_registry, CallContext, ProcedureRegistry, ServerConfig};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries procedure output only.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("vitrun=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Flags are generated from procedure metadata, which does not depend on
    // runner configuration.
    let cli = Cli::try_parse_from(&build_registry(&ServerConfig::default())?, std::env::args_os())
        .unwrap_or_else(|e| e.exit());

    let mut config = cli.global.apply(ServerConfig::default());

    match cli.invocation {
        Invocation::Serve(serve) => {
            config.bind_addr = serve.addr;
            let registry = Arc::new(build_registry(&config)?);
            serve_registry(registry, &config.bind_addr).await?;
            Ok(ExitCode::SUCCESS)
        }
        Invocation::Call { path, input } => {
            let registry = build_registry(&config)?;
            call_once(&registry, &path, input).await
        }
    }
}

async fn call_once(
    registry: &ProcedureRegistry,
    path: &ProcedurePath,
    input: serde_json::Value,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let ctx = CallContext::new().with_metadata("source", "cli");

    match registry.call(path, input, &ctx).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let response = ProcedureResponse::err(e.code(), &e.to_string());
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn serve_registry(
    registry: Arc<ProcedureRegistry>,
    bind_addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = bind_addr.parse()?;
    let ct = CancellationToken::new();

    let router = create_router(registry.clone()).merge(create_mcp_router(registry, ct.clone()));

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "HTTP server listening (procedures, MCP at /mcp)");

    let shutdown = ct.clone();
    let result = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutting down");
            shutdown.cancel();
        })
        .await;

    if let Err(e) = result {
        error!(error = %e, "HTTP server error");
        return Err(e.into());
    }

    info!("vitrun server stopped");
    Ok(())
}
