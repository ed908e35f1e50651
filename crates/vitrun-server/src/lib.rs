//! vitrun Server Library
//!
//! Procedure registry for the `vitest run` and `vitest watch` procedures,
//! plus the surfaces that expose it: a command line, an HTTP JSON API, and
//! an MCP server.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod mcp;
pub mod procedures;
pub mod registry;

pub use config::ServerConfig;
pub use error::{ProcedureError, RegistryError};
pub use procedures::build_registry;
pub use registry::{CallContext, Procedure, ProcedureRegistry};
