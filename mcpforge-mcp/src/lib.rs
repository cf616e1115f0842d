//! # mcpforge-mcp
//!
//! Model Context Protocol server for generated tools.
//!
//! ## Core Concepts
//!
//! - **[`McpServer`]**: answers `initialize`, `tools/list` and `tools/call`
//! - **[`ToolHandler`]**: a callable tool; implemented for [`mcpforge_tools::HttpTool`]
//! - **[`ArtifactToolset`]**: loads a directory of tool artifacts
//! - **[`ServerMode`]**: stdio, stateless HTTP or session HTTP transport
//!
//! ## Example
//!
//! ```ignore
//! use mcpforge_mcp::{serve, ArtifactToolset, McpServer, ServerMode};
//! use std::sync::Arc;
//!
//! let server = ArtifactToolset::load("out/tools")?
//!     .with_variables(std::env::vars())
//!     .register(McpServer::new("petstore", "1.0.0"));
//!
//! serve(Arc::new(server), ServerMode::HttpSession, "127.0.0.1:3000".parse()?).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod http;
pub mod server;
pub mod toolset;
pub mod transport;
pub mod types;

// Re-exports
pub use error::{McpError, McpResult};
pub use http::{
    router, serve_http, SessionMode, SessionStore, DEFAULT_MAX_SESSIONS,
    DEFAULT_SESSION_IDLE_TIMEOUT, MCP_PATH, SESSION_HEADER,
};
pub use server::{McpServer, ToolHandler};
pub use toolset::{tools_dir, ArtifactToolset};
pub use transport::{serve, ServerMode, DEFAULT_HTTP_ADDR};
pub use types::{
    CallToolParams, CallToolResult, Implementation, InitializeResult, JsonRpcError,
    JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, ListToolsResult,
    McpTool, RequestId, ServerCapabilities, ToolResultContent, PROTOCOL_VERSION,
};
