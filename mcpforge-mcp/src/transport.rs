//! Transport selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{McpError, McpResult};
use crate::http::{serve_http, SessionMode};
use crate::server::McpServer;

/// Address HTTP transports bind to when none is given.
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:3000";

/// How a generated server talks to its clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServerMode {
    /// Line-delimited JSON-RPC on stdin/stdout.
    #[default]
    Stdio,
    /// `POST /mcp`, every request independent.
    HttpStateless,
    /// `POST /mcp` with `Mcp-Session-Id` sessions.
    HttpSession,
}

impl ServerMode {
    /// All modes, in menu order.
    pub const ALL: [ServerMode; 3] = [Self::Stdio, Self::HttpStateless, Self::HttpSession];

    /// Mode name as used on the command line and in templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::HttpStateless => "http-stateless",
            Self::HttpSession => "http-session",
        }
    }

    /// One-line description for menus and docs.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Stdio => "Standard input/output, for local MCP clients",
            Self::HttpStateless => "Streamable HTTP without sessions",
            Self::HttpSession => "Streamable HTTP with session management",
        }
    }

    /// Check if this mode serves over HTTP.
    pub fn is_http(&self) -> bool {
        !matches!(self, Self::Stdio)
    }
}

impl fmt::Display for ServerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerMode {
    type Err = McpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim())
            .ok_or_else(|| McpError::UnknownMode(s.to_string()))
    }
}

/// Serve until the transport closes.
pub async fn serve(server: Arc<McpServer>, mode: ServerMode, addr: SocketAddr) -> McpResult<()> {
    match mode {
        ServerMode::Stdio => server.run_stdio().await,
        ServerMode::HttpStateless => serve_http(server, addr, SessionMode::Stateless).await,
        ServerMode::HttpSession => serve_http(server, addr, SessionMode::Sessions).await,
    }
}
