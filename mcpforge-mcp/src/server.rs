//! MCP server implementation.
//!
//! [`McpServer`] answers JSON-RPC messages for a set of [`ToolHandler`]s.
//! Transports feed it raw messages: see [`McpServer::run_stdio`] and
//! [`crate::http`].

use crate::error::{McpError, McpResult};
use crate::types::{
    CallToolParams, CallToolResult, Implementation, InitializeResult, JsonRpcError,
    JsonRpcMessage, JsonRpcResponse, ListToolsResult, McpTool, ServerCapabilities,
    ToolsCapability, PROTOCOL_VERSION,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Trait for MCP tool handlers.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Get the tool definition.
    fn definition(&self) -> McpTool;

    /// Handle a tool call.
    async fn call(&self, arguments: JsonValue) -> McpResult<CallToolResult>;
}

/// MCP server for exposing tools.
///
/// Tools are listed in registration order.
///
/// # Example
///
/// ```ignore
/// use mcpforge_mcp::{ArtifactToolset, McpServer};
///
/// let toolset = ArtifactToolset::load("out/tools")?;
/// let server = toolset.register(McpServer::new("petstore", "1.0.0"));
/// server.run_stdio().await?;
/// ```
pub struct McpServer {
    info: Implementation,
    tools: RwLock<IndexMap<String, Arc<dyn ToolHandler>>>,
    capabilities: ServerCapabilities,
}

impl McpServer {
    /// Create a new server.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: Implementation::new(name, version),
            tools: RwLock::new(IndexMap::new()),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
        }
    }

    /// Add a tool handler. A handler with the same name replaces the old one.
    pub fn tool(self, handler: impl ToolHandler + 'static) -> Self {
        self.add_tool(Arc::new(handler));
        self
    }

    /// Add a shared tool handler.
    pub fn add_tool(&self, handler: Arc<dyn ToolHandler>) {
        let name = handler.definition().name;
        if self.tools.write().insert(name.clone(), handler).is_some() {
            tracing::warn!(tool = %name, "Duplicate tool name, keeping the last definition");
        }
    }

    /// Run the server on stdio.
    pub async fn run_stdio(&self) -> McpResult<()> {
        tracing::info!(server = %self.info.name, "Serving MCP over stdio");
        self.serve_lines(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve line-delimited JSON-RPC until the reader reaches EOF.
    pub async fn serve_lines<R, W>(&self, mut reader: R, mut writer: W) -> McpResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    if let Some(resp) = self.handle_message(trimmed).await {
                        let json = serde_json::to_string(&resp)?;
                        writer.write_all(json.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;
                    }
                }
                Err(e) => return Err(McpError::Io(e)),
            }
        }

        Ok(())
    }

    /// Handle one raw JSON-RPC message. Notifications get no response.
    pub async fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        let message: JsonRpcMessage = match serde_json::from_str(message) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
            }
        };

        let request = match message {
            JsonRpcMessage::Notification(notification) => {
                tracing::debug!(method = %notification.method, "Notification received");
                return None;
            }
            JsonRpcMessage::Request(request) => request,
        };
        let id = request.id;

        match request.method.as_str() {
            "initialize" => {
                let result = InitializeResult {
                    protocol_version: PROTOCOL_VERSION.to_string(),
                    capabilities: self.capabilities.clone(),
                    server_info: self.info.clone(),
                    instructions: None,
                };
                Some(JsonRpcResponse::success(id, result))
            }
            "ping" => Some(JsonRpcResponse::success(id, serde_json::json!({}))),
            "tools/list" => {
                let tools: Vec<McpTool> =
                    self.tools.read().values().map(|h| h.definition()).collect();
                let result = ListToolsResult {
                    tools,
                    next_cursor: None,
                };
                Some(JsonRpcResponse::success(id, result))
            }
            "tools/call" => {
                let params: CallToolParams = match request.params {
                    Some(p) => match serde_json::from_value(p) {
                        Ok(params) => params,
                        Err(e) => {
                            return Some(JsonRpcResponse::error(
                                Some(id),
                                JsonRpcError::INVALID_PARAMS,
                                format!("Invalid params: {e}"),
                            ));
                        }
                    },
                    None => {
                        return Some(JsonRpcResponse::error(
                            Some(id),
                            JsonRpcError::INVALID_PARAMS,
                            "Missing params",
                        ));
                    }
                };

                let handler = self.tools.read().get(&params.name).cloned();
                let Some(handler) = handler else {
                    return Some(JsonRpcResponse::error(
                        Some(id),
                        JsonRpcError::INVALID_PARAMS,
                        McpError::ToolNotFound(params.name).to_string(),
                    ));
                };

                tracing::info!(tool = %params.name, "Tool call");
                let result = match handler.call(params.arguments).await {
                    Ok(output) => output,
                    Err(e) => CallToolResult::error(e.to_string()),
                };
                Some(JsonRpcResponse::success(id, result))
            }
            _ => Some(JsonRpcResponse::error(
                Some(id),
                JsonRpcError::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        }
    }

    /// Get server info.
    pub fn info(&self) -> &Implementation {
        &self.info
    }

    /// Get registered tool count.
    pub fn tool_count(&self) -> usize {
        self.tools.read().len()
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new("mcp-server", env!("CARGO_PKG_VERSION"))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    pub(crate) struct EchoTool;

    #[async_trait]
    impl ToolHandler for EchoTool {
        fn definition(&self) -> McpTool {
            McpTool::new("echo", json!({"type": "object", "properties": {}}))
                .with_description("Echo the arguments")
        }

        async fn call(&self, arguments: JsonValue) -> McpResult<CallToolResult> {
            Ok(CallToolResult::text(arguments.to_string()))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl ToolHandler for FailingTool {
        fn definition(&self) -> McpTool {
            McpTool::new("fail", json!({"type": "object", "properties": {}}))
        }

        async fn call(&self, _arguments: JsonValue) -> McpResult<CallToolResult> {
            Err(McpError::Transport("upstream gone".to_string()))
        }
    }

    #[test]
    fn test_server_creation() {
        let server = McpServer::new("test", "1.0.0");
        assert_eq!(server.info().name, "test");
        assert_eq!(server.tool_count(), 0);
    }

    #[test]
    fn test_duplicate_tool_replaces() {
        let server = McpServer::new("test", "1.0.0").tool(EchoTool).tool(EchoTool);
        assert_eq!(server.tool_count(), 1);
    }

    #[tokio::test]
    async fn test_handle_initialize() {
        let server = McpServer::new("test", "1.0.0");

        let message = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
        let response = server.handle_message(message).await.unwrap();

        let result: InitializeResult = response.into_result().unwrap();
        assert_eq!(result.protocol_version, PROTOCOL_VERSION);
        assert_eq!(result.server_info.name, "test");
        assert!(result.capabilities.tools.is_some());
    }

    #[tokio::test]
    async fn test_handle_tools_list() {
        let server = McpServer::new("test", "1.0.0").tool(EchoTool);

        let message = r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#;
        let response = server.handle_message(message).await.unwrap();

        let result: ListToolsResult = response.into_result().unwrap();
        assert_eq!(result.tools.len(), 1);
        assert_eq!(result.tools[0].name, "echo");
    }

    #[tokio::test]
    async fn test_handle_tools_call() {
        let server = McpServer::new("test", "1.0.0").tool(EchoTool);

        let message = r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"echo","arguments":{"text":"hello"}}}"#;
        let response = server.handle_message(message).await.unwrap();

        let result: CallToolResult = response.into_result().unwrap();
        assert!(!result.is_error);
        assert_eq!(result.as_text(), Some(r#"{"text":"hello"}"#));
    }

    #[tokio::test]
    async fn test_handler_error_becomes_error_result() {
        let server = McpServer::new("test", "1.0.0").tool(FailingTool);

        let message = r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"fail"}}"#;
        let result: CallToolResult = server
            .handle_message(message)
            .await
            .unwrap()
            .into_result()
            .unwrap();
        assert!(result.is_error);
        assert!(result.as_text().unwrap().contains("upstream gone"));
    }

    #[tokio::test]
    async fn test_handle_unknown_tool() {
        let server = McpServer::new("test", "1.0.0");

        let message = r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"nope"}}"#;
        let response = server.handle_message(message).await.unwrap();

        let error = response.error.unwrap();
        assert_eq!(error.code, JsonRpcError::INVALID_PARAMS);
        assert_eq!(error.message, "Tool not found: nope");
    }

    #[tokio::test]
    async fn test_handle_unknown_method() {
        let server = McpServer::new("test", "1.0.0");

        let message = r#"{"jsonrpc":"2.0","id":1,"method":"unknown"}"#;
        let response = server.handle_message(message).await.unwrap();

        assert!(response.is_error());
        assert_eq!(response.error.unwrap().code, JsonRpcError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handle_parse_error() {
        let server = McpServer::new("test", "1.0.0");
        let response = server.handle_message("{not json").await.unwrap();
        assert_eq!(response.id, None);
        assert_eq!(response.error.unwrap().code, JsonRpcError::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_handle_notification() {
        let server = McpServer::new("test", "1.0.0");

        let message = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(server.handle_message(message).await.is_none());
    }

    #[tokio::test]
    async fn test_serve_lines() {
        let server = McpServer::new("test", "1.0.0").tool(EchoTool);
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );
        let mut output = Vec::new();
        server
            .serve_lines(input.as_bytes(), &mut output)
            .await
            .unwrap();

        let lines: Vec<JsonValue> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1]["result"]["tools"][0]["name"], "echo");
    }
}
