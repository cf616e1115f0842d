//! Loading generated tools into an MCP server.
//!
//! An [`ArtifactToolset`] reads every tool artifact under a directory and
//! exposes each one as an [`HttpTool`] handler.

use async_trait::async_trait;
use mcpforge_tools::{CallToolResult, HttpTool, ToolArtifact};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::error::{McpError, McpResult};
use crate::server::{McpServer, ToolHandler};
use crate::types::McpTool;

/// Tool artifacts loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct ArtifactToolset {
    tools: Vec<HttpTool>,
}

impl ArtifactToolset {
    /// Load every `*.json` artifact under `dir`, in file name order.
    pub fn load(dir: impl AsRef<Path>) -> McpResult<Self> {
        let dir = dir.as_ref();
        let mut tools = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| McpError::artifact(dir, e))?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_artifact(path) {
                continue;
            }
            let text = std::fs::read_to_string(path).map_err(|e| McpError::artifact(path, e))?;
            let artifact = ToolArtifact::parse(&text).map_err(|e| McpError::artifact(path, e))?;
            tracing::debug!(tool = %artifact.name, path = %path.display(), "Loaded tool");
            tools.push(HttpTool::new(artifact));
        }

        tracing::info!(count = tools.len(), dir = %dir.display(), "Tools loaded");
        Ok(Self { tools })
    }

    /// Build a toolset from artifacts already in memory.
    pub fn from_artifacts(artifacts: impl IntoIterator<Item = ToolArtifact>) -> Self {
        Self {
            tools: artifacts.into_iter().map(HttpTool::new).collect(),
        }
    }

    /// Apply URL template variables to every tool.
    pub fn with_variables<I, K, V>(self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let variables: Vec<(String, String)> = variables
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            tools: self
                .tools
                .into_iter()
                .map(|tool| tool.with_variables(variables.iter().cloned()))
                .collect(),
        }
    }

    /// Use a shared HTTP client for every tool.
    pub fn with_client(self, client: reqwest::Client) -> Self {
        Self {
            tools: self
                .tools
                .into_iter()
                .map(|tool| tool.with_client(client.clone()))
                .collect(),
        }
    }

    /// The loaded tools.
    pub fn tools(&self) -> &[HttpTool] {
        &self.tools
    }

    /// Number of tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if there are no tools.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Register every tool on a server.
    pub fn register(self, server: McpServer) -> McpServer {
        for tool in self.tools {
            server.add_tool(Arc::new(tool));
        }
        server
    }
}

fn is_artifact(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == ToolArtifact::FILE_EXTENSION)
}

/// Directory holding the artifacts of a generated server.
pub fn tools_dir(root: impl AsRef<Path>) -> PathBuf {
    root.as_ref().join("tools")
}

#[async_trait]
impl ToolHandler for HttpTool {
    fn definition(&self) -> McpTool {
        let artifact = self.artifact();
        let mut tool = McpTool::new(artifact.name.clone(), artifact.input_schema.to_json_schema())
            .with_title(artifact.title.clone())
            .with_description(artifact.description.clone());
        if artifact.output_schema.fields().is_some() {
            tool = tool.with_output_schema(artifact.output_schema.to_json_schema());
        }
        tool
    }

    async fn call(&self, arguments: JsonValue) -> McpResult<CallToolResult> {
        Ok(HttpTool::call(self, arguments).await)
    }
}
