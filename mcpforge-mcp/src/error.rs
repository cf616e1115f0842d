//! MCP error types.

use std::path::PathBuf;
use thiserror::Error;

/// MCP errors.
#[derive(Debug, Error)]
pub enum McpError {
    /// The transport could not be started.
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A tool artifact could not be loaded.
    #[error("Failed to load tool '{}': {message}", path.display())]
    Artifact {
        /// Artifact file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Tool not found.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Unknown server mode.
    #[error("Unknown server mode '{0}' (expected stdio, http-stateless or http-session)")]
    UnknownMode(String),
}

impl McpError {
    /// Create an artifact loading error.
    pub fn artifact(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Artifact {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for MCP operations.
pub type McpResult<T> = Result<T, McpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = McpError::Transport("connection failed".to_string());
        assert!(err.to_string().contains("connection failed"));
    }

    #[test]
    fn test_artifact_error() {
        let err = McpError::artifact("tools/a.json", "expected value");
        assert_eq!(
            err.to_string(),
            "Failed to load tool 'tools/a.json': expected value"
        );
    }
}
