//! Tool return types.
//!
//! [`CallToolResult`] is the envelope every tool invocation produces, success
//! or failure. It serializes in the MCP `tools/call` result shape.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Result of calling a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    /// Result content.
    pub content: Vec<ToolResultContent>,
    /// Structured copy of an object result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<JsonValue>,
    /// Whether this is an error result.
    #[serde(default)]
    pub is_error: bool,
}

impl CallToolResult {
    /// Create a success result with text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent::text(text)],
            structured_content: None,
            is_error: false,
        }
    }

    /// Create a success result from JSON data.
    ///
    /// The text is the pretty-printed data. Objects are also attached as
    /// structured content.
    pub fn json(data: &JsonValue) -> Result<Self, serde_json::Error> {
        let text = serde_json::to_string_pretty(data)?;
        let structured = data.is_object().then(|| data.clone());
        Ok(Self {
            content: vec![ToolResultContent::text(text)],
            structured_content: structured,
            is_error: false,
        })
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent::text(message)],
            structured_content: None,
            is_error: true,
        }
    }

    /// The first text block, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.content.iter().find_map(|c| match c {
            ToolResultContent::Text { text } => Some(text.as_str()),
        })
    }
}

/// Tool result content types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ToolResultContent {
    /// Text content.
    #[serde(rename = "text")]
    Text {
        /// Text value.
        text: String,
    },
}

impl ToolResultContent {
    /// Create text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}
