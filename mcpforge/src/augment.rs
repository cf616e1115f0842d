//! OpenAI-backed naming augmentation.
//!
//! Requests that lack a name or description are described to a chat
//! completions endpoint, which answers with a JSON object holding a `name`
//! and a `description`.

use async_trait::async_trait;
use mcpforge_core::RequestNode;
use mcpforge_tools::{AugmentError, NamingAugmentor, NamingSuggestion};
use reqwest::Client;
use serde_json::{json, Value as JsonValue};

use crate::config::OpenAiConfig;

const SYSTEM_PROMPT: &str = "You name API operations for an MCP tool catalog. \
Given an HTTP request, answer with a JSON object {\"name\": string, \"description\": string}. \
The name is a short human title of two to five words. \
The description is one sentence saying what the operation does.";

/// Naming augmentor using the OpenAI chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiAugmentor {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiAugmentor {
    /// Create an augmentor.
    pub fn new(config: OpenAiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    /// Create an augmentor from the environment.
    pub fn from_env() -> Result<Self, AugmentError> {
        Ok(Self::new(OpenAiConfig::from_env()?))
    }

    /// The configuration in use.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn request_body(&self, node: &RequestNode) -> JsonValue {
        json!({
            "model": self.config.model,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": describe_request(node)},
            ],
        })
    }
}

#[async_trait]
impl NamingAugmentor for OpenAiAugmentor {
    async fn suggest(&self, node: &RequestNode) -> Result<NamingSuggestion, AugmentError> {
        tracing::debug!(model = %self.config.model, request = ?node.name, "Requesting naming suggestion");

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(node))
            .send()
            .await
            .map_err(|e| AugmentError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AugmentError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let raw: JsonValue = response
            .json()
            .await
            .map_err(|e| AugmentError::invalid_response(e.to_string()))?;
        parse_suggestion(&raw)
    }
}

/// Describe a request for the prompt.
fn describe_request(node: &RequestNode) -> String {
    let mut lines = vec![
        format!("Name: {}", node.name.as_deref().unwrap_or("(none)")),
        format!("Method: {}", node.method()),
    ];
    if let Some(request) = &node.request {
        lines.push(format!("URL: {}", request.url.raw));
        if let Some(body) = request.raw_body() {
            lines.push(format!("Body: {body}"));
        }
    }
    lines.push(format!(
        "Description: {}",
        node.description.as_deref().unwrap_or("(none)")
    ));
    lines.join("\n")
}

/// Extract the suggestion from a chat completions response.
fn parse_suggestion(raw: &JsonValue) -> Result<NamingSuggestion, AugmentError> {
    let content = raw["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| AugmentError::invalid_response("no message content"))?;
    let suggestion: NamingSuggestion = serde_json::from_str(content)
        .map_err(|e| AugmentError::invalid_response(format!("{e}: {content}")))?;

    if suggestion.name.trim().is_empty() {
        return Err(AugmentError::invalid_response("empty name"));
    }
    Ok(suggestion)
}
