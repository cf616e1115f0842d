//! Tool definition types.
//!
//! A [`ToolArtifact`] is the complete, self-contained description of one
//! generated tool: its identity, its input and output contracts, and the
//! HTTP call it forwards to. Artifacts are written to disk as JSON and loaded
//! back by the server runtime.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::schema::SchemaDescriptor;

/// JSON Schema for an object type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectJsonSchema {
    /// The schema type (always "object").
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Property definitions.
    pub properties: IndexMap<String, JsonValue>,

    /// List of required property names.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,

    /// Description of the schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ObjectJsonSchema {
    /// Create a new empty object schema.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: IndexMap::new(),
            required: Vec::new(),
            description: None,
        }
    }

    /// Add a property without consuming self.
    pub fn add_property(&mut self, name: &str, schema: JsonValue, required: bool) {
        self.properties.insert(name.to_string(), schema);
        if required && !self.is_required(name) {
            self.required.push(name.to_string());
        }
    }

    /// Check if a property is required.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

impl Default for ObjectJsonSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectJsonSchema> for JsonValue {
    fn from(schema: ObjectJsonSchema) -> Self {
        serde_json::to_value(schema).unwrap_or(JsonValue::Null)
    }
}

/// How a tool forwards its input to the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerSpec {
    /// Upper-case HTTP method.
    pub method: String,

    /// URL with `{name}` slots for path parameters and environment variables.
    pub url_template: String,

    /// Input fields substituted into the URL template.
    #[serde(default)]
    pub path_params: Vec<String>,

    /// Input fields appended as query parameters when present.
    #[serde(default)]
    pub query_params: Vec<String>,

    /// Whether the `body` input field is sent as the JSON request body.
    #[serde(default)]
    pub send_body: bool,

    /// Fixed request headers.
    #[serde(default)]
    pub headers: IndexMap<String, String>,
}

impl HandlerSpec {
    /// Create a handler with the default JSON content type header.
    #[must_use]
    pub fn new(method: impl Into<String>, url_template: impl Into<String>) -> Self {
        let mut headers = IndexMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            method: method.into(),
            url_template: url_template.into(),
            path_params: Vec::new(),
            query_params: Vec::new(),
            send_body: false,
            headers,
        }
    }

    /// Add a path parameter.
    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>) -> Self {
        self.path_params.push(name.into());
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>) -> Self {
        self.query_params.push(name.into());
        self
    }

    /// Set whether the body is forwarded.
    #[must_use]
    pub fn with_body(mut self, send_body: bool) -> Self {
        self.send_body = send_body;
        self
    }

    /// Names of the `{name}` slots in the URL template, in order.
    #[must_use]
    pub fn template_slots(&self) -> Vec<&str> {
        let mut slots = Vec::new();
        let mut rest = self.url_template.as_str();
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else { break };
            slots.push(&after[..end]);
            rest = &after[end + 1..];
        }
        slots
    }
}

/// A generated tool, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolArtifact {
    /// Tool identifier. Also the file stem.
    pub name: String,

    /// Human title.
    pub title: String,

    /// What the tool does.
    pub description: String,

    /// Input contract.
    pub input_schema: SchemaDescriptor,

    /// Output contract.
    pub output_schema: SchemaDescriptor,

    /// The HTTP call behind the tool.
    pub handler: HandlerSpec,
}

impl ToolArtifact {
    /// File extension of stored artifacts.
    pub const FILE_EXTENSION: &'static str = "json";

    /// File name the artifact is stored under.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, Self::FILE_EXTENSION)
    }

    /// Render the artifact text. Same artifact, same bytes.
    pub fn render(&self) -> Result<String, serde_json::Error> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }

    /// Parse artifact text.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ObjectSchemaBuilder, ScalarKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> ToolArtifact {
        ToolArtifact {
            name: "getUser".to_string(),
            title: "Get User".to_string(),
            description: "Fetch one user".to_string(),
            input_schema: ObjectSchemaBuilder::new()
                .scalar("id", ScalarKind::Number, Some("Path parameter: id"), true)
                .build(),
            output_schema: SchemaDescriptor::unconstrained()
                .with_description("The successful response from the API."),
            handler: HandlerSpec::new("GET", "{baseUrl}/users/{id}").with_path_param("id"),
        }
    }

    #[test]
    fn test_object_schema_required_dedup() {
        let mut schema = ObjectJsonSchema::new();
        schema.add_property("a", json!({"type": "string"}), true);
        schema.add_property("a", json!({"type": "number"}), true);
        assert_eq!(schema.required, vec!["a"]);
        assert_eq!(schema.properties["a"], json!({"type": "number"}));
    }

    #[test]
    fn test_template_slots() {
        let handler = HandlerSpec::new("GET", "{baseUrl}/a/{id}/b/{other}");
        assert_eq!(handler.template_slots(), vec!["baseUrl", "id", "other"]);

        let handler = HandlerSpec::new("GET", "https://x.test/{broken");
        assert!(handler.template_slots().is_empty());
    }

    #[test]
    fn test_render_shape() {
        let value: JsonValue = serde_json::from_str(&sample().render().unwrap()).unwrap();
        assert_eq!(value["name"], "getUser");
        assert_eq!(value["inputSchema"]["required"], json!(["id"]));
        assert_eq!(value["handler"]["urlTemplate"], "{baseUrl}/users/{id}");
        assert_eq!(value["handler"]["headers"]["Content-Type"], "application/json");
        assert_eq!(value["handler"]["sendBody"], false);
    }

    #[test]
    fn test_render_is_deterministic_and_parses_back() {
        let artifact = sample();
        let first = artifact.render().unwrap();
        assert_eq!(first, artifact.clone().render().unwrap());
        assert!(first.ends_with('\n'));
        assert_eq!(ToolArtifact::parse(&first).unwrap(), artifact);
        assert_eq!(artifact.file_name(), "getUser.json");
    }
}
