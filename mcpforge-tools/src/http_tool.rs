//! Runtime for generated tools.
//!
//! An [`HttpTool`] executes a [`ToolArtifact`]: it validates the input, builds
//! the upstream request from the handler spec, sends it and validates the
//! answer. Calls never fail; every problem is reported in the result
//! envelope.

use indexmap::IndexMap;
use reqwest::{Client, Method};
use serde_json::Value as JsonValue;
use url::Url;

use crate::definition::ToolArtifact;
use crate::errors::ToolError;
use crate::inference::BODY_FIELD;
use crate::return_types::CallToolResult;

/// A generated tool bound to an HTTP client.
#[derive(Debug, Clone)]
pub struct HttpTool {
    artifact: ToolArtifact,
    client: Client,
    variables: IndexMap<String, String>,
}

impl HttpTool {
    /// Create a tool with a default client and no template variables.
    #[must_use]
    pub fn new(artifact: ToolArtifact) -> Self {
        Self {
            artifact,
            client: Client::new(),
            variables: IndexMap::new(),
        }
    }

    /// Use a specific HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Set one template variable, e.g. `baseUrl`.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Set template variables.
    #[must_use]
    pub fn with_variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.variables
            .extend(variables.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// The artifact this tool executes.
    #[must_use]
    pub fn artifact(&self) -> &ToolArtifact {
        &self.artifact
    }

    /// Tool identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.artifact.name
    }

    /// Call the tool.
    pub async fn call(&self, input: JsonValue) -> CallToolResult {
        let outcome = match self.execute(input).await {
            Ok(data) => CallToolResult::json(&data).map_err(ToolError::from),
            Err(err) => Err(err),
        };
        outcome.unwrap_or_else(|err| {
            tracing::error!(tool = %self.artifact.name, error = %err, "Tool call failed");
            CallToolResult::error(format!(
                "Error executing tool {}: {}",
                self.artifact.name, err
            ))
        })
    }

    async fn execute(&self, input: JsonValue) -> Result<JsonValue, ToolError> {
        let input = match input {
            JsonValue::Null => JsonValue::Object(serde_json::Map::new()),
            other => other,
        };
        self.artifact
            .input_schema
            .validate(&input)
            .map_err(ToolError::InvalidArguments)?;

        let handler = &self.artifact.handler;
        let url = self.build_url(&input)?;
        let method = Method::from_bytes(handler.method.as_bytes())
            .map_err(|_| ToolError::InvalidMethod(handler.method.clone()))?;

        tracing::debug!(tool = %self.artifact.name, %method, %url, "Calling API");

        let mut request = self.client.request(method, url);
        for (name, value) in &handler.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if handler.send_body {
            if let Some(body) = input.get(BODY_FIELD) {
                request = request.json(body);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::http_status(status.as_u16(), body));
        }

        let text = response.text().await?;
        let data: JsonValue =
            serde_json::from_str(&text).map_err(|e| ToolError::InvalidJson(e.to_string()))?;
        self.artifact
            .output_schema
            .validate(&data)
            .map_err(ToolError::InvalidOutput)?;
        Ok(data)
    }

    /// Build the request URL for an input.
    ///
    /// Path parameters are taken from the input and percent-encoded. Other
    /// slots are filled from the template variables. Query parameters are
    /// appended in declaration order when their value is present, non-null
    /// and not an empty string.
    pub fn build_url(&self, input: &JsonValue) -> Result<Url, ToolError> {
        let handler = &self.artifact.handler;
        let mut resolved = String::with_capacity(handler.url_template.len());
        let mut rest = handler.url_template.as_str();

        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else { break };
            resolved.push_str(&rest[..start]);

            let slot = &after[..end];
            let path_value = handler
                .path_params
                .iter()
                .any(|p| p == slot)
                .then(|| input.get(slot))
                .flatten()
                .and_then(param_text)
                .map(|v| urlencoding::encode(&v).into_owned());
            let value = path_value
                .or_else(|| self.variables.get(slot).cloned())
                .ok_or_else(|| ToolError::UnresolvedPlaceholder(slot.to_string()))?;
            resolved.push_str(&value);

            rest = &after[end + 1..];
        }
        resolved.push_str(rest);

        let mut url = Url::parse(&resolved).map_err(|e| ToolError::invalid_url(&resolved, e))?;

        let pairs: Vec<(&str, String)> = handler
            .query_params
            .iter()
            .filter_map(|key| {
                input
                    .get(key)
                    .filter(|v| is_truthy(v))
                    .and_then(param_text)
                    .map(|v| (key.as_str(), v))
            })
            .collect();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, &value);
            }
        }

        Ok(url)
    }
}

/// Whether a query value is sent. `null`, `false`, `0` and `""` are not.
fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Text form of a parameter value. Null counts as absent.
fn param_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::HandlerSpec;
    use crate::schema::{ObjectSchemaBuilder, ScalarKind, SchemaDescriptor};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn get_user() -> ToolArtifact {
        ToolArtifact {
            name: "getUser".to_string(),
            title: "Get User".to_string(),
            description: "Fetch a user".to_string(),
            input_schema: ObjectSchemaBuilder::new()
                .scalar("id", ScalarKind::String, None, true)
                .scalar("verbose", ScalarKind::Boolean, None, false)
                .scalar("q", ScalarKind::String, None, false)
                .build(),
            output_schema: ObjectSchemaBuilder::new()
                .scalar("name", ScalarKind::String, None, true)
                .build(),
            handler: HandlerSpec::new("GET", "{baseUrl}/users/{id}")
                .with_path_param("id")
                .with_query_param("verbose")
                .with_query_param("q"),
        }
    }

    fn create_post() -> ToolArtifact {
        ToolArtifact {
            name: "createPost".to_string(),
            title: "Create Post".to_string(),
            description: "Create a post".to_string(),
            input_schema: ObjectSchemaBuilder::new()
                .field(
                    "body",
                    ObjectSchemaBuilder::new()
                        .scalar("title", ScalarKind::String, None, true)
                        .build(),
                    false,
                )
                .build(),
            output_schema: SchemaDescriptor::unconstrained(),
            handler: HandlerSpec::new("POST", "{baseUrl}/posts").with_body(true),
        }
    }

    #[test]
    fn test_build_url_substitutes_and_encodes() {
        let tool = HttpTool::new(get_user()).with_variable("baseUrl", "https://api.test/v1");
        let url = tool
            .build_url(&json!({"id": "a b/c", "verbose": true}))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.test/v1/users/a%20b%2Fc?verbose=true"
        );
    }

    #[test]
    fn test_build_url_skips_absent_null_and_empty_query() {
        let tool = HttpTool::new(get_user()).with_variable("baseUrl", "https://api.test");
        let url = tool
            .build_url(&json!({"id": "7", "verbose": null, "q": ""}))
            .unwrap();
        assert_eq!(url.as_str(), "https://api.test/users/7");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_build_url_skips_false_and_zero_query() {
        let tool = HttpTool::new(get_user()).with_variable("baseUrl", "https://api.test");
        let url = tool
            .build_url(&json!({"id": 0, "verbose": false, "q": 0}))
            .unwrap();
        assert_eq!(url.as_str(), "https://api.test/users/0");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_build_url_keeps_truthy_query_values() {
        let tool = HttpTool::new(get_user()).with_variable("baseUrl", "https://api.test");
        let url = tool
            .build_url(&json!({"id": "1", "verbose": true, "q": 2.5}))
            .unwrap();
        assert_eq!(url.as_str(), "https://api.test/users/1?verbose=true&q=2.5");
    }

    #[test]
    fn test_build_url_unresolved_placeholder() {
        let tool = HttpTool::new(get_user());
        let err = tool.build_url(&json!({"id": "1"})).unwrap_err();
        assert!(matches!(err, ToolError::UnresolvedPlaceholder(ref slot) if slot == "baseUrl"));
    }

    #[tokio::test]
    async fn test_call_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/42"))
            .and(query_param("verbose", "true"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Ada"})))
            .expect(1)
            .mount(&server)
            .await;

        let tool = HttpTool::new(get_user()).with_variable("baseUrl", server.uri());
        let result = tool.call(json!({"id": "42", "verbose": true})).await;

        assert!(!result.is_error);
        assert_eq!(
            result.as_text(),
            Some(serde_json::to_string_pretty(&json!({"name": "Ada"})).unwrap().as_str())
        );
        assert_eq!(result.structured_content, Some(json!({"name": "Ada"})));
    }

    #[tokio::test]
    async fn test_call_sends_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/posts"))
            .and(body_json(json!({"title": "Hello"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([1, 2])))
            .expect(1)
            .mount(&server)
            .await;

        let tool = HttpTool::new(create_post()).with_variables([("baseUrl", server.uri())]);
        let result = tool.call(json!({"body": {"title": "Hello"}})).await;

        assert!(!result.is_error, "{:?}", result.as_text());
        assert_eq!(result.structured_content, None);
    }

    #[tokio::test]
    async fn test_call_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
            .mount(&server)
            .await;

        let tool = HttpTool::new(get_user()).with_variable("baseUrl", server.uri());
        let result = tool.call(json!({"id": "9"})).await;

        assert!(result.is_error);
        assert_eq!(
            result.as_text(),
            Some("Error executing tool getUser: API call failed with status 404: no such user")
        );
    }

    #[tokio::test]
    async fn test_call_output_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": 5})))
            .mount(&server)
            .await;

        let tool = HttpTool::new(get_user()).with_variable("baseUrl", server.uri());
        let result = tool.call(json!({"id": "1"})).await;

        assert!(result.is_error);
        assert!(result.as_text().unwrap().contains("Invalid response"));
    }

    #[tokio::test]
    async fn test_call_non_json_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let tool = HttpTool::new(get_user()).with_variable("baseUrl", server.uri());
        let result = tool.call(json!({"id": "1"})).await;

        assert!(result.is_error);
        assert!(result.as_text().unwrap().contains("Failed to parse response as JSON"));
    }

    #[tokio::test]
    async fn test_call_invalid_arguments_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tool = HttpTool::new(get_user()).with_variable("baseUrl", server.uri());
        let result = tool.call(JsonValue::Null).await;

        assert!(result.is_error);
        assert!(result
            .as_text()
            .unwrap()
            .starts_with("Error executing tool getUser: Invalid arguments"));
    }
}
