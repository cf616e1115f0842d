//! Collection tree types.
//!
//! A collection is an ordered tree of folders and request definitions. The
//! types here are the normalized form the compiler works on: whatever shape
//! the source document used (bare URL strings, rich descriptions, split host
//! and path arrays), by the time it reaches these types it has been flattened
//! to plain strings and ordered vectors.

use serde_json::Value as JsonValue;

use crate::errors::Result;

/// Key used for a path variable that has no key.
pub const PATH_VARIABLE_PLACEHOLDER: &str = "systemVariable";

/// Key used for a query variable that has no key.
pub const QUERY_VARIABLE_PLACEHOLDER: &str = "systemquery";

/// Method used when a request does not declare one.
pub const DEFAULT_METHOD: &str = "GET";

/// A parsed API collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    /// Collection name.
    pub name: Option<String>,
    /// Collection description.
    pub description: Option<String>,
    /// Top-level items, in declaration order.
    pub items: Vec<CollectionNode>,
}

impl Collection {
    /// Create an empty collection.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
            items: Vec::new(),
        }
    }

    /// Parse a Postman collection document.
    pub fn from_json(text: &str) -> Result<Self> {
        crate::postman::parse_collection(serde_json::from_str(text)?)
    }

    /// Build a collection from an already parsed Postman document.
    pub fn from_value(value: JsonValue) -> Result<Self> {
        crate::postman::parse_collection(value)
    }

    /// Add a top-level item.
    #[must_use]
    pub fn with_item(mut self, item: impl Into<CollectionNode>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Count the request definitions that carry a request payload.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.items.iter().map(CollectionNode::request_count).sum()
    }
}

/// A node in the collection tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionNode {
    /// A folder of further nodes.
    Folder(Folder),
    /// A single request definition.
    Request(RequestNode),
}

impl CollectionNode {
    /// Declared name of the node, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Folder(folder) => folder.name.as_deref(),
            Self::Request(request) => request.name.as_deref(),
        }
    }

    /// Check if this node is a folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    fn request_count(&self) -> usize {
        match self {
            Self::Folder(folder) => folder.children.iter().map(Self::request_count).sum(),
            Self::Request(request) => usize::from(request.request.is_some()),
        }
    }
}

impl From<Folder> for CollectionNode {
    fn from(folder: Folder) -> Self {
        Self::Folder(folder)
    }
}

impl From<RequestNode> for CollectionNode {
    fn from(request: RequestNode) -> Self {
        Self::Request(request)
    }
}

/// A folder grouping other nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Folder {
    /// Folder name.
    pub name: Option<String>,
    /// Children, in declaration order.
    pub children: Vec<CollectionNode>,
}

impl Folder {
    /// Create an empty folder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            children: Vec::new(),
        }
    }

    /// Add a child node.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<CollectionNode>) -> Self {
        self.children.push(child.into());
        self
    }
}

/// A request definition with its saved example responses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestNode {
    /// Human-readable name.
    pub name: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
    /// The request itself. Nodes without one are skipped by the compiler.
    pub request: Option<RequestSpec>,
    /// Saved example responses, in declaration order.
    pub responses: Vec<ResponseExample>,
}

impl RequestNode {
    /// Create a named node without a request payload.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the request payload.
    #[must_use]
    pub fn with_request(mut self, request: RequestSpec) -> Self {
        self.request = Some(request);
        self
    }

    /// Add an example response.
    #[must_use]
    pub fn with_response(mut self, response: ResponseExample) -> Self {
        self.responses.push(response);
        self
    }

    /// The declared HTTP method, upper-cased, or `GET`.
    #[must_use]
    pub fn method(&self) -> String {
        self.request
            .as_ref()
            .and_then(|r| r.method.as_deref())
            .filter(|m| !m.trim().is_empty())
            .map_or_else(|| DEFAULT_METHOD.to_string(), |m| m.trim().to_uppercase())
    }
}

/// The HTTP part of a request definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestSpec {
    /// HTTP method as declared.
    pub method: Option<String>,
    /// Target URL.
    pub url: UrlSpec,
    /// Request body.
    pub body: Option<RequestBody>,
}

impl RequestSpec {
    /// Create a request spec.
    #[must_use]
    pub fn new(method: impl Into<String>, url: UrlSpec) -> Self {
        Self {
            method: Some(method.into()),
            url,
            body: None,
        }
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// The raw body text, when the request carries a non-empty raw body.
    #[must_use]
    pub fn raw_body(&self) -> Option<&str> {
        self.body.as_ref().and_then(RequestBody::raw_text)
    }
}

/// A request URL with its declared variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlSpec {
    /// The URL as declared, including any `{{var}}` placeholders.
    pub raw: String,
    /// Path variables, in declaration order.
    pub path_variables: Vec<Variable>,
    /// Query parameters, in declaration order.
    pub query: Vec<Variable>,
}

impl UrlSpec {
    /// Create a URL with no variables.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            ..Default::default()
        }
    }

    /// Add a path variable.
    #[must_use]
    pub fn with_path_variable(mut self, variable: Variable) -> Self {
        self.path_variables.push(variable);
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query(mut self, variable: Variable) -> Self {
        self.query.push(variable);
        self
    }

    /// Path variable keys, with the placeholder for missing keys.
    #[must_use]
    pub fn path_keys(&self) -> Vec<&str> {
        self.path_variables
            .iter()
            .map(|v| v.key_or(PATH_VARIABLE_PLACEHOLDER))
            .collect()
    }

    /// Query parameter keys, with the placeholder for missing keys.
    #[must_use]
    pub fn query_keys(&self) -> Vec<&str> {
        self.query
            .iter()
            .map(|v| v.key_or(QUERY_VARIABLE_PLACEHOLDER))
            .collect()
    }
}

/// A path variable or query parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variable {
    /// Variable key.
    pub key: Option<String>,
    /// Example value.
    pub value: Option<JsonValue>,
    /// Human description.
    pub description: Option<String>,
}

impl Variable {
    /// Create a variable with an example value.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
            description: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The key, or `fallback` when the key is missing or empty.
    #[must_use]
    pub fn key_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.key.as_deref().filter(|k| !k.is_empty()).unwrap_or(fallback)
    }
}

/// A request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody {
    /// Body mode (`raw`, `formdata`, `urlencoded`, ...).
    pub mode: Option<String>,
    /// Raw body text.
    pub raw: Option<String>,
}

impl RequestBody {
    /// Create a raw body.
    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            mode: Some("raw".to_string()),
            raw: Some(text.into()),
        }
    }

    /// The raw text, when the mode is raw (or unspecified) and the text is non-empty.
    #[must_use]
    pub fn raw_text(&self) -> Option<&str> {
        let raw_mode = self.mode.as_deref().map_or(true, |m| m == "raw");
        if !raw_mode {
            return None;
        }
        self.raw.as_deref().filter(|text| !text.is_empty())
    }
}

/// A saved example response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseExample {
    /// Example name.
    pub name: Option<String>,
    /// HTTP status code.
    pub code: Option<u16>,
    /// Response body text.
    pub body: Option<String>,
}

impl ResponseExample {
    /// Create an example with a status code.
    #[must_use]
    pub fn new(code: u16) -> Self {
        Self {
            name: None,
            code: Some(code),
            body: None,
        }
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}
