//! Tool-specific error types.

use serde_json::Value as JsonValue;
use thiserror::Error;

/// A value did not match a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A required field is absent.
    #[error("missing required field '{path}'")]
    MissingField {
        /// Location of the field, e.g. `$.body.id`.
        path: String,
    },

    /// A value has the wrong type.
    #[error("'{path}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Location of the value.
        path: String,
        /// Expected JSON type.
        expected: &'static str,
        /// Actual JSON type.
        found: &'static str,
    },
}

impl SchemaError {
    /// Create a missing field error.
    #[must_use]
    pub fn missing_field(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }

    /// Create a type mismatch error for the given value.
    #[must_use]
    pub fn type_mismatch(path: impl Into<String>, expected: &'static str, found: &JsonValue) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected,
            found: json_type_name(found),
        }
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Errors that can occur while executing a generated tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The input did not match the input schema.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(SchemaError),

    /// The upstream response did not match the output schema.
    #[error("Invalid response: {0}")]
    InvalidOutput(SchemaError),

    /// A URL template slot had no value.
    #[error("No value for URL placeholder '{0}'")]
    UnresolvedPlaceholder(String),

    /// The final URL could not be parsed.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The URL after substitution.
        url: String,
        /// Parser message.
        message: String,
    },

    /// The handler declares a method reqwest cannot send.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Transport failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream API answered with a non-success status.
    #[error("API call failed with status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The upstream response body was not JSON.
    #[error("Failed to parse response as JSON: {0}")]
    InvalidJson(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    /// Create an invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Check if this error came from the caller's input.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidArguments(_))
    }
}

/// Errors raised by a naming augmentation service.
#[derive(Debug, Error)]
pub enum AugmentError {
    /// The service is not usable with the given configuration.
    #[error("Augmentation not configured: {0}")]
    Configuration(String),

    /// Transport failure.
    #[error("Augmentation request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("Augmentation service returned status {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The service answer could not be understood.
    #[error("Invalid augmentation response: {0}")]
    InvalidResponse(String),
}

impl AugmentError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an invalid response error.
    #[must_use]
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}
