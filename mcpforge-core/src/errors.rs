//! Error types for collection loading.

use thiserror::Error;

/// Errors that can occur while reading a collection document.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// The document is not valid JSON, or does not have the expected shape.
    #[error("Invalid collection JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but is missing something the compiler needs.
    #[error("Invalid collection: {0}")]
    Invalid(String),
}

impl CollectionError {
    /// Create an invalid collection error.
    #[must_use]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Result type alias using CollectionError.
pub type Result<T> = std::result::Result<T, CollectionError>;
