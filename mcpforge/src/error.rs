//! Generation error types.

use mcpforge_core::CollectionError;
use mcpforge_tools::AugmentError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The collection file could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The collection could not be parsed.
    #[error(transparent)]
    Parse(#[from] CollectionError),

    /// The naming augmentation service failed.
    #[error("Naming augmentation failed for '{request}': {source}")]
    Augment {
        /// Request being named.
        request: String,
        /// Underlying error.
        #[source]
        source: AugmentError,
    },

    /// A file or directory could not be written.
    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A tool artifact could not be rendered.
    #[error("Failed to render tool '{tool}': {source}")]
    Render {
        /// Tool identifier.
        tool: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A server template could not be rendered.
    #[error("Failed to render template '{name}': {message}")]
    Template {
        /// Template name.
        name: String,
        /// What went wrong.
        message: String,
    },

    /// The output archive could not be built.
    #[error("Failed to package '{}': {message}", path.display())]
    Package {
        /// Archive path.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },
}

impl GenerateError {
    /// Create a read error.
    #[must_use]
    pub fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a write error.
    #[must_use]
    pub fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a packaging error.
    #[must_use]
    pub fn package(path: &Path, message: impl ToString) -> Self {
        Self::Package {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// Result type alias using GenerateError.
pub type Result<T> = std::result::Result<T, GenerateError>;
