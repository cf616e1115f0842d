//! # mcpforge-core
//!
//! Collection model and Postman collection parsing for mcpforge.
//!
//! This crate provides the input side of the compiler:
//!
//! - **Collection tree**: folders and request definitions, in declaration order
//! - **Postman parsing**: v2.0 / v2.1 collection documents into the tree
//! - **Errors**: what can go wrong while reading a collection
//!
//! ## Example
//!
//! ```rust
//! use mcpforge_core::{Collection, CollectionNode};
//!
//! let collection = Collection::from_json(r#"{
//!     "info": {"name": "Demo"},
//!     "item": [{"name": "Ping", "request": "https://example.com/ping"}]
//! }"#).unwrap();
//!
//! assert_eq!(collection.name.as_deref(), Some("Demo"));
//! assert!(matches!(collection.items[0], CollectionNode::Request(_)));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod collection;
pub mod errors;
mod postman;

// Re-exports for convenience
pub use collection::{
    Collection, CollectionNode, Folder, RequestBody, RequestNode, RequestSpec, ResponseExample,
    UrlSpec, Variable, DEFAULT_METHOD, PATH_VARIABLE_PLACEHOLDER, QUERY_VARIABLE_PLACEHOLDER,
};
pub use errors::{CollectionError, Result};
