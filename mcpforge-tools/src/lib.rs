//! # mcpforge-tools
//!
//! Tool compilation and execution for mcpforge.
//!
//! This crate turns request definitions into self-describing tool artifacts
//! and runs those artifacts against the upstream API.
//!
//! ## Core Concepts
//!
//! - **[`SchemaDescriptor`]**: the shape of a tool's input or output
//! - **[`build_input_schema`] / [`build_output_schema`]**: schema inference
//!   from declared variables, bodies and example responses
//! - **[`NamingResolver`]**: identifier, title and description of a tool,
//!   optionally helped by a [`NamingAugmentor`]
//! - **[`ToolSynthesizer`]**: assembles a [`ToolArtifact`]
//! - **[`HttpTool`]**: executes an artifact and returns a [`CallToolResult`]
//!
//! ## Compiling a Request
//!
//! ```rust
//! use mcpforge_core::{RequestNode, RequestSpec, UrlSpec, Variable};
//! use mcpforge_tools::{NamingResolver, ToolSynthesizer};
//!
//! let node = RequestNode::new("Get Pet").with_request(RequestSpec::new(
//!     "GET",
//!     UrlSpec::new("{{baseUrl}}/pets/:petId").with_path_variable(Variable::new("petId", "1")),
//! ));
//!
//! let artifact = ToolSynthesizer::new()
//!     .compile(&node, NamingResolver::resolve_local(&node))
//!     .unwrap();
//!
//! assert_eq!(artifact.name, "getPet");
//! assert_eq!(artifact.handler.url_template, "{baseUrl}/pets/{petId}");
//! assert!(artifact.input_schema.field("petId").unwrap().required);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod definition;
pub mod errors;
pub mod http_tool;
pub mod inference;
pub mod naming;
pub mod return_types;
pub mod schema;
pub mod synth;

// Re-export core types
pub use definition::{HandlerSpec, ObjectJsonSchema, ToolArtifact};
pub use errors::{AugmentError, SchemaError, ToolError};
pub use http_tool::HttpTool;
pub use inference::{
    build_input_schema, build_output_schema, select_response, BODY_DESCRIPTION, BODY_FIELD,
    OUTPUT_DESCRIPTION,
};
pub use naming::{
    sanitize_dir_name, sanitize_name, AugmentFailurePolicy, NamingAugmentor, NamingResolver,
    NamingSuggestion, ToolNaming, FALLBACK_IDENTIFIER, UNNAMED_TOOL_TITLE,
};
pub use return_types::{CallToolResult, ToolResultContent};
pub use schema::{
    guess_kind, guess_optional_kind, Field, ObjectSchemaBuilder, ScalarKind, SchemaDescriptor,
};
pub use synth::{url_template, ToolSynthesizer};
