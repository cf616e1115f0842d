//! # mcpforge
//!
//! Compiles Postman collections into Model Context Protocol servers.
//!
//! Every request in a collection becomes a tool artifact: a JSON file holding
//! the tool's name, title, description, inferred input and output schemas and
//! the HTTP call it makes. The artifacts are laid out in the collection's
//! folder hierarchy and shipped with a README, an environment sample, a
//! manifest and a start script.
//!
//! ## Core Concepts
//!
//! - **[`TreeWalker`]**: mirrors the collection tree on disk, one artifact per request
//! - **[`Generator`]**: the full pipeline, from collection file to zip or directory
//! - **[`OpenAiAugmentor`]**: names undocumented requests via a chat completions API
//! - **[`GeneratorConfig`]**: server mode, collision and augmentation policies
//!
//! ## Example
//!
//! ```ignore
//! use mcpforge::{generate_server, GeneratorConfig, OutputTarget};
//! use mcpforge_mcp::ServerMode;
//!
//! let report = generate_server(
//!     "petstore.postman_collection.json".as_ref(),
//!     &OutputTarget::Directory("petstore-server".into()),
//!     GeneratorConfig::new().with_server_mode(ServerMode::HttpSession),
//! )
//! .await?;
//! println!("{} tools", report.tools.len());
//! ```
//!
//! ## Architecture
//!
//! - [`mcpforge_core`] - collection model and parsing
//! - [`mcpforge_tools`] - schema inference, naming, artifacts and the HTTP tool runtime
//! - [`mcpforge_mcp`] - MCP server and transports

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod augment;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod package;
pub mod templates;
pub mod walker;

pub use mcpforge_core as core;
pub use mcpforge_mcp as mcp;
pub use mcpforge_tools as tools;

pub use augment::OpenAiAugmentor;
pub use config::{GeneratorConfig, OpenAiConfig};
pub use error::{GenerateError, Result};
pub use generator::{generate_server, GenerateReport, Generator, OutputTarget};
pub use package::zip_directory;
pub use templates::{server_name, ServerManifest, TemplateContext};
pub use walker::{CollisionPolicy, TreeWalker, WalkSummary};
