//! Tool synthesis.
//!
//! Combines a request definition, its resolved naming and its inferred
//! schemas into a [`ToolArtifact`].

use mcpforge_core::{RequestNode, UrlSpec};

use crate::definition::{HandlerSpec, ToolArtifact};
use crate::inference::{build_input_schema, build_output_schema};
use crate::naming::ToolNaming;
use crate::schema::SchemaDescriptor;

/// Builds tool artifacts from request definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolSynthesizer;

impl ToolSynthesizer {
    /// Create a synthesizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Assemble an artifact. Returns `None` for nodes without a request.
    #[must_use]
    pub fn synthesize(
        &self,
        node: &RequestNode,
        naming: ToolNaming,
        input_schema: SchemaDescriptor,
        output_schema: SchemaDescriptor,
    ) -> Option<ToolArtifact> {
        let request = node.request.as_ref()?;

        let mut handler = HandlerSpec::new(node.method(), url_template(&request.url))
            .with_body(request.raw_body().is_some());
        for key in request.url.path_keys() {
            handler = handler.with_path_param(key);
        }
        for key in request.url.query_keys() {
            handler = handler.with_query_param(key);
        }

        Some(ToolArtifact {
            name: naming.identifier,
            title: naming.title,
            description: naming.description,
            input_schema,
            output_schema,
            handler,
        })
    }

    /// Infer both schemas and assemble the artifact.
    #[must_use]
    pub fn compile(&self, node: &RequestNode, naming: ToolNaming) -> Option<ToolArtifact> {
        let request = node.request.as_ref()?;
        self.synthesize(
            node,
            naming,
            build_input_schema(request),
            build_output_schema(&node.responses),
        )
    }
}

/// Turn a declared URL into a handler URL template.
///
/// The query string and fragment are dropped, `{{var}}` becomes `{var}`, and
/// `:key` path segments of declared path variables become `{key}`.
///
/// ```rust
/// use mcpforge_core::{UrlSpec, Variable};
/// use mcpforge_tools::url_template;
///
/// let url = UrlSpec::new("{{baseUrl}}/pets/:petId?limit=10")
///     .with_path_variable(Variable::new("petId", "1"));
/// assert_eq!(url_template(&url), "{baseUrl}/pets/{petId}");
/// ```
#[must_use]
pub fn url_template(url: &UrlSpec) -> String {
    let base = url
        .raw
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .replace("{{", "{")
        .replace("}}", "}");

    let keys = url.path_keys();
    if keys.is_empty() {
        return base;
    }
    base.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(key) if keys.contains(&key) => format!("{{{key}}}"),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
