//! Static files of a generated server.
//!
//! Besides the tool artifacts, a generated server carries a README, an
//! environment sample, a start script and an `mcp-server.json` manifest. The
//! text files are embedded templates with `{{serverName}}`, `{{serverMode}}`
//! and `{{envVariables}}` slots; the manifest is serialized directly.

use mcpforge_mcp::ServerMode;
use mcpforge_tools::ToolArtifact;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{GenerateError, Result};

/// Server name used when the collection has none.
pub const DEFAULT_SERVER_NAME: &str = "mcp-server";
/// File name of the server manifest.
pub const MANIFEST_FILE: &str = "mcp-server.json";
/// File name of the start script.
pub const START_SCRIPT: &str = "start.sh";

/// An embedded text template.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    /// Output file name.
    pub file: &'static str,
    /// Template text.
    pub source: &'static str,
    /// Whether the output should be executable.
    pub executable: bool,
}

/// The embedded templates, in write order.
pub const TEMPLATES: [Template; 3] = [
    Template {
        file: "README.md",
        source: include_str!("../templates/README.md"),
        executable: false,
    },
    Template {
        file: ".env.example",
        source: include_str!("../templates/env"),
        executable: false,
    },
    Template {
        file: START_SCRIPT,
        source: include_str!("../templates/start.sh"),
        executable: true,
    },
];

/// Derive the server name from a collection name.
///
/// Whitespace runs become `-` and the result is lower-cased.
///
/// ```rust
/// use mcpforge::templates::server_name;
///
/// assert_eq!(server_name("Pet  Store API"), "pet-store-api");
/// assert_eq!(server_name(""), "mcp-server");
/// ```
#[must_use]
pub fn server_name(collection_name: &str) -> String {
    let mut name = String::with_capacity(collection_name.len());
    let mut in_whitespace = false;
    for c in collection_name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                name.push('-');
            }
            in_whitespace = true;
        } else {
            name.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }
    if name.is_empty() {
        DEFAULT_SERVER_NAME.to_string()
    } else {
        name
    }
}

/// Runtime variables the tools expect from the environment.
///
/// These are the URL template slots that are not path parameters, sorted and
/// deduplicated.
pub fn env_variables<'a>(artifacts: impl IntoIterator<Item = &'a ToolArtifact>) -> Vec<String> {
    let mut names = BTreeSet::new();
    for artifact in artifacts {
        for slot in artifact.handler.template_slots() {
            if !artifact.handler.path_params.iter().any(|p| p == slot) {
                names.insert(slot.to_string());
            }
        }
    }
    names.into_iter().collect()
}

/// Values substituted into the templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    /// Server name.
    pub server_name: String,
    /// Transport of the generated server.
    pub server_mode: ServerMode,
    /// Runtime variables listed in `.env.example`.
    pub env_variables: Vec<String>,
}

impl TemplateContext {
    /// Create a context without runtime variables.
    #[must_use]
    pub fn new(server_name: impl Into<String>, server_mode: ServerMode) -> Self {
        Self {
            server_name: server_name.into(),
            server_mode,
            env_variables: Vec::new(),
        }
    }

    /// Set the runtime variables.
    #[must_use]
    pub fn with_env_variables(mut self, names: Vec<String>) -> Self {
        self.env_variables = names;
        self
    }

    /// Render a template.
    ///
    /// Fails when the template uses a `{{...}}` slot other than the known
    /// ones. Substituted values are never rescanned.
    pub fn render(&self, name: &str, source: &str) -> Result<String> {
        let mut out = String::with_capacity(source.len());
        let mut rest = source;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let slot = after.find("}}").map(|end| &after[..end]);
            match slot {
                Some("serverName") => out.push_str(&self.server_name),
                Some("serverMode") => out.push_str(self.server_mode.as_str()),
                Some("envVariables") => out.push_str(&self.env_lines()),
                _ => {
                    let shown: String = rest[start..].chars().take_while(|c| *c != '\n').collect();
                    return Err(GenerateError::Template {
                        name: name.to_string(),
                        message: format!("unknown placeholder {shown}"),
                    });
                }
            }
            rest = slot.map_or("", |slot| &after[slot.len() + 2..]);
        }
        out.push_str(rest);
        Ok(out)
    }

    fn env_lines(&self) -> String {
        self.env_variables
            .iter()
            .map(|v| format!("{v}="))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Contents of `mcp-server.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerManifest {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
    /// Transport.
    pub mode: ServerMode,
    /// Directory holding the tool artifacts, relative to the manifest.
    pub tools_dir: String,
    /// Tool identifiers, in generation order.
    #[serde(default)]
    pub tools: Vec<String>,
}

impl ServerManifest {
    /// Create a manifest for the given tools.
    #[must_use]
    pub fn new(context: &TemplateContext, tools: Vec<String>) -> Self {
        Self {
            name: context.server_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode: context.server_mode,
            tools_dir: "tools".to_string(),
            tools,
        }
    }

    /// Directory of the tool artifacts of the server rooted at `dir`.
    pub fn tools_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.tools_dir)
    }

    /// Read a manifest from a generated server directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let text = std::fs::read_to_string(&path).map_err(|e| GenerateError::read(&path, e))?;
        serde_json::from_str(&text).map_err(|e| GenerateError::Template {
            name: MANIFEST_FILE.to_string(),
            message: e.to_string(),
        })
    }
}

/// Write the templates and the manifest into `dir`.
pub async fn write_templates(
    dir: &Path,
    context: &TemplateContext,
    tools: Vec<String>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(TEMPLATES.len() + 1);

    for template in TEMPLATES {
        let path = dir.join(template.file);
        let text = context.render(template.file, template.source)?;
        tokio::fs::write(&path, text)
            .await
            .map_err(|e| GenerateError::write(&path, e))?;
        if template.executable {
            make_executable(&path).await?;
        }
        written.push(path);
    }

    let path = dir.join(MANIFEST_FILE);
    let manifest = ServerManifest::new(context, tools);
    let mut text = serde_json::to_string_pretty(&manifest).map_err(|e| GenerateError::Template {
        name: MANIFEST_FILE.to_string(),
        message: e.to_string(),
    })?;
    text.push('\n');
    tokio::fs::write(&path, text)
        .await
        .map_err(|e| GenerateError::write(&path, e))?;
    written.push(path);

    tracing::debug!(count = written.len(), "Templates written");
    Ok(written)
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|e| GenerateError::write(path, e))
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
