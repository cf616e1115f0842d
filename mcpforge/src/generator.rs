//! The generation pipeline.
//!
//! Reads a collection, compiles every request into a tool artifact, adds the
//! server templates and either zips the result or leaves it unpacked.

use mcpforge_core::Collection;
use mcpforge_mcp::tools_dir;
use mcpforge_tools::{NamingAugmentor, NamingResolver};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::augment::OpenAiAugmentor;
use crate::config::GeneratorConfig;
use crate::error::{GenerateError, Result};
use crate::package::zip_directory;
use crate::templates::{env_variables, server_name, write_templates, TemplateContext};
use crate::walker::TreeWalker;

/// Where a generated server goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// A zip archive. The server is staged in a temporary directory first.
    Zip(PathBuf),
    /// An unpacked directory, created if missing.
    Directory(PathBuf),
}

impl OutputTarget {
    /// The output path.
    pub fn path(&self) -> &Path {
        match self {
            Self::Zip(path) | Self::Directory(path) => path,
        }
    }
}

/// Outcome of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    /// Derived server name.
    pub server_name: String,
    /// Identifiers of the generated tools, in generation order.
    pub tools: Vec<String>,
    /// Request definitions that were skipped.
    pub skipped: usize,
    /// Where the server was written.
    pub output: PathBuf,
}

/// Generates MCP servers from collections.
#[derive(Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
    augmentor: Option<Arc<dyn NamingAugmentor>>,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("config", &self.config)
            .field("augmented", &self.augmentor.is_some())
            .finish()
    }
}

impl Generator {
    /// Create a generator.
    ///
    /// When the config carries OpenAI settings, an [`OpenAiAugmentor`] is
    /// used for naming.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let augmentor = config
            .augment
            .clone()
            .map(|c| Arc::new(OpenAiAugmentor::new(c)) as Arc<dyn NamingAugmentor>);
        Self { config, augmentor }
    }

    /// Use a specific naming augmentor.
    #[must_use]
    pub fn with_augmentor(mut self, augmentor: Arc<dyn NamingAugmentor>) -> Self {
        self.augmentor = Some(augmentor);
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn walker(&self) -> TreeWalker {
        let mut resolver =
            NamingResolver::new().with_failure_policy(self.config.augment_failure);
        if let Some(augmentor) = &self.augmentor {
            resolver = resolver.with_augmentor(Arc::clone(augmentor));
        }
        TreeWalker::new()
            .with_resolver(resolver)
            .with_collision_policy(self.config.collision)
    }

    /// Read a collection file and generate a server from it.
    pub async fn generate_file(&self, input: &Path, target: &OutputTarget) -> Result<GenerateReport> {
        let text = tokio::fs::read_to_string(input)
            .await
            .map_err(|e| GenerateError::read(input, e))?;
        let collection = Collection::from_json(&text)?;
        self.generate(&collection, target).await
    }

    /// Generate a server from a parsed collection.
    pub async fn generate(
        &self,
        collection: &Collection,
        target: &OutputTarget,
    ) -> Result<GenerateReport> {
        let name = server_name(collection.name.as_deref().unwrap_or_default());
        tracing::info!(
            server = %name,
            mode = %self.config.server_mode,
            requests = collection.request_count(),
            "Generating MCP server"
        );

        let (tools, skipped) = match target {
            OutputTarget::Zip(archive) => {
                let staging = tempfile::Builder::new()
                    .prefix("mcp-gen-")
                    .tempdir()
                    .map_err(|e| GenerateError::write(&std::env::temp_dir(), e))?;
                let result = self.write_server(collection, &name, staging.path()).await?;

                let source = staging.path().to_path_buf();
                let archive = archive.clone();
                tokio::task::spawn_blocking(move || zip_directory(&source, &archive))
                    .await
                    .map_err(|e| GenerateError::package(target.path(), e))??;
                result
            }
            OutputTarget::Directory(dir) => {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|e| GenerateError::write(dir, e))?;
                self.write_server(collection, &name, dir).await?
            }
        };

        tracing::info!(
            tools = tools.len(),
            skipped,
            output = %target.path().display(),
            "MCP server generated"
        );
        Ok(GenerateReport {
            server_name: name,
            tools,
            skipped,
            output: target.path().to_path_buf(),
        })
    }

    async fn write_server(
        &self,
        collection: &Collection,
        name: &str,
        root: &Path,
    ) -> Result<(Vec<String>, usize)> {
        let summary = self
            .walker()
            .walk_collection(collection, &tools_dir(root))
            .await?;

        let context = TemplateContext::new(name, self.config.server_mode)
            .with_env_variables(env_variables(&summary.artifacts));
        let tools: Vec<String> = summary.artifacts.iter().map(|a| a.name.clone()).collect();
        write_templates(root, &context, tools.clone()).await?;

        Ok((tools, summary.requests_skipped))
    }
}

/// Generate a server with the given configuration.
pub async fn generate_server(
    input: &Path,
    target: &OutputTarget,
    config: GeneratorConfig,
) -> Result<GenerateReport> {
    Generator::new(config).generate_file(input, target).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{ServerManifest, START_SCRIPT};
    use async_trait::async_trait;
    use mcpforge_core::RequestNode;
    use mcpforge_mcp::{ArtifactToolset, McpServer, ServerMode};
    use mcpforge_tools::{AugmentError, AugmentFailurePolicy, NamingSuggestion};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn collection_json() -> serde_json::Value {
        json!({
            "info": {"name": "Pet Store", "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"},
            "item": [
                {
                    "name": "Pets",
                    "item": [
                        {
                            "name": "Get Pet",
                            "request": {
                                "method": "GET",
                                "url": {
                                    "raw": "{{baseUrl}}/pets/:petId",
                                    "variable": [{"key": "petId", "value": "1"}]
                                }
                            },
                            "response": [
                                {"code": 200, "body": "{\"id\": 1, \"name\": \"Rex\"}"}
                            ]
                        }
                    ]
                },
                {"name": "Notes"},
                {
                    "request": {"method": "DELETE", "url": {"raw": "{{baseUrl}}/cache"}}
                }
            ]
        })
    }

    fn write_collection(dir: &Path) -> PathBuf {
        let path = dir.join("collection.json");
        std::fs::write(&path, collection_json().to_string()).unwrap();
        path
    }

    struct FailingAugmentor;

    #[async_trait]
    impl NamingAugmentor for FailingAugmentor {
        async fn suggest(&self, _node: &RequestNode) -> std::result::Result<NamingSuggestion, AugmentError> {
            Err(AugmentError::Request("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_generate_directory() {
        let work = tempfile::tempdir().unwrap();
        let input = write_collection(work.path());
        let out = work.path().join("server");

        let report = generate_server(
            &input,
            &OutputTarget::Directory(out.clone()),
            GeneratorConfig::new().with_server_mode(ServerMode::HttpSession),
        )
        .await
        .unwrap();

        assert_eq!(report.server_name, "pet-store");
        assert_eq!(report.tools, vec!["getPet", "unnamedTool"]);
        assert_eq!(report.skipped, 1);
        assert!(out.join("tools/Pets/getPet.json").is_file());
        assert!(out.join("tools/unnamedTool.json").is_file());
        assert!(out.join("README.md").is_file());
        assert!(out.join(START_SCRIPT).is_file());

        let env = std::fs::read_to_string(out.join(".env.example")).unwrap();
        assert!(env.contains("baseUrl="));

        let manifest = ServerManifest::load(&out).unwrap();
        assert_eq!(manifest.mode, ServerMode::HttpSession);

        // The generated tree loads back into a server.
        let server = ArtifactToolset::load(tools_dir(&out))
            .unwrap()
            .register(McpServer::new(manifest.name, manifest.version));
        assert_eq!(server.tool_count(), 2);
    }

    #[tokio::test]
    async fn test_generate_zip() {
        let work = tempfile::tempdir().unwrap();
        let input = write_collection(work.path());
        let archive_path = work.path().join("mcp-server.zip");

        let report = generate_server(
            &input,
            &OutputTarget::Zip(archive_path.clone()),
            GeneratorConfig::new(),
        )
        .await
        .unwrap();
        assert_eq!(report.output, archive_path);

        let archive = zip::ZipArchive::new(std::fs::File::open(&archive_path).unwrap()).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"tools/Pets/getPet.json"));
        assert!(names.contains(&"mcp-server.json"));
        assert!(names.contains(&".env.example"));
    }

    #[tokio::test]
    async fn test_generate_missing_input() {
        let work = tempfile::tempdir().unwrap();
        let err = generate_server(
            &work.path().join("missing.json"),
            &OutputTarget::Directory(work.path().join("out")),
            GeneratorConfig::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GenerateError::Read { .. }));
    }

    #[tokio::test]
    async fn test_generate_invalid_collection() {
        let work = tempfile::tempdir().unwrap();
        let input = work.path().join("collection.json");
        std::fs::write(&input, "{not json").unwrap();

        let err = generate_server(
            &input,
            &OutputTarget::Directory(work.path().join("out")),
            GeneratorConfig::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GenerateError::Parse(_)));
    }

    #[tokio::test]
    async fn test_augment_failure_aborts_by_default() {
        let work = tempfile::tempdir().unwrap();
        let input = write_collection(work.path());

        let err = Generator::new(GeneratorConfig::new())
            .with_augmentor(Arc::new(FailingAugmentor))
            .generate_file(&input, &OutputTarget::Directory(work.path().join("out")))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Augment { .. }));
    }

    #[tokio::test]
    async fn test_augment_failure_fallback() {
        let work = tempfile::tempdir().unwrap();
        let input = write_collection(work.path());

        let report = Generator::new(
            GeneratorConfig::new().with_augment_failure(AugmentFailurePolicy::Fallback),
        )
        .with_augmentor(Arc::new(FailingAugmentor))
        .generate_file(&input, &OutputTarget::Directory(work.path().join("out")))
        .await
        .unwrap();
        assert_eq!(report.tools, vec!["getPet", "unnamedTool"]);
    }

    #[tokio::test]
    async fn test_generate_braced_collection_name() {
        let work = tempfile::tempdir().unwrap();
        let mut collection = collection_json();
        collection["info"]["name"] = json!("{{tenant}} Billing");
        let input = work.path().join("collection.json");
        std::fs::write(&input, collection.to_string()).unwrap();
        let out = work.path().join("out");

        let report = generate_server(&input, &OutputTarget::Directory(out.clone()), GeneratorConfig::new())
            .await
            .unwrap();
        assert_eq!(report.server_name, "{{tenant}}-billing");

        let readme = std::fs::read_to_string(out.join("README.md")).unwrap();
        assert!(readme.starts_with("# {{tenant}}-billing\n"));
        assert_eq!(ServerManifest::load(&out).unwrap().name, "{{tenant}}-billing");
    }

    #[tokio::test]
    async fn test_generate_overwritten_tool_listed_once() {
        let work = tempfile::tempdir().unwrap();
        let mut collection = collection_json();
        let duplicate = collection["item"][0]["item"][0].clone();
        collection["item"][0]["item"]
            .as_array_mut()
            .unwrap()
            .push(duplicate);
        let input = work.path().join("collection.json");
        std::fs::write(&input, collection.to_string()).unwrap();
        let out = work.path().join("out");

        let report = generate_server(&input, &OutputTarget::Directory(out.clone()), GeneratorConfig::new())
            .await
            .unwrap();
        assert_eq!(report.tools, vec!["getPet", "unnamedTool"]);
        assert_eq!(ServerManifest::load(&out).unwrap().tools, vec!["getPet", "unnamedTool"]);
    }
}
