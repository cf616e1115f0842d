//! Collection tree walking.
//!
//! The walker mirrors the folder hierarchy of a collection on disk and writes
//! one tool artifact per request definition. Traversal is depth-first
//! pre-order in declaration order, driven by an explicit work stack so deep
//! trees cannot overflow the call stack.

use mcpforge_core::{Collection, CollectionNode, RequestNode};
use mcpforge_tools::{sanitize_dir_name, NamingResolver, ToolArtifact, ToolSynthesizer};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{GenerateError, Result};

/// Directory name used for folders without a usable name.
pub const UNNAMED_FOLDER: &str = "unnamed_folder";

/// What to do when two requests resolve to the same tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// The later tool replaces the earlier one. A warning is logged.
    #[default]
    Overwrite,
    /// The later tool gets a numeric suffix: `getUser2`, `getUser3`, ...
    Suffix,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "overwrite" => Ok(Self::Overwrite),
            "suffix" => Ok(Self::Suffix),
            other => Err(format!(
                "unknown collision policy '{other}' (expected overwrite or suffix)"
            )),
        }
    }
}

/// What a walk produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkSummary {
    /// Distinct tool files written. A file overwritten on collision counts once.
    pub tools_written: usize,
    /// Folders visited.
    pub folders_created: usize,
    /// Request definitions without a request payload.
    pub requests_skipped: usize,
    /// Paths of the tool files, in first-write order.
    pub written: Vec<PathBuf>,
    /// Artifacts as they ended up on disk, parallel to `written`.
    pub artifacts: Vec<ToolArtifact>,
}

/// Walks a collection tree and writes tool artifacts.
#[derive(Debug, Clone, Default)]
pub struct TreeWalker {
    resolver: NamingResolver,
    synthesizer: ToolSynthesizer,
    collision: CollisionPolicy,
}

#[derive(Default)]
struct WalkState {
    identifiers: HashSet<String>,
    /// Written path to its index in the summary.
    paths: HashMap<PathBuf, usize>,
}

impl TreeWalker {
    /// Create a walker with local naming and overwrite on collision.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the naming resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: NamingResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set the collision policy.
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision = policy;
        self
    }

    /// Walk a single node into `output_root`.
    ///
    /// A folder root becomes a subdirectory of `output_root`; a request root
    /// becomes a file in it.
    pub async fn walk(&self, root: &CollectionNode, output_root: &Path) -> Result<WalkSummary> {
        self.walk_nodes(std::slice::from_ref(root), output_root)
            .await
    }

    /// Walk the top-level items of a collection directly into `tools_dir`.
    pub async fn walk_collection(
        &self,
        collection: &Collection,
        tools_dir: &Path,
    ) -> Result<WalkSummary> {
        create_dir(tools_dir).await?;
        self.walk_nodes(&collection.items, tools_dir).await
    }

    async fn walk_nodes(&self, nodes: &[CollectionNode], dir: &Path) -> Result<WalkSummary> {
        let mut summary = WalkSummary::default();
        let mut state = WalkState::default();
        let mut stack: Vec<(&CollectionNode, PathBuf)> = nodes
            .iter()
            .rev()
            .map(|node| (node, dir.to_path_buf()))
            .collect();

        while let Some((node, dir)) = stack.pop() {
            match node {
                CollectionNode::Folder(folder) => {
                    let name = folder
                        .name
                        .as_deref()
                        .map(sanitize_dir_name)
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| UNNAMED_FOLDER.to_string());
                    let folder_dir = dir.join(name);
                    tracing::info!(folder = %folder_dir.display(), "Processing folder");
                    create_dir(&folder_dir).await?;
                    summary.folders_created += 1;

                    stack.extend(
                        folder
                            .children
                            .iter()
                            .rev()
                            .map(|child| (child, folder_dir.clone())),
                    );
                }
                CollectionNode::Request(request) => {
                    let label = request.name.as_deref().unwrap_or("Unnamed");
                    if request.request.is_none() {
                        tracing::debug!(request = label, "Skipping item without a request");
                        summary.requests_skipped += 1;
                        continue;
                    }
                    tracing::info!(request = label, "Processing request");

                    let Some(artifact) = self.compile(request).await? else {
                        summary.requests_skipped += 1;
                        continue;
                    };
                    let artifact = self.place(artifact, &dir, &mut state);
                    let path = dir.join(artifact.file_name());
                    let text = artifact.render().map_err(|source| GenerateError::Render {
                        tool: artifact.name.clone(),
                        source,
                    })?;
                    tokio::fs::write(&path, text)
                        .await
                        .map_err(|e| GenerateError::write(&path, e))?;
                    tracing::info!(tool = %artifact.name, path = %path.display(), "Generated tool");

                    if let Some(&index) = state.paths.get(&path) {
                        summary.artifacts[index] = artifact;
                    } else {
                        state.paths.insert(path.clone(), summary.written.len());
                        summary.tools_written += 1;
                        summary.written.push(path);
                        summary.artifacts.push(artifact);
                    }
                }
            }
        }

        Ok(summary)
    }

    async fn compile(&self, node: &RequestNode) -> Result<Option<ToolArtifact>> {
        let naming = self
            .resolver
            .resolve(node)
            .await
            .map_err(|source| GenerateError::Augment {
                request: node.name.clone().unwrap_or_default(),
                source,
            })?;
        Ok(self.synthesizer.compile(node, naming))
    }

    /// Apply the collision policy and record the final identifier.
    fn place(&self, mut artifact: ToolArtifact, dir: &Path, state: &mut WalkState) -> ToolArtifact {
        match self.collision {
            CollisionPolicy::Overwrite => {
                if state.paths.contains_key(&dir.join(artifact.file_name())) {
                    tracing::warn!(tool = %artifact.name, "Tool name collision, overwriting");
                } else if state.identifiers.contains(&artifact.name) {
                    tracing::warn!(tool = %artifact.name, "Tool name already used in another folder");
                }
            }
            CollisionPolicy::Suffix => {
                if state.identifiers.contains(&artifact.name) {
                    let base = artifact.name.clone();
                    let mut n = 2;
                    while state.identifiers.contains(&format!("{base}{n}")) {
                        n += 1;
                    }
                    artifact.name = format!("{base}{n}");
                    tracing::warn!(tool = %base, renamed = %artifact.name, "Tool name collision, renamed");
                }
            }
        }
        state.identifiers.insert(artifact.name.clone());
        artifact
    }
}

async fn create_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| GenerateError::write(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpforge_core::{Folder, RequestSpec, UrlSpec};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn request(name: &str) -> RequestNode {
        RequestNode::new(name).with_request(RequestSpec::new(
            "GET",
            UrlSpec::new(format!("https://api.test/{}", name.to_lowercase().replace(' ', "/"))),
        ))
    }

    fn relative_files(root: &Path) -> Vec<String> {
        let mut files: Vec<String> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }

    #[tokio::test]
    async fn test_hierarchy_fidelity() {
        let out = tempfile::tempdir().unwrap();
        let root: CollectionNode = Folder::new("A")
            .with_child(Folder::new("B/C").with_child(request("Get Thing")))
            .into();

        let summary = TreeWalker::new().walk(&root, out.path()).await.unwrap();

        assert_eq!(relative_files(out.path()), vec!["A/B_C/getThing.json"]);
        assert_eq!(summary.tools_written, 1);
        assert_eq!(summary.folders_created, 2);
    }

    #[tokio::test]
    async fn test_empty_folder_still_created() {
        let out = tempfile::tempdir().unwrap();
        let root: CollectionNode = Folder::new("Empty").into();

        TreeWalker::new().walk(&root, out.path()).await.unwrap();
        assert!(out.path().join("Empty").is_dir());
    }

    #[tokio::test]
    async fn test_skips_items_without_request() {
        let out = tempfile::tempdir().unwrap();
        let collection = Collection::new("c")
            .with_item(RequestNode::new("Docs only"))
            .with_item(request("Ping"));

        let summary = TreeWalker::new()
            .walk_collection(&collection, out.path())
            .await
            .unwrap();

        assert_eq!(summary.requests_skipped, 1);
        assert_eq!(relative_files(out.path()), vec!["ping.json"]);
    }

    #[tokio::test]
    async fn test_pre_order_declaration_order() {
        let out = tempfile::tempdir().unwrap();
        let collection = Collection::new("c")
            .with_item(request("First"))
            .with_item(
                Folder::new("Nested")
                    .with_child(request("Second"))
                    .with_child(request("Third")),
            )
            .with_item(request("Fourth"));

        let summary = TreeWalker::new()
            .walk_collection(&collection, out.path())
            .await
            .unwrap();

        let names: Vec<&str> = summary.artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third", "fourth"]);
    }

    #[tokio::test]
    async fn test_idempotent_output() {
        let collection = Collection::new("c").with_item(
            Folder::new("Users").with_child(request("List Users")).with_child(request("Get User")),
        );
        let walker = TreeWalker::new();

        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        walker.walk_collection(&collection, first.path()).await.unwrap();
        walker.walk_collection(&collection, second.path()).await.unwrap();
        // Walking into an existing tree is also fine.
        walker.walk_collection(&collection, second.path()).await.unwrap();

        let files = relative_files(first.path());
        assert_eq!(files, relative_files(second.path()));
        for file in files {
            assert_eq!(
                std::fs::read(first.path().join(&file)).unwrap(),
                std::fs::read(second.path().join(&file)).unwrap()
            );
        }
    }

    #[tokio::test]
    async fn test_collision_overwrite() {
        let out = tempfile::tempdir().unwrap();
        let collection = Collection::new("c")
            .with_item(request("Get User"))
            .with_item(request("get user"));

        let summary = TreeWalker::new()
            .walk_collection(&collection, out.path())
            .await
            .unwrap();

        assert_eq!(summary.tools_written, 1);
        assert_eq!(summary.written, vec![out.path().join("getUser.json")]);
        assert_eq!(summary.artifacts.len(), 1);
        assert_eq!(summary.artifacts[0].title, "get user");
        assert_eq!(relative_files(out.path()), vec!["getUser.json"]);
        let text = std::fs::read_to_string(out.path().join("getUser.json")).unwrap();
        assert!(text.contains("\"title\": \"get user\""));
    }

    #[tokio::test]
    async fn test_collision_suffix() {
        let out = tempfile::tempdir().unwrap();
        let collection = Collection::new("c")
            .with_item(request("Get User"))
            .with_item(request("get user"))
            .with_item(Folder::new("Other").with_child(request("Get-User")));

        let summary = TreeWalker::new()
            .with_collision_policy(CollisionPolicy::Suffix)
            .walk_collection(&collection, out.path())
            .await
            .unwrap();

        assert_eq!(
            relative_files(out.path()),
            vec!["Other/getUser3.json", "getUser.json", "getUser2.json"]
        );
        assert_eq!(summary.artifacts[1].name, "getUser2");
    }

    #[test]
    fn test_collision_policy_from_str() {
        assert_eq!("suffix".parse::<CollisionPolicy>(), Ok(CollisionPolicy::Suffix));
        assert!("rename".parse::<CollisionPolicy>().is_err());
    }
}
