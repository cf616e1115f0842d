//! Tool naming.
//!
//! Every generated tool needs an identifier, a title and a description. They
//! come from the request's declared name and description, optionally helped
//! by an external [`NamingAugmentor`] when either is missing.

use async_trait::async_trait;
use mcpforge_core::RequestNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::errors::AugmentError;

/// Title used when a request has no name.
pub const UNNAMED_TOOL_TITLE: &str = "Unnamed Tool";

/// Identifier used when a name sanitizes to nothing.
pub const FALLBACK_IDENTIFIER: &str = "unnamedTool";

/// Turn a human title into a camelCase identifier.
///
/// Characters other than ASCII letters, digits, whitespace and `-` are
/// dropped. Whitespace runs act as word separators like `-` does. The first
/// word is lower-cased; later words get an upper-cased first letter and keep
/// the rest of their case.
///
/// ```rust
/// use mcpforge_tools::sanitize_name;
///
/// assert_eq!(sanitize_name("Get User Info!"), "getUserInfo");
/// assert_eq!(sanitize_name("list-all-PETs"), "listAllPETs");
/// ```
#[must_use]
pub fn sanitize_name(title: &str) -> String {
    let mut words: Vec<String> = vec![String::new()];
    let mut in_whitespace = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                words.push(String::new());
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c == '-' {
            words.push(String::new());
        } else if c.is_ascii_alphanumeric() {
            if let Some(word) = words.last_mut() {
                word.push(c);
            }
        }
    }

    let mut words = words.into_iter();
    let mut identifier = words.next().unwrap_or_default().to_ascii_lowercase();
    for word in words {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            identifier.push(first.to_ascii_uppercase());
            identifier.push_str(chars.as_str());
        }
    }
    identifier
}

/// Turn a folder name into a safe directory name.
///
/// Every character outside `[A-Za-z0-9_-]` becomes `_`.
#[must_use]
pub fn sanitize_dir_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// The resolved identity of a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolNaming {
    /// Sanitized identifier.
    pub identifier: String,
    /// Human title.
    pub title: String,
    /// Human description.
    pub description: String,
}

/// A name and description proposed by an augmentation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingSuggestion {
    /// Suggested tool name.
    pub name: String,
    /// Suggested description.
    pub description: String,
}

/// A service that proposes a name and description for a request.
#[async_trait]
pub trait NamingAugmentor: Send + Sync {
    /// Suggest a name and description for the given request.
    async fn suggest(&self, node: &RequestNode) -> Result<NamingSuggestion, AugmentError>;
}

/// What to do when the augmentor fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AugmentFailurePolicy {
    /// Propagate the error and stop.
    #[default]
    Abort,
    /// Log a warning and use the local heuristics.
    Fallback,
}

/// Resolves tool names from request definitions.
#[derive(Clone, Default)]
pub struct NamingResolver {
    augmentor: Option<Arc<dyn NamingAugmentor>>,
    failure_policy: AugmentFailurePolicy,
}

impl NamingResolver {
    /// Create a resolver that only uses local heuristics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an augmentation service for incomplete requests.
    #[must_use]
    pub fn with_augmentor(mut self, augmentor: Arc<dyn NamingAugmentor>) -> Self {
        self.augmentor = Some(augmentor);
        self
    }

    /// Set the augmentation failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: AugmentFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Check if an augmentor is configured.
    #[must_use]
    pub fn has_augmentor(&self) -> bool {
        self.augmentor.is_some()
    }

    /// Resolve naming from the declared name and description only.
    #[must_use]
    pub fn resolve_local(node: &RequestNode) -> ToolNaming {
        let title = declared(&node.name).unwrap_or(UNNAMED_TOOL_TITLE).to_string();
        let description = declared(&node.description).map_or_else(
            || format!("Handles the {} request.", node.method()),
            String::from,
        );
        ToolNaming {
            identifier: identifier_for(&title),
            title,
            description,
        }
    }

    /// Resolve naming, consulting the augmentor when the name or the
    /// description is missing.
    pub async fn resolve(&self, node: &RequestNode) -> Result<ToolNaming, AugmentError> {
        let Some(augmentor) = &self.augmentor else {
            return Ok(Self::resolve_local(node));
        };
        if declared(&node.name).is_some() && declared(&node.description).is_some() {
            return Ok(Self::resolve_local(node));
        }

        match augmentor.suggest(node).await {
            Ok(suggestion) => Ok(Self::apply_suggestion(node, suggestion)),
            Err(err) if self.failure_policy == AugmentFailurePolicy::Fallback => {
                tracing::warn!(
                    request = node.name.as_deref().unwrap_or(UNNAMED_TOOL_TITLE),
                    error = %err,
                    "Naming augmentation failed, using local names"
                );
                Ok(Self::resolve_local(node))
            }
            Err(err) => Err(err),
        }
    }

    fn apply_suggestion(node: &RequestNode, suggestion: NamingSuggestion) -> ToolNaming {
        let local = Self::resolve_local(node);
        let suggested_name = suggestion.name.trim();
        let suggested_name = if suggested_name.is_empty() {
            local.title.as_str()
        } else {
            suggested_name
        };
        let title = declared(&node.name).unwrap_or(suggested_name).to_string();
        let description = if suggestion.description.trim().is_empty() {
            local.description
        } else {
            suggestion.description
        };
        ToolNaming {
            identifier: identifier_for(suggested_name),
            title,
            description,
        }
    }
}

impl fmt::Debug for NamingResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamingResolver")
            .field("has_augmentor", &self.augmentor.is_some())
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

fn declared(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn identifier_for(title: &str) -> String {
    let identifier = sanitize_name(title);
    if identifier.is_empty() {
        FALLBACK_IDENTIFIER.to_string()
    } else {
        identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpforge_core::{RequestSpec, UrlSpec};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Get User Info!", "getUserInfo")]
    #[case("get-user-info", "getUserInfo")]
    #[case("Create  new   PET", "createNewPET")]
    #[case("  leading space", "LeadingSpace")]
    #[case("List Users (v2)", "listUsersV2")]
    #[case("déjà vu", "djVu")]
    #[case("a--b", "aB")]
    #[case("!!!", "")]
    #[case("", "")]
    fn test_sanitize_name(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_name(input), expected);
    }

    #[rstest]
    #[case("Get User Info!")]
    #[case("ünïcödé name")]
    #[case("a-b c_d")]
    fn test_sanitize_name_charset(#[case] input: &str) {
        assert!(sanitize_name(input).chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[rstest]
    #[case("B C", "B_C")]
    #[case("users/admin", "users_admin")]
    #[case("keep_this-one", "keep_this-one")]
    #[case("ä", "_")]
    fn test_sanitize_dir_name(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_dir_name(input), expected);
    }

    fn node(name: Option<&str>, description: Option<&str>) -> RequestNode {
        RequestNode {
            name: name.map(String::from),
            description: description.map(String::from),
            request: Some(RequestSpec::new("delete", UrlSpec::new("https://x.test"))),
            responses: Vec::new(),
        }
    }

    struct FixedAugmentor {
        result: Result<NamingSuggestion, String>,
        calls: Mutex<usize>,
    }

    impl FixedAugmentor {
        fn ok(name: &str, description: &str) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(NamingSuggestion {
                    name: name.to_string(),
                    description: description.to_string(),
                }),
                calls: Mutex::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                result: Err("service down".to_string()),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock()
        }
    }

    #[async_trait]
    impl NamingAugmentor for FixedAugmentor {
        async fn suggest(&self, _node: &RequestNode) -> Result<NamingSuggestion, AugmentError> {
            *self.calls.lock() += 1;
            self.result
                .clone()
                .map_err(AugmentError::Request)
        }
    }

    #[test]
    fn test_resolve_local_defaults() {
        let naming = NamingResolver::resolve_local(&node(None, None));
        assert_eq!(
            naming,
            ToolNaming {
                identifier: "unnamedTool".to_string(),
                title: "Unnamed Tool".to_string(),
                description: "Handles the DELETE request.".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_local_declared() {
        let naming = NamingResolver::resolve_local(&node(Some("Remove Pet"), Some("Deletes a pet")));
        assert_eq!(naming.identifier, "removePet");
        assert_eq!(naming.title, "Remove Pet");
        assert_eq!(naming.description, "Deletes a pet");
    }

    #[test]
    fn test_unsanitizable_name_falls_back() {
        let naming = NamingResolver::resolve_local(&node(Some("???"), None));
        assert_eq!(naming.identifier, FALLBACK_IDENTIFIER);
        assert_eq!(naming.title, "???");
    }

    #[tokio::test]
    async fn test_augmentor_not_called_when_complete() {
        let augmentor = FixedAugmentor::ok("Other Name", "Other description");
        let resolver = NamingResolver::new().with_augmentor(augmentor.clone());

        let naming = resolver
            .resolve(&node(Some("Remove Pet"), Some("Deletes a pet")))
            .await
            .unwrap();
        assert_eq!(naming.identifier, "removePet");
        assert_eq!(augmentor.calls(), 0);
    }

    #[tokio::test]
    async fn test_augmentor_fills_missing_description() {
        let augmentor = FixedAugmentor::ok("Delete Pet By Id", "Removes one pet.");
        let resolver = NamingResolver::new().with_augmentor(augmentor.clone());

        let naming = resolver.resolve(&node(Some("Remove Pet"), None)).await.unwrap();
        assert_eq!(naming.identifier, "deletePetById");
        assert_eq!(naming.title, "Remove Pet");
        assert_eq!(naming.description, "Removes one pet.");
        assert_eq!(augmentor.calls(), 1);
    }

    #[tokio::test]
    async fn test_augmentor_fills_missing_name() {
        let resolver =
            NamingResolver::new().with_augmentor(FixedAugmentor::ok("Delete Pet", "Removes a pet."));

        let naming = resolver.resolve(&node(None, Some("x"))).await.unwrap();
        assert_eq!(naming.title, "Delete Pet");
        assert_eq!(naming.identifier, "deletePet");
    }

    #[tokio::test]
    async fn test_augmentor_failure_aborts_by_default() {
        let resolver = NamingResolver::new().with_augmentor(FixedAugmentor::failing());
        let err = resolver.resolve(&node(None, None)).await.unwrap_err();
        assert!(err.to_string().contains("service down"));
    }

    #[tokio::test]
    async fn test_augmentor_failure_fallback() {
        let resolver = NamingResolver::new()
            .with_augmentor(FixedAugmentor::failing())
            .with_failure_policy(AugmentFailurePolicy::Fallback);
        let naming = resolver.resolve(&node(Some("Remove Pet"), None)).await.unwrap();
        assert_eq!(naming.identifier, "removePet");
        assert_eq!(naming.description, "Handles the DELETE request.");
    }
}
