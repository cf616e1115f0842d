//! Generator configuration.

use mcpforge_mcp::ServerMode;
use mcpforge_tools::{AugmentError, AugmentFailurePolicy};
use std::time::Duration;

use crate::walker::CollisionPolicy;

/// Environment variable holding the augmentation API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the augmentation base URL.
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";
/// Default augmentation base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default augmentation model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Configuration for the OpenAI naming augmentor.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key.
    pub api_key: String,
    /// Base URL of the chat completions API.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// Create a config with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Read the API key (and optional base URL) from the environment.
    pub fn from_env() -> Result<Self, AugmentError> {
        let api_key = std::env::var(OPENAI_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AugmentError::configuration(format!("{OPENAI_API_KEY_ENV} is not set"))
            })?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var(OPENAI_BASE_URL_ENV) {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the timeout.
    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// The timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Options for a generation run.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Transport the generated server will use.
    pub server_mode: ServerMode,
    /// How tool name collisions are handled.
    pub collision: CollisionPolicy,
    /// What to do when augmentation fails.
    pub augment_failure: AugmentFailurePolicy,
    /// Augmentation settings. `None` disables augmentation.
    pub augment: Option<OpenAiConfig>,
}

impl GeneratorConfig {
    /// Create a config with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server mode.
    #[must_use]
    pub fn with_server_mode(mut self, mode: ServerMode) -> Self {
        self.server_mode = mode;
        self
    }

    /// Set the collision policy.
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision = policy;
        self
    }

    /// Set the augmentation failure policy.
    #[must_use]
    pub fn with_augment_failure(mut self, policy: AugmentFailurePolicy) -> Self {
        self.augment_failure = policy;
        self
    }

    /// Enable augmentation.
    #[must_use]
    pub fn with_augment(mut self, config: OpenAiConfig) -> Self {
        self.augment = Some(config);
        self
    }
}
