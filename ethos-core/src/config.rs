//! Configuration types for Ethos

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{EthosError, Result};
use crate::llm::providers::groq::{GROQ_API_KEY_ENV, GROQ_BASE_URL};
use crate::llm::{DEFAULT_MAX_TOKENS, GroqModel};
use crate::personality::PersonalityCatalog;

/// Default config file looked up in the working directory.
pub const CONFIG_FILE: &str = "ethos.toml";

/// Environment variable naming an additional config file.
pub const CONFIG_PATH_ENV: &str = "ETHOS_CONFIG_PATH";

/// Main configuration for Ethos
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EthosConfig {
    /// Hosted model API configuration
    pub llm: LlmConfig,

    /// Conversation history configuration
    pub conversation: ConversationConfig,

    /// Personality selection
    pub personality: PersonalitySettings,

    /// Transcript export
    pub export: ExportConfig,
}

/// Hosted model API configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model used when a session does not pick one
    pub model: GroqModel,

    /// API key (prefer the GROQ_API_KEY env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,

    /// Total time allowed for one request, including a streamed body
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Time allowed to establish the connection
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: GroqModel::default(),
            api_key: None,
            base_url: GROQ_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl LlmConfig {
    /// Resolve the API credential: config value first, then GROQ_API_KEY.
    ///
    /// # Errors
    ///
    /// Returns [`EthosError::MissingCredential`] when neither is set.
    pub fn resolve_api_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(GROQ_API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| EthosError::MissingCredential(GROQ_API_KEY_ENV.to_string()))
    }
}

/// Conversation history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Exchanges (user + assistant pairs) kept in history
    pub max_history: usize,

    /// Completion budget per request
    pub max_tokens: usize,

    /// Record the partial reply when a stream fails after producing text
    pub keep_partial_replies: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_history: 10,
            max_tokens: DEFAULT_MAX_TOKENS,
            keep_partial_replies: false,
        }
    }
}

impl ConversationConfig {
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history.max(1);
        self
    }

    pub fn with_keep_partial_replies(mut self, keep: bool) -> Self {
        self.keep_partial_replies = keep;
        self
    }
}

/// Personality selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalitySettings {
    /// Personality selected at startup; the catalog's first entry when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// YAML catalog replacing the built-in presets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl PersonalitySettings {
    /// Personality to start with: the configured default, else the first
    /// catalog entry.
    pub fn default_id<'a>(&'a self, catalog: &'a PersonalityCatalog) -> &'a str {
        self.default.as_deref().unwrap_or_else(|| catalog.default_id())
    }

    /// Load the configured catalog, or the built-in one.
    pub fn load_catalog(&self) -> Result<PersonalityCatalog> {
        match &self.catalog_path {
            Some(path) => PersonalityCatalog::from_file(path),
            None => Ok(PersonalityCatalog::builtin().clone()),
        }
    }
}

/// Transcript export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory transcripts are written to
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl EthosConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. `ethos.toml` in the working directory
    /// 3. File named by ETHOS_CONFIG_PATH
    /// 4. `ETHOS_` environment variables, `__` separating nested keys
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is invalid or fails validation.
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Like [`EthosConfig::load`], with an explicit file merged after
    /// ETHOS_CONFIG_PATH and before the environment.
    pub fn load_with(path: Option<&Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(EthosConfig::default()))
            .merge(Toml::file(CONFIG_FILE));

        // Check for custom config path
        if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
            figment = figment.merge(Toml::file(env_path));
        }

        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }

        let config: EthosConfig = figment
            .merge(Env::prefixed("ETHOS_").split("__"))
            .extract()
            .map_err(|e| EthosError::Configuration(format!("Failed to load configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path only.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let config: EthosConfig = Figment::from(Serialized::defaults(EthosConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .extract()
            .map_err(|e| {
                EthosError::Configuration(format!("Failed to load configuration file: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.conversation.max_history == 0 {
            return Err(EthosError::Configuration(
                "conversation.max_history must be at least 1".to_string(),
            ));
        }
        if self.conversation.max_tokens == 0 {
            return Err(EthosError::Configuration(
                "conversation.max_tokens must be at least 1".to_string(),
            ));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(EthosError::Configuration(
                "llm.base_url must not be empty".to_string(),
            ));
        }
        if self
            .personality
            .default
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            return Err(EthosError::Configuration(
                "personality.default must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
