use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::generation::{BudgetConfig, GenerationSettings, TemplateRegistry};
use crate::core::llm::ProviderConfig;
use crate::core::logging::LoggingConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderSettings,
    pub generation: GenerationSettings,
    pub budget: BudgetConfig,
    pub logging: LoggingConfig,
    /// Instruction overrides keyed by content type (`guide = "..."`)
    pub templates: HashMap<String, String>,
}

/// Provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Entry in the provider table (`openai`, `openrouter`, `groq`, ...)
    pub id: String,
    /// Model name; the provider default when unset
    pub model: Option<String>,
    /// Override the provider's endpoint
    pub base_url: Option<String>,
    /// API key. Prefer `api_key_env` over storing keys in the file.
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset
    pub api_key_env: String,
    /// Force reasoning-model handling on or off
    pub reasoning_model: Option<bool>,
    /// HTTP timeout for a single provider call
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            id: "openai".to_string(),
            model: None,
            base_url: None,
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            reasoning_model: None,
            timeout_secs: 180,
        }
    }
}

impl ProviderSettings {
    /// API key from the file, falling back to the configured env var
    pub fn resolve_api_key(&self) -> String {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .unwrap_or_default()
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/contentgen/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        if !config_path.exists() {
            log::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Self::default();
        }

        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit path, surfacing errors.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Provider settings resolved for `create_provider`
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider_id: self.provider.id.clone(),
            api_key: self.provider.resolve_api_key(),
            model: self.provider.model.clone(),
            base_url: self.provider.base_url.clone(),
            reasoning_model: self.provider.reasoning_model,
            timeout_secs: self.provider.timeout_secs,
        }
    }

    /// Built-in templates with this config's overrides applied
    pub fn template_registry(&self) -> TemplateRegistry {
        TemplateRegistry::builtin().with_overrides(&self.templates)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("contentgen").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
