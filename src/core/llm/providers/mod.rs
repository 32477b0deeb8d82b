//! LLM Provider Implementations
//!
//! Every supported upstream speaks the OpenAI `/chat/completions` dialect, so
//! one client implementation is parameterized by the canonical metadata table
//! below.
//!
//! Adding a new provider requires:
//! 1. A new entry in `PROVIDERS`
//! 2. Nothing else, as long as it is OpenAI-compatible

mod openai;

pub use openai::{parse_completion, OpenAIProvider, OPENAI_BASE_URL};

use super::router::{LLMError, LLMProvider, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

// ── Provider metadata ───────────────────────────────────────────────────────

/// Static metadata for a known provider (display name, endpoint, defaults).
#[derive(Clone, Debug)]
pub struct ProviderMeta {
    pub id: &'static str,
    pub display_name: &'static str,
    pub base_url: &'static str,
    pub default_model: &'static str,
    pub needs_api_key: bool,
}

/// Canonical table of all known providers. Single source of truth.
pub const PROVIDERS: &[ProviderMeta] = &[
    ProviderMeta {
        id: "openai",
        display_name: "OpenAI",
        base_url: OPENAI_BASE_URL,
        default_model: "gpt-4o",
        needs_api_key: true,
    },
    ProviderMeta {
        id: "openrouter",
        display_name: "OpenRouter",
        base_url: "https://openrouter.ai/api/v1",
        default_model: "openai/gpt-4o",
        needs_api_key: true,
    },
    ProviderMeta {
        id: "groq",
        display_name: "Groq",
        base_url: "https://api.groq.com/openai/v1",
        default_model: "llama-3.3-70b-versatile",
        needs_api_key: true,
    },
    ProviderMeta {
        id: "deepseek",
        display_name: "DeepSeek",
        base_url: "https://api.deepseek.com/v1",
        default_model: "deepseek-chat",
        needs_api_key: true,
    },
    ProviderMeta {
        id: "ollama",
        display_name: "Ollama (Local)",
        base_url: "http://localhost:11434/v1",
        default_model: "llama3.2",
        needs_api_key: false,
    },
];

/// Look up a provider's metadata by ID.
pub fn find_provider_meta(id: &str) -> Option<&'static ProviderMeta> {
    PROVIDERS.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}

// ── ProviderConfig ──────────────────────────────────────────────────────────

/// Resolved settings for creating a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Key into `PROVIDERS`
    pub provider_id: String,
    pub api_key: String,
    /// Falls back to the provider's default model
    pub model: Option<String>,
    /// Falls back to the provider's canonical endpoint
    pub base_url: Option<String>,
    /// Overrides name-based reasoning-model detection
    pub reasoning_model: Option<bool>,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Create a provider from this configuration
    pub fn create_provider(&self) -> Result<Arc<dyn LLMProvider>> {
        let meta = find_provider_meta(&self.provider_id)
            .ok_or_else(|| LLMError::NotConfigured(format!("unknown provider '{}'", self.provider_id)))?;

        if meta.needs_api_key && self.api_key.trim().is_empty() {
            return Err(LLMError::NotConfigured(format!(
                "{} requires an API key",
                meta.display_name
            )));
        }

        // Local servers accept any bearer token
        let api_key = if meta.needs_api_key {
            self.api_key.clone()
        } else if self.api_key.is_empty() {
            meta.id.to_string()
        } else {
            self.api_key.clone()
        };

        let mut provider = OpenAIProvider::new(
            api_key,
            self.model_name(),
            Some(
                self.base_url
                    .clone()
                    .unwrap_or_else(|| meta.base_url.to_string()),
            ),
            Duration::from_secs(self.timeout_secs),
        )?;

        if let Some(reasoning) = self.reasoning_model {
            provider = provider.with_reasoning_model(reasoning);
        }

        tracing::info!(
            provider = meta.id,
            model = %provider.model(),
            reasoning = provider.is_reasoning_model(),
            "provider configured"
        );

        Ok(Arc::new(provider))
    }

    /// Get the model name for this configuration
    pub fn model_name(&self) -> String {
        self.model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| find_provider_meta(&self.provider_id).map(|m| m.default_model.to_string()))
            .unwrap_or_else(|| "gpt-4o".to_string())
    }
}
