//! LLM Message Types
//!
//! Core types for chat messages, requests and responses exchanged with a
//! provider gateway.

use crate::core::llm::usage::TokenUsage;
use serde::{Deserialize, Serialize};

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// Strict structured-output contract sent alongside a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    /// Schema name reported to the provider
    pub name: String,
    /// Whether the provider must reject replies that deviate from the schema
    pub strict: bool,
    /// JSON Schema document
    pub schema: serde_json::Value,
}

/// How much web context a search-enabled request should pull in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchContextSize {
    Low,
    Medium,
    High,
}

/// Web research options for providers that support grounded generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchOptions {
    pub search_context_size: SearchContextSize,
}

/// Request for a chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Optional: Strict output schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<ResponseSchema>,
    /// Optional: Web research settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_search: Option<WebSearchOptions>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
            response_schema: None,
            web_search: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_response_schema(mut self, schema: ResponseSchema) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_web_search(mut self, options: WebSearchOptions) -> Self {
        self.web_search = Some(options);
        self
    }

    /// Content of the first system message, if any
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Message content as returned by a provider.
///
/// Providers are expected to return a JSON string, but some hand back an
/// already-parsed value when structured output is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyContent {
    Text(String),
    Structured(serde_json::Value),
}

impl ReplyContent {
    /// Classify a raw `message.content` value
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => ReplyContent::Text(s),
            serde_json::Value::Null => ReplyContent::Text(String::new()),
            other => ReplyContent::Structured(other),
        }
    }

    /// Short name of the content's runtime shape, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            ReplyContent::Text(_) => "string",
            ReplyContent::Structured(serde_json::Value::Object(_)) => "object",
            ReplyContent::Structured(serde_json::Value::Array(_)) => "array",
            ReplyContent::Structured(_) => "scalar",
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            ReplyContent::Text(s) => s.trim().is_empty(),
            ReplyContent::Structured(_) => false,
        }
    }
}

impl Default for ReplyContent {
    fn default() -> Self {
        ReplyContent::Text(String::new())
    }
}

impl From<&str> for ReplyContent {
    fn from(s: &str) -> Self {
        ReplyContent::Text(s.to_string())
    }
}

impl From<String> for ReplyContent {
    fn from(s: String) -> Self {
        ReplyContent::Text(s)
    }
}

/// Response from a chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: ReplyContent,
    pub model: String,
    pub provider: String,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
    pub latency_ms: u64,
}
