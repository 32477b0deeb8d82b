//! LLM Client Module
//!
//! Provides the provider gateway used by the generation pipeline:
//! - `router`: `LLMProvider` trait and chat wire types
//! - `providers`: OpenAI-compatible provider implementation and metadata table
//! - `usage`: token accounting

pub mod providers;
pub mod router;
pub mod usage;

// Re-export commonly used types
pub use providers::{find_provider_meta, OpenAIProvider, ProviderConfig, ProviderMeta, PROVIDERS};
pub use router::{
    is_reasoning_model, ChatMessage, ChatRequest, ChatResponse, LLMError, LLMProvider,
    MessageRole, ReplyContent, ResponseSchema, Result, SearchContextSize, WebSearchOptions,
};
pub use usage::TokenUsage;
