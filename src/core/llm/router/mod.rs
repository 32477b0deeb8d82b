//! Provider Gateway
//!
//! The `LLMProvider` trait is the only seam between the generation pipeline
//! and an upstream model service.

mod error;
mod types;

pub use error::{LLMError, Result};
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, MessageRole, ReplyContent, ResponseSchema,
    SearchContextSize, WebSearchOptions,
};

use async_trait::async_trait;

/// Trait that all LLM providers must implement
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Get the provider's unique identifier
    fn id(&self) -> &str;

    /// Get the provider's display name
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;

    /// Whether the configured model deliberates internally before answering
    fn is_reasoning_model(&self) -> bool {
        is_reasoning_model(self.model())
    }

    /// Send a chat completion request
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}

/// Model families known to spend output budget on hidden reasoning
const REASONING_PREFIXES: &[&str] = &["o1", "o3", "o4", "gpt-5", "deepseek-reasoner"];

/// Heuristic reasoning-model detection by model name.
///
/// Vendor prefixes such as `openai/` are ignored.
pub fn is_reasoning_model(model: &str) -> bool {
    let name = model
        .rsplit('/')
        .next()
        .unwrap_or(model)
        .trim()
        .to_ascii_lowercase();

    REASONING_PREFIXES.iter().any(|p| name.starts_with(p))
        || name.contains("thinking")
        || name.contains("reasoning")
}
