//! Token Usage Accounting
//!
//! Usage figures reported by providers, including the reasoning tokens that
//! reasoning-style models spend before emitting visible output.

use serde::{Deserialize, Serialize};

/// Token usage for a request/response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input/prompt tokens
    pub input_tokens: u32,
    /// Number of output/completion tokens (reasoning tokens included)
    pub output_tokens: u32,
    /// Portion of `output_tokens` spent on internal deliberation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u32>,
}

impl TokenUsage {
    /// Create a new token usage record
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            reasoning_tokens: None,
        }
    }

    /// Attach a reasoning token count
    pub fn with_reasoning(mut self, reasoning_tokens: u32) -> Self {
        self.reasoning_tokens = Some(reasoning_tokens);
        self
    }

    /// Total tokens used
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// Output tokens that were actually visible to the caller
    pub fn visible_output_tokens(&self) -> u32 {
        self.output_tokens
            .saturating_sub(self.reasoning_tokens.unwrap_or(0))
    }
}
