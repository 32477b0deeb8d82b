//! LLM Error Types
//!
//! Defines error types for provider gateway operations.

/// Errors that can occur while talking to a provider
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl LLMError {
    /// HTTP status reported by the upstream, if the failure carried one
    pub fn status(&self) -> Option<u16> {
        match self {
            LLMError::ApiError { status, .. } => Some(*status),
            LLMError::AuthError(_) => Some(401),
            LLMError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LLMError>;
