//! Failure taxonomy for the generation pipeline
//!
//! Every failure leaves the pipeline as data: an [`ErrorKind`] for the caller
//! to branch on, a human-readable message, and diagnostics sufficient to
//! root-cause a malformed reply without re-running the request.

use crate::core::llm::LLMError;
use serde::{Deserialize, Serialize};

/// Classified failure cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required request fields were absent
    MissingInput,
    /// The provider returned no usable content
    EmptyResponse,
    /// The whole output budget went to internal deliberation
    ReasoningBudgetExhausted,
    /// No decode strategy could parse a document from the reply
    DecodeFailure,
    /// The reply parsed but lacks the `sections` sequence
    InvalidShape,
    /// The gateway call failed or returned a non-success status
    ProviderError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingInput => "missing_input",
            ErrorKind::EmptyResponse => "empty_response",
            ErrorKind::ReasoningBudgetExhausted => "reasoning_budget_exhausted",
            ErrorKind::DecodeFailure => "decode_failure",
            ErrorKind::InvalidShape => "invalid_shape",
            ErrorKind::ProviderError => "provider_error",
        }
    }

    /// Actionable hint surfaced to end users
    pub fn default_suggestion(&self) -> &'static str {
        match self {
            ErrorKind::MissingInput => "Provide both a content type and a topic.",
            ErrorKind::EmptyResponse => "The model returned nothing. Try again or rephrase the topic.",
            ErrorKind::ReasoningBudgetExhausted => {
                "The model spent its whole output budget reasoning. Increase the token budget or reduce the requested length."
            }
            ErrorKind::DecodeFailure => {
                "The model reply was not valid structured output. Try again, or use a shorter length."
            }
            ErrorKind::InvalidShape => "The model reply was missing its sections. Try again.",
            ErrorKind::ProviderError => "The model provider is unavailable. Try again later.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic metadata attached to every failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u32>,
    /// Output-token ceiling that was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Runtime shape of the reply content (`string`, `object`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Truncated copy of the reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Last parser error seen by the decoder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser_error: Option<String>,
    /// Upstream HTTP status, for provider failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A classified pipeline failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct GenerationFailure {
    pub kind: ErrorKind,
    pub message: String,
    pub diagnostics: Diagnostics,
}

impl GenerationFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            diagnostics: Diagnostics {
                suggestion: Some(kind.default_suggestion().to_string()),
                ..Default::default()
            },
        }
    }

    pub fn missing_input(fields: &[&str]) -> Self {
        Self::new(
            ErrorKind::MissingInput,
            format!("Missing required field(s): {}", fields.join(", ")),
        )
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        let suggestion = diagnostics
            .suggestion
            .clone()
            .or_else(|| self.diagnostics.suggestion.take());
        self.diagnostics = Diagnostics {
            suggestion,
            ..diagnostics
        };
        self
    }

    /// Fill diagnostic fields the failing stage did not know about
    pub fn enrich(mut self, finish_reason: Option<&str>, reasoning_tokens: Option<u32>, ceiling: u32) -> Self {
        let d = &mut self.diagnostics;
        if d.finish_reason.is_none() {
            d.finish_reason = finish_reason.map(str::to_string);
        }
        if d.reasoning_tokens.is_none() {
            d.reasoning_tokens = reasoning_tokens;
        }
        if d.max_output_tokens.is_none() {
            d.max_output_tokens = Some(ceiling);
        }
        self
    }
}

impl From<LLMError> for GenerationFailure {
    fn from(err: LLMError) -> Self {
        let status = err.status();
        let failure = GenerationFailure::new(ErrorKind::ProviderError, err.to_string());
        let suggestion = failure.diagnostics.suggestion.clone();
        failure.with_diagnostics(Diagnostics {
            provider_status: status,
            suggestion,
            ..Default::default()
        })
    }
}

/// Truncate text to at most `max_chars` characters for diagnostics
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
