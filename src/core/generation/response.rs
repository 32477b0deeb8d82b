//! Outbound result shape for HTTP-layer callers

use super::error::{ErrorKind, GenerationFailure};
use super::types::{ContentDocument, PipelineResult, Section};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentContent {
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessBody {
    pub success: bool,
    pub title: String,
    pub description: String,
    pub tldr: String,
    pub icon: String,
    pub content: DocumentContent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl FailureDetails {
    fn is_empty(&self) -> bool {
        self.finish_reason.is_none() && self.reasoning_tokens.is_none() && self.suggestion.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FailureDetails>,
    /// Kept for the caller's status-code mapping; not serialized
    #[serde(skip)]
    pub kind: ErrorKind,
}

/// `{success: true, ...}` or `{success: false, error, details?}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundResponse {
    Success(SuccessBody),
    Failure(FailureBody),
}

impl OutboundResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, OutboundResponse::Success(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            OutboundResponse::Success(_) => None,
            OutboundResponse::Failure(body) => Some(body.kind),
        }
    }

    /// Suggested HTTP status for the response
    pub fn status_code(&self) -> u16 {
        match self.error_kind() {
            None => 200,
            Some(ErrorKind::MissingInput) => 400,
            Some(ErrorKind::ProviderError) => 502,
            Some(ErrorKind::ReasoningBudgetExhausted) => 422,
            Some(_) => 500,
        }
    }
}

impl From<ContentDocument> for OutboundResponse {
    fn from(doc: ContentDocument) -> Self {
        OutboundResponse::Success(SuccessBody {
            success: true,
            title: doc.title,
            description: doc.description,
            tldr: doc.tldr,
            icon: doc.icon,
            content: DocumentContent {
                sections: doc.sections,
            },
        })
    }
}

impl From<GenerationFailure> for OutboundResponse {
    fn from(failure: GenerationFailure) -> Self {
        let details = FailureDetails {
            finish_reason: failure.diagnostics.finish_reason,
            reasoning_tokens: failure.diagnostics.reasoning_tokens,
            suggestion: failure.diagnostics.suggestion,
        };
        OutboundResponse::Failure(FailureBody {
            success: false,
            error: failure.message,
            details: (!details.is_empty()).then_some(details),
            kind: failure.kind,
        })
    }
}

impl From<PipelineResult> for OutboundResponse {
    fn from(result: PipelineResult) -> Self {
        match result {
            Ok(doc) => doc.into(),
            Err(failure) => failure.into(),
        }
    }
}
