//! Generation data model
//!
//! Request-scoped values: the caller's intent, the provider reply as seen by
//! the decoder, and the document handed back to the caller.

use super::error::GenerationFailure;
use crate::core::llm::{ChatResponse, ReplyContent};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default `length` when the caller does not supply one
pub const DEFAULT_LENGTH_PERCENT: u8 = 50;

// ============================================================================
// Content Types
// ============================================================================

/// Kind of document being generated; selects the instruction template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Article,
    Guide,
    Tutorial,
    LandingPage,
    Faq,
    Checklist,
    Comparison,
}

impl ContentType {
    pub const ALL: [ContentType; 7] = [
        ContentType::Article,
        ContentType::Guide,
        ContentType::Tutorial,
        ContentType::LandingPage,
        ContentType::Faq,
        ContentType::Checklist,
        ContentType::Comparison,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Guide => "guide",
            ContentType::Tutorial => "tutorial",
            ContentType::LandingPage => "landing_page",
            ContentType::Faq => "faq",
            ContentType::Checklist => "checklist",
            ContentType::Comparison => "comparison",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    /// Accepts `landing_page`, `landing-page`, `landingPage` and friends
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "article" | "blogpost" | "post" => Ok(ContentType::Article),
            "guide" | "howto" => Ok(ContentType::Guide),
            "tutorial" => Ok(ContentType::Tutorial),
            "landingpage" | "landing" => Ok(ContentType::LandingPage),
            "faq" => Ok(ContentType::Faq),
            "checklist" => Ok(ContentType::Checklist),
            "comparison" | "versus" => Ok(ContentType::Comparison),
            _ => Err(format!("unknown content type '{}'", s)),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Request as received from the HTTP layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InboundRequest {
    pub content_type: Option<String>,
    pub topic: Option<String>,
    pub include_web_research: bool,
    pub deep_research: bool,
    /// Desired length, 0-100
    pub length: Option<i64>,
}

/// Validated caller intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub content_type: ContentType,
    pub topic: String,
    /// Desired length, 0-100
    pub length_percent: u8,
    pub include_external_research: bool,
    /// Only set together with `include_external_research`
    pub deep_research: bool,
}

impl GenerationRequest {
    pub fn new(content_type: ContentType, topic: impl Into<String>) -> Self {
        Self {
            content_type,
            topic: topic.into(),
            length_percent: DEFAULT_LENGTH_PERCENT,
            include_external_research: false,
            deep_research: false,
        }
    }

    /// Set the desired length, clamped to 0-100
    pub fn with_length(mut self, length_percent: u8) -> Self {
        self.length_percent = length_percent.min(100);
        self
    }

    /// Enable external research; `deep` escalates it
    pub fn with_research(mut self, deep: bool) -> Self {
        self.include_external_research = true;
        self.deep_research = deep;
        self
    }

    /// Check the request before the pipeline runs
    pub fn validate(&self) -> Result<(), GenerationFailure> {
        if self.topic.trim().is_empty() {
            return Err(GenerationFailure::missing_input(&["topic"]));
        }
        Ok(())
    }
}

impl TryFrom<InboundRequest> for GenerationRequest {
    type Error = GenerationFailure;

    fn try_from(inbound: InboundRequest) -> Result<Self, Self::Error> {
        let content_type = inbound
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let topic = inbound
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let (content_type, topic) = match (content_type, topic) {
            (Some(c), Some(t)) => (c, t),
            (None, None) => return Err(GenerationFailure::missing_input(&["contentType", "topic"])),
            (None, _) => return Err(GenerationFailure::missing_input(&["contentType"])),
            (_, None) => return Err(GenerationFailure::missing_input(&["topic"])),
        };

        let content_type = content_type.parse().unwrap_or_else(|e| {
            log::warn!("{}, falling back to article template", e);
            ContentType::Article
        });

        let length_percent = inbound
            .length
            .map(|l| l.clamp(0, 100) as u8)
            .unwrap_or(DEFAULT_LENGTH_PERCENT);

        if inbound.deep_research && !inbound.include_web_research {
            log::debug!("deepResearch requested without includeWebResearch; ignoring");
        }

        Ok(Self {
            content_type,
            topic: topic.to_string(),
            length_percent,
            include_external_research: inbound.include_web_research,
            deep_research: inbound.deep_research && inbound.include_web_research,
        })
    }
}

// ============================================================================
// Provider Reply
// ============================================================================

/// Why the provider stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Completed,
    LengthLimited,
    Other,
}

impl StopReason {
    pub fn from_finish_reason(reason: Option<&str>) -> Self {
        match reason.map(|r| r.to_ascii_lowercase()).as_deref() {
            Some("stop" | "end_turn" | "completed" | "stop_sequence") => StopReason::Completed,
            Some("length" | "max_tokens" | "max_output_tokens") => StopReason::LengthLimited,
            _ => StopReason::Other,
        }
    }
}

/// Provider reply as consumed by the decoder
#[derive(Debug, Clone, PartialEq)]
pub struct RawProviderReply {
    pub content: ReplyContent,
    pub stop_reason: StopReason,
    /// Provider's own finish reason string, kept for diagnostics
    pub finish_reason: Option<String>,
    pub reasoning_tokens_used: Option<u32>,
}

impl RawProviderReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: ReplyContent::Text(content.into()),
            stop_reason: StopReason::Completed,
            finish_reason: Some("stop".to_string()),
            reasoning_tokens_used: None,
        }
    }

    pub fn structured(value: serde_json::Value) -> Self {
        Self {
            content: ReplyContent::Structured(value),
            ..Self::text("")
        }
    }

    pub fn with_finish_reason(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        self.stop_reason = StopReason::from_finish_reason(Some(&reason));
        self.finish_reason = Some(reason);
        self
    }

    pub fn with_reasoning_tokens(mut self, tokens: u32) -> Self {
        self.reasoning_tokens_used = Some(tokens);
        self
    }
}

impl From<ChatResponse> for RawProviderReply {
    fn from(response: ChatResponse) -> Self {
        Self {
            stop_reason: StopReason::from_finish_reason(response.finish_reason.as_deref()),
            finish_reason: response.finish_reason,
            reasoning_tokens_used: response.usage.and_then(|u| u.reasoning_tokens),
            content: response.content,
        }
    }
}

// ============================================================================
// Documents
// ============================================================================

/// One addressable block of a generated document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Always present, possibly empty
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Section {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            ..Default::default()
        }
    }
}

/// The validated document returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDocument {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub tldr: String,
    /// Reading order
    pub sections: Vec<Section>,
}

/// Outcome of one pipeline run
pub type PipelineResult = Result<ContentDocument, GenerationFailure>;
