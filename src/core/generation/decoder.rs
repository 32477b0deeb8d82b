//! Response Decoder
//!
//! Turns a raw provider reply into a JSON object using an ordered chain of
//! increasingly tolerant strategies, stopping at the first that succeeds:
//!
//! 1. blank content is classified (reasoning exhaustion vs. plain empty)
//! 2. structured content is accepted as-is; text is parsed directly
//! 3. each fenced code block holding an object, in order
//! 4. the span from the first `{` to the last `}`
//! 5. the [`Repairer`]'s best-effort rewrite
//!
//! A successful parse must still carry a `sections` array.

use super::error::{preview, Diagnostics, ErrorKind, GenerationFailure};
use super::repair::{JsonRepairer, Repairer};
use super::types::{RawProviderReply, StopReason};
use crate::core::llm::ReplyContent;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Reasoning-token usage at or above which an empty, length-limited reply
/// is classified as budget exhaustion
pub const DEFAULT_REASONING_EXHAUSTION_THRESHOLD: u32 = 1000;

/// Characters of reply kept in failure diagnostics
pub const DEFAULT_PREVIEW_CHARS: usize = 1000;

/// Body of a triple-backtick block, with or without a language tag
static FENCED_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z0-9_-]*(.*?)```").unwrap());

/// Which strategy produced the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    Structured,
    Direct,
    FencedBlock,
    Boundary,
    Repair,
}

impl DecodeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeStrategy::Structured => "structured",
            DecodeStrategy::Direct => "direct",
            DecodeStrategy::FencedBlock => "fenced_block",
            DecodeStrategy::Boundary => "boundary",
            DecodeStrategy::Repair => "repair",
        }
    }
}

impl std::fmt::Display for DecodeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed reply, guaranteed to hold a `sections` array
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedDocument {
    pub fields: Map<String, Value>,
    pub strategy: DecodeStrategy,
}

impl DecodedDocument {
    pub fn sections(&self) -> &[Value] {
        self.fields
            .get("sections")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// String field, if present and a string
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

fn parse_object(text: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, found {}", value_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn boundary_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Ordered decode fallback chain
pub struct ResponseDecoder {
    repairer: Box<dyn Repairer>,
    reasoning_exhaustion_threshold: u32,
    preview_chars: usize,
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self::new(Box::new(JsonRepairer::new()))
    }
}

impl ResponseDecoder {
    pub fn new(repairer: Box<dyn Repairer>) -> Self {
        Self {
            repairer,
            reasoning_exhaustion_threshold: DEFAULT_REASONING_EXHAUSTION_THRESHOLD,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    pub fn with_reasoning_exhaustion_threshold(mut self, threshold: u32) -> Self {
        self.reasoning_exhaustion_threshold = threshold;
        self
    }

    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    /// Decode a reply; `ceiling` is the output-token budget that was requested
    pub fn decode(
        &self,
        reply: &RawProviderReply,
        ceiling: u32,
    ) -> Result<DecodedDocument, GenerationFailure> {
        let base = Diagnostics {
            finish_reason: reply.finish_reason.clone(),
            reasoning_tokens: reply.reasoning_tokens_used,
            max_output_tokens: Some(ceiling),
            content_type: Some(reply.content.kind().to_string()),
            ..Default::default()
        };

        if reply.content.is_blank() {
            return Err(self.classify_empty(reply, base));
        }

        let decoded = match &reply.content {
            ReplyContent::Structured(value) => {
                debug!("Reply content is already structured");
                let fields = match value {
                    Value::Object(map) => map.clone(),
                    _ => Map::new(),
                };
                DecodedDocument {
                    fields,
                    strategy: DecodeStrategy::Structured,
                }
            }
            ReplyContent::Text(text) => self.decode_text(text, &base)?,
        };

        if decoded.strategy != DecodeStrategy::Direct && decoded.strategy != DecodeStrategy::Structured {
            warn!(strategy = %decoded.strategy, "Reply needed a fallback decode strategy");
        }

        self.check_shape(decoded, reply, base)
    }

    fn classify_empty(&self, reply: &RawProviderReply, base: Diagnostics) -> GenerationFailure {
        let reasoning = reply.reasoning_tokens_used.unwrap_or(0);
        let exhausted = reply.stop_reason == StopReason::LengthLimited
            && reasoning >= self.reasoning_exhaustion_threshold;

        let failure = if exhausted {
            GenerationFailure::new(
                ErrorKind::ReasoningBudgetExhausted,
                format!(
                    "Model used {} reasoning tokens of a {} token budget and produced no visible output",
                    reasoning,
                    base.max_output_tokens.unwrap_or_default()
                ),
            )
        } else {
            GenerationFailure::new(ErrorKind::EmptyResponse, "Model returned empty content")
        };

        warn!(
            kind = %failure.kind,
            finish_reason = ?reply.finish_reason,
            reasoning_tokens = ?reply.reasoning_tokens_used,
            "Empty reply from provider"
        );
        failure.with_diagnostics(base)
    }

    fn decode_text(&self, text: &str, base: &Diagnostics) -> Result<DecodedDocument, GenerationFailure> {
        let mut last_error = String::new();

        let mut attempt = |strategy: DecodeStrategy, candidate: &str| -> Option<DecodedDocument> {
            match parse_object(candidate) {
                Ok(fields) => {
                    debug!(strategy = %strategy, "Decode strategy succeeded");
                    Some(DecodedDocument { fields, strategy })
                }
                Err(e) => {
                    debug!(strategy = %strategy, error = %e, "Decode strategy failed");
                    last_error = e;
                    None
                }
            }
        };

        if let Some(doc) = attempt(DecodeStrategy::Direct, text.trim()) {
            return Ok(doc);
        }

        for captures in FENCED_BLOCK_RE.captures_iter(text) {
            if let Some(doc) = captures
                .get(1)
                .and_then(|body| boundary_span(body.as_str()))
                .and_then(|span| attempt(DecodeStrategy::FencedBlock, span))
            {
                return Ok(doc);
            }
        }

        if let Some(doc) = boundary_span(text).and_then(|span| attempt(DecodeStrategy::Boundary, span)) {
            return Ok(doc);
        }

        match self.repairer.try_repair(text) {
            Some(repaired) => {
                if let Some(doc) = attempt(DecodeStrategy::Repair, &repaired) {
                    return Ok(doc);
                }
            }
            None => debug!("Repairer had nothing to offer"),
        }

        let parser_error = if last_error.is_empty() {
            "no JSON object found".to_string()
        } else {
            last_error
        };
        warn!(error = %parser_error, "All decode strategies failed");

        Err(GenerationFailure::new(
            ErrorKind::DecodeFailure,
            format!("Could not parse model reply: {}", parser_error),
        )
        .with_diagnostics(Diagnostics {
            preview: Some(preview(text, self.preview_chars)),
            parser_error: Some(parser_error),
            ..base.clone()
        }))
    }

    fn check_shape(
        &self,
        decoded: DecodedDocument,
        reply: &RawProviderReply,
        base: Diagnostics,
    ) -> Result<DecodedDocument, GenerationFailure> {
        let found = match decoded.fields.get("sections") {
            Some(Value::Array(_)) => return Ok(decoded),
            Some(other) => value_kind(other),
            None => "nothing",
        };

        warn!(found, strategy = %decoded.strategy, "Decoded reply has no sections array");

        let shown = match &reply.content {
            ReplyContent::Text(text) => preview(text, self.preview_chars),
            ReplyContent::Structured(value) => preview(&value.to_string(), self.preview_chars),
        };
        Err(GenerationFailure::new(
            ErrorKind::InvalidShape,
            format!("Expected `sections` to be an array, found {}", found),
        )
        .with_diagnostics(Diagnostics {
            preview: Some(shown),
            ..base
        }))
    }
}
