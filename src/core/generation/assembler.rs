//! Result Assembler
//!
//! Builds the final [`ContentDocument`] from a decoded reply: every text
//! field is sanitized, empty optional section fields are dropped, and
//! missing document fields get defaults derived from the request.

use super::decoder::DecodedDocument;
use super::error::{Diagnostics, ErrorKind, GenerationFailure};
use super::sanitizer::sanitize;
use super::types::{ContentDocument, GenerationRequest, PipelineResult, Section};
use serde_json::{Map, Value};

/// Icon used when the model does not supply one
pub const DEFAULT_ICON: &str = "📄";

/// Scalars are accepted where text is expected; objects and arrays are not
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Sanitized text, or `None` when it ends up empty
fn clean_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    let cleaned = sanitize(&scalar_text(fields.get(key)?)?);
    (!cleaned.is_empty()).then_some(cleaned)
}

fn clean_items(value: Option<&Value>) -> Option<Vec<String>> {
    let items: Vec<String> = match value? {
        Value::Array(entries) => entries
            .iter()
            .filter_map(scalar_text)
            .map(|item| sanitize(&item))
            .filter(|item| !item.is_empty())
            .collect(),
        // A lone string is a one-item list
        other => scalar_text(other)
            .map(|item| sanitize(&item))
            .filter(|item| !item.is_empty())
            .into_iter()
            .collect(),
    };
    (!items.is_empty()).then_some(items)
}

fn assemble_section(fields: &Map<String, Value>) -> Section {
    Section {
        heading: fields
            .get("heading")
            .and_then(scalar_text)
            .map(|h| sanitize(&h))
            .unwrap_or_default(),
        text: clean_field(fields, "text"),
        items: clean_items(fields.get("items")),
        code: clean_field(fields, "code"),
        note: clean_field(fields, "note"),
    }
}

/// Build the document, falling back to request-derived defaults
pub fn assemble(decoded: DecodedDocument, request: &GenerationRequest) -> PipelineResult {
    let fields = &decoded.fields;

    let raw_sections = match fields.get("sections") {
        Some(Value::Array(sections)) => sections,
        _ => {
            return Err(GenerationFailure::new(
                ErrorKind::InvalidShape,
                "Decoded document has no sections array",
            )
            .with_diagnostics(Diagnostics {
                content_type: Some("object".to_string()),
                ..Default::default()
            }))
        }
    };

    let mut sections = Vec::with_capacity(raw_sections.len());
    for (index, entry) in raw_sections.iter().enumerate() {
        match entry {
            Value::Object(section) => sections.push(assemble_section(section)),
            other => log::warn!("Skipping section {} which is not an object: {}", index, other),
        }
    }

    let topic = request.topic.trim();
    let document = ContentDocument {
        title: clean_field(fields, "title").unwrap_or_else(|| topic.to_string()),
        description: clean_field(fields, "description")
            .unwrap_or_else(|| format!("Learn about {}", topic)),
        icon: clean_field(fields, "icon").unwrap_or_else(|| DEFAULT_ICON.to_string()),
        tldr: clean_field(fields, "tldr").unwrap_or_default(),
        sections,
    };

    log::debug!(
        "Assembled '{}' with {} sections (decoded via {})",
        document.title,
        document.sections.len(),
        decoded.strategy
    );

    Ok(document)
}
