//! Strict output schema for generated documents
//!
//! Strict mode rejects optional keys, so every field is required and
//! "unused" is expressed as an empty string or empty list.

use crate::core::llm::ResponseSchema;
use serde_json::{json, Value};

/// Name the schema is registered under with the provider
pub const SCHEMA_NAME: &str = "content_document";

/// Top-level fields every reply must carry
pub const DOCUMENT_FIELDS: [&str; 5] = ["title", "description", "icon", "tldr", "sections"];

/// Fields every section must carry
pub const SECTION_FIELDS: [&str; 5] = ["heading", "text", "items", "code", "note"];

fn section_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "heading": { "type": "string" },
            "text": { "type": "string", "description": "Prose; empty string when unused" },
            "items": {
                "type": "array",
                "items": { "type": "string" },
                "description": "List entries; empty array when unused"
            },
            "code": { "type": "string", "description": "Code or commands; empty string when unused" },
            "note": { "type": "string", "description": "Tip or warning; empty string when unused" }
        },
        "required": SECTION_FIELDS,
        "additionalProperties": false
    })
}

/// JSON Schema for a content document
pub fn document_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "description": { "type": "string", "description": "One-sentence description" },
            "icon": { "type": "string", "description": "A single emoji" },
            "tldr": { "type": "string", "description": "2-3 sentence summary" },
            "sections": {
                "type": "array",
                "items": section_schema()
            }
        },
        "required": DOCUMENT_FIELDS,
        "additionalProperties": false
    })
}

/// Schema wrapped for a chat request
pub fn response_schema() -> ResponseSchema {
    ResponseSchema {
        name: SCHEMA_NAME.to_string(),
        strict: true,
        schema: document_schema(),
    }
}
