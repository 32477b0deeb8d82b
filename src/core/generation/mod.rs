//! Content Generation Pipeline
//!
//! Sizes a generation request, calls the provider, and reconciles whatever
//! comes back into a validated [`ContentDocument`]:
//!
//! - `budget`: output-token ceiling and section target from desired length
//! - `templates`, `schema`, `request_builder`: the outbound chat request
//! - `decoder`, `repair`: ordered parse fallback chain
//! - `sanitizer`: citation and whitespace cleanup for every text field
//! - `assembler`: final document with defaults and empty-field dropping
//! - `orchestrator`: the end-to-end [`ContentPipeline`]

pub mod assembler;
pub mod budget;
pub mod decoder;
pub mod error;
pub mod orchestrator;
pub mod repair;
pub mod request_builder;
pub mod response;
pub mod sanitizer;
pub mod schema;
pub mod templates;
pub mod types;

pub use assembler::{assemble, DEFAULT_ICON};
pub use budget::{compute_budget, BudgetConfig, BudgetPlan, LengthDescriptor};
pub use decoder::{DecodeStrategy, DecodedDocument, ResponseDecoder};
pub use error::{Diagnostics, ErrorKind, GenerationFailure};
pub use orchestrator::{ContentPipeline, GenerationSettings};
pub use repair::{JsonRepairer, Repairer};
pub use request_builder::{build_request, DEFAULT_TEMPERATURE};
pub use response::OutboundResponse;
pub use sanitizer::sanitize;
pub use schema::{document_schema, response_schema};
pub use templates::{ContentTemplate, TemplateRegistry};
pub use types::{
    ContentDocument, ContentType, GenerationRequest, InboundRequest, PipelineResult,
    RawProviderReply, Section, StopReason,
};
