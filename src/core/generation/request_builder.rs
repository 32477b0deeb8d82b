//! Request Builder
//!
//! Turns a validated request and its budget into a provider-ready chat
//! request. Pure construction, no I/O.

use super::budget::{BudgetPlan, LengthDescriptor};
use super::schema::response_schema;
use super::templates::TemplateRegistry;
use super::types::GenerationRequest;
use crate::core::llm::{ChatMessage, ChatRequest, SearchContextSize, WebSearchOptions};

/// Sampling temperature used when config does not override it
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

fn tone_guidance(descriptor: LengthDescriptor) -> &'static str {
    match descriptor {
        LengthDescriptor::VeryBrief => {
            "Be very brief: one or two sentences per section, no preamble, only the essentials."
        }
        LengthDescriptor::Brief => {
            "Be brief: short paragraphs, get to the point quickly, skip tangents."
        }
        LengthDescriptor::Standard => {
            "Use a standard depth: explain each point clearly with a concrete example where useful."
        }
        LengthDescriptor::Detailed => {
            "Be detailed: cover nuances, edge cases and practical examples in each section."
        }
        LengthDescriptor::Extensive => {
            "Be extensive: treat the topic comprehensively, with in-depth explanation, examples and supporting detail throughout."
        }
    }
}

const FIELD_RULES: &str = "\
Respond with a single JSON object matching the provided schema.
Every field is mandatory in the schema. When a section does not use a field, \
supply an empty string (or an empty array for `items`) instead of omitting it.
- `title`: a concise, specific title
- `description`: one sentence describing the document
- `icon`: a single emoji representing the topic
- `tldr`: a 2-3 sentence summary of the whole document
- `sections`: ordered in reading order; each has `heading`, `text`, `items`, `code`, `note`";

const RESEARCH_RULES: &str = "\
Use web research to ground the content in current, accurate information.
Never emit inline citation tokens, reference markers or bracketed source ids \
(for example `cite turn0search3` or `[1]`). Attribute sources in natural \
language instead, e.g. \"According to the 2024 industry survey...\".";

const DEEP_RESEARCH_RULES: &str = "\
Research thoroughly: consult multiple independent sources, cross-check facts \
and figures between them, and prefer primary sources where available.";

fn system_prompt(request: &GenerationRequest, plan: &BudgetPlan, templates: &TemplateRegistry) -> String {
    let template = templates.get_or_default(request.content_type);

    let mut prompt = format!(
        "You are an expert content writer producing a {}.\n\n{}\n\n{}\n\nLength: {}. Aim for {} sections. {}",
        template.display_name,
        template.instructions,
        FIELD_RULES,
        plan.length_descriptor,
        plan.target_section_range,
        tone_guidance(plan.length_descriptor),
    );

    if request.include_external_research {
        prompt.push_str("\n\n");
        prompt.push_str(RESEARCH_RULES);
        if request.deep_research {
            prompt.push_str("\n\n");
            prompt.push_str(DEEP_RESEARCH_RULES);
        }
    }

    prompt
}

/// Assemble the outbound chat request
pub fn build_request(
    request: &GenerationRequest,
    plan: &BudgetPlan,
    templates: &TemplateRegistry,
    temperature: f32,
) -> ChatRequest {
    let messages = vec![
        ChatMessage::system(system_prompt(request, plan, templates)),
        ChatMessage::user(format!("Topic: {}", request.topic)),
    ];

    let mut chat = ChatRequest::new(messages)
        .with_temperature(temperature)
        .with_max_tokens(plan.max_output_tokens)
        .with_response_schema(response_schema());

    if request.include_external_research {
        let search_context_size = if request.deep_research {
            SearchContextSize::High
        } else {
            SearchContextSize::Medium
        };
        chat = chat.with_web_search(WebSearchOptions { search_context_size });
    }

    chat
}
