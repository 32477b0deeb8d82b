//! Template Registry - instruction templates per content type
//!
//! The registry is built once at startup (built-ins plus configured
//! overrides) and then shared read-only between requests.

use super::types::ContentType;
use std::collections::HashMap;

/// Instruction template for one content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTemplate {
    pub content_type: ContentType,
    /// Human-readable name used in prompts ("step-by-step guide")
    pub display_name: String,
    /// Description of the desired content shape
    pub instructions: String,
}

impl ContentTemplate {
    pub fn new(
        content_type: ContentType,
        display_name: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            content_type,
            display_name: display_name.into(),
            instructions: instructions.into(),
        }
    }
}

/// Immutable lookup of templates keyed by content type
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<ContentType, ContentTemplate>,
}

impl TemplateRegistry {
    /// Registry with the built-in template for every content type
    pub fn builtin() -> Self {
        let templates = ContentType::ALL
            .iter()
            .map(|ct| (*ct, builtin_template(*ct)))
            .collect();
        Self { templates }
    }

    /// Replace instructions for selected content types.
    ///
    /// Keys are content type names as accepted by `ContentType::from_str`;
    /// unknown keys are skipped with a warning.
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (key, instructions) in overrides {
            match key.parse::<ContentType>() {
                Ok(ct) if !instructions.trim().is_empty() => {
                    log::info!("Using configured template for {}", ct);
                    if let Some(template) = self.templates.get_mut(&ct) {
                        template.instructions = instructions.trim().to_string();
                    }
                }
                Ok(ct) => log::warn!("Ignoring empty template override for {}", ct),
                Err(e) => log::warn!("Ignoring template override: {}", e),
            }
        }
        self
    }

    /// Template for a content type, or the article template as a fallback
    pub fn get_or_default(&self, content_type: ContentType) -> &ContentTemplate {
        self.templates
            .get(&content_type)
            .or_else(|| self.templates.get(&ContentType::Article))
            .unwrap_or_else(|| &*FALLBACK)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

static FALLBACK: std::sync::LazyLock<ContentTemplate> =
    std::sync::LazyLock::new(|| builtin_template(ContentType::Article));

fn builtin_template(content_type: ContentType) -> ContentTemplate {
    match content_type {
        ContentType::Article => ContentTemplate::new(
            content_type,
            "informative article",
            "Write an informative, well-structured article. Open with context, develop the \
             key ideas one per section, and close with a takeaway. Use prose in `text`, and \
             `items` only where a list genuinely helps.",
        ),
        ContentType::Guide => ContentTemplate::new(
            content_type,
            "step-by-step guide",
            "Write a practical step-by-step guide. Each section is one step or phase, its \
             heading states the action, `text` explains why and how, `items` lists concrete \
             sub-steps, and `note` carries warnings or tips.",
        ),
        ContentType::Tutorial => ContentTemplate::new(
            content_type,
            "hands-on tutorial",
            "Write a hands-on tutorial that builds something concrete. Introduce prerequisites \
             first, then progress through runnable steps. Put commands or code in `code`, \
             explain each step in `text`, and use `note` for common pitfalls.",
        ),
        ContentType::LandingPage => ContentTemplate::new(
            content_type,
            "persuasive landing page",
            "Write persuasive landing page copy. Lead with a benefit-driven hero section, \
             follow with features framed as outcomes, social proof, objection handling, and \
             a closing call to action. Keep sentences punchy and concrete.",
        ),
        ContentType::Faq => ContentTemplate::new(
            content_type,
            "FAQ page",
            "Write a frequently-asked-questions page. Each section heading is a question a \
             real reader would ask, and `text` answers it directly in the first sentence \
             before adding detail.",
        ),
        ContentType::Checklist => ContentTemplate::new(
            content_type,
            "actionable checklist",
            "Write an actionable checklist. Group related checks into sections, put each \
             check in `items` as a short imperative, and use `text` sparingly for context.",
        ),
        ContentType::Comparison => ContentTemplate::new(
            content_type,
            "balanced comparison",
            "Write a balanced comparison. Establish the criteria first, then compare the \
             options criterion by criterion, and end with recommendations for different \
             reader situations. Stay neutral and specific.",
        ),
    }
}
