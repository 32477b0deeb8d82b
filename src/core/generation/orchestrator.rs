//! Content Pipeline
//!
//! Runs one request through budget → request → provider → decode →
//! sanitize/assemble. The provider call is the only await point and the
//! only place a timeout applies; there are no retries.

use super::assembler::assemble;
use super::budget::{BudgetConfig, BudgetPlan};
use super::decoder::{
    ResponseDecoder, DEFAULT_PREVIEW_CHARS, DEFAULT_REASONING_EXHAUSTION_THRESHOLD,
};
use super::error::GenerationFailure;
use super::repair::JsonRepairer;
use super::request_builder::{build_request, DEFAULT_TEMPERATURE};
use super::response::OutboundResponse;
use super::templates::TemplateRegistry;
use super::types::{GenerationRequest, InboundRequest, PipelineResult, RawProviderReply};
use crate::core::llm::{LLMError, LLMProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

/// Pipeline tuning, loaded from the `[generation]` config section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub temperature: f32,
    /// Reasoning tokens at or above which an empty, length-limited reply
    /// counts as budget exhaustion
    pub reasoning_exhaustion_threshold: u32,
    /// Characters of reply kept in failure diagnostics
    pub preview_chars: usize,
    /// Upper bound on the provider call
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            reasoning_exhaustion_threshold: DEFAULT_REASONING_EXHAUSTION_THRESHOLD,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            timeout_secs: 180,
        }
    }
}

/// End-to-end generation pipeline, shareable across concurrent requests
pub struct ContentPipeline {
    provider: Arc<dyn LLMProvider>,
    templates: Arc<TemplateRegistry>,
    settings: GenerationSettings,
    budget: BudgetConfig,
    decoder: ResponseDecoder,
}

impl ContentPipeline {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        let settings = GenerationSettings::default();
        Self {
            provider,
            templates: Arc::new(TemplateRegistry::builtin()),
            decoder: Self::decoder_for(&settings),
            settings,
            budget: BudgetConfig::default(),
        }
    }

    fn decoder_for(settings: &GenerationSettings) -> ResponseDecoder {
        ResponseDecoder::new(Box::new(JsonRepairer::new()))
            .with_reasoning_exhaustion_threshold(settings.reasoning_exhaustion_threshold)
            .with_preview_chars(settings.preview_chars)
    }

    pub fn with_templates(mut self, templates: Arc<TemplateRegistry>) -> Self {
        self.templates = templates;
        self
    }

    /// Replaces the settings and rebuilds the default decoder from them
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.decoder = Self::decoder_for(&settings);
        self.settings = settings;
        self
    }

    pub fn with_budget(mut self, budget: BudgetConfig) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_decoder(mut self, decoder: ResponseDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Budget the pipeline would request for this request
    pub fn plan(&self, request: &GenerationRequest) -> BudgetPlan {
        self.budget
            .plan(request.length_percent, self.provider.is_reasoning_model())
    }

    /// Run the pipeline for a validated request
    pub async fn generate(&self, request: &GenerationRequest) -> PipelineResult {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "generate",
            %request_id,
            content_type = %request.content_type,
            model = %self.provider.model(),
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &GenerationRequest) -> PipelineResult {
        request.validate()?;

        let plan = self.plan(request);
        info!(
            length = request.length_percent,
            descriptor = %plan.length_descriptor,
            max_output_tokens = plan.max_output_tokens,
            research = request.include_external_research,
            deep_research = request.deep_research,
            "Generating content"
        );

        let chat = build_request(request, &plan, &self.templates, self.settings.temperature);

        let started = Instant::now();
        let timeout = Duration::from_secs(self.settings.timeout_secs);
        let response = match tokio::time::timeout(timeout, self.provider.chat(chat)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(error = %e, "Provider call failed");
                return Err(GenerationFailure::from(e).enrich(None, None, plan.max_output_tokens));
            }
            Err(_) => {
                error!(timeout_secs = self.settings.timeout_secs, "Provider call timed out");
                return Err(GenerationFailure::from(LLMError::Timeout).enrich(
                    None,
                    None,
                    plan.max_output_tokens,
                ));
            }
        };

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            finish_reason = ?response.finish_reason,
            reasoning_tokens = ?response.usage.as_ref().and_then(|u| u.reasoning_tokens),
            "Provider replied"
        );

        let reply = RawProviderReply::from(response);
        let result = self
            .decoder
            .decode(&reply, plan.max_output_tokens)
            .and_then(|decoded| assemble(decoded, request))
            .map_err(|failure| {
                failure.enrich(
                    reply.finish_reason.as_deref(),
                    reply.reasoning_tokens_used,
                    plan.max_output_tokens,
                )
            });

        match &result {
            Ok(doc) => info!(sections = doc.sections.len(), "Generation succeeded"),
            Err(failure) => warn!(kind = %failure.kind, message = %failure.message, "Generation failed"),
        }
        result
    }

    /// Validate an inbound request, run it, and shape the result for the caller
    pub async fn handle(&self, inbound: InboundRequest) -> OutboundResponse {
        let request = match GenerationRequest::try_from(inbound) {
            Ok(request) => request,
            Err(failure) => {
                warn!(message = %failure.message, "Rejected inbound request");
                return failure.into();
            }
        };
        self.generate(&request).await.into()
    }
}
