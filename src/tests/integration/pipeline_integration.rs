//! Pipeline Integration Tests
//!
//! Full request → document runs covering:
//! - The happy path with budget, prompt and schema wiring
//! - Malformed and noisy replies recovered by the decode chain
//! - Every failure kind surfacing as data with diagnostics
//! - Provider timeouts and concurrent use of one pipeline

use crate::core::generation::{
    BudgetConfig, ContentPipeline, ContentType, ErrorKind, GenerationRequest,
    GenerationSettings, InboundRequest, LengthDescriptor, OutboundResponse, TemplateRegistry,
};
use crate::core::llm::LLMProvider;
use crate::tests::mocks::{MockProvider, MockReply};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// Fixtures
// =============================================================================

fn time_blocking_reply() -> serde_json::Value {
    json!({
        "title": "Time Blocking Basics",
        "description": "Plan your day in focused blocks.",
        "icon": "⏰",
        "tldr": "Assign every hour a job. Protect deep work. Review daily.",
        "sections": [
            {"heading": "Pick your blocks", "text": "Start with fixed commitments.", "items": ["Meetings", "Commute"], "code": "", "note": ""},
            {"heading": "Protect deep work", "text": "Reserve mornings.", "items": [], "code": "", "note": "Silence notifications."},
            {"heading": "Batch shallow tasks", "text": "Group email and admin.", "items": ["Email", "Invoices"], "code": "", "note": ""},
            {"heading": "Review", "text": "Adjust tomorrow's plan tonight.", "items": [], "code": "", "note": ""}
        ]
    })
}

fn pipeline(provider: Arc<MockProvider>) -> ContentPipeline {
    ContentPipeline::new(provider)
}

fn guide_request() -> GenerationRequest {
    GenerationRequest::try_from(InboundRequest {
        content_type: Some("guide".to_string()),
        topic: Some("time blocking".to_string()),
        length: Some(25),
        ..Default::default()
    })
    .unwrap()
}

// =============================================================================
// Success Paths
// =============================================================================

#[tokio::test]
async fn test_guide_end_to_end() {
    let provider = Arc::new(
        MockProvider::new("gpt-4o").with_reply(MockReply::text(time_blocking_reply().to_string())),
    );
    let pipeline = pipeline(provider.clone());
    let request = guide_request();

    let plan = pipeline.plan(&request);
    assert_eq!(plan.length_descriptor, LengthDescriptor::Brief);
    assert_eq!(plan.max_output_tokens, 4375);

    let doc = pipeline.generate(&request).await.unwrap();
    assert_eq!(doc.sections.len(), 4);
    assert_eq!(doc.title, "Time Blocking Basics");
    assert_eq!(doc.icon, "⏰");
    assert_eq!(doc.sections[0].items.as_ref().unwrap().len(), 2);
    assert!(doc.sections[1].items.is_none());
    assert_eq!(doc.sections[1].note.as_deref(), Some("Silence notifications."));

    let sent = provider.last_request().unwrap();
    assert_eq!(sent.max_tokens, Some(4375));
    assert_eq!(sent.temperature, Some(0.7));
    assert!(sent.system_prompt().unwrap().contains("step-by-step guide"));
    assert!(sent.system_prompt().unwrap().contains("3-5"));
    assert!(sent.response_schema.is_some());
    assert!(sent.web_search.is_none());
    assert_eq!(provider.chat_call_count(), 1);
}

#[tokio::test]
async fn test_all_non_empty_fields_kept() {
    let reply = json!({
        "title": "T", "description": "D", "icon": "I", "tldr": "S",
        "sections": [{"heading": "H", "text": "t", "items": ["a"], "code": "c", "note": "n"}]
    });
    let provider = Arc::new(MockProvider::new("gpt-4o").with_reply(MockReply::structured(reply)));
    let doc = pipeline(provider).generate(&guide_request()).await.unwrap();

    assert_eq!(
        serde_json::to_value(&doc.sections[0]).unwrap(),
        json!({"heading": "H", "text": "t", "items": ["a"], "code": "c", "note": "n"})
    );
}

#[tokio::test]
async fn test_noisy_reply_is_recovered_and_sanitized() {
    let content = format!(
        "Sure! Here's your guide:\n```json\n{}\n```",
        r#"{"title": "Solar cite turn0search3 basics", "description": "", "icon": "", "tldr": "Panels  pay off (turn1news2) .", "sections": [{"heading": "Costs", "text": "Prices fell [cite turn0search7].", "items": ["", "Check  incentives "], "code": "", "note": ""}]}"#
    );
    let provider = Arc::new(MockProvider::new("gpt-4o").with_reply(MockReply::text(content)));
    let request = GenerationRequest::new(ContentType::Article, "solar panels").with_research(false);

    let doc = pipeline(provider.clone()).generate(&request).await.unwrap();
    assert_eq!(doc.title, "Solar basics");
    assert_eq!(doc.description, "Learn about solar panels");
    assert_eq!(doc.icon, "📄");
    assert_eq!(doc.tldr, "Panels pay off.");
    assert_eq!(doc.sections[0].text.as_deref(), Some("Prices fell."));
    assert_eq!(doc.sections[0].items, Some(vec!["Check incentives".to_string()]));

    let sent = provider.last_request().unwrap();
    assert!(sent.web_search.is_some());
    assert!(sent.system_prompt().unwrap().contains("Never emit inline citation tokens"));
}

#[tokio::test]
async fn test_repaired_reply() {
    let content = "{title: 'Checklist', sections: [{heading: 'Pack', items: ['Tent', 'Stove',],},],}";
    let provider = Arc::new(MockProvider::new("gpt-4o").with_reply(MockReply::text(content)));
    let request = GenerationRequest::new(ContentType::Checklist, "camping");

    let doc = pipeline(provider).generate(&request).await.unwrap();
    assert_eq!(doc.title, "Checklist");
    assert_eq!(
        doc.sections[0].items,
        Some(vec!["Tent".to_string(), "Stove".to_string()])
    );
}

// =============================================================================
// Reasoning Models
// =============================================================================

#[tokio::test]
async fn test_reasoning_model_gets_inflated_budget() {
    let provider = Arc::new(
        MockProvider::new("o3-mini").with_reply(MockReply::text(time_blocking_reply().to_string())),
    );
    assert!(provider.is_reasoning_model());

    let pipeline = pipeline(provider.clone());
    let doc = pipeline.generate(&guide_request()).await.unwrap();
    assert_eq!(doc.sections.len(), 4);
    assert_eq!(provider.last_request().unwrap().max_tokens, Some(4375 * 4));
}

#[tokio::test]
async fn test_reasoning_budget_exhausted() {
    let provider = Arc::new(
        MockProvider::new("o3-mini").with_reply(MockReply::reasoning_exhausted(17_500)),
    );
    let err = pipeline(provider).generate(&guide_request()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::ReasoningBudgetExhausted);
    assert_eq!(err.diagnostics.reasoning_tokens, Some(17_500));
    assert_eq!(err.diagnostics.max_output_tokens, Some(17_500));
    assert_eq!(err.diagnostics.finish_reason.as_deref(), Some("length"));
    assert!(err.diagnostics.suggestion.is_some());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_decode_failure_has_preview() {
    let provider = Arc::new(
        MockProvider::new("gpt-4o").with_reply(MockReply::text("not json at all, no braces")),
    );
    let err = pipeline(provider).generate(&guide_request()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::DecodeFailure);
    assert!(!err.diagnostics.preview.unwrap().is_empty());
    assert_eq!(err.diagnostics.finish_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn test_invalid_shape() {
    let provider = Arc::new(
        MockProvider::new("gpt-4o").with_reply(MockReply::text(r#"{"title": "No sections"}"#)),
    );
    let err = pipeline(provider).generate(&guide_request()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidShape);
}

#[tokio::test]
async fn test_provider_error() {
    let provider = Arc::new(MockProvider::new("gpt-4o"));
    provider.set_should_fail(true, 503);

    let err = pipeline(provider).generate(&guide_request()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ProviderError);
    assert_eq!(err.diagnostics.provider_status, Some(503));
    assert_eq!(err.diagnostics.max_output_tokens, Some(4375));
}

#[tokio::test]
async fn test_provider_timeout() {
    let provider = Arc::new(
        MockProvider::new("gpt-4o").with_reply(MockReply::text(time_blocking_reply().to_string())),
    );
    provider.set_delay(2_000);

    let pipeline = pipeline(provider).with_settings(GenerationSettings {
        timeout_secs: 0,
        ..Default::default()
    });
    let err = pipeline.generate(&guide_request()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ProviderError);
    assert!(err.message.to_lowercase().contains("timeout"));
}

#[tokio::test]
async fn test_blank_topic_never_reaches_provider() {
    let provider = Arc::new(MockProvider::new("gpt-4o"));
    let request = GenerationRequest::new(ContentType::Faq, "   ");

    let err = pipeline(provider.clone()).generate(&request).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingInput);
    assert_eq!(provider.chat_call_count(), 0);
}

// =============================================================================
// Inbound / Outbound
// =============================================================================

#[tokio::test]
async fn test_handle_success_shape() {
    let provider = Arc::new(
        MockProvider::new("gpt-4o").with_reply(MockReply::structured(time_blocking_reply())),
    );
    let inbound: InboundRequest = serde_json::from_value(json!({
        "contentType": "guide",
        "topic": "time blocking",
        "length": 25
    }))
    .unwrap();

    let response = pipeline(provider).handle(inbound).await;
    assert!(response.is_success());

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["content"]["sections"].as_array().unwrap().len(), 4);
    assert_eq!(value["title"], json!("Time Blocking Basics"));
}

#[tokio::test]
async fn test_handle_missing_input() {
    let provider = Arc::new(MockProvider::new("gpt-4o"));
    let inbound: InboundRequest = serde_json::from_value(json!({"contentType": "guide"})).unwrap();

    let response = pipeline(provider.clone()).handle(inbound).await;
    assert_eq!(response.error_kind(), Some(ErrorKind::MissingInput));
    assert_eq!(response.status_code(), 400);
    assert_eq!(provider.chat_call_count(), 0);

    match response {
        OutboundResponse::Failure(body) => {
            assert!(!body.success);
            assert!(body.error.contains("topic"));
        }
        OutboundResponse::Success(_) => panic!("expected failure"),
    }
}

#[tokio::test]
async fn test_handle_reasoning_failure_details() {
    let provider = Arc::new(
        MockProvider::new("o3-mini").with_reply(MockReply::reasoning_exhausted(12_000)),
    );
    let pipeline = pipeline(provider).with_settings(GenerationSettings {
        reasoning_exhaustion_threshold: 10_000,
        ..Default::default()
    });
    let inbound: InboundRequest =
        serde_json::from_value(json!({"contentType": "article", "topic": "x"})).unwrap();

    let value = serde_json::to_value(pipeline.handle(inbound).await).unwrap();
    assert_eq!(value["success"], json!(false));
    assert_eq!(value["details"]["finishReason"], json!("length"));
    assert_eq!(value["details"]["reasoningTokens"], json!(12_000));
    assert!(value["details"]["suggestion"]
        .as_str()
        .unwrap()
        .contains("reduce the requested length"));
}

// =============================================================================
// Configuration Wiring
// =============================================================================

#[tokio::test]
async fn test_custom_budget_and_templates() {
    let provider = Arc::new(
        MockProvider::new("gpt-4o").with_reply(MockReply::structured(time_blocking_reply())),
    );
    let mut overrides = HashMap::new();
    overrides.insert("guide".to_string(), "Write it as a numbered field manual.".to_string());

    let pipeline = pipeline(provider.clone())
        .with_budget(BudgetConfig {
            min_tokens: 1_000,
            max_tokens: 3_000,
            ..Default::default()
        })
        .with_templates(Arc::new(TemplateRegistry::builtin().with_overrides(&overrides)));

    pipeline.generate(&guide_request()).await.unwrap();
    let sent = provider.last_request().unwrap();
    assert_eq!(sent.max_tokens, Some(1_500));
    assert!(sent.system_prompt().unwrap().contains("numbered field manual"));
}

#[tokio::test]
async fn test_concurrent_requests_share_pipeline() {
    let provider = Arc::new(
        MockProvider::new("gpt-4o").with_reply(MockReply::structured(time_blocking_reply())),
    );
    provider.set_delay(20);
    let pipeline = Arc::new(pipeline(provider.clone()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                let request = GenerationRequest::new(ContentType::Guide, format!("topic {i}"));
                pipeline.generate(&request).await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().sections.len(), 4);
    }
    assert_eq!(provider.chat_call_count(), 8);
}
