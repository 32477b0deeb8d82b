//! Mock implementations for testing
//!
//! A scriptable [`MockProvider`] standing in for the chat-completion gateway,
//! so pipeline tests run without network access or API keys.

#![allow(dead_code)]

use crate::core::llm::{
    ChatRequest, ChatResponse, LLMError, LLMProvider, ReplyContent, Result, TokenUsage,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::RwLock;

// ============================================================================
// Provider Mock
// ============================================================================

/// Canned reply returned by [`MockProvider`]
#[derive(Debug, Clone)]
pub struct MockReply {
    pub content: ReplyContent,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl MockReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: ReplyContent::Text(content.into()),
            finish_reason: Some("stop".to_string()),
            usage: Some(TokenUsage::new(200, 800)),
        }
    }

    pub fn structured(value: serde_json::Value) -> Self {
        Self {
            content: ReplyContent::Structured(value),
            ..Self::text("")
        }
    }

    /// Empty, length-limited reply after heavy reasoning
    pub fn reasoning_exhausted(reasoning_tokens: u32) -> Self {
        Self {
            content: ReplyContent::Text(String::new()),
            finish_reason: Some("length".to_string()),
            usage: Some(TokenUsage::new(200, reasoning_tokens).with_reasoning(reasoning_tokens)),
        }
    }
}

/// A scriptable LLM provider for testing
pub struct MockProvider {
    id: String,
    model: String,
    reasoning: bool,
    /// Should the provider fail?
    should_fail: AtomicBool,
    /// Status reported when failing
    failure_status: AtomicU32,
    /// Delay before responding (ms)
    response_delay_ms: AtomicU64,
    /// Count of chat calls
    chat_call_count: AtomicU32,
    /// Reply to return
    reply: RwLock<MockReply>,
    /// Most recent request received
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockProvider {
    pub fn new(model: &str) -> Self {
        Self {
            id: "mock".to_string(),
            model: model.to_string(),
            reasoning: crate::core::llm::is_reasoning_model(model),
            should_fail: AtomicBool::new(false),
            failure_status: AtomicU32::new(503),
            response_delay_ms: AtomicU64::new(0),
            chat_call_count: AtomicU32::new(0),
            reply: RwLock::new(MockReply::text("{}")),
            last_request: Mutex::new(None),
        }
    }

    pub fn with_reply(self, reply: MockReply) -> Self {
        Self {
            reply: RwLock::new(reply),
            ..self
        }
    }

    pub fn with_reasoning(mut self, reasoning: bool) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn set_should_fail(&self, fail: bool, status: u32) {
        self.failure_status.store(status, Ordering::SeqCst);
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay_ms: u64) {
        self.response_delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    pub async fn set_reply(&self, reply: MockReply) {
        *self.reply.write().await = reply;
    }

    pub fn chat_call_count(&self) -> u32 {
        self.chat_call_count.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl LLMProvider for MockProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Mock"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_reasoning_model(&self) -> bool {
        self.reasoning
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.chat_call_count.fetch_add(1, Ordering::SeqCst);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request);

        let delay = self.response_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.should_fail.load(Ordering::SeqCst) {
            return Err(LLMError::ApiError {
                status: self.failure_status.load(Ordering::SeqCst) as u16,
                message: "Mock failure".to_string(),
            });
        }

        let reply = self.reply.read().await.clone();
        Ok(ChatResponse {
            content: reply.content,
            model: self.model.clone(),
            provider: self.id.clone(),
            usage: reply.usage,
            finish_reason: reply.finish_reason,
            latency_ms: delay,
        })
    }
}
