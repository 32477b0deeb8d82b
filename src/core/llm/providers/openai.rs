//! OpenAI Provider Implementation
//!
//! Speaks the `/chat/completions` wire format, so it also covers
//! OpenAI-compatible gateways (OpenRouter, Groq, local servers) through
//! `base_url`.

use crate::core::llm::router::{
    is_reasoning_model, ChatRequest, ChatResponse, LLMError, LLMProvider, MessageRole,
    ReplyContent, Result,
};
use crate::core::llm::usage::TokenUsage;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI provider
pub struct OpenAIProvider {
    api_key: String,
    model: String,
    base_url: String,
    reasoning_model: bool,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let reasoning_model = is_reasoning_model(&model);

        Ok(Self {
            api_key,
            model,
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            reasoning_model,
            client,
        })
    }

    /// Override name-based reasoning-model detection
    pub fn with_reasoning_model(mut self, reasoning_model: bool) -> Self {
        self.reasoning_model = reasoning_model;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_messages(&self, request: &ChatRequest) -> Vec<serde_json::Value> {
        request
            .messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    // Reasoning models take instructions under the developer role
                    MessageRole::System if self.reasoning_model => "developer",
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                };
                serde_json::json!({
                    "role": role,
                    "content": msg.content
                })
            })
            .collect()
    }

    /// Serialize a request into the provider's JSON body
    pub fn build_body(&self, request: &ChatRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": self.build_messages(request),
        });

        if let Some(max) = request.max_tokens {
            if self.reasoning_model {
                body["max_completion_tokens"] = serde_json::json!(max);
            } else {
                body["max_tokens"] = serde_json::json!(max);
            }
        }

        // Reasoning models reject sampling parameters
        if let Some(temp) = request.temperature.filter(|_| !self.reasoning_model) {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(schema) = &request.response_schema {
            body["response_format"] = serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name,
                    "strict": schema.strict,
                    "schema": schema.schema,
                }
            });
        }

        if let Some(search) = &request.web_search {
            body["web_search_options"] = serde_json::json!(search);
        }

        body
    }
}

/// Pull the reply pieces out of a `/chat/completions` response body
pub fn parse_completion(
    json: &serde_json::Value,
    fallback_model: &str,
) -> Result<(ReplyContent, Option<String>, Option<TokenUsage>, String)> {
    let choice = json["choices"]
        .as_array()
        .and_then(|arr| arr.first())
        .ok_or_else(|| LLMError::InvalidResponse("Missing choices".to_string()))?;

    let content = ReplyContent::from_value(choice["message"]["content"].clone());

    let finish_reason = choice["finish_reason"].as_str().map(|s| s.to_string());

    let usage = json["usage"].as_object().map(|u| {
        let mut usage = TokenUsage::new(
            u.get("prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
            u.get("completion_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
        );
        usage.reasoning_tokens = u
            .get("completion_tokens_details")
            .and_then(|d| d.get("reasoning_tokens"))
            .and_then(|v| v.as_u64())
            .map(|v| v as u32);
        usage
    });

    let model = json["model"].as_str().unwrap_or(fallback_model).to_string();

    Ok((content, finish_reason, usage, model))
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn name(&self) -> &str {
        "OpenAI"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_reasoning_model(&self) -> bool {
        self.reasoning_model
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        if self.api_key.is_empty() {
            return Err(LLMError::NotConfigured("missing API key".to_string()));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(&request);

        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else {
                    LLMError::HttpError(e)
                }
            })?;
        let status = resp.status();
        let latency = start.elapsed().as_millis() as u64;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(LLMError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LLMError::AuthError("Invalid API key".to_string()));
        }

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(LLMError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let json: serde_json::Value = resp.json().await?;
        let (content, finish_reason, usage, model) = parse_completion(&json, &self.model)?;

        log::debug!(
            "openai reply: model={} finish_reason={:?} latency_ms={} usage={:?}",
            model,
            finish_reason,
            latency,
            usage
        );

        Ok(ChatResponse {
            content,
            model,
            provider: "openai".to_string(),
            usage,
            finish_reason,
            latency_ms: latency,
        })
    }
}
