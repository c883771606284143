//! Anthropic Messages API adapter

use super::{build_client, check_status, map_request_error, trim_base_url};
use async_trait::async_trait;
use divebar_application::{GatewayError, InferenceGateway};
use divebar_domain::generation::message::split_system;
use divebar_domain::{GenerationParams, GenerationRequest, GenerationResult};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct AnthropicGateway {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    api_version: String,
    model: String,
    defaults: GenerationParams,
}

impl AnthropicGateway {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        api_version: impl Into<String>,
        model: impl Into<String>,
        defaults: GenerationParams,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: trim_base_url(base_url),
            api_key,
            api_version: api_version.into(),
            model: model.into(),
            defaults,
        })
    }

    fn api_key(&self) -> Result<&str, GatewayError> {
        self.api_key.as_deref().ok_or_else(|| {
            GatewayError::Configuration(
                "No API key: set llm.api.api_key in config or the ANTHROPIC_API_KEY env var"
                    .to_string(),
            )
        })
    }

    fn build_body(&self, request: &GenerationRequest) -> Value {
        let params = request.overrides.merge(&self.defaults);
        let model = request.overrides.model.as_deref().unwrap_or(&self.model);
        let (system, rest) = split_system(&request.messages);
        let messages: Vec<Value> = rest
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();

        let mut body = json!({
            "model": model,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
            "top_k": params.top_k,
            "messages": messages,
        });
        if let Some(system) = system {
            body["system"] = json!(system);
        }

        // The API rejects whitespace-only stop sequences such as "\n\n"
        let stops: Vec<&str> = request
            .stop
            .iter()
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
            .collect();
        if !stops.is_empty() {
            body["stop_sequences"] = json!(stops);
        }
        body
    }

    fn parse_response(raw: &Value, elapsed: Duration) -> Result<GenerationResult, GatewayError> {
        let content = raw["content"]
            .as_array()
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|b| b["type"] == "text")
                    .and_then(|b| b["text"].as_str())
            })
            .ok_or_else(|| GatewayError::InvalidResponse("no text block in response".into()))?;
        let usage = &raw["usage"];
        Ok(GenerationResult {
            content: content.trim().to_string(),
            tokens_prompt: usage["input_tokens"].as_u64().unwrap_or(0) as u32,
            tokens_completion: usage["output_tokens"].as_u64().unwrap_or(0) as u32,
            generation_time_ms: elapsed.as_secs_f64() * 1000.0,
        })
    }
}

#[async_trait]
impl InferenceGateway for AnthropicGateway {
    /// Only checks that a key is configured; no request is made.
    async fn initialize(&self) -> Result<(), GatewayError> {
        self.api_key()?;
        info!(model = %self.model, "Anthropic API configured");
        Ok(())
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, GatewayError> {
        let api_key = self.api_key()?;
        let body = self.build_body(&request);
        let url = format!("{}/v1/messages", self.base_url);
        debug!(model = %body["model"], messages = request.messages.len(), "Messages API request");

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(map_request_error)?;
        let raw = check_status(response)
            .await?
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Self::parse_response(&raw, start.elapsed())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
