//! OpenAI-compatible chat-completions adapter (llama.cpp server, vLLM, ...)

use super::{build_client, check_status, map_request_error, trim_base_url};
use async_trait::async_trait;
use divebar_application::{GatewayError, InferenceGateway};
use divebar_domain::{GenerationParams, GenerationRequest, GenerationResult};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct OpenAiCompatGateway {
    client: Client,
    base_url: String,
    model: String,
    defaults: GenerationParams,
}

impl OpenAiCompatGateway {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        defaults: GenerationParams,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: trim_base_url(base_url),
            model: model.into(),
            defaults,
        })
    }

    fn build_body(&self, request: &GenerationRequest) -> Value {
        let params = request.overrides.merge(&self.defaults);
        let model = request.overrides.model.as_deref().unwrap_or(&self.model);
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();

        let mut body = json!({
            "model": model,
            "messages": messages,
            "temperature": params.temperature,
            "top_p": params.top_p,
            "top_k": params.top_k,
            "min_p": params.min_p,
            "max_tokens": params.max_tokens,
            "repeat_penalty": params.repeat_penalty,
            "frequency_penalty": params.frequency_penalty,
            "presence_penalty": params.presence_penalty,
            "stream": false,
        });
        if !request.stop.is_empty() {
            body["stop"] = json!(request.stop);
        }
        body
    }

    fn parse_response(raw: &Value, elapsed: Duration) -> Result<GenerationResult, GatewayError> {
        let content = raw["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| GatewayError::InvalidResponse("no choices[0].message.content".into()))?;
        let usage = &raw["usage"];
        Ok(GenerationResult {
            content: content.trim().to_string(),
            tokens_prompt: usage["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            tokens_completion: usage["completion_tokens"].as_u64().unwrap_or(0) as u32,
            generation_time_ms: elapsed.as_secs_f64() * 1000.0,
        })
    }
}

#[async_trait]
impl InferenceGateway for OpenAiCompatGateway {
    /// Fail fast when the server is not reachable.
    async fn initialize(&self) -> Result<(), GatewayError> {
        let url = format!("{}/v1/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_request_error)?;
        check_status(response).await?;
        info!(base_url = %self.base_url, model = %self.model, "Local backend reachable");
        Ok(())
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, GatewayError> {
        let body = self.build_body(&request);
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(model = %body["model"], messages = request.messages.len(), "Chat completion request");

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
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

#[cfg(test)]
mod tests {
    use super::*;
    use divebar_domain::ChatMessage;

    fn gateway() -> OpenAiCompatGateway {
        OpenAiCompatGateway::new(
            "http://127.0.0.1:8080/",
            "local",
            GenerationParams::default(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_body_carries_sampling_params_and_stops() {
        let request = GenerationRequest::new(vec![
            ChatMessage::system("You are Mike."),
            ChatMessage::user("Rosa: evening"),
        ])
        .with_stop(vec!["Rosa:".to_string(), "\n\n".to_string()]);

        let body = gateway().build_body(&request);
        assert_eq!(body["model"], "local");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Rosa: evening");
        assert_eq!(body["temperature"], 0.85);
        assert_eq!(body["top_k"], 50);
        assert_eq!(body["min_p"], 0.05);
        assert_eq!(body["max_tokens"], 200);
        assert_eq!(body["repeat_penalty"], 1.1);
        assert_eq!(body["stop"], json!(["Rosa:", "\n\n"]));
    }

    #[test]
    fn test_body_applies_overrides() {
        let request = GenerationRequest::new(vec![ChatMessage::user("topic?")])
            .with_max_tokens(20)
            .with_model(Some("tiny".to_string()));
        let body = gateway().build_body(&request);
        assert_eq!(body["max_tokens"], 20);
        assert_eq!(body["model"], "tiny");
        assert!(body.get("stop").is_none());
    }

    #[test]
    fn test_parse_response_reads_content_and_usage() {
        let raw = json!({
            "choices": [{"message": {"role": "assistant", "content": "  Another round.\n"}}],
            "usage": {"prompt_tokens": 310, "completion_tokens": 6}
        });
        let result =
            OpenAiCompatGateway::parse_response(&raw, Duration::from_millis(250)).unwrap();
        assert_eq!(result.content, "Another round.");
        assert_eq!(result.tokens_prompt, 310);
        assert_eq!(result.tokens_completion, 6);
        assert_eq!(result.generation_time_ms, 250.0);
    }

    #[test]
    fn test_parse_response_without_choices_is_invalid() {
        let raw = json!({"error": "model not loaded"});
        let result = OpenAiCompatGateway::parse_response(&raw, Duration::ZERO);
        assert!(matches!(result, Err(GatewayError::InvalidResponse(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(gateway().base_url, "http://127.0.0.1:8080");
    }
}
