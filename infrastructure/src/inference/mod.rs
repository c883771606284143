//! Text backend adapters implementing the
//! [`InferenceGateway`](divebar_application::InferenceGateway) port.
//!
//! | `llm.mode` | Adapter | Endpoint |
//! |------------|---------|----------|
//! | `local` | [`OpenAiCompatGateway`] | `POST {base_url}/v1/chat/completions` |
//! | `api` | [`AnthropicGateway`] | `POST {base_url}/v1/messages` |
//!
//! Both adapters time each call, read token usage from the response and
//! trim the returned text. A request's model override replaces the
//! configured model.

mod anthropic;
mod openai_compat;

pub use anthropic::AnthropicGateway;
pub use openai_compat::OpenAiCompatGateway;

use crate::config::{FileLlmConfig, LlmMode};
use divebar_application::{GatewayError, InferenceGateway};
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;

/// Build the adapter selected by `llm.mode`.
pub fn gateway_from_config(config: &FileLlmConfig) -> Result<Arc<dyn InferenceGateway>, GatewayError> {
    let (mode, issues) = config.parse_mode();
    if let Some(issue) = issues.first() {
        return Err(GatewayError::Configuration(issue.message.clone()));
    }
    let gateway: Arc<dyn InferenceGateway> = match mode {
        LlmMode::Local => Arc::new(OpenAiCompatGateway::new(
            &config.local.base_url,
            config.local.model.clone(),
            config.generation.clone(),
            config.timeout(),
        )?),
        LlmMode::Api => Arc::new(AnthropicGateway::new(
            &config.api.base_url,
            config.api.resolve_api_key(),
            config.api.api_version.clone(),
            config.api.model.clone(),
            config.generation.clone(),
            config.timeout(),
        )?),
    };
    Ok(gateway)
}

fn build_client(timeout: Duration) -> Result<Client, GatewayError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GatewayError::Configuration(format!("HTTP client: {}", e)))
}

fn map_request_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ConnectionError(error.to_string())
    } else {
        GatewayError::RequestFailed(error.to_string())
    }
}

/// Pass successful responses through; turn anything else into an error
/// carrying the status and body.
async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::RequestFailed(format!(
        "HTTP {}: {}",
        status,
        body.trim()
    )))
}

fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_follows_mode() {
        let mut config = FileLlmConfig::default();
        assert_eq!(gateway_from_config(&config).unwrap().model_name(), "local");

        config.mode = "api".to_string();
        config.api.model = "claude-haiku".to_string();
        assert_eq!(gateway_from_config(&config).unwrap().model_name(), "claude-haiku");

        config.mode = "gguf".to_string();
        assert!(matches!(
            gateway_from_config(&config),
            Err(GatewayError::Configuration(_))
        ));
    }

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("http://127.0.0.1:8080/"), "http://127.0.0.1:8080");
        assert_eq!(trim_base_url("https://api.anthropic.com"), "https://api.anthropic.com");
    }
}
