//! Text backend configuration from TOML (`[llm]` section)
//!
//! ```toml
//! [llm]
//! mode = "api"            # "local" (OpenAI-compatible server) or "api" (Anthropic)
//! n_ctx = 4096
//!
//! [llm.local]
//! base_url = "http://127.0.0.1:8080"
//!
//! [llm.api]
//! model = "claude-opus-4-6"
//! # api_key falls back to ANTHROPIC_API_KEY
//!
//! [llm.generation]
//! temperature = 0.85
//! ```

use divebar_domain::core::validation::check_unit_interval;
use divebar_domain::{ConfigIssue, ConfigIssueCode, GenerationParams};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable consulted when `llm.api.api_key` is unset.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Which backend adapter drives the bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmMode {
    /// OpenAI-compatible chat-completions server (llama.cpp, vLLM, ...)
    #[default]
    Local,
    /// Hosted Anthropic Messages API
    Api,
}

impl FromStr for LlmMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(LlmMode::Local),
            "api" => Ok(LlmMode::Api),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for LlmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmMode::Local => write!(f, "local"),
            LlmMode::Api => write!(f, "api"),
        }
    }
}

/// Local OpenAI-compatible server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLocalLlmConfig {
    pub base_url: String,
    /// Model name sent with each request; most local servers ignore it
    pub model: String,
}

impl Default for FileLocalLlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            model: "local".to_string(),
        }
    }
}

/// Hosted API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiLlmConfig {
    /// Only "anthropic" is supported
    pub provider: String,
    /// Direct API key (prefer the environment variable)
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Anthropic API version header
    pub api_version: String,
}

impl Default for FileApiLlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            api_key: None,
            model: "claude-opus-4-6".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            api_version: "2023-06-01".to_string(),
        }
    }
}

impl FileApiLlmConfig {
    /// Configured key, else the `ANTHROPIC_API_KEY` environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var(API_KEY_ENV)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
    }
}

/// Raw `[llm]` configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// "local" or "api"
    pub mode: String,
    /// Backend context window, in tokens
    pub n_ctx: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub local: FileLocalLlmConfig,
    pub api: FileApiLlmConfig,
    pub generation: GenerationParams,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            mode: "local".to_string(),
            n_ctx: 4096,
            timeout_secs: 120,
            local: FileLocalLlmConfig::default(),
            api: FileApiLlmConfig::default(),
            generation: GenerationParams::default(),
        }
    }
}

impl FileLlmConfig {
    /// Parse `mode` into [`LlmMode`].
    ///
    /// Accepts: "local", "api"
    pub fn parse_mode(&self) -> (LlmMode, Vec<ConfigIssue>) {
        match self.mode.parse::<LlmMode>() {
            Ok(mode) => (mode, vec![]),
            Err(value) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "llm.mode".to_string(),
                        value: value.clone(),
                        valid_values: vec!["local".to_string(), "api".to_string()],
                    },
                    format!("llm.mode: unknown value '{}'", value),
                );
                (LlmMode::default(), vec![issue])
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let (mode, mut issues) = self.parse_mode();

        if mode == LlmMode::Api && !self.api.provider.eq_ignore_ascii_case("anthropic") {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidEnumValue {
                    field: "llm.api.provider".to_string(),
                    value: self.api.provider.clone(),
                    valid_values: vec!["anthropic".to_string()],
                },
                format!("llm.api.provider: unsupported provider '{}'", self.api.provider),
            ));
        }

        let generation = &self.generation;
        issues.extend(check_unit_interval("llm.generation.top_p", generation.top_p));
        issues.extend(check_unit_interval("llm.generation.min_p", generation.min_p));
        if !(0.0..=2.0).contains(&generation.temperature) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "llm.generation.temperature".to_string(),
                },
                format!(
                    "llm.generation.temperature: {} is outside [0, 2]",
                    generation.temperature
                ),
            ));
        }
        if generation.max_tokens == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "llm.generation.max_tokens".to_string(),
                },
                "llm.generation.max_tokens must be at least 1",
            ));
        }
        if self.n_ctx <= generation.max_tokens as usize {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "llm.n_ctx".to_string(),
                },
                format!(
                    "llm.n_ctx ({}) leaves no room for history after max_tokens ({})",
                    self.n_ctx, generation.max_tokens
                ),
            ));
        }
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "llm.timeout_secs".to_string(),
                },
                "llm.timeout_secs cannot be 0",
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("local".parse::<LlmMode>(), Ok(LlmMode::Local));
        assert_eq!(" API ".parse::<LlmMode>(), Ok(LlmMode::Api));
        assert!("gguf".parse::<LlmMode>().is_err());
    }

    #[test]
    fn test_unknown_mode_is_an_error() {
        let config = FileLlmConfig {
            mode: "cloud".to_string(),
            ..Default::default()
        };
        let (mode, issues) = config.parse_mode();
        assert_eq!(mode, LlmMode::Local);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert!(issues[0].message.contains("cloud"));
    }

    #[test]
    fn test_unsupported_provider_only_matters_in_api_mode() {
        let mut config = FileLlmConfig::default();
        config.api.provider = "openai".to_string();
        assert!(config.validate().is_empty());

        config.mode = "api".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| matches!(
            &i.code,
            ConfigIssueCode::InvalidEnumValue { field, .. } if field == "llm.api.provider"
        )));
    }

    #[test]
    fn test_sampling_ranges_checked() {
        let mut config = FileLlmConfig::default();
        config.generation.top_p = 1.5;
        config.generation.temperature = 3.0;
        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(ConfigIssue::is_error));
    }

    #[test]
    fn test_configured_api_key_wins() {
        let api = FileApiLlmConfig {
            api_key: Some("  sk-test  ".to_string()),
            ..Default::default()
        };
        assert_eq!(api.resolve_api_key().as_deref(), Some("sk-test"));
    }
}
