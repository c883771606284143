//! Generation request

use super::message::ChatMessage;
use super::params::GenerationParams;

/// Per-request replacements for the default parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOverrides {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    /// Backend model name, replacing the configured default
    pub model: Option<String>,
}

impl GenerationOverrides {
    /// Apply the overrides on top of `defaults`.
    pub fn merge(&self, defaults: &GenerationParams) -> GenerationParams {
        GenerationParams {
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            ..defaults.clone()
        }
    }
}

/// One call to the text backend
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub stop: Vec<String>,
    pub overrides: GenerationOverrides,
}

impl GenerationRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            stop: Vec::new(),
            overrides: GenerationOverrides::default(),
        }
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.overrides.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.overrides.model = model;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_what_is_set() {
        let defaults = GenerationParams::default();
        let merged = GenerationOverrides {
            max_tokens: Some(20),
            ..Default::default()
        }
        .merge(&defaults);
        assert_eq!(merged.max_tokens, 20);
        assert_eq!(merged.temperature, defaults.temperature);
        assert_eq!(merged.top_k, defaults.top_k);
    }

    #[test]
    fn builder_sets_fields() {
        let request = GenerationRequest::new(vec![ChatMessage::user("topic?")])
            .with_stop(vec!["\n".to_string()])
            .with_max_tokens(20)
            .with_model(Some("small".to_string()));
        assert_eq!(request.stop, vec!["\n"]);
        assert_eq!(request.overrides.max_tokens, Some(20));
        assert_eq!(request.overrides.model.as_deref(), Some("small"));
    }
}
