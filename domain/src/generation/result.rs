//! Generation result

use serde::{Deserialize, Serialize};

/// Text returned by the backend with usage metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub content: String,
    pub tokens_prompt: u32,
    pub tokens_completion: u32,
    pub generation_time_ms: f64,
}

impl GenerationResult {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}
