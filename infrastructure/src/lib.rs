//! Infrastructure layer for dive-bar
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration file loading.
//!
//! - [`config`] — figment-merged TOML/env configuration and the persona roster
//! - [`inference`] — HTTP text backends (OpenAI-compatible, Anthropic)
//! - [`transcript`] — append-only JSONL transcript store and reader

pub mod config;
pub mod inference;
pub mod transcript;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, DEFAULT_AGENTS_PATH, FileAgentsConfig, FileConfig, LlmMode,
    config_hash,
};
pub use inference::{AnthropicGateway, OpenAiCompatGateway, gateway_from_config};
pub use transcript::{JsonlTranscriptReader, JsonlTranscriptStore};
