//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.
//!
//! | Section | Type |
//! |---------|------|
//! | `[bar]` | [`FileBarConfig`] |
//! | `[llm]` | [`FileLlmConfig`] |
//! | `[display]` | [`FileDisplayConfig`] |
//! | `[storage]` | [`FileStorageConfig`] |
//! | `[diversity]` | [`DiversitySettings`] |

mod bar;
mod display;
mod llm;
mod storage;

pub use bar::FileBarConfig;
pub use display::FileDisplayConfig;
pub use llm::{API_KEY_ENV, FileApiLlmConfig, FileLlmConfig, FileLocalLlmConfig, LlmMode};
pub use storage::FileStorageConfig;

use divebar_application::BarSettings;
use divebar_domain::core::validation::check_unit_interval;
use divebar_domain::{ConfigIssue, ConfigIssueCode, DiversitySettings};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub bar: FileBarConfig,
    /// Text backend settings
    pub llm: FileLlmConfig,
    pub display: FileDisplayConfig,
    pub storage: FileStorageConfig,
    /// Diversity checking and regeneration
    pub diversity: DiversitySettings,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Personas live in a separate file and are checked by
    /// [`FileAgentsConfig::validate`](super::FileAgentsConfig::validate).
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Bar loop
        issues.extend(self.bar.validate());

        // 2. Backend
        issues.extend(self.llm.validate());

        // 3. Diversity
        issues.extend(validate_diversity(&self.diversity));

        issues
    }

    /// Orchestration settings for the resolved configuration.
    ///
    /// Call after [`validate`](Self::validate) reported no errors; an
    /// invalid tick interval falls back to the default.
    pub fn to_bar_settings(&self, config_hash: impl Into<String>) -> BarSettings {
        let defaults = BarSettings::default();
        let tick_interval = self.bar.tick_duration().0.unwrap_or(defaults.tick_interval);
        BarSettings {
            bar_name: self.bar.name.clone(),
            tick_interval,
            max_subject_chat: self.bar.max_subject_chat,
            n_ctx: self.llm.n_ctx,
            generation: self.llm.generation.clone(),
            diversity: self.diversity.clone(),
            config_hash: config_hash.into(),
            ..defaults
        }
    }
}

fn validate_diversity(diversity: &DiversitySettings) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    issues.extend(check_unit_interval("diversity.threshold", diversity.threshold));

    if diversity.ngram_min == 0 {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::OutOfRange {
                field: "diversity.ngram_min".to_string(),
            },
            "diversity.ngram_min must be at least 1",
        ));
    }
    if diversity.ngram_min > diversity.ngram_max {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::InvertedRange {
                min_field: "diversity.ngram_min".to_string(),
                max_field: "diversity.ngram_max".to_string(),
            },
            format!(
                "diversity.ngram_min ({}) is greater than diversity.ngram_max ({})",
                diversity.ngram_min, diversity.ngram_max
            ),
        ));
    }
    if diversity.enabled && diversity.window_size == 0 {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::OutOfRange {
                field: "diversity.window_size".to_string(),
            },
            "diversity.window_size is 0; every candidate will pass",
        ));
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[bar]
name = "The Broken Stool"
max_agents = 3
tick_interval = 1.5
max_subject_chat = 4

[llm]
mode = "api"
n_ctx = 8192

[llm.api]
model = "claude-haiku"

[llm.generation]
temperature = 0.7
max_tokens = 120

[display]
show_timestamps = false

[storage]
transcript_path = "/tmp/bar.jsonl"

[diversity]
threshold = 0.5
max_retries = 2
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bar.name, "The Broken Stool");
        assert_eq!(config.bar.max_agents, 3);
        assert_eq!(config.llm.parse_mode().0, LlmMode::Api);
        assert_eq!(config.llm.api.model, "claude-haiku");
        assert_eq!(config.llm.api.api_version, "2023-06-01");
        assert_eq!(config.llm.generation.max_tokens, 120);
        assert_eq!(config.llm.generation.top_k, 50);
        assert!(!config.display.show_timestamps);
        assert!(config.display.color);
        assert_eq!(config.storage.transcript_path, PathBuf::from("/tmp/bar.jsonl"));
        assert_eq!(config.storage.log_dir, PathBuf::from("data/logs"));
        assert_eq!(config.diversity.threshold, 0.5);
        assert_eq!(config.diversity.window_size, 10);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.bar.name, "The Rusty Nail");
        assert_eq!(config.bar.max_agents, 5);
        assert_eq!(config.bar.tick_interval, 2.0);
        assert_eq!(config.bar.max_subject_chat, 3);
        assert_eq!(config.llm.parse_mode().0, LlmMode::Local);
        assert_eq!(config.llm.n_ctx, 4096);
        assert!(config.diversity.enabled);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_empty());
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let toml_str = r#"
[bar]
tick_interval = 0.0

[llm]
mode = "gguf"

[diversity]
threshold = 1.2
ngram_min = 5
ngram_max = 3
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 4);
        assert!(issues.iter().all(ConfigIssue::is_error));
        assert!(issues.iter().any(|i| matches!(i.code, ConfigIssueCode::InvertedRange { .. })));
    }

    #[test]
    fn test_to_bar_settings() {
        let mut config = FileConfig::default();
        config.bar.tick_interval = 0.5;
        config.bar.name = "Joe's".to_string();
        config.llm.n_ctx = 2048;
        config.diversity.enabled = false;

        let settings = config.to_bar_settings("abc123");
        assert_eq!(settings.bar_name, "Joe's");
        assert_eq!(settings.tick_interval, Duration::from_millis(500));
        assert_eq!(settings.n_ctx, 2048);
        assert!(!settings.diversity.enabled);
        assert_eq!(settings.config_hash, "abc123");
        assert_eq!(settings.speed, 1.0);
    }
}
