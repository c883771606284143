//! Configuration file loading for dive-bar
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `DIVEBAR_`-prefixed environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./dive-bar.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/dive-bar/config.toml`
//! 5. Default values
//!
//! The persona roster is read separately from `agents.toml`.

mod agents;
mod error;
mod file_config;
mod fingerprint;
mod loader;

pub use agents::{DEFAULT_AGENTS_PATH, FileAgentsConfig, FilePersonaConfig};
pub use error::ConfigError;
pub use file_config::{
    API_KEY_ENV, FileApiLlmConfig, FileBarConfig, FileConfig, FileDisplayConfig, FileLlmConfig,
    FileLocalLlmConfig, FileStorageConfig, LlmMode,
};
pub use fingerprint::config_hash;
pub use loader::ConfigLoader;
