//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// JSONL transcript, appended to across sessions
    pub transcript_path: PathBuf,
    /// Directory for rolling diagnostic logs
    pub log_dir: PathBuf,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            transcript_path: PathBuf::from("data/dive_bar.jsonl"),
            log_dir: PathBuf::from("data/logs"),
        }
    }
}
