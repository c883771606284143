//! Display configuration from TOML (`[display]` section)

use serde::{Deserialize, Serialize};

/// Raw display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDisplayConfig {
    /// Prefix each line with the local wall-clock time
    pub show_timestamps: bool,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileDisplayConfig {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            color: true,
        }
    }
}
