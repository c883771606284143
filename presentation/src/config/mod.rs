//! Presentation-level configuration
//!
//! Configuration for console display.

use serde::{Deserialize, Serialize};

/// Console display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Prefix each line with the local wall-clock time
    pub show_timestamps: bool,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            color: true,
        }
    }
}

impl ConsoleConfig {
    /// Apply the color choice process-wide.
    pub fn apply_color_choice(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}
