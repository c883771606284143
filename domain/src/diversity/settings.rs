//! Diversity checking configuration

use serde::{Deserialize, Serialize};

/// Tuning for diversity checking and regeneration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversitySettings {
    /// Run the check (and the regeneration loop) at all
    pub enabled: bool,
    /// Minimum aggregate score that counts as a pass
    pub threshold: f64,
    /// Upper bound on regeneration attempts per turn
    pub max_retries: u32,
    /// Trailing history window, across all speakers
    pub window_size: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
}

impl Default for DiversitySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.6,
            max_retries: 3,
            window_size: 10,
            ngram_min: 3,
            ngram_max: 6,
        }
    }
}
