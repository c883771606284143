//! Bar settings: use case loop control.
//!
//! [`BarSettings`] groups the static parameters the
//! [`TurnController`](crate::use_cases::turn_controller::TurnController)
//! runs with. They are resolved from file configuration by the
//! infrastructure layer.

use divebar_domain::{DiversitySettings, GenerationParams, SchedulerSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Orchestration loop parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSettings {
    pub bar_name: String,
    /// Base delay between ticks, before the speed multiplier.
    pub tick_interval: Duration,
    /// Continuation turns before the subject is rotated; 0 rotates every turn.
    pub max_subject_chat: u32,
    /// Initial speed multiplier.
    pub speed: f64,
    /// Context window of the backend, in tokens.
    pub n_ctx: usize,
    pub generation: GenerationParams,
    pub diversity: DiversitySettings,
    /// Fingerprint of the resolved configuration, recorded per session.
    pub config_hash: String,
}

impl Default for BarSettings {
    fn default() -> Self {
        Self {
            bar_name: "The Rusty Nail".to_string(),
            tick_interval: Duration::from_secs(2),
            max_subject_chat: 3,
            speed: 1.0,
            n_ctx: 4096,
            generation: GenerationParams::default(),
            diversity: DiversitySettings::default(),
            config_hash: String::new(),
        }
    }
}

impl BarSettings {
    // ==================== Builder Methods ====================

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_max_subject_chat(mut self, max: u32) -> Self {
        self.max_subject_chat = max;
        self
    }

    pub fn with_diversity(mut self, diversity: DiversitySettings) -> Self {
        self.diversity = diversity;
        self
    }

    /// Scheduler settings derived from the tick interval.
    pub fn scheduler_settings(&self) -> SchedulerSettings {
        SchedulerSettings::with_tick_interval(self.tick_interval)
    }
}
