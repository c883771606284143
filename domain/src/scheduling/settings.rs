//! Scheduler tuning parameters

use std::time::Duration;

/// Weights of the scoring terms. They sum to 1.0; the silence boost is
/// added on top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionWeights {
    pub time: f64,
    pub chattiness: f64,
    pub addressed: f64,
    pub random: f64,
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            time: 0.35,
            chattiness: 0.25,
            addressed: 0.30,
            random: 0.10,
        }
    }
}

impl SelectionWeights {
    /// Same weights with the random term removed (used for reproducible runs).
    pub fn without_random(self) -> Self {
        Self {
            random: 0.0,
            ..self
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSettings {
    /// Base interval between orchestration ticks
    pub tick_interval: Duration,
    /// Cooldown is `tick_interval * cooldown_multiplier`
    pub cooldown_multiplier: f64,
    pub weights: SelectionWeights,
    /// Silence after which the time factor saturates at 1.0
    pub time_cap: Duration,
    /// Turns without speaking before the silence boost applies
    pub silence_threshold: u64,
    pub silence_boost: f64,
    /// Consecutive same-dyad pairs that suppress deterministic addressing
    pub max_pair_streak: usize,
    /// Pair history is trimmed to `pair_history_keep` once it exceeds this
    pub pair_history_cap: usize,
    pub pair_history_keep: usize,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(2),
            cooldown_multiplier: 1.5,
            weights: SelectionWeights::default(),
            time_cap: Duration::from_secs(60),
            silence_threshold: 8,
            silence_boost: 0.25,
            max_pair_streak: 2,
            pair_history_cap: 20,
            pair_history_keep: 10,
        }
    }
}

impl SchedulerSettings {
    pub fn with_tick_interval(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            ..Self::default()
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.tick_interval.mul_f64(self.cooldown_multiplier)
    }
}
