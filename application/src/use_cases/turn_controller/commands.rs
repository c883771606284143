//! Operator commands
//!
//! Commands reach the running controller over a channel and are applied on
//! the orchestration timeline between ticks.

use std::time::Duration;
use tracing::warn;

/// An operator request to the running bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarCommand {
    Pause,
    Resume,
    TogglePause,
    SpeedUp,
    SpeedDown,
    /// Inject a line from someone outside the roster
    Stranger(String),
    Quit,
}

/// Tick speed multiplier, kept within [0.25, 4.0] in 0.25 steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedMultiplier(f64);

impl SpeedMultiplier {
    pub const MIN: f64 = 0.25;
    pub const MAX: f64 = 4.0;
    pub const STEP: f64 = 0.25;

    /// Clamp `value` into range; a non-finite value falls back to 1x.
    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            warn!(speed = value, "Ignoring non-finite speed, using 1x");
            return Self::default();
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn faster(&mut self) {
        *self = Self::new(self.0 + Self::STEP);
    }

    pub fn slower(&mut self) {
        *self = Self::new(self.0 - Self::STEP);
    }

    /// Delay until the next tick at this speed.
    pub fn delay(&self, tick_interval: Duration) -> Duration {
        tick_interval.div_f64(self.0)
    }
}

impl Default for SpeedMultiplier {
    fn default() -> Self {
        Self(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_clamps() {
        let mut speed = SpeedMultiplier::new(3.9);
        speed.faster();
        assert_eq!(speed.value(), 4.0);
        speed.faster();
        assert_eq!(speed.value(), 4.0);

        let mut speed = SpeedMultiplier::new(0.25);
        speed.slower();
        assert_eq!(speed.value(), 0.25);
        assert_eq!(SpeedMultiplier::new(-3.0).value(), 0.25);
    }

    #[test]
    fn test_non_finite_speed_falls_back_to_default() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let speed = SpeedMultiplier::new(value);
            assert_eq!(speed, SpeedMultiplier::default());
            assert_eq!(speed.delay(Duration::from_secs(2)), Duration::from_secs(2));
        }
    }

    #[test]
    fn test_delay_divides_interval() {
        let speed = SpeedMultiplier::new(2.0);
        assert_eq!(speed.delay(Duration::from_secs(2)), Duration::from_secs(1));
        let speed = SpeedMultiplier::new(0.5);
        assert_eq!(speed.delay(Duration::from_secs(2)), Duration::from_secs(4));
    }
}
