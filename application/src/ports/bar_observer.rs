//! Bar observer port
//!
//! Defines the interface for reporting what happens at the bar. Purely
//! observational: nothing an observer does feeds back into orchestration.

use divebar_domain::{DiversityAssessment, Utterance};

/// What a persona is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaStatus {
    Idle,
    Thinking,
}

impl PersonaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaStatus::Idle => "idle",
            PersonaStatus::Thinking => "thinking",
        }
    }
}

/// Running counters shown alongside the conversation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarStats {
    /// Turn attempts so far, including empty ones
    pub turn: u64,
    pub speed: f64,
    pub paused: bool,
}

/// Callback for bar events
///
/// Implementations live in the presentation layer.
pub trait BarObserver: Send + Sync {
    /// Called when a committed utterance should be displayed
    fn on_utterance(&self, utterance: &Utterance);

    /// Called when a persona starts or stops generating
    fn on_status(&self, _persona: &str, _status: PersonaStatus) {}

    /// Called when a topic change is requested for the next line
    fn on_topic(&self, _persona: &str, _topic: &str) {}

    /// Called for each failed diversity check that triggers a rephrase
    fn on_regeneration(&self, _persona: &str, _attempt: u32, _assessment: &DiversityAssessment) {}

    /// Called with short operator-facing status lines ("Paused.")
    fn on_notice(&self, _message: &str) {}

    /// Called when counters change
    fn on_stats(&self, _stats: &BarStats) {}
}

/// No-op observer for when nothing is displayed
pub struct NoObserver;

impl BarObserver for NoObserver {
    fn on_utterance(&self, _utterance: &Utterance) {}
}
