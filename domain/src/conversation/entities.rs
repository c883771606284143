//! Conversation entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker name used for the session-opening line
pub const BARTENDER: &str = "Bartender";

/// Speaker name used for operator-injected lines
pub const STRANGER: &str = "A stranger";

/// A single committed line of dialogue (Entity)
///
/// Immutable once created. `turn_number` is assigned by
/// [`ConversationHistory`](super::history::ConversationHistory) at append time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    speaker: String,
    content: String,
    turn_number: u64,
    timestamp: DateTime<Utc>,
}

impl Utterance {
    pub fn new(
        speaker: impl Into<String>,
        content: impl Into<String>,
        turn_number: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
            turn_number,
            timestamp,
        }
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn turn_number(&self) -> u64 {
        self.turn_number
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// `Name: content` line used when packing history into a prompt script.
    pub fn as_script_line(&self) -> String {
        format!("{}: {}", self.speaker, self.content)
    }
}
