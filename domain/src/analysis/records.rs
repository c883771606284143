//! Records read back from a transcript

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub bar_name: String,
    pub agent_count: usize,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtteranceRecord {
    pub session_id: String,
    pub turn_number: u64,
    pub speaker: String,
    pub content: String,
    #[serde(default)]
    pub tokens_prompt: Option<u32>,
    #[serde(default)]
    pub tokens_completion: Option<u32>,
    #[serde(default)]
    pub generation_time_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegenerationRecord {
    pub session_id: String,
    pub turn_number: u64,
    pub speaker: String,
    pub attempt_count: u32,
}

/// Everything read from one transcript, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptSnapshot {
    pub sessions: Vec<SessionRecord>,
    pub utterances: Vec<UtteranceRecord>,
    pub regenerations: Vec<RegenerationRecord>,
}

impl TranscriptSnapshot {
    /// Keep only records whose session id starts with `prefix`.
    pub fn filter_session(self, prefix: &str) -> Self {
        Self {
            sessions: self
                .sessions
                .into_iter()
                .filter(|s| s.session_id.starts_with(prefix))
                .collect(),
            utterances: self
                .utterances
                .into_iter()
                .filter(|u| u.session_id.starts_with(prefix))
                .collect(),
            regenerations: self
                .regenerations
                .into_iter()
                .filter(|r| r.session_id.starts_with(prefix))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.utterances.is_empty() && self.regenerations.is_empty()
    }
}
