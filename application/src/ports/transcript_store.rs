//! Transcript persistence port
//!
//! The controller records sessions, committed utterances and regeneration
//! events through [`TranscriptStore`]. Calls are fire-and-forget from the
//! orchestration loop's point of view: errors are returned so the caller can
//! log them, but they never stop a session.

use divebar_domain::TranscriptSnapshot;
use serde::Serialize;
use thiserror::Error;

/// Errors from transcript stores and readers
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Malformed record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Data written when a session opens
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStart {
    pub bar_name: String,
    pub agent_count: usize,
    pub config_hash: String,
}

/// A committed utterance plus the metrics of the call that produced it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UtteranceEntry {
    pub turn_number: u64,
    pub speaker: String,
    pub content: String,
    pub model_name: Option<String>,
    pub tokens_prompt: Option<u32>,
    pub tokens_completion: Option<u32>,
    pub generation_time_ms: Option<f64>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub chattiness: Option<f64>,
    pub score: Option<f64>,
    pub selection_reason: Option<String>,
    pub addressed_by: Option<String>,
}

impl UtteranceEntry {
    /// Entry for a line without generation metrics (opener, stranger).
    pub fn plain(turn_number: u64, speaker: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            turn_number,
            speaker: speaker.into(),
            content: content.into(),
            ..Default::default()
        }
    }
}

/// A turn that needed at least one regeneration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegenerationEntry {
    pub turn_number: u64,
    pub speaker: String,
    pub attempt_count: u32,
}

/// Port for persisting the conversation transcript.
pub trait TranscriptStore: Send + Sync {
    /// Open a session and return its id.
    fn start_session(&self, session: &SessionStart) -> Result<String, StoreError>;

    fn log_utterance(&self, session_id: &str, entry: &UtteranceEntry) -> Result<(), StoreError>;

    fn log_regeneration(
        &self,
        session_id: &str,
        entry: &RegenerationEntry,
    ) -> Result<(), StoreError>;

    fn end_session(&self, session_id: &str) -> Result<(), StoreError>;
}

/// No-op store for tests and when persistence is disabled.
pub struct NoTranscript;

impl TranscriptStore for NoTranscript {
    fn start_session(&self, _session: &SessionStart) -> Result<String, StoreError> {
        Ok("unrecorded".to_string())
    }

    fn log_utterance(&self, _session_id: &str, _entry: &UtteranceEntry) -> Result<(), StoreError> {
        Ok(())
    }

    fn log_regeneration(
        &self,
        _session_id: &str,
        _entry: &RegenerationEntry,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn end_session(&self, _session_id: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Port for reading a persisted transcript back.
pub trait TranscriptReader: Send + Sync {
    fn read_all(&self) -> Result<TranscriptSnapshot, StoreError>;
}
