//! JSONL transcript reader

use super::jsonl_store::event_type;
use chrono::{DateTime, Utc};
use divebar_application::{StoreError, TranscriptReader};
use divebar_domain::{RegenerationRecord, SessionRecord, TranscriptSnapshot, UtteranceRecord};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Deserialize)]
struct SessionStartLine {
    session_id: String,
    timestamp: DateTime<Utc>,
    bar_name: String,
    agent_count: usize,
}

#[derive(Deserialize)]
struct SessionEndLine {
    session_id: String,
    timestamp: DateTime<Utc>,
}

/// Reads a transcript written by
/// [`JsonlTranscriptStore`](super::JsonlTranscriptStore).
///
/// Unknown event types are skipped. A truncated final line (an interrupted
/// write) is skipped with a warning; malformed lines elsewhere are errors.
pub struct JsonlTranscriptReader {
    path: PathBuf,
}

impl JsonlTranscriptReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse transcript text into a snapshot.
    pub fn parse(text: &str) -> Result<TranscriptSnapshot, StoreError> {
        let mut snapshot = TranscriptSnapshot::default();
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();
        let last_line = lines.last().map(|(n, _)| *n);

        for (number, line) in lines {
            let value: Value = match serde_json::from_str(line) {
                Ok(value) => value,
                Err(e) if Some(number) == last_line => {
                    warn!(line = number, error = %e, "Skipping truncated final transcript line");
                    continue;
                }
                Err(e) => {
                    return Err(StoreError::Malformed {
                        line: number,
                        reason: e.to_string(),
                    });
                }
            };

            let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
            match kind {
                event_type::SESSION_START => {
                    let start: SessionStartLine = decode(value, number)?;
                    snapshot.sessions.push(SessionRecord {
                        session_id: start.session_id,
                        bar_name: start.bar_name,
                        agent_count: start.agent_count,
                        started_at: start.timestamp,
                        ended_at: None,
                    });
                }
                event_type::UTTERANCE => {
                    snapshot.utterances.push(decode::<UtteranceRecord>(value, number)?);
                }
                event_type::REGENERATION => {
                    snapshot
                        .regenerations
                        .push(decode::<RegenerationRecord>(value, number)?);
                }
                event_type::SESSION_END => {
                    let end: SessionEndLine = decode(value, number)?;
                    if let Some(session) = snapshot
                        .sessions
                        .iter_mut()
                        .rev()
                        .find(|s| s.session_id == end.session_id)
                    {
                        session.ended_at = Some(end.timestamp);
                    }
                }
                _ => {}
            }
        }

        Ok(snapshot)
    }
}

fn decode<T: DeserializeOwned>(value: Value, line: usize) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Malformed {
        line,
        reason: e.to_string(),
    })
}

impl TranscriptReader for JsonlTranscriptReader {
    fn read_all(&self) -> Result<TranscriptSnapshot, StoreError> {
        let text = std::fs::read_to_string(&self.path)?;
        Self::parse(&text)
    }
}
