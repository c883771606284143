//! JSONL file writer for transcript events.
//!
//! Each event is serialized as a single JSON line with a `type` field and
//! `timestamp`, appended to the file via a buffered writer. Sessions from
//! earlier runs stay in the file; every record carries its `session_id`.

use divebar_application::{
    RegenerationEntry, SessionStart, StoreError, TranscriptStore, UtteranceEntry,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Event type tags written to the `type` field
pub(crate) mod event_type {
    pub const SESSION_START: &str = "session_start";
    pub const UTTERANCE: &str = "utterance";
    pub const REGENERATION: &str = "regeneration";
    pub const SESSION_END: &str = "session_end";
}

/// JSONL transcript store that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record
/// and on `Drop`.
pub struct JsonlTranscriptStore {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTranscriptStore {
    /// Open (or create) the transcript at `path` for appending.
    ///
    /// Creates parent directories if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        debug!(path = %path.display(), "Opened transcript");

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the transcript file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_event(
        &self,
        event_type: &str,
        session_id: &str,
        payload: impl Serialize,
    ) -> Result<(), StoreError> {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        // Build the record: merge payload with type + timestamp + session
        let mut map = match serde_json::to_value(payload) {
            Ok(Value::Object(map)) => map,
            Ok(Value::Null) => Map::new(),
            Ok(other) => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
            Err(e) => return Err(StoreError::Serialization(e.to_string())),
        };
        map.insert("type".to_string(), Value::String(event_type.to_string()));
        map.insert("timestamp".to_string(), Value::String(timestamp));
        map.insert(
            "session_id".to_string(),
            Value::String(session_id.to_string()),
        );

        let line = serde_json::to_string(&Value::Object(map))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::Serialization("transcript writer poisoned".to_string()))?;
        writeln!(writer, "{}", line)?;
        // JSONL is append-only; flush each record so a crash loses at most one line
        writer.flush()?;
        Ok(())
    }
}

impl TranscriptStore for JsonlTranscriptStore {
    fn start_session(&self, session: &SessionStart) -> Result<String, StoreError> {
        let session_id = Uuid::new_v4().to_string();
        self.write_event(event_type::SESSION_START, &session_id, session)?;
        Ok(session_id)
    }

    fn log_utterance(&self, session_id: &str, entry: &UtteranceEntry) -> Result<(), StoreError> {
        self.write_event(event_type::UTTERANCE, session_id, entry)
    }

    fn log_regeneration(
        &self,
        session_id: &str,
        entry: &RegenerationEntry,
    ) -> Result<(), StoreError> {
        self.write_event(event_type::REGENERATION, session_id, entry)
    }

    fn end_session(&self, session_id: &str) -> Result<(), StoreError> {
        self.write_event(event_type::SESSION_END, session_id, ())
    }
}

impl Drop for JsonlTranscriptStore {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_session_lifecycle_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("bar.jsonl");
        let store = JsonlTranscriptStore::open(&path).unwrap();

        let session_id = store
            .start_session(&SessionStart {
                bar_name: "The Rusty Nail".to_string(),
                agent_count: 3,
                config_hash: "0123456789abcdef".to_string(),
            })
            .unwrap();
        assert!(Uuid::parse_str(&session_id).is_ok());

        let mut entry = UtteranceEntry::plain(1, "Mike", "Another round.");
        entry.tokens_prompt = Some(120);
        entry.score = Some(0.82);
        entry.selection_reason = Some("addressed".to_string());
        store.log_utterance(&session_id, &entry).unwrap();
        store
            .log_regeneration(
                &session_id,
                &RegenerationEntry {
                    turn_number: 2,
                    speaker: "Rosa".to_string(),
                    attempt_count: 2,
                },
            )
            .unwrap();
        store.end_session(&session_id).unwrap();
        drop(store);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 4);
        for line in &lines {
            assert_eq!(line["session_id"], session_id.as_str());
            assert!(line["timestamp"].is_string());
        }
        assert_eq!(lines[0]["type"], "session_start");
        assert_eq!(lines[0]["agent_count"], 3);
        assert_eq!(lines[0]["config_hash"], "0123456789abcdef");
        assert_eq!(lines[1]["type"], "utterance");
        assert_eq!(lines[1]["speaker"], "Mike");
        assert_eq!(lines[1]["tokens_prompt"], 120);
        assert!(lines[1]["tokens_completion"].is_null());
        assert_eq!(lines[1]["selection_reason"], "addressed");
        assert_eq!(lines[2]["type"], "regeneration");
        assert_eq!(lines[2]["attempt_count"], 2);
        assert_eq!(lines[3]["type"], "session_end");
    }

    #[test]
    fn test_reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bar.jsonl");
        let start = SessionStart {
            bar_name: "Joe's".to_string(),
            agent_count: 2,
            config_hash: String::new(),
        };

        let first = JsonlTranscriptStore::open(&path).unwrap();
        let a = first.start_session(&start).unwrap();
        drop(first);
        let second = JsonlTranscriptStore::open(&path).unwrap();
        let b = second.start_session(&start).unwrap();
        drop(second);

        assert_ne!(a, b);
        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_open_fails_on_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = JsonlTranscriptStore::open(dir.path());
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
