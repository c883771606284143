//! Analyze Transcript use case
//!
//! Reads a persisted transcript and reduces it to an [`AnalysisReport`].

use crate::ports::transcript_store::{StoreError, TranscriptReader};
use divebar_domain::AnalysisReport;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during analysis
#[derive(Error, Debug)]
pub enum AnalyzeTranscriptError {
    #[error("Failed to read transcript: {0}")]
    Store(#[from] StoreError),

    #[error("No session matches '{0}'")]
    NoMatchingSession(String),
}

/// Input for the AnalyzeTranscript use case
#[derive(Debug, Clone, Default)]
pub struct AnalyzeTranscriptInput {
    /// Restrict to sessions whose id starts with this prefix
    pub session_prefix: Option<String>,
}

impl AnalyzeTranscriptInput {
    pub fn for_session(prefix: impl Into<String>) -> Self {
        Self {
            session_prefix: Some(prefix.into()),
        }
    }
}

/// Use case for analyzing a transcript
pub struct AnalyzeTranscriptUseCase {
    reader: Arc<dyn TranscriptReader>,
}

impl AnalyzeTranscriptUseCase {
    pub fn new(reader: Arc<dyn TranscriptReader>) -> Self {
        Self { reader }
    }

    pub fn execute(
        &self,
        input: AnalyzeTranscriptInput,
    ) -> Result<AnalysisReport, AnalyzeTranscriptError> {
        let mut snapshot = self.reader.read_all()?;
        if let Some(prefix) = input.session_prefix {
            snapshot = snapshot.filter_session(&prefix);
            if snapshot.is_empty() {
                return Err(AnalyzeTranscriptError::NoMatchingSession(prefix));
            }
        }
        info!(
            sessions = snapshot.sessions.len(),
            utterances = snapshot.utterances.len(),
            "Analyzing transcript"
        );
        Ok(AnalysisReport::build(&snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use divebar_domain::{TranscriptSnapshot, UtteranceRecord};

    struct FixedReader(TranscriptSnapshot);

    impl TranscriptReader for FixedReader {
        fn read_all(&self) -> Result<TranscriptSnapshot, StoreError> {
            Ok(self.0.clone())
        }
    }

    fn snapshot() -> TranscriptSnapshot {
        let utterance = |session: &str, speaker: &str, content: &str| UtteranceRecord {
            session_id: session.to_string(),
            turn_number: 1,
            speaker: speaker.to_string(),
            content: content.to_string(),
            tokens_prompt: None,
            tokens_completion: None,
            generation_time_ms: None,
        };
        TranscriptSnapshot {
            sessions: Vec::new(),
            utterances: vec![
                utterance("aaa111", "Mike", "Another round."),
                utterance("aaa111", "Rosa", "Another round."),
                utterance("bbb222", "Dave", "Quiet tonight."),
            ],
            regenerations: Vec::new(),
        }
    }

    #[test]
    fn test_whole_transcript() {
        let use_case = AnalyzeTranscriptUseCase::new(Arc::new(FixedReader(snapshot())));
        let report = use_case.execute(AnalyzeTranscriptInput::default()).unwrap();
        assert_eq!(report.summary.utterances, 3);
        assert_eq!(report.duplicates.len(), 1);
    }

    #[test]
    fn test_session_prefix_filters() {
        let use_case = AnalyzeTranscriptUseCase::new(Arc::new(FixedReader(snapshot())));
        let report = use_case
            .execute(AnalyzeTranscriptInput::for_session("bbb"))
            .unwrap();
        assert_eq!(report.summary.utterances, 1);
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn test_unknown_session_is_an_error() {
        let use_case = AnalyzeTranscriptUseCase::new(Arc::new(FixedReader(snapshot())));
        let err = use_case
            .execute(AnalyzeTranscriptInput::for_session("zzz"))
            .unwrap_err();
        assert!(matches!(err, AnalyzeTranscriptError::NoMatchingSession(_)));
    }
}
