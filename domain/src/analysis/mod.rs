//! Transcript analysis
//!
//! Offline reports over persisted sessions, focused on spotting echo and
//! repetition problems across personas.

pub mod records;
pub mod report;

pub use records::{RegenerationRecord, SessionRecord, TranscriptSnapshot, UtteranceRecord};
pub use report::{
    AnalysisReport, DuplicateLine, EchoPhrase, RegenerationStats, RepeatedOpener, SpeakerStats,
    StaleStretch, TranscriptSummary, WordCount,
};
