//! Application layer for dive-bar
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::BarSettings;
pub use ports::{
    bar_observer::{BarObserver, BarStats, NoObserver, PersonaStatus},
    inference_gateway::{GatewayError, InferenceGateway},
    transcript_store::{
        NoTranscript, RegenerationEntry, SessionStart, StoreError, TranscriptReader,
        TranscriptStore, UtteranceEntry,
    },
};
pub use use_cases::analyze_transcript::{
    AnalyzeTranscriptError, AnalyzeTranscriptInput, AnalyzeTranscriptUseCase,
};
pub use use_cases::turn_controller::{
    BarCommand, InferenceLane, SpeedMultiplier, TickOutcome, TurnController, TurnError,
};
