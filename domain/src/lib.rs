//! Domain layer for dive-bar
//!
//! This crate contains the core conversation logic, entities, and value
//! objects. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! ## Turn orchestration
//!
//! A roster of personas shares one conversation. Each tick the
//! [`Scheduler`] picks who speaks next, the persona's line is generated by an
//! opaque text backend, and the [`compute_diversity`] scorer decides whether
//! the line is fresh enough to commit to the [`ConversationHistory`].
//!
//! ## Analysis
//!
//! Persisted transcripts can be read back and reduced to an
//! [`AnalysisReport`] that surfaces echoes, repeated openers and duplicates.

pub mod analysis;
pub mod conversation;
pub mod core;
pub mod diversity;
pub mod generation;
pub mod persona;
pub mod prompt;
pub mod scheduling;

// Re-export commonly used types
pub use analysis::{
    AnalysisReport, RegenerationRecord, SessionRecord, TranscriptSnapshot, UtteranceRecord,
};
pub use conversation::{
    cleanup::clean_response,
    entities::{BARTENDER, STRANGER, Utterance},
    history::ConversationHistory,
};
pub use core::{
    error::DomainError,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use diversity::{
    assessment::DiversityAssessment, scorer::compute_diversity, settings::DiversitySettings,
};
pub use generation::{
    message::{ChatMessage, Role},
    params::GenerationParams,
    request::{GenerationOverrides, GenerationRequest},
    result::GenerationResult,
};
pub use persona::{entities::Persona, roster::Roster};
pub use prompt::{BarPromptTemplate, PersonaPromptTemplate, turn_stop_sequences};
pub use scheduling::{
    scheduler::{Scheduler, Selection, SelectionReason},
    settings::{SchedulerSettings, SelectionWeights},
    state::SchedulerState,
};
