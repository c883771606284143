//! Diversity scoring for candidate utterances.
//!
//! A candidate is compared with a trailing window of history on three
//! independent signals, aggregated by fixed weights:
//!
//! | Signal | Weight | Pass condition |
//! |--------|--------|----------------|
//! | Cross-turn n-gram overlap | 0.50 | overlap ratio ≤ 0.30 |
//! | Formulaic opener (same speaker) | 0.25 | opener used < 2 times |
//! | Structural similarity (same speaker) | 0.25 | similarity ≤ 0.7 |
//!
//! The scorer is a pure function: it never mutates history and builds a
//! fresh [`assessment::DiversityAssessment`] per call.

pub mod assessment;
pub mod scorer;
pub mod settings;
pub mod text;
