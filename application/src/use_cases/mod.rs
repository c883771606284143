//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod analyze_transcript;
pub mod turn_controller;
