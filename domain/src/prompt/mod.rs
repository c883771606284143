//! Prompt domain
//!
//! Templates that turn personas and history into backend prompts.
//!
//! - [`persona::PersonaPromptTemplate`] — per-persona turn, topic and rephrase prompts
//! - [`template::BarPromptTemplate`] — house prompts (the bartender's opener)

pub mod persona;
mod template;

pub use persona::{MAX_SCRIPT_LINES, PersonaPromptTemplate, estimate_tokens, turn_stop_sequences};
pub use template::{BarPromptTemplate, FALLBACK_OPENER, OPENER_CATEGORIES};
