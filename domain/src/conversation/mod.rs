//! Conversation domain.
//!
//! - [`entities::Utterance`] — one committed line of dialogue
//! - [`history::ConversationHistory`] — append-only log of utterances
//! - [`cleanup::clean_response`] — normalizes raw backend text into a single spoken line

pub mod cleanup;
pub mod entities;
pub mod history;
