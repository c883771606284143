//! Append-only conversation history

use super::entities::Utterance;
use crate::core::error::DomainError;
use chrono::{DateTime, Utc};

/// Ordered log of committed utterances
///
/// Insertion order is conversational order. Entries are never reordered or
/// removed; the only mutation is [`append`](Self::append), which assigns the
/// next turn number so committed turns are strictly increasing without gaps.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    utterances: Vec<Utterance>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn number the next appended utterance will receive.
    pub fn next_turn_number(&self) -> u64 {
        self.utterances
            .last()
            .map(|u| u.turn_number() + 1)
            .unwrap_or(0)
    }

    /// Commit a new utterance and return it.
    ///
    /// Empty or whitespace-only content is rejected; callers treat that as a
    /// no-op turn rather than an error.
    pub fn append(
        &mut self,
        speaker: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<&Utterance, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::EmptyUtterance);
        }
        let turn = self.next_turn_number();
        self.utterances
            .push(Utterance::new(speaker, content, turn, timestamp));
        Ok(&self.utterances[self.utterances.len() - 1])
    }

    pub fn last(&self) -> Option<&Utterance> {
        self.utterances.last()
    }

    /// The trailing `n` utterances (fewer if the history is shorter).
    pub fn recent(&self, n: usize) -> &[Utterance] {
        let start = self.utterances.len().saturating_sub(n);
        &self.utterances[start..]
    }

    pub fn as_slice(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn iter(&self) -> impl Iterator<Item = &Utterance> {
        self.utterances.iter()
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }
}
