//! Topic rotation
//!
//! Counts continuation turns and says when the next turn should pivot to a
//! fresh subject. Recent topics are remembered so the topic prompt can ask
//! for something new.

use std::collections::VecDeque;

/// Topics remembered for de-duplication.
const RECENT_TOPICS: usize = 5;

#[derive(Debug, Clone)]
pub struct TopicRotation {
    max_subject_chat: u32,
    subject_count: u32,
    recent: VecDeque<String>,
}

impl TopicRotation {
    /// `max_subject_chat` of 0 changes the subject on every turn.
    pub fn new(max_subject_chat: u32) -> Self {
        Self {
            max_subject_chat,
            subject_count: 0,
            recent: VecDeque::with_capacity(RECENT_TOPICS + 1),
        }
    }

    /// Count one turn; `true` when this turn should change the subject.
    ///
    /// The rotating turn resets the counter instead of incrementing it.
    pub fn advance(&mut self) -> bool {
        if self.subject_count >= self.max_subject_chat {
            self.subject_count = 0;
            true
        } else {
            self.subject_count += 1;
            false
        }
    }

    pub fn recent(&self) -> Vec<String> {
        self.recent.iter().cloned().collect()
    }

    /// Remember a generated topic unless it was used recently.
    pub fn remember(&mut self, topic: &str) {
        let known = self
            .recent
            .iter()
            .any(|t| t.eq_ignore_ascii_case(topic));
        if known || topic.is_empty() {
            return;
        }
        self.recent.push_back(topic.to_string());
        if self.recent.len() > RECENT_TOPICS {
            self.recent.pop_front();
        }
    }
}
