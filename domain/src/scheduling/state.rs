//! Mutable scheduling state

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

/// Timing and turn bookkeeping owned by the scheduler.
///
/// Only [`Scheduler::record_spoke`](super::scheduler::Scheduler::record_spoke)
/// mutates the speaking records; the pause flag is toggled by the operator.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    pub(crate) last_spoke: HashMap<String, Instant>,
    pub(crate) last_spoke_turn: HashMap<String, u64>,
    /// `(responded_to, speaker)` pairs, oldest first
    pub(crate) pair_history: VecDeque<(String, String)>,
    pub(crate) turn_number: u64,
    pub(crate) paused: bool,
}

impl SchedulerState {
    pub fn last_spoke(&self, name: &str) -> Option<Instant> {
        self.last_spoke.get(name).copied()
    }

    pub fn last_spoke_turn(&self, name: &str) -> Option<u64> {
        self.last_spoke_turn.get(name).copied()
    }

    pub fn pair_history(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pair_history
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }

    pub fn pair_history_len(&self) -> usize {
        self.pair_history.len()
    }

    /// Number of turn attempts recorded so far.
    pub fn turn_number(&self) -> u64 {
        self.turn_number
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Turns elapsed since `name` last spoke. Personas that never spoke
    /// count from turn zero.
    pub fn turns_since_spoke(&self, name: &str) -> u64 {
        let last = self.last_spoke_turn(name).unwrap_or(0);
        self.turn_number.saturating_sub(last)
    }
}
