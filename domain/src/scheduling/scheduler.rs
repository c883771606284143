//! Next-speaker selection

use super::settings::SchedulerSettings;
use super::state::SchedulerState;
use crate::conversation::entities::Utterance;
use crate::persona::entities::Persona;
use crate::persona::roster::Roster;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

/// Why a persona was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// Named in the previous utterance and picked deterministically
    Addressed,
    /// Highest weighted score among eligible personas
    Weighted,
}

impl SelectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionReason::Addressed => "addressed",
            SelectionReason::Weighted => "weighted",
        }
    }
}

impl std::fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful selection
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub persona: String,
    pub reason: SelectionReason,
    /// Weighted score of the chosen persona. Addressed picks are scored too,
    /// for the record, though the score did not decide them.
    pub score: f64,
}

/// Chooses the next speaker from the roster.
///
/// Owns its [`SchedulerState`] exclusively. All time-dependent operations
/// have an `_at` variant taking an explicit `now` so callers (and tests)
/// control the clock.
pub struct Scheduler {
    roster: Roster,
    settings: SchedulerSettings,
    state: SchedulerState,
    rng: StdRng,
}

impl Scheduler {
    pub fn new(roster: Roster, settings: SchedulerSettings) -> Self {
        Self::with_rng(roster, settings, StdRng::from_entropy())
    }

    /// Scheduler with a reproducible random term.
    pub fn with_seed(roster: Roster, settings: SchedulerSettings, seed: u64) -> Self {
        Self::with_rng(roster, settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(roster: Roster, settings: SchedulerSettings, rng: StdRng) -> Self {
        Self {
            roster,
            settings,
            state: SchedulerState::default(),
            rng,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
    }

    /// Number of turn attempts recorded so far.
    pub fn turn_number(&self) -> u64 {
        self.state.turn_number
    }

    /// Pick the next speaker, or `None` when paused or nobody is eligible.
    ///
    /// `None` is not an error: the caller retries on a later tick.
    pub fn select_next(&mut self, last: Option<&Utterance>) -> Option<Selection> {
        self.select_next_at(last, Instant::now())
    }

    pub fn select_next_at(&mut self, last: Option<&Utterance>, now: Instant) -> Option<Selection> {
        if self.state.paused {
            return None;
        }

        if let Some(last) = last
            && let Some(addressed) = self.find_addressed(last, now)
        {
            if !self.pair_locked(last.speaker(), &addressed)
                && let Some(score) = self.score_at(&addressed, Some(last), now)
            {
                return Some(Selection {
                    persona: addressed,
                    reason: SelectionReason::Addressed,
                    score,
                });
            }
        }

        let eligible: Vec<String> = self
            .roster
            .names()
            .filter(|name| !self.in_cooldown(name, now))
            .map(str::to_string)
            .collect();

        let mut best: Option<(String, f64)> = None;
        for name in eligible {
            let Some(score) = self.score_at(&name, last, now) else {
                continue;
            };
            // Equal scores resolve to the lexically smallest name.
            let better = match &best {
                None => true,
                Some((best_name, best_score)) => {
                    score > *best_score || (score == *best_score && name < *best_name)
                }
            };
            if better {
                best = Some((name, score));
            }
        }

        best.map(|(persona, score)| Selection {
            persona,
            reason: SelectionReason::Weighted,
            score,
        })
    }

    /// Record that `speaker` took a turn.
    ///
    /// Must be called once per turn attempt, including failed or empty
    /// generations, so an unlucky persona cannot block everyone else.
    pub fn record_spoke(&mut self, speaker: &str, responded_to: Option<&str>) {
        self.record_spoke_at(speaker, responded_to, Instant::now());
    }

    pub fn record_spoke_at(&mut self, speaker: &str, responded_to: Option<&str>, now: Instant) {
        self.state.last_spoke.insert(speaker.to_string(), now);
        self.state
            .last_spoke_turn
            .insert(speaker.to_string(), self.state.turn_number);
        self.state.turn_number += 1;

        if let Some(from) = responded_to {
            self.state
                .pair_history
                .push_back((from.to_string(), speaker.to_string()));
            if self.state.pair_history.len() > self.settings.pair_history_cap {
                let excess = self.state.pair_history.len() - self.settings.pair_history_keep;
                self.state.pair_history.drain(..excess);
            }
        }
    }

    /// Selection score for one persona, exposed for logging.
    ///
    /// Returns `None` for names outside the roster. Includes a fresh draw of
    /// the random term, so two calls rarely agree exactly.
    pub fn score(&mut self, name: &str, last: Option<&Utterance>) -> Option<f64> {
        self.score_at(name, last, Instant::now())
    }

    pub fn score_at(&mut self, name: &str, last: Option<&Utterance>, now: Instant) -> Option<f64> {
        let persona = self.roster.get(name)?;
        let weights = self.settings.weights;
        let time_factor = self.time_factor(name, now);
        let addressed_factor = Self::addressed_factor(persona, last);
        let chattiness = persona.chattiness();
        let silence_boost = self.silence_boost(name);
        let jitter: f64 = self.rng.r#gen();

        Some(
            weights.time * time_factor
                + weights.chattiness * chattiness
                + weights.addressed * addressed_factor
                + weights.random * jitter
                + silence_boost,
        )
    }

    /// Whether `name` spoke less than one cooldown ago.
    pub fn in_cooldown(&self, name: &str, now: Instant) -> bool {
        match self.state.last_spoke.get(name) {
            Some(last) => now.saturating_duration_since(*last) < self.settings.cooldown(),
            None => false,
        }
    }

    /// First eligible persona, in roster order, named in `last`.
    ///
    /// Skips the speaker and anyone in cooldown.
    fn find_addressed(&self, last: &Utterance, now: Instant) -> Option<String> {
        self.roster
            .iter()
            .filter(|p| p.name() != last.speaker())
            .filter(|p| !self.in_cooldown(p.name(), now))
            .find(|p| p.is_named_in(last.content()))
            .map(|p| p.name().to_string())
    }

    /// True when the last `max_pair_streak` pairs all involve exactly the
    /// dyad `{speaker, responder}`, in either direction.
    fn pair_locked(&self, speaker: &str, responder: &str) -> bool {
        let streak = self.settings.max_pair_streak;
        let history = &self.state.pair_history;
        if streak == 0 || history.len() < streak {
            return false;
        }
        let dyad: HashSet<&str> = [speaker, responder].into_iter().collect();
        history.iter().skip(history.len() - streak).all(|(from, to)| {
            let pair: HashSet<&str> = [from.as_str(), to.as_str()].into_iter().collect();
            pair == dyad
        })
    }

    fn time_factor(&self, name: &str, now: Instant) -> f64 {
        let Some(last) = self.state.last_spoke.get(name) else {
            return 1.0;
        };
        let cap = self.settings.time_cap.as_secs_f64();
        if cap <= 0.0 {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(*last).as_secs_f64();
        (elapsed / cap).min(1.0)
    }

    fn addressed_factor(persona: &Persona, last: Option<&Utterance>) -> f64 {
        match last {
            Some(last) if last.speaker() != persona.name() && persona.is_named_in(last.content()) => {
                persona.responsiveness()
            }
            _ => 0.0,
        }
    }

    fn silence_boost(&self, name: &str) -> f64 {
        if self.state.turns_since_spoke(name) >= self.settings.silence_threshold {
            self.settings.silence_boost
        } else {
            0.0
        }
    }
}
