//! Speaker scheduling.
//!
//! The [`scheduler::Scheduler`] picks who talks next. It first honors direct
//! addressing ("hey Rosa, ...") unless two personas have been ping-ponging,
//! and otherwise falls back to a weighted score over everyone outside their
//! cooldown window.
//!
//! - [`settings::SchedulerSettings`] — weights, cooldown and silence tuning
//! - [`state::SchedulerState`] — per-persona timing and the pair-history ring
//! - [`scheduler::Selection`] — the chosen persona and why

pub mod scheduler;
pub mod settings;
pub mod state;
