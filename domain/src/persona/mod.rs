//! Persona domain.
//!
//! - [`entities::Persona`] — a scripted bar patron with speaking traits
//! - [`roster::Roster`] — the ordered, uniquely-named set of personas in a session

pub mod entities;
pub mod roster;
