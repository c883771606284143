//! Application-level configuration.
//!
//! - [`BarSettings`] — orchestration loop control (tick interval, topic
//!   rotation, generation and diversity parameters)

pub mod bar_settings;

pub use bar_settings::BarSettings;
