//! Presentation layer for dive-bar
//!
//! This crate contains CLI definitions, the console observer that prints
//! the conversation, stdin operator controls, and the analysis report
//! formatter.

pub mod cli;
pub mod config;
pub mod controls;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{AnalyzeArgs, Cli, Command};
pub use config::ConsoleConfig;
pub use controls::{parse_control_line, spawn_stdin_controls};
pub use output::console::ConsoleObserver;
pub use output::report::ReportFormatter;
