//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for dive-bar
#[derive(Parser, Debug)]
#[command(name = "dive-bar")]
#[command(author, version, about = "A dive bar full of LLM regulars talking over each other")]
#[command(long_about = r#"
Dive Bar seats a roster of personas at one bar and lets them talk.

Each tick a scheduler picks who speaks next (whoever was named, or the
most eager regular), the line is generated by a text backend, and
repetitive lines are sent back for a rephrase before they are committed.

While the bar is open, type into the terminal:
  /pause  /resume  /p    pause, resume or toggle the conversation
  +  -                   speed up or slow down
  /quit  /q              last call
  anything else          say it as "A stranger"

Configuration files are loaded from (in priority order):
1. DIVEBAR_* env vars    e.g. DIVEBAR_BAR__TICK_INTERVAL=1.5
2. --config <path>       Explicit config file
3. ./dive-bar.toml       Project-level config
4. ~/.config/dive-bar/config.toml   Global config

Personas are read from ./agents.toml ([[agent]] tables) unless --agents is given.

Example:
  dive-bar --agents regulars.toml
  dive-bar analyze --session 3f2a
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Path to the persona roster
    #[arg(long, value_name = "PATH")]
    pub agents: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write diagnostic logs to stderr instead of the log directory
    #[arg(long, global = true)]
    pub log_stderr: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Initial speed multiplier (0.25 - 4.0)
    #[arg(long, value_name = "X")]
    pub speed: Option<f64>,

    /// Seed for speaker selection and opener choice
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report repetition and activity in a recorded transcript
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Transcript to read (defaults to storage.transcript_path)
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Only include sessions whose id starts with this prefix
    #[arg(long, value_name = "ID")]
    pub session: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::parse_from([
            "dive-bar", "--agents", "regulars.toml", "-vv", "--speed", "2", "--seed", "7",
        ]);
        assert!(cli.command.is_none());
        assert_eq!(cli.agents, Some(PathBuf::from("regulars.toml")));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.speed, Some(2.0));
        assert_eq!(cli.seed, Some(7));
    }

    #[test]
    fn test_analyze_subcommand() {
        let cli = Cli::parse_from(["dive-bar", "analyze", "--session", "3f2a", "--json", "-v"]);
        let Some(Command::Analyze(args)) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.session.as_deref(), Some("3f2a"));
        assert!(args.json);
        assert!(args.transcript.is_none());
        assert_eq!(cli.verbose, 1);
    }
}
