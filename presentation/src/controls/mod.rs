//! Operator controls read from stdin
//!
//! | Input | Command |
//! |-------|---------|
//! | `/pause` | [`BarCommand::Pause`] |
//! | `/resume` | [`BarCommand::Resume`] |
//! | `/p` | [`BarCommand::TogglePause`] |
//! | `+` | [`BarCommand::SpeedUp`] |
//! | `-` | [`BarCommand::SpeedDown`] |
//! | `/quit`, `/q` | [`BarCommand::Quit`] |
//! | anything else | [`BarCommand::Stranger`] |

use divebar_application::BarCommand;
use std::io::BufRead;
use tokio::sync::mpsc;
use tracing::debug;

/// Map one input line to a command; blank lines map to nothing.
pub fn parse_control_line(line: &str) -> Option<BarCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let command = match line.to_lowercase().as_str() {
        "/pause" => BarCommand::Pause,
        "/resume" => BarCommand::Resume,
        "/p" => BarCommand::TogglePause,
        "+" => BarCommand::SpeedUp,
        "-" => BarCommand::SpeedDown,
        "/quit" | "/q" => BarCommand::Quit,
        _ => BarCommand::Stranger(line.to_string()),
    };
    Some(command)
}

/// Forward stdin lines as commands until EOF or the receiver closes.
///
/// Runs on a plain thread: a blocking stdin read must not keep the async
/// runtime from shutting down after last call.
pub fn spawn_stdin_controls(commands: mpsc::Sender<BarCommand>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let Some(command) = parse_control_line(&line) else {
                continue;
            };
            if commands.blocking_send(command).is_err() {
                break;
            }
        }
        debug!("Stdin controls closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_words() {
        assert_eq!(parse_control_line("/pause"), Some(BarCommand::Pause));
        assert_eq!(parse_control_line("/resume"), Some(BarCommand::Resume));
        assert_eq!(parse_control_line(" /P "), Some(BarCommand::TogglePause));
        assert_eq!(parse_control_line("+"), Some(BarCommand::SpeedUp));
        assert_eq!(parse_control_line("-"), Some(BarCommand::SpeedDown));
        assert_eq!(parse_control_line("/quit"), Some(BarCommand::Quit));
        assert_eq!(parse_control_line("/q"), Some(BarCommand::Quit));
    }

    #[test]
    fn test_other_lines_are_stranger_messages() {
        assert_eq!(
            parse_control_line("  Who ordered the pickled eggs?  "),
            Some(BarCommand::Stranger("Who ordered the pickled eggs?".to_string()))
        );
        assert_eq!(
            parse_control_line("/dance"),
            Some(BarCommand::Stranger("/dance".to_string()))
        );
    }

    #[test]
    fn test_blank_lines_ignored() {
        assert_eq!(parse_control_line(""), None);
        assert_eq!(parse_control_line("   \t"), None);
    }
}
