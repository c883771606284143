//! Console display of the running bar

use crate::config::ConsoleConfig;
use chrono::Local;
use colored::{Color, Colorize};
use divebar_application::{BarObserver, BarStats, PersonaStatus};
use divebar_domain::{BARTENDER, DiversityAssessment, STRANGER, Utterance};
use std::collections::HashMap;
use std::io::{IsTerminal, Write};
use std::sync::Mutex;
use tracing::debug;

/// Colors assigned to personas in order of first appearance
const PERSONA_COLORS: [Color; 8] = [
    Color::BrightCyan,
    Color::BrightMagenta,
    Color::BrightYellow,
    Color::BrightGreen,
    Color::BrightRed,
    Color::BrightBlue,
    Color::TrueColor {
        r: 255,
        g: 175,
        b: 0,
    },
    Color::TrueColor {
        r: 218,
        g: 112,
        b: 214,
    },
];

/// Erase the current terminal line
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Prints committed lines and bar notices to stdout.
///
/// Lines are written whole, so the conversation stays readable while
/// operator commands are typed underneath.
pub struct ConsoleObserver {
    config: ConsoleConfig,
    colors: Mutex<HashMap<String, Color>>,
    last_speed: Mutex<Option<f64>>,
    interactive: bool,
}

impl ConsoleObserver {
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            config,
            colors: Mutex::new(HashMap::new()),
            last_speed: Mutex::new(None),
            interactive: std::io::stdout().is_terminal(),
        }
    }

    /// Color for `speaker`, assigning the next palette entry on first use.
    fn color_for(&self, speaker: &str) -> Color {
        match speaker {
            BARTENDER => Color::Yellow,
            STRANGER => Color::White,
            _ => {
                let Ok(mut colors) = self.colors.lock() else {
                    return Color::White;
                };
                let next = PERSONA_COLORS[colors.len() % PERSONA_COLORS.len()];
                *colors.entry(speaker.to_string()).or_insert(next)
            }
        }
    }

    pub fn format_utterance(&self, utterance: &Utterance) -> String {
        let mut line = String::new();
        if self.config.show_timestamps {
            let local = utterance.timestamp().with_timezone(&Local);
            line.push_str(&format!("[{}] ", local.format("%H:%M:%S")).dimmed().to_string());
        }
        let name = format!("{}:", utterance.speaker())
            .color(self.color_for(utterance.speaker()))
            .bold();
        line.push_str(&format!("{} {}", name, utterance.content()));
        line
    }

    pub fn format_notice(message: &str) -> String {
        format!("* {} *", message).dimmed().italic().to_string()
    }

    pub fn format_topic(persona: &str, topic: &str) -> String {
        Self::format_notice(&format!("{} changes the subject: {}", persona, topic))
    }

    pub fn format_speed(speed: f64) -> String {
        Self::format_notice(&format!("Speed {:.2}x", speed))
    }

    fn emit(&self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        if self.interactive {
            let _ = write!(stdout, "{}", CLEAR_LINE);
        }
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }
}

impl BarObserver for ConsoleObserver {
    fn on_utterance(&self, utterance: &Utterance) {
        self.emit(&self.format_utterance(utterance));
    }

    fn on_status(&self, persona: &str, status: PersonaStatus) {
        if !self.interactive {
            return;
        }
        // Transient indicator, replaced by the next line written
        let mut stdout = std::io::stdout().lock();
        let _ = match status {
            PersonaStatus::Thinking => write!(
                stdout,
                "{}{}",
                CLEAR_LINE,
                format!("{} is thinking...", persona).dimmed()
            ),
            PersonaStatus::Idle => write!(stdout, "{}", CLEAR_LINE),
        };
        let _ = stdout.flush();
    }

    fn on_topic(&self, persona: &str, topic: &str) {
        self.emit(&Self::format_topic(persona, topic));
    }

    fn on_regeneration(&self, persona: &str, attempt: u32, assessment: &DiversityAssessment) {
        debug!(
            persona,
            attempt,
            score = assessment.score,
            problems = ?assessment.problems,
            "Rephrase requested"
        );
    }

    fn on_notice(&self, message: &str) {
        self.emit(&Self::format_notice(message));
    }

    fn on_stats(&self, stats: &BarStats) {
        let Ok(mut last) = self.last_speed.lock() else {
            return;
        };
        let changed = last.is_some_and(|previous| previous != stats.speed);
        *last = Some(stats.speed);
        drop(last);
        if changed {
            self.emit(&Self::format_speed(stats.speed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn plain() -> ConsoleObserver {
        colored::control::set_override(false);
        ConsoleObserver::new(ConsoleConfig {
            show_timestamps: false,
            color: false,
        })
    }

    #[test]
    fn test_utterance_line() {
        let observer = plain();
        let utterance = Utterance::new("Mike", "Another round.", 3, Utc::now());
        assert_eq!(observer.format_utterance(&utterance), "Mike: Another round.");
    }

    #[test]
    fn test_timestamp_prefix() {
        colored::control::set_override(false);
        let observer = ConsoleObserver::new(ConsoleConfig::default());
        let utterance = Utterance::new("Rosa", "Evening.", 1, Utc::now());
        let line = observer.format_utterance(&utterance);
        assert!(line.starts_with('['));
        assert!(line.ends_with("] Rosa: Evening."));
    }

    #[test]
    fn test_colors_assigned_in_order_of_appearance() {
        let observer = plain();
        assert_eq!(observer.color_for("Mike"), PERSONA_COLORS[0]);
        assert_eq!(observer.color_for("Rosa"), PERSONA_COLORS[1]);
        assert_eq!(observer.color_for("Mike"), PERSONA_COLORS[0]);
        assert_eq!(observer.color_for(BARTENDER), Color::Yellow);
        assert_eq!(observer.color_for("Dave"), PERSONA_COLORS[2]);
    }

    #[test]
    fn test_notice_formats() {
        colored::control::set_override(false);
        assert_eq!(ConsoleObserver::format_notice("Paused."), "* Paused. *");
        assert_eq!(
            ConsoleObserver::format_topic("Rosa", "landlords"),
            "* Rosa changes the subject: landlords *"
        );
        assert_eq!(ConsoleObserver::format_speed(1.5), "* Speed 1.50x *");
    }
}
