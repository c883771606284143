//! Bar configuration from TOML (`[bar]` section)

use divebar_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw bar configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBarConfig {
    /// Name used in persona prompts and the session header
    pub name: String,
    /// Roster cap; personas beyond this are ignored in file order
    pub max_agents: usize,
    /// Seconds between ticks at 1x speed
    pub tick_interval: f64,
    /// Continuation turns before the subject rotates (0 = every turn)
    pub max_subject_chat: u32,
}

impl Default for FileBarConfig {
    fn default() -> Self {
        Self {
            name: "The Rusty Nail".to_string(),
            max_agents: 5,
            tick_interval: 2.0,
            max_subject_chat: 3,
        }
    }
}

impl FileBarConfig {
    /// Tick interval as a [`Duration`], or an issue when it is not positive.
    pub fn tick_duration(&self) -> (Option<Duration>, Option<ConfigIssue>) {
        match Duration::try_from_secs_f64(self.tick_interval) {
            Ok(d) if !d.is_zero() => (Some(d), None),
            _ => (
                None,
                Some(ConfigIssue::error(
                    ConfigIssueCode::OutOfRange {
                        field: "bar.tick_interval".to_string(),
                    },
                    format!(
                        "bar.tick_interval: {} must be a positive number of seconds",
                        self.tick_interval
                    ),
                )),
            ),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.tick_duration().1);
        if self.max_agents == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "bar.max_agents".to_string(),
                },
                "bar.max_agents must be at least 1",
            ));
        }
        if self.name.trim().is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::EmptyField {
                    field: "bar.name".to_string(),
                },
                "bar.name is empty; prompts will name no bar",
            ));
        }
        issues
    }
}
