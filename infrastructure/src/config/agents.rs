//! Persona roster from TOML (`agents.toml`)
//!
//! ```toml
//! [[agent]]
//! name = "Mike"
//! backstory = "Retired longshoreman."
//! personality_traits = ["gruff", "loyal"]
//! chattiness = 0.7
//! responsiveness = 0.4
//! drink = "Rye, neat"
//! ```

use super::error::ConfigError;
use divebar_domain::core::validation::check_unit_interval;
use divebar_domain::{ConfigIssue, ConfigIssueCode, DomainError, Persona, Roster};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default location of the roster file, relative to the working directory.
pub const DEFAULT_AGENTS_PATH: &str = "agents.toml";

/// One `[[agent]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePersonaConfig {
    pub name: String,
    pub backstory: String,
    pub personality_traits: Vec<String>,
    pub chattiness: f64,
    pub responsiveness: f64,
    pub drink: String,
    pub speaking_style: String,
    pub model_override: Option<String>,
}

impl Default for FilePersonaConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            backstory: String::new(),
            personality_traits: Vec::new(),
            chattiness: 0.5,
            responsiveness: 0.5,
            drink: "Beer".to_string(),
            speaking_style: String::new(),
            model_override: None,
        }
    }
}

impl FilePersonaConfig {
    pub fn to_persona(&self) -> Result<Persona, DomainError> {
        Ok(Persona::new(&self.name, self.chattiness, self.responsiveness)?
            .with_backstory(&self.backstory)
            .with_traits(self.personality_traits.clone())
            .with_drink(&self.drink)
            .with_speaking_style(&self.speaking_style)
            .with_model_override(self.model_override.clone()))
    }
}

/// Raw roster file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentsConfig {
    pub agent: Vec<FilePersonaConfig>,
}

impl FileAgentsConfig {
    /// Read and parse a roster file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the roster, returning all detected issues.
    pub fn validate(&self, max_agents: usize) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.agent.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyRoster,
                "no [[agent]] entries configured",
            ));
            return issues;
        }

        let mut seen = HashSet::new();
        for (index, agent) in self.agent.iter().enumerate() {
            let name = agent.name.trim();
            if name.is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyField {
                        field: format!("agent[{}].name", index),
                    },
                    format!("agent[{}].name cannot be empty", index),
                ));
                continue;
            }
            if !seen.insert(name.to_lowercase()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicatePersona {
                        name: name.to_string(),
                    },
                    format!("duplicate agent name '{}'", name),
                ));
            }
            let prefix = format!("agent.{}", name);
            issues.extend(check_unit_interval(
                &format!("{}.chattiness", prefix),
                agent.chattiness,
            ));
            issues.extend(check_unit_interval(
                &format!("{}.responsiveness", prefix),
                agent.responsiveness,
            ));
        }

        if self.agent.len() > max_agents {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "bar.max_agents".to_string(),
                },
                format!(
                    "{} agents configured but bar.max_agents is {}; only the first {} will join",
                    self.agent.len(),
                    max_agents,
                    max_agents
                ),
            ));
        }

        issues
    }

    /// Build the session roster from the first `max_agents` entries.
    pub fn to_roster(&self, max_agents: usize) -> Result<Roster, DomainError> {
        let personas = self
            .agent
            .iter()
            .map(FilePersonaConfig::to_persona)
            .collect::<Result<Vec<_>, _>>()?;
        Roster::with_limit(personas, max_agents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ROSTER: &str = r#"
[[agent]]
name = "Mike"
backstory = """
  Retired longshoreman.
"""
personality_traits = ["gruff", "loyal"]
chattiness = 0.7
responsiveness = 0.4
drink = "Rye, neat"

[[agent]]
name = "Rosa"
speaking_style = "dry"
model_override = "small-model"

[[agent]]
name = "Dave"
"#;

    #[test]
    fn test_deserialize_roster_with_defaults() {
        let config: FileAgentsConfig = toml::from_str(ROSTER).unwrap();
        assert_eq!(config.agent.len(), 3);
        assert_eq!(config.agent[1].chattiness, 0.5);
        assert_eq!(config.agent[2].drink, "Beer");
        assert!(config.validate(5).is_empty());

        let roster = config.to_roster(5).unwrap();
        let mike = roster.get("Mike").unwrap();
        assert_eq!(mike.backstory, "Retired longshoreman.");
        assert_eq!(mike.chattiness(), 0.7);
        assert_eq!(
            roster.get("Rosa").unwrap().model_override.as_deref(),
            Some("small-model")
        );
    }

    #[test]
    fn test_roster_capped_in_file_order() {
        let config: FileAgentsConfig = toml::from_str(ROSTER).unwrap();
        let issues = config.validate(2);
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());

        let roster = config.to_roster(2).unwrap();
        let names: Vec<&str> = roster.names().collect();
        assert_eq!(names, vec!["Mike", "Rosa"]);
    }

    #[test]
    fn test_empty_roster_is_an_error() {
        let config = FileAgentsConfig::default();
        let issues = config.validate(5);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::EmptyRoster);
        assert!(config.to_roster(5).is_err());
    }

    #[test]
    fn test_duplicates_and_ranges_reported_together() {
        let config: FileAgentsConfig = toml::from_str(
            r#"
[[agent]]
name = "Mike"

[[agent]]
name = "mike"
chattiness = 1.5

[[agent]]
name = "  "
"#,
        )
        .unwrap();
        let issues = config.validate(5);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(ConfigIssue::is_error));
        assert!(issues.iter().any(|i| matches!(
            &i.code,
            ConfigIssueCode::DuplicatePersona { name } if name == "mike"
        )));
        assert!(issues.iter().any(|i| matches!(
            &i.code,
            ConfigIssueCode::OutOfRange { field } if field == "agent.mike.chattiness"
        )));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ROSTER.as_bytes()).unwrap();
        let config = FileAgentsConfig::load(file.path()).unwrap();
        assert_eq!(config.agent.len(), 3);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("agents.toml");
        let error = FileAgentsConfig::load(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Read { .. }));
    }
}
