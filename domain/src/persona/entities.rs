//! Persona entity

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A scripted patron at the bar (Entity)
///
/// Identity is the `name`. Personas are created once at session start and
/// never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    name: String,
    /// Baseline eagerness to speak, in `[0, 1]`
    chattiness: f64,
    /// Eagerness to answer when named, in `[0, 1]`
    responsiveness: f64,
    pub backstory: String,
    pub personality_traits: Vec<String>,
    pub drink: String,
    pub speaking_style: String,
    /// Backend model to use instead of the configured default
    pub model_override: Option<String>,
}

impl Persona {
    /// Create a persona, validating the name and trait ranges.
    pub fn new(
        name: impl Into<String>,
        chattiness: f64,
        responsiveness: f64,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidPersona(
                "name cannot be empty".to_string(),
            ));
        }
        for (label, value) in [("chattiness", chattiness), ("responsiveness", responsiveness)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::InvalidPersona(format!(
                    "{}: {} must be within [0, 1], got {}",
                    name, label, value
                )));
            }
        }
        Ok(Self {
            name,
            chattiness,
            responsiveness,
            backstory: String::new(),
            personality_traits: Vec::new(),
            drink: "Beer".to_string(),
            speaking_style: String::new(),
            model_override: None,
        })
    }

    pub fn with_backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into().trim().to_string();
        self
    }

    pub fn with_traits(mut self, traits: Vec<String>) -> Self {
        self.personality_traits = traits;
        self
    }

    pub fn with_drink(mut self, drink: impl Into<String>) -> Self {
        self.drink = drink.into();
        self
    }

    pub fn with_speaking_style(mut self, style: impl Into<String>) -> Self {
        self.speaking_style = style.into();
        self
    }

    pub fn with_model_override(mut self, model: Option<String>) -> Self {
        self.model_override = model.filter(|m| !m.trim().is_empty());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chattiness(&self) -> f64 {
        self.chattiness
    }

    pub fn responsiveness(&self) -> f64 {
        self.responsiveness
    }

    /// Case-insensitive check whether `text` mentions this persona by name.
    ///
    /// Plain substring matching: "Al" also matches "also". Callers accept
    /// such false positives.
    pub fn is_named_in(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.name.to_lowercase())
    }
}
