//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("No personas configured for the bar")]
    NoPersonas,

    #[error("Duplicate persona name: {0}")]
    DuplicatePersona(String),

    #[error("Invalid persona: {0}")]
    InvalidPersona(String),

    #[error("Utterance content cannot be empty")]
    EmptyUtterance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_persona_display() {
        let error = DomainError::DuplicatePersona("Mike".to_string());
        assert_eq!(error.to_string(), "Duplicate persona name: Mike");
    }
}
