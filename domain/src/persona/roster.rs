//! Roster of personas for a session

use super::entities::Persona;
use crate::core::error::DomainError;
use std::collections::HashSet;

/// Ordered set of personas with unique names (Value Object)
///
/// Order is the configuration order and is used wherever listing order
/// matters (display, stop sequences, addressing ties).
#[derive(Debug, Clone)]
pub struct Roster {
    personas: Vec<Persona>,
}

impl Roster {
    /// Build a roster, rejecting an empty list or duplicate names.
    ///
    /// Name uniqueness is case-insensitive because addressing detection is.
    pub fn new(personas: Vec<Persona>) -> Result<Self, DomainError> {
        if personas.is_empty() {
            return Err(DomainError::NoPersonas);
        }
        let mut seen = HashSet::new();
        for persona in &personas {
            if !seen.insert(persona.name().to_lowercase()) {
                return Err(DomainError::DuplicatePersona(persona.name().to_string()));
            }
        }
        Ok(Self { personas })
    }

    /// Build a roster from the first `limit` personas.
    pub fn with_limit(mut personas: Vec<Persona>, limit: usize) -> Result<Self, DomainError> {
        personas.truncate(limit);
        Self::new(personas)
    }

    pub fn get(&self, name: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.personas.iter().map(|p| p.name())
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(name: &str) -> Persona {
        Persona::new(name, 0.5, 0.5).unwrap()
    }

    #[test]
    fn test_roster_rejects_empty() {
        assert_eq!(Roster::new(vec![]).unwrap_err(), DomainError::NoPersonas);
    }

    #[test]
    fn test_roster_rejects_duplicates_case_insensitively() {
        let err = Roster::new(vec![persona("Mike"), persona("mike")]).unwrap_err();
        assert_eq!(err, DomainError::DuplicatePersona("mike".to_string()));
    }

    #[test]
    fn test_roster_with_limit_keeps_order() {
        let roster =
            Roster::with_limit(vec![persona("A"), persona("B"), persona("C")], 2).unwrap();
        assert_eq!(roster.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert!(!roster.contains("C"));
    }
}
