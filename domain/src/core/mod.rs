//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] — domain-level errors
//! - [`validation::ConfigIssue`] — structured configuration problems

pub mod error;
pub mod validation;
