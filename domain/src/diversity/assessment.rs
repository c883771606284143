//! Diversity assessment value object

use serde::{Deserialize, Serialize};

/// Outcome of scoring one candidate utterance (Value Object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityAssessment {
    /// Aggregate score: 0.0 fully repetitive, 1.0 fully fresh
    pub score: f64,
    /// `score >= threshold`
    pub passed: bool,
    /// Human-readable problems, in signal order
    pub problems: Vec<String>,
    /// Phrases shared with the window (only set when overlap was flagged)
    pub repeated_phrases: Vec<String>,
    /// Opener signature that was flagged as formulaic
    pub formulaic_opener: Option<String>,
    /// Structure contribution (`1 - average similarity`)
    pub structural_score: f64,
}

impl DiversityAssessment {
    /// Full pass with no problems, used for an empty window.
    pub fn fresh() -> Self {
        Self {
            score: 1.0,
            passed: true,
            problems: Vec::new(),
            repeated_phrases: Vec::new(),
            formulaic_opener: None,
            structural_score: 1.0,
        }
    }

    /// The first `n` problems, used to build corrective prompts.
    pub fn top_problems(&self, n: usize) -> &[String] {
        &self.problems[..self.problems.len().min(n)]
    }
}
