//! Shallow lexical and structural text features.
//!
//! Shared by the diversity scorer and transcript analysis.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Words too common in bar talk to signal repetition.
pub const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "we", "you", "your", "he", "she", "it", "they", "them", "the", "a", "an",
    "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "is", "am", "are", "was",
    "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "just", "not", "no",
    "so", "if", "that", "this", "what", "when", "how", "all", "up", "out", "about", "like", "got",
    "get", "go", "can", "would", "could", "should", "there", "here", "from", "its", "than",
    "into", "over", "some", "then", "too", "very", "dont", "im", "ive", "thats", "yeah", "oh",
];

static STOP_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Number of leading words forming an opener signature.
pub const OPENER_WORDS: usize = 6;

/// Lower-case, drop ASCII punctuation, split on whitespace, remove stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    normalized
        .split_whitespace()
        .filter(|w| !STOP_SET.contains(w))
        .map(str::to_string)
        .collect()
}

/// Contiguous `n`-word sequences, each joined with single spaces.
pub fn ngrams(words: &[String], n: usize) -> Vec<String> {
    if n == 0 || words.len() < n {
        return Vec::new();
    }
    words.windows(n).map(|w| w.join(" ")).collect()
}

/// All n-grams for every length in `min..=max`, shortest first.
pub fn ngram_range(words: &[String], min: usize, max: usize) -> Vec<String> {
    (min..=max).flat_map(|n| ngrams(words, n)).collect()
}

/// Normalized first words of `text`: lower-cased, word characters and
/// whitespace only, trimmed. Empty when the text has no words.
pub fn opener_signature(text: &str) -> String {
    let lowered = text.to_lowercase();
    let head = lowered
        .split_whitespace()
        .take(OPENER_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    head.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Coarse shape of an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralFeatures {
    pub sentences: usize,
    pub question_marks: usize,
    pub commas: usize,
    pub exclamations: usize,
    pub words: usize,
}

impl StructuralFeatures {
    const FIELDS: usize = 5;

    pub fn of(text: &str) -> Self {
        Self {
            sentences: text
                .split(['.', '!', '?'])
                .filter(|s| !s.trim().is_empty())
                .count(),
            question_marks: text.matches('?').count(),
            commas: text.matches(',').count(),
            exclamations: text.matches('!').count(),
            words: text.split_whitespace().count(),
        }
    }

    /// Fraction of fields that are exactly equal.
    pub fn similarity(&self, other: &Self) -> f64 {
        let matches = [
            self.sentences == other.sentences,
            self.question_marks == other.question_marks,
            self.commas == other.commas,
            self.exclamations == other.exclamations,
            self.words == other.words,
        ]
        .iter()
        .filter(|m| **m)
        .count();
        matches as f64 / Self::FIELDS as f64
    }
}
