//! Diversity scorer

use super::assessment::DiversityAssessment;
use super::settings::DiversitySettings;
use super::text::{StructuralFeatures, ngram_range, opener_signature, tokenize};
use crate::conversation::entities::Utterance;
use std::collections::HashSet;

const W_NGRAM: f64 = 0.50;
const W_OPENER: f64 = 0.25;
const W_STRUCT: f64 = 0.25;

/// Overlap ratio above which shared phrases are reported.
const NGRAM_OVERLAP_THRESHOLD: f64 = 0.30;
/// Overlap ratio at which the n-gram contribution reaches zero.
const NGRAM_OVERLAP_SATURATION: f64 = 0.5;
const MAX_REPEATED_PHRASES: usize = 5;
const PHRASES_IN_PROBLEM: usize = 3;

/// Prior uses of the same opener that make it formulaic.
const MAX_OPENER_REPEATS: usize = 2;
const OPENER_DISPLAY_CHARS: usize = 40;

const STRUCT_SIMILARITY_THRESHOLD: f64 = 0.7;
/// How many of the speaker's latest utterances are compared structurally.
const STRUCT_COMPARE_LAST: usize = 3;

/// Score `candidate` from `speaker` against the trailing window of `history`.
///
/// The window is the last `settings.window_size` utterances across all
/// speakers. An empty window is a full pass.
pub fn compute_diversity(
    candidate: &str,
    history: &[Utterance],
    speaker: &str,
    settings: &DiversitySettings,
) -> DiversityAssessment {
    let start = history.len().saturating_sub(settings.window_size);
    let window = &history[start..];
    if window.is_empty() {
        return DiversityAssessment::fresh();
    }

    let mut problems = Vec::new();
    let mut repeated_phrases = Vec::new();

    // 1. Cross-turn n-gram overlap
    let (overlap, phrases) =
        ngram_overlap(candidate, window, settings.ngram_min, settings.ngram_max);
    if overlap > NGRAM_OVERLAP_THRESHOLD {
        let shown: Vec<&str> = phrases
            .iter()
            .take(PHRASES_IN_PROBLEM)
            .map(String::as_str)
            .collect();
        problems.push(format!("Repeated phrases: {}", shown.join(", ")));
        repeated_phrases = phrases;
    }
    let ngram_score = 1.0 - (overlap / NGRAM_OVERLAP_SATURATION).min(1.0);

    // 2. Formulaic opener
    let formulaic_opener = formulaic_opener(candidate, window, speaker);
    if let Some(opener) = &formulaic_opener {
        let shown: String = opener.chars().take(OPENER_DISPLAY_CHARS).collect();
        problems.push(format!("Repeated opener: \"{}\"", shown));
    }
    let opener_score = if formulaic_opener.is_some() { 0.0 } else { 1.0 };

    // 3. Structural similarity
    let similarity = structural_similarity(candidate, window, speaker);
    if similarity > STRUCT_SIMILARITY_THRESHOLD {
        problems.push("Similar structure to recent messages".to_string());
    }
    let structural_score = 1.0 - similarity;

    let score = round3(W_NGRAM * ngram_score + W_OPENER * opener_score + W_STRUCT * structural_score);

    DiversityAssessment {
        score,
        passed: score >= settings.threshold,
        problems,
        repeated_phrases,
        formulaic_opener,
        structural_score,
    }
}

/// Share of the candidate's n-grams already present in `window`, and the
/// distinct shared phrases in first-seen order (at most five).
pub fn ngram_overlap(
    candidate: &str,
    window: &[Utterance],
    ngram_min: usize,
    ngram_max: usize,
) -> (f64, Vec<String>) {
    let words = tokenize(candidate);
    if words.len() < ngram_min {
        return (0.0, Vec::new());
    }
    let candidate_grams = ngram_range(&words, ngram_min, ngram_max);
    if candidate_grams.is_empty() {
        return (0.0, Vec::new());
    }

    let history_grams: HashSet<String> = window
        .iter()
        .flat_map(|u| ngram_range(&tokenize(u.content()), ngram_min, ngram_max))
        .collect();

    let shared: Vec<&String> = candidate_grams
        .iter()
        .filter(|g| history_grams.contains(*g))
        .collect();
    let ratio = shared.len() as f64 / candidate_grams.len() as f64;

    let mut seen = HashSet::new();
    let phrases = shared
        .into_iter()
        .filter(|g| seen.insert(g.as_str()))
        .take(MAX_REPEATED_PHRASES)
        .cloned()
        .collect();
    (ratio, phrases)
}

/// The candidate's opener signature if `speaker` already used it at least
/// twice inside the window.
fn formulaic_opener(candidate: &str, window: &[Utterance], speaker: &str) -> Option<String> {
    let opener = opener_signature(candidate);
    if opener.is_empty() {
        return None;
    }
    let uses = window
        .iter()
        .filter(|u| u.speaker() == speaker)
        .filter(|u| opener_signature(u.content()) == opener)
        .count();
    (uses >= MAX_OPENER_REPEATS).then_some(opener)
}

/// Average structural similarity to the speaker's latest utterances in the
/// window; 0.0 when the speaker has none.
fn structural_similarity(candidate: &str, window: &[Utterance], speaker: &str) -> f64 {
    let own: Vec<&Utterance> = window.iter().filter(|u| u.speaker() == speaker).collect();
    let recent = &own[own.len().saturating_sub(STRUCT_COMPARE_LAST)..];
    if recent.is_empty() {
        return 0.0;
    }
    let features = StructuralFeatures::of(candidate);
    let total: f64 = recent
        .iter()
        .map(|u| features.similarity(&StructuralFeatures::of(u.content())))
        .sum();
    total / recent.len() as f64
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn window(lines: &[(&str, &str)]) -> Vec<Utterance> {
        lines
            .iter()
            .enumerate()
            .map(|(i, (speaker, content))| Utterance::new(*speaker, *content, i as u64, Utc::now()))
            .collect()
    }

    #[test]
    fn empty_window_is_a_full_pass() {
        let result = compute_diversity("anything at all", &[], "Mike", &DiversitySettings::default());
        assert_eq!(result.score, 1.0);
        assert!(result.passed);
        assert!(result.problems.is_empty());
        assert!(result.formulaic_opener.is_none());
    }

    #[test]
    fn verbatim_phrase_has_full_overlap() {
        let history = window(&[("Rosa", "Honestly the cheap warm flat beer here is criminal.")]);
        let (ratio, phrases) = ngram_overlap("cheap warm flat beer", &history, 3, 6);
        assert_eq!(ratio, 1.0);
        assert!(phrases.contains(&"cheap warm flat beer".to_string()));

        let result = compute_diversity(
            "Cheap, warm, flat beer!",
            &history,
            "Mike",
            &DiversitySettings::default(),
        );
        assert!(!result.passed);
        assert_eq!(result.score, 0.5);
        assert!(result.problems[0].starts_with("Repeated phrases: "));
        assert!(result.repeated_phrases.contains(&"cheap warm flat beer".to_string()));
    }

    #[test]
    fn short_candidates_have_no_overlap() {
        let history = window(&[("Rosa", "cheap warm flat beer")]);
        let (ratio, phrases) = ngram_overlap("warm beer", &history, 3, 6);
        assert_eq!(ratio, 0.0);
        assert!(phrases.is_empty());
    }

    #[test]
    fn opener_flagged_on_third_use_not_second() {
        let settings = DiversitySettings::default();
        let opener = "Man, I tell you what, this";

        let once = window(&[("Mike", "Man, I tell you what, this town is dead.")]);
        let second = compute_diversity(
            &format!("{} beer is warm.", opener),
            &once,
            "Mike",
            &settings,
        );
        assert!(second.formulaic_opener.is_none());

        let twice = window(&[
            ("Mike", "Man, I tell you what, this town is dead."),
            ("Rosa", "Sure it is."),
            ("Mike", "Man, I tell you what, this jukebox stinks!"),
        ]);
        let third = compute_diversity(
            &format!("{} beer is warm.", opener),
            &twice,
            "Mike",
            &settings,
        );
        assert_eq!(
            third.formulaic_opener.as_deref(),
            Some("man i tell you what this")
        );
        assert!(third.problems.iter().any(|p| p.starts_with("Repeated opener")));
    }

    #[test]
    fn long_opener_is_shortened_by_characters() {
        let line = "Señoritas, jalapeños, crèmebrûlées, piñatas, façades, déjàvus everywhere.";
        let history = window(&[("Mike", line), ("Mike", line)]);
        let result = compute_diversity(line, &history, "Mike", &DiversitySettings::default());
        assert_eq!(
            result.formulaic_opener.as_deref(),
            Some("señoritas jalapeños crèmebrûlées piñatas façades déjàvus")
        );
        assert!(
            result
                .problems
                .contains(&"Repeated opener: \"señoritas jalapeños crèmebrûlées piñatas\"".to_string())
        );
    }

    #[test]
    fn openers_of_other_speakers_do_not_count() {
        let history = window(&[
            ("Rosa", "Man, I tell you what, this town is dead."),
            ("Dave", "Man, I tell you what, this jukebox stinks."),
        ]);
        let result = compute_diversity(
            "Man, I tell you what, this beer is warm.",
            &history,
            "Mike",
            &DiversitySettings::default(),
        );
        assert!(result.formulaic_opener.is_none());
    }

    #[test]
    fn identical_structure_is_flagged() {
        let history = window(&[
            ("Mike", "Rain again today."),
            ("Mike", "Traffic was brutal."),
            ("Mike", "Landlord called twice."),
        ]);
        let result = compute_diversity(
            "Boss yelled more.",
            &history,
            "Mike",
            &DiversitySettings::default(),
        );
        assert_eq!(result.structural_score, 0.0);
        assert!(result.problems.contains(&"Similar structure to recent messages".to_string()));
        assert_eq!(result.score, 0.75);
        assert!(result.passed);
    }

    #[test]
    fn window_limits_history_considered() {
        let mut lines = vec![("Rosa", "cheap warm flat beer forever")];
        for _ in 0..10 {
            lines.push(("Dave", "unrelated chatter about football season"));
        }
        let history = window(&lines);
        let settings = DiversitySettings::default();
        let result = compute_diversity("cheap warm flat beer", &history, "Mike", &settings);
        assert!(result.repeated_phrases.is_empty());
        assert_eq!(result.score, 1.0);
    }
}
