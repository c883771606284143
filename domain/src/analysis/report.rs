//! Repetition and activity reports

use super::records::{RegenerationRecord, TranscriptSnapshot, UtteranceRecord};
use crate::diversity::text::{ngrams, opener_signature, tokenize};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

const ECHO_NGRAM_MIN: usize = 3;
const ECHO_NGRAM_MAX: usize = 6;
const ECHO_MIN_SPEAKERS: usize = 2;
/// Total uses, across all speakers, before a shared phrase counts as an echo.
const ECHO_MIN_USES: usize = 3;
const MAX_ECHO_PHRASES: usize = 15;
/// Openers shorter than this are too generic to report.
const OPENER_MIN_WORDS: usize = 3;
const OPENER_MIN_USES: usize = 3;
const DUPLICATE_DISPLAY_CHARS: usize = 80;
const MAX_TOP_WORDS: usize = 20;
/// Consecutive utterances inspected for a stale stretch.
const STALE_WINDOW: usize = 5;
/// Uses of one word inside the window that make the stretch stale.
const STALE_MIN_USES: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranscriptSummary {
    pub sessions: usize,
    pub utterances: usize,
    pub speakers: usize,
    pub regenerations: usize,
    pub total_words: usize,
    pub unique_words: usize,
    /// Unique over total content words, 0.0 when there are none.
    pub vocabulary_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakerStats {
    pub speaker: String,
    pub turns: usize,
    pub avg_words: f64,
    pub avg_generation_ms: Option<f64>,
    pub tokens_prompt: u64,
    pub tokens_completion: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoPhrase {
    pub phrase: String,
    pub count: usize,
    pub speakers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeatedOpener {
    pub speaker: String,
    pub opener: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateLine {
    pub text: String,
    pub count: usize,
    pub speakers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Run of consecutive utterances dominated by one content word
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaleStretch {
    pub start_turn: u64,
    pub end_turn: u64,
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegenerationStats {
    pub speaker: String,
    pub events: usize,
    pub total_attempts: u64,
    pub avg_attempts: f64,
}

/// Full analysis of a transcript
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub summary: TranscriptSummary,
    pub speakers: Vec<SpeakerStats>,
    pub echoes: Vec<EchoPhrase>,
    pub openers: Vec<RepeatedOpener>,
    pub duplicates: Vec<DuplicateLine>,
    pub top_words: Vec<WordCount>,
    pub stale_stretches: Vec<StaleStretch>,
    pub regenerations: Vec<RegenerationStats>,
}

impl AnalysisReport {
    pub fn build(snapshot: &TranscriptSnapshot) -> Self {
        Self {
            summary: summarize(snapshot),
            speakers: speaker_stats(&snapshot.utterances),
            echoes: detect_echoes(&snapshot.utterances),
            openers: repeated_openers(&snapshot.utterances),
            duplicates: exact_duplicates(&snapshot.utterances),
            top_words: top_words(&snapshot.utterances),
            stale_stretches: stale_stretches(&snapshot.utterances),
            regenerations: regeneration_stats(&snapshot.regenerations),
        }
    }
}

pub fn summarize(snapshot: &TranscriptSnapshot) -> TranscriptSummary {
    let words: Vec<String> = snapshot
        .utterances
        .iter()
        .flat_map(|u| tokenize(&u.content))
        .collect();
    let unique = words.iter().collect::<HashSet<_>>().len();
    let speakers = snapshot
        .utterances
        .iter()
        .map(|u| u.speaker.as_str())
        .collect::<HashSet<_>>()
        .len();
    let ratio = if words.is_empty() {
        0.0
    } else {
        round_to(unique as f64 / words.len() as f64, 4)
    };

    TranscriptSummary {
        sessions: snapshot.sessions.len(),
        utterances: snapshot.utterances.len(),
        speakers,
        regenerations: snapshot.regenerations.len(),
        total_words: words.len(),
        unique_words: unique,
        vocabulary_ratio: ratio,
    }
}

/// Per-speaker activity, busiest first.
pub fn speaker_stats(utterances: &[UtteranceRecord]) -> Vec<SpeakerStats> {
    let mut grouped: BTreeMap<&str, Vec<&UtteranceRecord>> = BTreeMap::new();
    for u in utterances {
        grouped.entry(u.speaker.as_str()).or_default().push(u);
    }

    let mut stats: Vec<SpeakerStats> = grouped
        .into_iter()
        .map(|(speaker, records)| {
            let turns = records.len();
            let words: usize = records
                .iter()
                .map(|r| r.content.split_whitespace().count())
                .sum();
            let timings: Vec<f64> = records.iter().filter_map(|r| r.generation_time_ms).collect();
            let avg_generation_ms = (!timings.is_empty())
                .then(|| round_to(timings.iter().sum::<f64>() / timings.len() as f64, 0));
            SpeakerStats {
                speaker: speaker.to_string(),
                turns,
                avg_words: round_to(words as f64 / turns as f64, 1),
                avg_generation_ms,
                tokens_prompt: records
                    .iter()
                    .filter_map(|r| r.tokens_prompt)
                    .map(u64::from)
                    .sum(),
                tokens_completion: records
                    .iter()
                    .filter_map(|r| r.tokens_completion)
                    .map(u64::from)
                    .sum(),
            }
        })
        .collect();
    stats.sort_by(|a, b| b.turns.cmp(&a.turns).then_with(|| a.speaker.cmp(&b.speaker)));
    stats
}

/// Phrases of 3 to 6 content words used by at least two different speakers
/// and at least three times in total.
///
/// A phrase contained in a longer reported phrase is dropped. Most frequent
/// first.
pub fn detect_echoes(utterances: &[UtteranceRecord]) -> Vec<EchoPhrase> {
    let mut speakers_by_gram: HashMap<String, BTreeSet<&str>> = HashMap::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for u in utterances {
        let words = tokenize(&u.content);
        for n in ECHO_NGRAM_MIN..=ECHO_NGRAM_MAX {
            for gram in ngrams(&words, n) {
                *counts.entry(gram.clone()).or_default() += 1;
                speakers_by_gram
                    .entry(gram)
                    .or_default()
                    .insert(u.speaker.as_str());
            }
        }
    }

    let mut shared: Vec<(String, BTreeSet<&str>)> = speakers_by_gram
        .into_iter()
        .filter(|(gram, speakers)| {
            speakers.len() >= ECHO_MIN_SPEAKERS
                && counts.get(gram).copied().unwrap_or_default() >= ECHO_MIN_USES
        })
        .collect();
    // Longest first so containment checks only look at kept longer phrases
    shared.sort_by(|(a, _), (b, _)| word_count(b).cmp(&word_count(a)).then_with(|| a.cmp(b)));

    let mut kept: Vec<EchoPhrase> = Vec::new();
    for (gram, speakers) in shared {
        let len = word_count(&gram);
        let contained = kept
            .iter()
            .any(|k| word_count(&k.phrase) > len && k.phrase.contains(gram.as_str()));
        if contained {
            continue;
        }
        kept.push(EchoPhrase {
            count: counts.get(&gram).copied().unwrap_or_default(),
            phrase: gram,
            speakers: speakers.into_iter().map(str::to_string).collect(),
        });
    }

    kept.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.phrase.cmp(&b.phrase)));
    kept.truncate(MAX_ECHO_PHRASES);
    kept
}

/// Opener signatures reused by the same speaker.
pub fn repeated_openers(utterances: &[UtteranceRecord]) -> Vec<RepeatedOpener> {
    let mut counts: BTreeMap<(&str, String), usize> = BTreeMap::new();
    for u in utterances {
        let opener = opener_signature(&u.content);
        if word_count(&opener) < OPENER_MIN_WORDS {
            continue;
        }
        *counts.entry((u.speaker.as_str(), opener)).or_default() += 1;
    }

    let mut openers: Vec<RepeatedOpener> = counts
        .into_iter()
        .filter(|(_, count)| *count >= OPENER_MIN_USES)
        .map(|((speaker, opener), count)| RepeatedOpener {
            speaker: speaker.to_string(),
            opener,
            count,
        })
        .collect();
    openers.sort_by(|a, b| {
        a.speaker
            .cmp(&b.speaker)
            .then_with(|| b.count.cmp(&a.count))
    });
    openers
}

/// Lines repeated verbatim after lower-casing and collapsing whitespace.
pub fn exact_duplicates(utterances: &[UtteranceRecord]) -> Vec<DuplicateLine> {
    let mut seen: HashMap<String, (usize, BTreeSet<&str>)> = HashMap::new();
    for u in utterances {
        let normalized = u
            .content
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if normalized.is_empty() {
            continue;
        }
        let entry = seen.entry(normalized).or_default();
        entry.0 += 1;
        entry.1.insert(u.speaker.as_str());
    }

    let mut duplicates: Vec<DuplicateLine> = seen
        .into_iter()
        .filter(|(_, (count, _))| *count >= 2)
        .map(|(text, (count, speakers))| DuplicateLine {
            text: text.chars().take(DUPLICATE_DISPLAY_CHARS).collect(),
            count,
            speakers: speakers.into_iter().map(str::to_string).collect(),
        })
        .collect();
    duplicates.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.text.cmp(&b.text)));
    duplicates
}

/// Most used content words, most frequent first.
pub fn top_words(utterances: &[UtteranceRecord]) -> Vec<WordCount> {
    let mut ranked = ranked_words(utterances);
    ranked.truncate(MAX_TOP_WORDS);
    ranked
}

/// Windows of five consecutive utterances where one word is used five or
/// more times. After a hit the scan resumes past the whole window.
pub fn stale_stretches(utterances: &[UtteranceRecord]) -> Vec<StaleStretch> {
    let mut stretches = Vec::new();
    let mut start = 0;
    while start + STALE_WINDOW <= utterances.len() {
        let chunk = &utterances[start..start + STALE_WINDOW];
        match ranked_words(chunk).into_iter().next() {
            Some(top) if top.count >= STALE_MIN_USES => {
                stretches.push(StaleStretch {
                    start_turn: chunk[0].turn_number,
                    end_turn: chunk[STALE_WINDOW - 1].turn_number,
                    word: top.word,
                    count: top.count,
                });
                start += STALE_WINDOW;
            }
            _ => start += 1,
        }
    }
    stretches
}

/// Content word counts, most frequent first; ties keep first-use order.
fn ranked_words(utterances: &[UtteranceRecord]) -> Vec<WordCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut ranked: Vec<WordCount> = Vec::new();
    for word in utterances.iter().flat_map(|u| tokenize(&u.content)) {
        match index.get(&word) {
            Some(&i) => ranked[i].count += 1,
            None => {
                index.insert(word.clone(), ranked.len());
                ranked.push(WordCount { word, count: 1 });
            }
        }
    }
    // Stable sort keeps first-use order among equal counts
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

/// Regeneration events per speaker, most frequent first.
pub fn regeneration_stats(regenerations: &[RegenerationRecord]) -> Vec<RegenerationStats> {
    let mut grouped: BTreeMap<&str, (usize, u64)> = BTreeMap::new();
    for r in regenerations {
        let entry = grouped.entry(r.speaker.as_str()).or_default();
        entry.0 += 1;
        entry.1 += u64::from(r.attempt_count);
    }

    let mut stats: Vec<RegenerationStats> = grouped
        .into_iter()
        .map(|(speaker, (events, total_attempts))| RegenerationStats {
            speaker: speaker.to_string(),
            events,
            total_attempts,
            avg_attempts: round_to(total_attempts as f64 / events as f64, 2),
        })
        .collect();
    stats.sort_by(|a, b| b.events.cmp(&a.events).then_with(|| a.speaker.cmp(&b.speaker)));
    stats
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
