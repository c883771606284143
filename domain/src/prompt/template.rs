//! House prompt templates

use crate::generation::message::ChatMessage;
use rand::Rng;
use rand::seq::SliceRandom;

/// Subjects the bartender picks from to open the night.
pub const OPENER_CATEGORIES: &[&str] = &[
    "sex and hookups",
    "politics",
    "marriage",
    "kids and parenting",
    "pets",
    "girlfriends and boyfriends",
    "work complaints",
    "crazy news stories",
    "neighborhood gossip",
    "money problems",
    "bad dates",
    "family drama",
    "landlord horror stories",
    "worst coworkers",
    "celebrity gossip",
    "gas prices and inflation",
];

/// Line used when the opener request comes back empty.
pub const FALLBACK_OPENER: &str = "Slow night. Somebody say something interesting.";

/// Templates for prompts that do not belong to a persona
pub struct BarPromptTemplate;

impl BarPromptTemplate {
    /// Pick an opener subject at random.
    pub fn pick_opener_category<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
        OPENER_CATEGORIES
            .choose(rng)
            .copied()
            .unwrap_or("work complaints")
    }

    /// Prompt for the bartender's one-line opener about `topic`.
    pub fn opener_prompt(topic: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(format!(
                "You are a bartender at a dive bar. Write one casual sentence about {topic} \
to kick off tonight's conversation. Sound natural and gruff. No quotes, no narration. \
Under 15 words."
            )),
            ChatMessage::user(format!(
                "Say something about {topic} to get the regulars talking."
            )),
        ]
    }

    /// Trim whitespace and surrounding quotes from a one-line reply.
    pub fn strip_quotes(text: &str) -> &str {
        text.trim().trim_matches(|c| c == '"' || c == '\'')
    }

    /// The opener line to seed with, falling back when the reply is empty.
    pub fn opener_or_fallback(raw: &str) -> String {
        match Self::strip_quotes(raw) {
            "" => FALLBACK_OPENER.to_string(),
            line => line.to_string(),
        }
    }
}
