//! Cleanup of raw backend output.
//!
//! Backends sometimes echo the speaker tag ("Mike: ...") or keep going and
//! script further turns ("...\nRosa: ..."). Two fixes are applied, in order:
//! strip a single leading name tag, then truncate at the first mid-text tag.

use regex::Regex;
use std::sync::LazyLock;

/// `Name:` or `Name 2:` at the very start.
static LEADING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]\w*(\s+\d+)?:\s*").expect("valid leading tag regex"));

/// A capitalized speaker tag starting a new line.
static MID_TEXT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*[A-Z][\w\s]*:").expect("valid mid-text tag regex"));

/// Normalize raw generated text into the single line the persona speaks.
///
/// Returns an empty string when nothing usable remains.
pub fn clean_response(text: &str) -> String {
    let trimmed = text.trim();
    let stripped = LEADING_TAG.replace(trimmed, "");
    let stripped = stripped.trim();
    match MID_TEXT_TAG.find(stripped) {
        Some(m) => stripped[..m.start()].trim().to_string(),
        None => stripped.to_string(),
    }
}
