//! Emoji and phrase analysis of message content.
//!
//! Emoji are matched as whole sequences rather than single code points, so a
//! family (`👨‍👩‍👧`), a skin-toned hand (`👋🏽`), a flag (`🇫🇷`) or a keycap (`1️⃣`)
//! each count once.
//!
//! ```rust
//! use memorybook::text::{contains_phrase, count_emojis, extract_emojis};
//!
//! assert_eq!(extract_emojis("hi 👋🏽 🇫🇷"), vec!["👋🏽", "🇫🇷"]);
//! assert_eq!(count_emojis("no emoji"), 0);
//! assert!(contains_phrase("Good Morning!", &["good morning"], false));
//! ```

use std::sync::LazyLock;

use regex::Regex;

static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    // element   := pictograph [VS16 | skin tone]
    // sequence  := element (ZWJ element)* [tag sequence]
    Regex::new(concat!(
        r"[\x{1F1E6}-\x{1F1FF}]{2}",
        r"|[0-9#*]\x{FE0F}?\x{20E3}",
        r"|\p{Extended_Pictographic}[\x{FE0F}\x{1F3FB}-\x{1F3FF}]?",
        r"(?:\x{200D}\p{Extended_Pictographic}[\x{FE0F}\x{1F3FB}-\x{1F3FF}]?)*",
        r"(?:[\x{E0020}-\x{E007E}]+\x{E007F})?",
    ))
    .expect("emoji pattern is valid")
});

/// Returns every emoji sequence in `text`, in order, duplicates included.
pub fn extract_emojis(text: &str) -> Vec<String> {
    EMOJI_RE
        .find_iter(text)
        .map(|m| m.as_str().to_owned())
        .collect()
}

/// Number of emoji sequences in `text`.
pub fn count_emojis(text: &str) -> usize {
    EMOJI_RE.find_iter(text).count()
}

/// Distinct emoji sequences in order of first appearance.
pub fn distinct_emojis(text: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for emoji in extract_emojis(text) {
        if !seen.contains(&emoji) {
            seen.push(emoji);
        }
    }
    seen
}

/// Returns `true` if `text` contains any of `phrases` as a substring.
///
/// Matching ignores case unless `case_sensitive` is set. Empty phrases are
/// ignored.
pub fn contains_phrase<S: AsRef<str>>(text: &str, phrases: &[S], case_sensitive: bool) -> bool {
    if text.is_empty() {
        return false;
    }
    if case_sensitive {
        return phrases
            .iter()
            .map(AsRef::as_ref)
            .any(|p| !p.is_empty() && text.contains(p));
    }
    let haystack = text.to_lowercase();
    phrases
        .iter()
        .map(AsRef::as_ref)
        .any(|p| !p.is_empty() && haystack.contains(&p.to_lowercase()))
}

/// Case-insensitive check that `text` mentions `name`. An empty name never
/// matches.
pub fn mentions(text: &str, name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && contains_phrase(text, &[name], false)
}
