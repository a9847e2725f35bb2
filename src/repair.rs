//! Mojibake detection and repair.
//!
//! Meta exports UTF-8 text as if every byte were a Latin-1 character, so
//! "Привет" arrives as "ÐŸÑ€Ð¸Ð²ÐµÑ‚" and emoji as sequences starting with `ð`.
//! [`repair_mojibake`] reverses that by taking each character back to its byte
//! and decoding the bytes as UTF-8. When that fails the original string is
//! returned untouched: repair never destroys data.
//!
//! [`unescape`] then removes the remaining noise: HTML entities, backslash
//! escapes and invisible bidirectional marks.
//!
//! ```rust
//! use memorybook::repair::{clean_text, repair_mojibake};
//!
//! assert_eq!(repair_mojibake("ZoÃ«"), "Zoë");
//! assert_eq!(repair_mojibake("Hello"), "Hello");
//! assert_eq!(clean_text("Tom &amp; Jerry \u{200E}"), "Tom & Jerry ");
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

/// Markers below U+00B0 that are still diagnostic of mis-decoded UTF-8.
const EXTRA_MARKERS: &[char] = &['§', '©', '¯'];

/// Bidirectional and invisible formatting characters stripped by [`unescape`].
const INVISIBLE_MARKS: &[char] = &[
    '\u{200E}', // left-to-right mark
    '\u{200F}', // right-to-left mark
    '\u{202A}', '\u{202B}', '\u{202C}', '\u{202D}', '\u{202E}', // embeddings and overrides
    '\u{2066}', '\u{2067}', '\u{2068}', '\u{2069}', // isolates
    '\u{061C}', // arabic letter mark
];

static ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\u([0-9a-fA-F]{4})(?:\\u([0-9a-fA-F]{4}))?|\\U([0-9a-fA-F]{8})|\\x([0-9a-fA-F]{2})",
    )
    .expect("escape pattern is valid")
});

/// Returns `true` if `s` contains a character diagnostic of UTF-8 bytes
/// having been decoded as Latin-1.
pub fn is_mojibake(s: &str) -> bool {
    s.chars()
        .any(|c| ('\u{B0}'..='\u{FF}').contains(&c) || EXTRA_MARKERS.contains(&c))
}

/// One Latin-1 round trip. `None` when a character is outside Latin-1 or the
/// bytes are not UTF-8.
fn latin1_round_trip(s: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(s.len());
    for c in s.chars() {
        bytes.push(u8::try_from(u32::from(c)).ok()?);
    }
    String::from_utf8(bytes).ok()
}

/// Repairs mojibake, or returns the input unchanged when repair does not apply.
///
/// Repair is applied until the text no longer looks corrupted or a round trip
/// fails, so text that was mis-decoded twice is fully recovered and
/// `repair_mojibake(&repair_mojibake(s)) == repair_mojibake(s)` for every `s`.
pub fn repair_mojibake(s: &str) -> String {
    let mut current = s.to_owned();
    // Every successful round trip folds a multi-byte sequence, so the text
    // shrinks and the loop terminates.
    while is_mojibake(&current) {
        match latin1_round_trip(&current) {
            Some(fixed) if fixed != current => current = fixed,
            _ => break,
        }
    }
    current
}

/// Decodes HTML entities and backslash escapes, then strips bidirectional
/// and invisible formatting marks.
pub fn unescape(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    let decoded = decode_backslash_escapes(&decoded);
    decoded.chars().filter(|c| !INVISIBLE_MARKS.contains(c)).collect()
}

fn decode_backslash_escapes(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_owned();
    }
    ESCAPE_RE
        .replace_all(s, |caps: &Captures<'_>| {
            let whole = caps[0].to_string();
            if let Some(high) = caps.get(1) {
                let high = hex_value(high.as_str());
                if let Some(low) = caps.get(2) {
                    let low = hex_value(low.as_str());
                    if let Some(pair) = char::decode_utf16([high as u16, low as u16])
                        .collect::<Result<String, _>>()
                        .ok()
                        .filter(|s| s.chars().count() == 1)
                    {
                        return pair;
                    }
                    // Not a surrogate pair: decode both halves independently.
                    return format!(
                        "{}{}",
                        char_or(high, &whole[..6]),
                        char_or(low, &whole[6..])
                    );
                }
                return char_or(high, &whole);
            }
            let code = caps
                .get(3)
                .or_else(|| caps.get(4))
                .map(|m| hex_value(m.as_str()))
                .unwrap_or_default();
            char_or(code, &whole)
        })
        .into_owned()
}

fn hex_value(hex: &str) -> u32 {
    u32::from_str_radix(hex, 16).unwrap_or_default()
}

fn char_or(code: u32, fallback: &str) -> String {
    char::from_u32(code)
        .map(String::from)
        .unwrap_or_else(|| fallback.to_owned())
}

/// Repairs then unescapes: the full treatment for message content.
pub fn clean_text(s: &str) -> String {
    unescape(&repair_mojibake(s))
}

/// Repairs every string inside a JSON tree in place.
pub fn repair_value(value: &mut Value) {
    match value {
        Value::String(s) => {
            if is_mojibake(s) {
                *s = repair_mojibake(s);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(repair_value),
        Value::Object(map) => map.values_mut().for_each(repair_value),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
