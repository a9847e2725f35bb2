//! Edge case tests for memorybook
//!
//! These tests cover malformed records, unusual names and boundary
//! conditions that the pipeline must survive without failing a run.

use memorybook::config::ProcessorConfig;
use memorybook::error::RecordSkipReason;
use memorybook::matcher::{MatchRule, ParticipantMatcher, SenderRole, match_names};
use memorybook::normalize::{Normalizer, collect_attachments, reconcile};
use memorybook::repair::{clean_text, repair_mojibake};
use memorybook::text::{contains_phrase, count_emojis, mentions};
use serde_json::{Value, json};

fn normalizer() -> Normalizer {
    Normalizer::new(&ProcessorConfig::for_target("sam", "alex")).unwrap()
}

fn normalize(record: Value) -> Result<memorybook::NormalizedMessage, RecordSkipReason> {
    normalizer().normalize(&record, &[])
}

// =========================================================================
// Record shape
// =========================================================================

#[test]
fn test_fallback_keys() {
    let msg = normalize(json!({"sender": "sam", "timestamp": 1000, "text": "hello"})).unwrap();
    assert_eq!(msg.sender, "sam");
    assert_eq!(msg.content, "hello");
    assert_eq!(msg.timestamp.timestamp_millis(), 1000);
}

#[test]
fn test_share_text_is_content() {
    let msg = normalize(json!({
        "sender_name": "sam",
        "timestamp_ms": 1000,
        "share": {"link": "https://example.com", "share_text": "look at this"}
    }))
    .unwrap();
    assert_eq!(msg.content, "look at this");
}

#[test]
fn test_missing_content_is_empty_not_error() {
    let msg = normalize(json!({"sender_name": "sam", "timestamp_ms": 1000})).unwrap();
    assert!(msg.is_empty());
    assert!(!msg.has_emoji);
    assert!(!msg.is_good_morning);
}

#[test]
fn test_whitespace_sender_is_missing() {
    let err = normalize(json!({"sender_name": "   ", "timestamp_ms": 1000})).unwrap_err();
    assert_eq!(err, RecordSkipReason::MissingSender);

    let err = normalize(json!({"sender_name": 42, "timestamp_ms": 1000})).unwrap_err();
    assert_eq!(err, RecordSkipReason::MissingSender);
}

#[test]
fn test_timestamp_shapes() {
    let ok = |ts: Value| {
        normalize(json!({"sender_name": "sam", "timestamp_ms": ts}))
            .unwrap()
            .timestamp
            .timestamp_millis()
    };
    assert_eq!(ok(json!(1500)), 1500);
    assert_eq!(ok(json!(1500.9)), 1500);
    assert_eq!(ok(json!("1500")), 1500);

    let err = |ts: Value| normalize(json!({"sender_name": "sam", "timestamp_ms": ts})).unwrap_err();
    assert_eq!(err(json!("yesterday")), RecordSkipReason::MissingTimestamp);
    assert_eq!(err(json!([1])), RecordSkipReason::MissingTimestamp);
    assert_eq!(err(json!(-5)), RecordSkipReason::InvalidTimestamp(-5));
    assert!(matches!(
        err(json!(i64::MAX)),
        RecordSkipReason::InvalidTimestamp(_)
    ));
}

#[test]
fn test_null_timestamp_falls_through() {
    let msg = normalize(json!({"sender_name": "sam", "timestamp_ms": null, "timestamp": 2000})).unwrap();
    assert_eq!(msg.timestamp.timestamp_millis(), 2000);
}

#[test]
fn test_reactions_without_actor() {
    let msg = normalize(json!({
        "sender_name": "sam",
        "timestamp_ms": 1000,
        "reactions": [{"reaction": "❤"}, {"actor": "alex"}, "junk"]
    }))
    .unwrap();
    assert_eq!(msg.reactions.len(), 1);
    assert_eq!(msg.reactions[0].reaction, "❤");
    assert_eq!(msg.reactions[0].actor, "");
}

// =========================================================================
// Attachments
// =========================================================================

#[test]
fn test_unrecognized_attachment_is_ignored() {
    let msg = normalize(json!({
        "sender_name": "sam",
        "timestamp_ms": 1000,
        "content": "see file",
        "attachments": [{"type": "sticker_pack", "uri": "x/unknown.bin"}],
        "files": [{"uri": "docs/report.pdf"}]
    }))
    .unwrap();
    assert!(!msg.has_media());
    assert_eq!(msg.content, "see file");
}

#[test]
fn test_uri_claimed_once_across_kinds() {
    let record = json!({
        "photos": [{"uri": "media/clip.mp4"}],
        "files": [{"uri": "media/clip.mp4"}]
    });
    let media = reconcile(collect_attachments(record.as_object().unwrap()));
    assert_eq!(media.photos, vec!["media/clip.mp4"]);
    assert!(media.videos.is_empty());
}

#[test]
fn test_nested_data_location() {
    let record = json!({"photos_data": [{"data": {"path": "p/1.png"}}], "voice_messages": ["v/1.aac"]});
    let media = reconcile(collect_attachments(record.as_object().unwrap()));
    assert_eq!(media.photos, vec!["p/1.png"]);
    assert_eq!(media.audio, vec!["v/1.aac"]);
}

// =========================================================================
// Names
// =========================================================================

#[test]
fn test_short_names_never_prefix_match() {
    assert_eq!(match_names("al", "alex"), Some(MatchRule::Contains));
    assert_eq!(match_names("bo", "bob"), Some(MatchRule::Contains));
    assert_eq!(match_names("ab", "ac"), None);
    assert_eq!(match_names("", "anyone"), None);
}

#[test]
fn test_me_wins_when_both_match() {
    let matcher = ParticipantMatcher::new("alex", "alex");
    assert_eq!(matcher.classify("Alex"), SenderRole::Me);
}

#[test]
fn test_unicode_names() {
    assert_eq!(match_names("Иван", "иван"), Some(MatchRule::Exact));
    assert!(mentions("привет, ИВАН!", "Иван"));
    assert!(!mentions("hello", "  "));
}

// =========================================================================
// Text
// =========================================================================

#[test]
fn test_repair_leaves_valid_text() {
    for s in ["plain", "Zoë", "東京", "café ☕", "°C"] {
        assert_eq!(repair_mojibake(s), s);
    }
}

#[test]
fn test_clean_text_handles_entities_and_marks() {
    assert_eq!(clean_text("&lt;3 \u{200F}you&#33;"), "<3 you!");
}

#[test]
fn test_phrase_edge_cases() {
    assert!(!contains_phrase("", &["gm"], false));
    assert!(!contains_phrase("gm", &[""], false));
    assert!(!contains_phrase::<&str>("gm", &[], false));
    assert!(contains_phrase("GM!", &["gm"], false));
    assert!(!contains_phrase("GM!", &["gm"], true));
}

#[test]
fn test_emoji_edge_cases() {
    assert_eq!(count_emojis(""), 0);
    assert_eq!(count_emojis("no emoji here: :) <3"), 0);
    assert_eq!(count_emojis("🇫🇷🇯🇵"), 2);
    assert_eq!(count_emojis("👍🏽"), 1);
}
