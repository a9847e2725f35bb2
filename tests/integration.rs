//! Integration tests for the ingestion pipeline with real files

use memorybook::MemoryBookError;
use memorybook::discovery::discover;
use memorybook::encoding::{DecodeStrategy, TextEncoding};
use memorybook::error::FileSkipReason;
use memorybook::matcher::MatchRule;
use memorybook::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

// ============================================================================
// Fixtures
// ============================================================================

/// Writes `document` to `<root>/inbox/<conversation>/<file>`.
fn write_conversation(root: &Path, conversation: &str, file: &str, document: &Value) {
    let dir = root.join("inbox").join(conversation);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), serde_json::to_vec_pretty(document).unwrap()).unwrap();
}

fn write_raw(root: &Path, conversation: &str, file: &str, bytes: &[u8]) {
    let dir = root.join("inbox").join(conversation);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), bytes).unwrap();
}

/// An export with one direct conversation between alex (me) and sam.
fn direct_export() -> TempDir {
    let dir = tempdir().unwrap();
    write_conversation(
        dir.path(),
        "sam_123",
        "message_1.json",
        &json!({
            "participants": [{"name": "Sam Rivera"}, {"name": "alex"}],
            "messages": [
                {"sender_name": "alex", "timestamp_ms": 1_700_000_300_000_i64, "content": "Good morning sam ☀️"},
                {"sender_name": "Sam Rivera", "timestamp_ms": 1_700_000_200_000_i64, "content": "haha 😂😂"},
                {"sender_name": "alex", "timestamp_ms": 1_700_000_100_000_i64, "content": "hey"},
            ]
        }),
    );
    write_conversation(
        dir.path(),
        "jordan_456",
        "message_1.json",
        &json!({
            "participants": [{"name": "jordan"}, {"name": "alex"}],
            "messages": [
                {"sender_name": "jordan", "timestamp_ms": 1_700_000_000_000_i64, "content": "unrelated"},
            ]
        }),
    );
    dir
}

fn sam_config() -> ProcessorConfig {
    ProcessorConfig::for_target("sam", "alex")
}

// ============================================================================
// Individual mode
// ============================================================================

#[test]
fn test_direct_conversation_end_to_end() {
    let dir = direct_export();
    let result = ingest(dir.path(), &sam_config()).unwrap();

    let contents: Vec<_> = result.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["hey", "haha 😂😂", "Good morning sam ☀️"]);

    assert!(result.messages[0].is_from_me);
    assert!(result.messages[1].is_from_target);
    assert!(result.messages[2].is_good_morning);
    assert!(result.messages[2].mentions_target_name);
    assert!(result.messages[1].has_custom_phrase);
    assert_eq!(result.messages[1].emoji_count, 2);
    assert_eq!(result.messages[1].emojis, vec!["😂"]);

    assert_eq!(result.stats.total_messages, 3);
    assert_eq!(result.stats.sender_count("alex"), 2);
    assert_eq!(result.stats.good_morning_count, 1);
    assert_eq!(result.participants.len(), 2);

    // jordan's conversation is not about sam
    assert_eq!(result.skipped_files.len(), 1);
    assert_eq!(result.skipped_files[0].reason, FileSkipReason::TargetNotParticipant);
}

#[test]
fn test_discovery_reports_match_rule() {
    let dir = direct_export();
    let discovery = discover(dir.path(), &sam_config()).unwrap();
    assert_eq!(discovery.files.len(), 1);
    // "sam" is contained in "sam rivera"
    assert_eq!(discovery.files[0].matched_by, Some(MatchRule::Contains));
    assert_eq!(
        discovery.files[0].strategy,
        DecodeStrategy::Direct(TextEncoding::Utf8)
    );
}

#[test]
fn test_root_without_inbox_is_searched_directly() {
    let dir = tempdir().unwrap();
    let conv = dir.path().join("sam");
    fs::create_dir_all(&conv).unwrap();
    fs::write(
        conv.join("message_1.json"),
        r#"{"participants": [{"name": "sam"}], "messages": [{"sender_name": "sam", "timestamp_ms": 1000}]}"#,
    )
    .unwrap();

    let result = ingest(dir.path(), &sam_config()).unwrap();
    assert_eq!(result.messages.len(), 1);
}

#[test]
fn test_paginated_files_merge_and_sort() {
    let dir = tempdir().unwrap();
    let roster = json!([{"name": "sam"}, {"name": "alex"}]);
    write_conversation(
        dir.path(),
        "sam",
        "message_1.json",
        &json!({"participants": roster, "messages": [
            {"sender_name": "sam", "timestamp_ms": 4000, "content": "d"},
            {"sender_name": "sam", "timestamp_ms": 2000, "content": "b1"},
        ]}),
    );
    write_conversation(
        dir.path(),
        "sam",
        "message_2.json",
        &json!({"participants": roster, "messages": [
            {"sender_name": "alex", "timestamp_ms": 2000, "content": "b2"},
            {"sender_name": "alex", "timestamp_ms": 1000, "content": "a"},
        ]}),
    );

    let result = ingest(dir.path(), &sam_config()).unwrap();
    let contents: Vec<_> = result.messages.iter().map(|m| m.content.as_str()).collect();
    // equal timestamps keep file order
    assert_eq!(contents, vec!["a", "b1", "b2", "d"]);
    assert!(result.messages.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn test_unmatched_fallback() {
    let dir = tempdir().unwrap();
    write_conversation(
        dir.path(),
        "mystery",
        "message_1.json",
        &json!({"participants": [{"name": "someone"}], "messages": [
            {"sender_name": "someone", "timestamp_ms": 1000, "content": "hi"},
        ]}),
    );

    let err = ingest(dir.path(), &sam_config()).unwrap_err();
    assert!(err.is_empty_result());

    let config = sam_config().with_accept_unmatched_files(true);
    let result = ingest(dir.path(), &config).unwrap();
    assert_eq!(result.messages.len(), 1);
    assert!(!result.messages[0].is_from_target);
}

#[test]
fn test_fallback_requires_messages() {
    let dir = tempdir().unwrap();
    write_conversation(
        dir.path(),
        "empty",
        "message_1.json",
        &json!({"participants": [{"name": "someone"}], "messages": []}),
    );
    let config = sam_config().with_accept_unmatched_files(true);
    assert!(ingest(dir.path(), &config).unwrap_err().is_empty_result());
}

// ============================================================================
// Encoding and repair
// ============================================================================

/// "Привет 🙂" with every UTF-8 byte stored as a Latin-1 character.
const PRIVET_SMILE_MOJIBAKE: &str =
    "\u{d0}\u{9f}\u{d1}\u{80}\u{d0}\u{b8}\u{d0}\u{b2}\u{d0}\u{b5}\u{d1}\u{82} \u{f0}\u{9f}\u{99}\u{82}";

#[test]
fn test_mojibake_sender_is_repaired() {
    let dir = tempdir().unwrap();
    write_conversation(
        dir.path(),
        "zoe",
        "message_1.json",
        &json!({
            "participants": [{"name": "ZoÃ«"}, {"name": "alex"}],
            "messages": [
                {"sender_name": "ZoÃ«", "timestamp_ms": 1000, "content": PRIVET_SMILE_MOJIBAKE},
            ]
        }),
    );

    let result = ingest(dir.path(), &ProcessorConfig::for_target("Zoë", "alex")).unwrap();
    assert_eq!(result.messages[0].sender, "Zoë");
    assert!(result.messages[0].is_from_target);
    assert_eq!(result.messages[0].content, "Привет 🙂");
    assert_eq!(result.messages[0].emoji_count, 1);
}

#[test]
fn test_repair_can_be_disabled() {
    let dir = tempdir().unwrap();
    write_conversation(
        dir.path(),
        "zoe",
        "message_1.json",
        &json!({"participants": [{"name": "ZoÃ«"}], "messages": [
            {"sender_name": "ZoÃ«", "timestamp_ms": 1000},
        ]}),
    );

    let config = ProcessorConfig::group().with_repair_encoding(false);
    let result = ingest(dir.path(), &config).unwrap();
    assert_eq!(result.messages[0].sender, "ZoÃ«");
}

#[test]
fn test_utf16_file_is_decoded() {
    let dir = tempdir().unwrap();
    let text = r#"{"participants": [{"name": "sam"}], "messages": [{"sender_name": "sam", "timestamp_ms": 1000, "content": "ñandú"}]}"#;
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    write_raw(dir.path(), "sam", "message_1.json", &bytes);

    let discovery = discover(dir.path(), &sam_config()).unwrap();
    assert_eq!(
        discovery.files[0].strategy,
        DecodeStrategy::Direct(TextEncoding::Utf16)
    );

    let result = ingest(dir.path(), &sam_config()).unwrap();
    assert_eq!(result.messages[0].content, "ñandú");
}

#[test]
fn test_broken_files_are_skipped_not_fatal() {
    let dir = direct_export();
    write_raw(dir.path(), "broken", "message_1.json", b"{not json");
    write_conversation(dir.path(), "nomsgs", "message_1.json", &json!({"participants": []}));

    let result = ingest(dir.path(), &sam_config()).unwrap();
    assert_eq!(result.messages.len(), 3);

    let reasons: Vec<_> = result.skipped_files.iter().map(|s| &s.reason).collect();
    assert!(reasons.contains(&&FileSkipReason::Undecodable));
    assert!(reasons.contains(&&FileSkipReason::MissingMessages));
    assert!(reasons.contains(&&FileSkipReason::TargetNotParticipant));
}

// ============================================================================
// Attachments
// ============================================================================

#[test]
fn test_legacy_and_attachment_photos_both_collected() {
    let dir = tempdir().unwrap();
    write_conversation(
        dir.path(),
        "sam",
        "message_1.json",
        &json!({"participants": [{"name": "sam"}], "messages": [{
            "sender_name": "sam",
            "timestamp_ms": 1000,
            "photos": [{"uri": "photos/a.jpg"}],
            "attachments": [{"type": "photo", "uri": "photos/b.jpg"}],
            "audio_files": [{"uri": "audio/v.mp4"}],
            "files": [{"uri": "files/clip.mov"}],
        }]}),
    );

    let result = ingest(dir.path(), &sam_config()).unwrap();
    let msg = &result.messages[0];
    assert_eq!(msg.photos, vec!["photos/a.jpg", "photos/b.jpg"]);
    assert_eq!(msg.audio, vec!["audio/v.mp4"]);
    assert_eq!(msg.videos, vec!["files/clip.mov"]);
    assert_eq!(result.stats.total_photos, 2);
    assert_eq!(result.stats.total_videos, 1);
    assert_eq!(result.stats.total_audio, 1);
}

// ============================================================================
// Group mode
// ============================================================================

#[test]
fn test_group_mode_across_files() {
    let dir = tempdir().unwrap();
    write_conversation(
        dir.path(),
        "crew",
        "message_1.json",
        &json!({"messages": [
            {"sender_name": "ana", "timestamp_ms": 1000, "content": "hi bo"},
            {"sender_name": "bo", "timestamp_ms": 2000, "content": "hey ana"},
        ]}),
    );
    write_conversation(
        dir.path(),
        "crew",
        "message_2.json",
        &json!({"messages": [
            {"sender_name": "cy", "timestamp_ms": 3000, "content": "yo"},
            {"sender_name": "bo", "timestamp_ms": 4000, "content": "cy!"},
        ]}),
    );
    write_conversation(
        dir.path(),
        "other",
        "message_1.json",
        &json!({"messages": [
            {"sender_name": "dee", "timestamp_ms": 5000, "content": "late"},
            {"sender_name": "bo", "timestamp_ms": 6000, "content": "dee"},
        ]}),
    );

    let result = ingest(dir.path(), &ProcessorConfig::group()).unwrap();
    assert_eq!(result.messages.len(), 6);
    assert!(result.messages.iter().all(|m| !m.is_from_me && !m.is_from_target));

    let group = result.stats.group.as_ref().unwrap();
    assert_eq!(group.participants_count, 4);
    assert_eq!(group.most_active_participants[0], ("bo".to_string(), 3));
    assert_eq!(group.interactions["bo"]["ana"], 1);
    assert_eq!(group.interactions["bo"]["cy"], 1);
    assert_eq!(group.interactions["bo"]["dee"], 1);

    let last = result.messages.last().unwrap();
    assert_eq!(last.all_participants.as_ref().unwrap().len(), 4);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_root_is_io_error() {
    let err = ingest(Path::new("/definitely/not/here"), &sam_config()).unwrap_err();
    assert!(err.is_io());
}

#[test]
fn test_empty_inbox_is_empty_result() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("inbox")).unwrap();
    let err = ingest(dir.path(), &sam_config()).unwrap_err();
    assert!(matches!(err, MemoryBookError::EmptyResult { skipped: 0, .. }));
}

#[test]
fn test_config_file_drives_ingestion() {
    let dir = direct_export();
    let config_path = dir.path().join("config.json");
    fs::write(
        &config_path,
        r#"{"target_user": "sam", "my_name": "alex", "custom_phrases": ["hey"], "date_format": "%d/%m/%Y"}"#,
    )
    .unwrap();

    let config = ProcessorConfig::from_file(&config_path).unwrap();
    let result = ingest(dir.path(), &config).unwrap();
    assert!(result.messages[0].has_custom_phrase);
    assert!(!result.messages[1].has_custom_phrase);
    assert_eq!(result.messages[0].date.matches('/').count(), 2);
}

#[test]
fn test_ingest_is_deterministic() {
    let dir = direct_export();
    let a = ingest(dir.path(), &sam_config()).unwrap();
    let b = ingest(dir.path(), &sam_config()).unwrap();
    assert_eq!(a.messages, b.messages);
    assert_eq!(a.stats, b.stats);
}
