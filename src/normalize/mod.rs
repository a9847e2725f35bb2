//! Raw record to [`NormalizedMessage`] conversion.
//!
//! Records are untrusted JSON objects. Every logical field is read through an
//! ordered fallback chain:
//!
//! | Field | Keys tried |
//! |-------|-----------|
//! | sender | `sender_name`, `sender` |
//! | timestamp (ms) | `timestamp_ms`, `timestamp` |
//! | content | `content`, `text`, `share.share_text` |
//!
//! Text is repaired and unescaped before any derived flag is computed, so
//! emoji counts and phrase matches always see the recovered text.
//!
//! ```rust
//! use memorybook::config::ProcessorConfig;
//! use memorybook::normalize::Normalizer;
//! use serde_json::json;
//!
//! let config = ProcessorConfig::for_target("sam", "alex");
//! let normalizer = Normalizer::new(&config)?;
//!
//! let record = json!({"sender_name": "sam", "timestamp_ms": 1_700_000_000_000_i64, "content": "good morning 🌞"});
//! let msg = normalizer.normalize(&record, &[]).unwrap();
//! assert!(msg.is_from_target);
//! assert!(msg.is_good_morning);
//! assert_eq!(msg.emoji_count, 1);
//! # Ok::<(), memorybook::MemoryBookError>(())
//! ```

pub mod attachments;

use chrono::{DateTime, Local, TimeZone};
use serde_json::{Map, Value};

use crate::config::ProcessorConfig;
use crate::error::RecordSkipReason;
use crate::matcher::{ParticipantMatcher, SenderRole};
use crate::message::{NormalizedMessage, Reaction};
use crate::repair::{clean_text, unescape};
use crate::text::{contains_phrase, extract_emojis};

pub use attachments::{
    AttachmentRef, AttachmentSource, ClassifiedBy, MediaKind, MediaSet, collect_attachments,
    reconcile,
};

const SENDER_KEYS: [&str; 2] = ["sender_name", "sender"];
const TIMESTAMP_KEYS: [&str; 2] = ["timestamp_ms", "timestamp"];
const CONTENT_KEYS: [&str; 2] = ["content", "text"];

/// Converts raw records into normalized messages for one configuration.
#[derive(Debug, Clone)]
pub struct Normalizer {
    matcher: ParticipantMatcher,
    group_chat: bool,
    repair_encoding: bool,
    date_format: String,
    time_format: String,
    good_morning_phrases: Vec<String>,
    custom_phrases: Vec<String>,
}

impl Normalizer {
    /// Builds a normalizer for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryBookError::InvalidConfig`](crate::MemoryBookError::InvalidConfig)
    /// when `config` fails [`ProcessorConfig::validate`].
    pub fn new(config: &ProcessorConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            matcher: ParticipantMatcher::new(&config.target_user, &config.my_name),
            group_chat: config.group_chat,
            repair_encoding: config.repair_encoding,
            date_format: config.date_format.clone(),
            time_format: config.time_format.clone(),
            good_morning_phrases: config.good_morning_phrases.clone(),
            custom_phrases: config.custom_phrases.clone(),
        })
    }

    /// The matcher used for sender classification and mentions.
    pub fn matcher(&self) -> &ParticipantMatcher {
        &self.matcher
    }

    /// Normalizes one record.
    ///
    /// `participants` is the snapshot stored in
    /// [`all_participants`](NormalizedMessage::all_participants) in group
    /// mode; it is ignored otherwise.
    ///
    /// # Errors
    ///
    /// Returns the reason when the record is not a well-formed message. Use
    /// `.ok()` when only the message matters.
    pub fn normalize(
        &self,
        record: &Value,
        participants: &[String],
    ) -> Result<NormalizedMessage, RecordSkipReason> {
        let record = record.as_object().ok_or(RecordSkipReason::NotAnObject)?;

        let sender = first_str(record, &SENDER_KEYS)
            .map(|s| self.clean(s))
            .filter(|s| !s.trim().is_empty())
            .ok_or(RecordSkipReason::MissingSender)?;
        let timestamp = parse_timestamp(record)?;

        let content = content_of(record)
            .map(|s| self.clean(s))
            .unwrap_or_default();

        let emojis = extract_emojis(&content);

        let mut msg = NormalizedMessage::new(sender, timestamp, &self.date_format, &self.time_format)
            .with_content(content)
            .with_emojis(&emojis);

        msg.reactions = self.reactions(record);

        let media = reconcile(collect_attachments(record));
        msg.photos = media.photos;
        msg.videos = media.videos;
        msg.audio = media.audio;

        self.derive_flags(&mut msg);

        if self.group_chat {
            msg.all_participants = Some(participants.to_vec());
        } else {
            match self.matcher.classify(&msg.sender) {
                SenderRole::Me => msg.is_from_me = true,
                SenderRole::Target => msg.is_from_target = true,
                SenderRole::Other => {}
            }
        }

        Ok(msg)
    }

    fn clean(&self, s: &str) -> String {
        if self.repair_encoding {
            clean_text(s)
        } else {
            unescape(s)
        }
    }

    fn reactions(&self, record: &Map<String, Value>) -> Vec<Reaction> {
        let Some(items) = record.get("reactions").and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| {
                let reaction = item.get("reaction").and_then(Value::as_str)?;
                let actor = item.get("actor").and_then(Value::as_str).unwrap_or_default();
                Some(Reaction::new(self.clean(reaction), self.clean(actor)))
            })
            .collect()
    }

    fn derive_flags(&self, msg: &mut NormalizedMessage) {
        msg.is_good_morning = contains_phrase(&msg.content, &self.good_morning_phrases, false);
        msg.has_custom_phrase = contains_phrase(&msg.content, &self.custom_phrases, false);
        msg.mentions_my_name = self.matcher.mentions_me(&msg.content);
        msg.mentions_target_name = self.matcher.mentions_target(&msg.content);
    }
}

fn first_str<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
}

fn content_of(record: &Map<String, Value>) -> Option<&str> {
    first_str(record, &CONTENT_KEYS).or_else(|| {
        record
            .get("share")
            .and_then(|share| share.get("share_text"))
            .and_then(Value::as_str)
    })
}

/// Reads the millisecond timestamp of a record as a local instant.
///
/// Integers, floats and numeric strings are accepted.
pub fn parse_timestamp(record: &Map<String, Value>) -> Result<DateTime<Local>, RecordSkipReason> {
    let ms = TIMESTAMP_KEYS
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
        .ok_or(RecordSkipReason::MissingTimestamp)
        .and_then(timestamp_millis)?;

    if ms < 0 {
        return Err(RecordSkipReason::InvalidTimestamp(ms));
    }
    Local
        .timestamp_millis_opt(ms)
        .single()
        .ok_or(RecordSkipReason::InvalidTimestamp(ms))
}

fn timestamp_millis(value: &Value) -> Result<i64, RecordSkipReason> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(float_millis))
            .ok_or(RecordSkipReason::InvalidTimestamp(i64::MAX)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_millis))
                .ok_or(RecordSkipReason::MissingTimestamp)
        }
        _ => Err(RecordSkipReason::MissingTimestamp),
    }
}

fn float_millis(f: f64) -> Option<i64> {
    (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| f.trunc() as i64)
}
