//! The normalized message entity.
//!
//! [`NormalizedMessage`] is what ingestion hands to every downstream consumer.
//! All text fields are already repaired and unescaped; exporters treat the
//! value as immutable and only apply target-format sanitization of their own.
//!
//! # Example
//!
//! ```
//! use chrono::{Local, TimeZone};
//! use memorybook::NormalizedMessage;
//!
//! let ts = Local.timestamp_millis_opt(1_609_459_200_000).unwrap();
//! let msg = NormalizedMessage::new("alex", ts, "%Y-%m-%d", "%H:%M")
//!     .with_content("good morning ☀️");
//!
//! assert_eq!(msg.sender(), "alex");
//! assert!(!msg.has_media());
//! ```

use std::fmt::Write;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

fn render(timestamp: &DateTime<Local>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", timestamp.format(format)).is_err() {
        out.clear();
    }
    out
}

/// A reaction left on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// The reaction glyph, usually a single emoji.
    pub reaction: String,
    /// Display name of whoever reacted.
    pub actor: String,
}

impl Reaction {
    pub fn new(reaction: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            reaction: reaction.into(),
            actor: actor.into(),
        }
    }
}

/// A chat message in canonical form.
///
/// # Fields
///
/// | Field | Description |
/// |-------|-------------|
/// | `sender` | Repaired display name |
/// | `timestamp` | Absolute instant in local time |
/// | `date`, `time` | `timestamp` rendered with the configured formats |
/// | `content` | Repaired, unescaped text (empty when the record has none) |
/// | `reactions` | Reactions in source order |
/// | `photos`, `videos`, `audio` | Attachment URIs, one entry per occurrence |
/// | `emoji_count`, `emojis`, `has_emoji` | Emoji metrics of `content` |
/// | `is_*`, `mentions_*`, `has_custom_phrase` | Derived flags |
/// | `all_participants` | Group mode: participants known when this message was processed |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub sender: String,
    pub timestamp: DateTime<Local>,
    pub date: String,
    pub time: String,
    pub content: String,

    #[serde(default)]
    pub reactions: Vec<Reaction>,

    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default)]
    pub audio: Vec<String>,

    pub emoji_count: usize,
    /// Distinct emoji glyphs in order of first appearance.
    #[serde(default)]
    pub emojis: Vec<String>,
    pub has_emoji: bool,

    pub is_good_morning: bool,
    pub mentions_my_name: bool,
    pub mentions_target_name: bool,
    pub has_custom_phrase: bool,
    pub is_from_me: bool,
    pub is_from_target: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub all_participants: Option<Vec<String>>,
}

impl NormalizedMessage {
    /// Creates a message with empty content and all flags cleared.
    ///
    /// `date` and `time` are rendered from `timestamp` with the given chrono
    /// format strings. A format chrono cannot render leaves the field empty;
    /// [`ProcessorConfig::validate`](crate::ProcessorConfig::validate) rejects
    /// such formats up front.
    pub fn new(
        sender: impl Into<String>,
        timestamp: DateTime<Local>,
        date_format: &str,
        time_format: &str,
    ) -> Self {
        Self {
            sender: sender.into(),
            timestamp,
            date: render(&timestamp, date_format),
            time: render(&timestamp, time_format),
            content: String::new(),
            reactions: Vec::new(),
            photos: Vec::new(),
            videos: Vec::new(),
            audio: Vec::new(),
            emoji_count: 0,
            emojis: Vec::new(),
            has_emoji: false,
            is_good_morning: false,
            mentions_my_name: false,
            mentions_target_name: false,
            has_custom_phrase: false,
            is_from_me: false,
            is_from_target: false,
            all_participants: None,
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Sets the content. Derived flags are not recomputed.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Appends a reaction.
    #[must_use]
    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.reactions.push(reaction);
        self
    }

    /// Sets the emoji metrics from the full list of matches in `content`.
    #[must_use]
    pub fn with_emojis(mut self, matches: &[String]) -> Self {
        self.emoji_count = matches.len();
        self.has_emoji = self.emoji_count > 0;
        self.emojis.clear();
        for emoji in matches {
            if !self.emojis.contains(emoji) {
                self.emojis.push(emoji.clone());
            }
        }
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Returns the sender name.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Returns the message content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the hour of day (0-23) in local time.
    pub fn hour(&self) -> u32 {
        use chrono::Timelike;
        self.timestamp.hour()
    }

    /// Returns the calendar date in local time.
    pub fn local_date(&self) -> chrono::NaiveDate {
        self.timestamp.date_naive()
    }

    /// Total number of attachment URIs across all media kinds.
    pub fn media_count(&self) -> usize {
        self.photos.len() + self.videos.len() + self.audio.len()
    }

    /// Returns `true` if the message carries any attachment.
    pub fn has_media(&self) -> bool {
        self.media_count() > 0
    }

    /// Returns `true` if the content is empty or whitespace-only.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}
