//! Processor configuration.
//!
//! Everything the ingestion core needs to know about the conversation under
//! analysis comes from [`ProcessorConfig`]: who "me" and the target are, whether
//! the archive is a group chat, how dates are rendered, and which phrase lists
//! drive the derived flags. No other module hard-codes any of these values.
//!
//! # Example
//!
//! ```rust
//! use memorybook::config::ProcessorConfig;
//!
//! let config = ProcessorConfig::for_target("friend_username", "your_username")
//!     .with_date_format("%d.%m.%Y")
//!     .with_custom_phrases(["see you", "miss you"]);
//!
//! assert!(config.validate().is_ok());
//! ```

use std::fs;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::{MemoryBookError, Result};

const DEFAULT_GOOD_MORNING_PHRASES: &[&str] = &[
    "gm",
    "good morning",
    "morning",
    "bonjour",
    "ohayo",
    "buenos dias",
    "guten morgen",
];

const DEFAULT_CUSTOM_PHRASES: &[&str] = &[
    "happy birthday",
    "congratulations",
    "thank you",
    "thanks",
    "lol",
    "haha",
    "wow",
    "awesome",
    "cool",
    "nice",
];

/// Configuration for one ingestion run.
///
/// Missing fields take their default when deserialized, so a JSON config file
/// only needs the keys it wants to override:
///
/// ```rust
/// use memorybook::config::ProcessorConfig;
///
/// let config = ProcessorConfig::from_json_str(r#"{"target_user": "sam", "my_name": "alex"}"#)?;
/// assert_eq!(config.date_format, "%Y-%m-%d");
/// # Ok::<(), memorybook::MemoryBookError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Display name of the person the conversation is analysed for.
    pub target_user: String,

    /// Display name of the archive owner.
    pub my_name: String,

    /// Treat every file as part of one group conversation (default: false)
    pub group_chat: bool,

    /// chrono format string for [`NormalizedMessage::date`](crate::NormalizedMessage::date)
    pub date_format: String,

    /// chrono format string for [`NormalizedMessage::time`](crate::NormalizedMessage::time)
    pub time_format: String,

    /// Phrases that mark a "good morning" message.
    pub good_morning_phrases: Vec<String>,

    /// Additional phrases counted by `has_custom_phrase`.
    pub custom_phrases: Vec<String>,

    /// Individual mode only: accept a file with messages even when no
    /// participant matches the target user (default: false)
    pub accept_unmatched_files: bool,

    /// Repair mojibake in names and text (default: true)
    pub repair_encoding: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            target_user: String::new(),
            my_name: String::new(),
            group_chat: false,
            date_format: "%Y-%m-%d".to_string(),
            time_format: "%H:%M:%S".to_string(),
            good_morning_phrases: DEFAULT_GOOD_MORNING_PHRASES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            custom_phrases: DEFAULT_CUSTOM_PHRASES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            accept_unmatched_files: false,
            repair_encoding: true,
        }
    }
}

impl ProcessorConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an individual-chat configuration for `target` as seen by `me`.
    pub fn for_target(target: impl Into<String>, me: impl Into<String>) -> Self {
        Self {
            target_user: target.into(),
            my_name: me.into(),
            ..Self::default()
        }
    }

    /// Creates a group-chat configuration.
    pub fn group() -> Self {
        Self {
            group_chat: true,
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON. Absent keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Loads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Sets the target user.
    #[must_use]
    pub fn with_target_user(mut self, name: impl Into<String>) -> Self {
        self.target_user = name.into();
        self
    }

    /// Sets the archive owner's name.
    #[must_use]
    pub fn with_my_name(mut self, name: impl Into<String>) -> Self {
        self.my_name = name.into();
        self
    }

    /// Enables or disables group mode.
    #[must_use]
    pub fn with_group_chat(mut self, enabled: bool) -> Self {
        self.group_chat = enabled;
        self
    }

    /// Sets the date format string.
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Sets the time format string.
    #[must_use]
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// Replaces the good-morning phrase list.
    #[must_use]
    pub fn with_good_morning_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.good_morning_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the custom phrase list.
    #[must_use]
    pub fn with_custom_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether unmatched files are accepted in individual mode.
    #[must_use]
    pub fn with_accept_unmatched_files(mut self, accept: bool) -> Self {
        self.accept_unmatched_files = accept;
        self
    }

    /// Enables or disables mojibake repair.
    #[must_use]
    pub fn with_repair_encoding(mut self, enabled: bool) -> Self {
        self.repair_encoding = enabled;
        self
    }

    /// Checks the configuration before a run.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryBookError::InvalidConfig`] when the target user is empty
    /// outside group mode, or when a date/time format string is not valid.
    pub fn validate(&self) -> Result<()> {
        if !self.group_chat && self.target_user.trim().is_empty() {
            return Err(MemoryBookError::invalid_config(
                "target_user is required for individual chats",
            ));
        }
        check_format("date_format", &self.date_format)?;
        check_format("time_format", &self.time_format)?;
        Ok(())
    }
}

fn check_format(field: &str, format: &str) -> Result<()> {
    if format.is_empty() {
        return Err(MemoryBookError::invalid_config(format!("{field} is empty")));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(MemoryBookError::invalid_config(format!(
            "{field} '{format}' is not a valid strftime format"
        )));
    }
    Ok(())
}
