//! Conversation statistics.
//!
//! [`compute_stats`] runs once over the ingested messages and produces an
//! immutable [`ConversationStats`] snapshot. Maps keyed by sender, date or
//! emoji keep first-encountered order, which is also how ties are broken.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use memorybook::stats::conversation_duration_days;
//!
//! let first = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
//! let last = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
//! assert_eq!(conversation_duration_days(first, last), 3);
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::ProcessorConfig;
use crate::message::NormalizedMessage;
use crate::text::{extract_emojis, mentions};

/// Aggregate statistics for one conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationStats {
    pub total_messages: usize,
    pub messages_by_sender: IndexMap<String, usize>,

    pub total_emojis: usize,
    pub unique_emojis_count: usize,
    /// Distinct emoji in order of first use.
    pub unique_emojis: Vec<String>,
    /// Occurrences of each emoji across all content.
    pub emoji_frequency: IndexMap<String, usize>,

    pub good_morning_count: usize,
    pub custom_phrases_count: usize,
    pub my_name_mentions: usize,
    pub target_name_mentions: usize,

    pub active_conversation_days: usize,
    pub first_message_date: Option<String>,
    pub last_message_date: Option<String>,
    /// Calendar days from first to last message, both included. Zero when
    /// there are no messages.
    pub conversation_duration_days: i64,
    pub most_active_day: Option<String>,
    pub most_active_day_count: usize,
    pub messages_by_date: IndexMap<String, usize>,
    pub messages_by_hour: BTreeMap<u32, usize>,

    pub total_photos: usize,
    pub total_videos: usize,
    pub total_audio: usize,
    pub total_reactions: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub group: Option<GroupStats>,
}

impl ConversationStats {
    /// Messages sent by `name` (exact display name).
    pub fn sender_count(&self, name: &str) -> usize {
        self.messages_by_sender.get(name).copied().unwrap_or(0)
    }
}

/// Group-mode additions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub participants_count: usize,
    /// Senders by message count, descending. Equal counts keep the order in
    /// which senders first appeared.
    pub most_active_participants: Vec<(String, usize)>,
    /// `interactions[a][b]`: messages from `a` whose content mentions `b`.
    pub interactions: IndexMap<String, IndexMap<String, usize>>,
}

/// Inclusive calendar-day span between two dates.
pub fn conversation_duration_days(first: NaiveDate, last: NaiveDate) -> i64 {
    (last - first).num_days() + 1
}

/// Computes statistics over `messages`.
///
/// Messages are expected in ingestion order; first and last dates come from
/// the earliest and latest timestamps regardless.
pub fn compute_stats(messages: &[NormalizedMessage], config: &ProcessorConfig) -> ConversationStats {
    let mut stats = ConversationStats {
        total_messages: messages.len(),
        ..ConversationStats::default()
    };

    for msg in messages {
        *stats.messages_by_sender.entry(msg.sender.clone()).or_default() += 1;
        *stats.messages_by_date.entry(msg.date.clone()).or_default() += 1;
        *stats.messages_by_hour.entry(msg.hour()).or_default() += 1;

        stats.total_emojis += msg.emoji_count;
        for emoji in extract_emojis(&msg.content) {
            if !stats.emoji_frequency.contains_key(&emoji) {
                stats.unique_emojis.push(emoji.clone());
            }
            *stats.emoji_frequency.entry(emoji).or_default() += 1;
        }

        stats.good_morning_count += usize::from(msg.is_good_morning);
        stats.custom_phrases_count += usize::from(msg.has_custom_phrase);
        stats.my_name_mentions += usize::from(msg.mentions_my_name);
        stats.target_name_mentions += usize::from(msg.mentions_target_name);

        stats.total_photos += msg.photos.len();
        stats.total_videos += msg.videos.len();
        stats.total_audio += msg.audio.len();
        stats.total_reactions += msg.reactions.len();
    }

    stats.unique_emojis_count = stats.unique_emojis.len();
    stats.active_conversation_days = stats.messages_by_date.len();

    if let Some((day, count)) = most_active(&stats.messages_by_date) {
        stats.most_active_day = Some(day.to_owned());
        stats.most_active_day_count = count;
    }

    let first = messages.iter().min_by_key(|m| m.timestamp);
    let last = messages.iter().max_by_key(|m| m.timestamp);
    if let (Some(first), Some(last)) = (first, last) {
        stats.first_message_date = Some(first.date.clone());
        stats.last_message_date = Some(last.date.clone());
        stats.conversation_duration_days =
            conversation_duration_days(first.local_date(), last.local_date());
    }

    if config.group_chat {
        stats.group = Some(group_stats(messages, &stats.messages_by_sender));
    }

    stats
}

/// First key holding the maximum count.
fn most_active(counts: &IndexMap<String, usize>) -> Option<(&str, usize)> {
    let mut best: Option<(&str, usize)> = None;
    for (key, &count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((key.as_str(), count));
        }
    }
    best
}

fn group_stats(messages: &[NormalizedMessage], by_sender: &IndexMap<String, usize>) -> GroupStats {
    let mut ranked: Vec<(String, usize)> = by_sender
        .iter()
        .map(|(name, count)| (name.clone(), *count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut interactions: IndexMap<String, IndexMap<String, usize>> = by_sender
        .keys()
        .map(|from| {
            let row = by_sender
                .keys()
                .filter(|to| *to != from)
                .map(|to| (to.clone(), 0))
                .collect();
            (from.clone(), row)
        })
        .collect();

    for msg in messages {
        let Some(row) = interactions.get_mut(&msg.sender) else {
            continue;
        };
        for (to, count) in row.iter_mut() {
            if mentions(&msg.content, to) {
                *count += 1;
            }
        }
    }

    GroupStats {
        participants_count: by_sender.len(),
        most_active_participants: ranked,
        interactions,
    }
}
