//! The ingestion pipeline.
//!
//! [`ingest`] is a pure function from an export directory and a
//! [`ProcessorConfig`] to an [`Ingestion`]: discovery, decoding, repair,
//! normalization, sorting and statistics in one synchronous pass. Nothing is
//! kept between calls, so running it twice on the same input gives the same
//! result.
//!
//! ```rust,no_run
//! use memorybook::config::ProcessorConfig;
//! use memorybook::ingest::ingest;
//!
//! let config = ProcessorConfig::for_target("friend_username", "your_username");
//! let result = ingest("instagram_export".as_ref(), &config)?;
//! println!("{} messages", result.messages.len());
//! # Ok::<(), memorybook::MemoryBookError>(())
//! ```

use std::path::Path;

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ProcessorConfig;
use crate::discovery::{ConversationFile, discover};
use crate::error::{FileSkip, RecordSkip, Result};
use crate::message::NormalizedMessage;
use crate::normalize::Normalizer;
use crate::stats::{ConversationStats, compute_stats};

/// Distinct sender names, in order of first appearance.
///
/// The set only grows while ingestion runs and is handed out read-only once
/// it completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParticipantSet {
    names: IndexSet<String>,
}

impl ParticipantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name`, returning `true` if it was not present.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_owned())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// The current names as an owned list.
    pub fn snapshot(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }
}

/// Everything one ingestion run produces.
#[derive(Debug, Clone)]
pub struct Ingestion {
    /// Messages in non-decreasing timestamp order. Ties keep file order, then
    /// record order.
    pub messages: Vec<NormalizedMessage>,
    pub participants: ParticipantSet,
    pub stats: ConversationStats,
    pub skipped_files: Vec<FileSkip>,
    pub skipped_records: Vec<RecordSkip>,
}

/// Discovers and ingests every conversation file under `root`.
///
/// # Errors
///
/// Fails on an invalid configuration, a missing `root`, or when no file
/// qualifies ([`MemoryBookError::EmptyResult`](crate::MemoryBookError::EmptyResult)).
pub fn ingest(root: &Path, config: &ProcessorConfig) -> Result<Ingestion> {
    config.validate()?;
    let discovery = discover(root, config)?;
    let mut ingestion = ingest_documents(&discovery.files, config)?;
    ingestion.skipped_files = discovery.skipped;
    Ok(ingestion)
}

/// Ingests already discovered files.
///
/// Records that are not well-formed messages are dropped and listed in
/// [`Ingestion::skipped_records`].
///
/// # Errors
///
/// Fails when `config` does not pass [`ProcessorConfig::validate`].
pub fn ingest_documents(files: &[ConversationFile], config: &ProcessorConfig) -> Result<Ingestion> {
    let normalizer = Normalizer::new(config)?;
    let mut participants = ParticipantSet::new();
    let mut messages = Vec::new();
    let mut skipped_records = Vec::new();
    // Built only in group mode, where every message carries it.
    let mut snapshot: Vec<String> = Vec::new();

    for file in files {
        for (index, record) in file.messages().iter().enumerate() {
            match normalizer.normalize(record, &snapshot) {
                Ok(mut msg) => {
                    if participants.insert(&msg.sender) && config.group_chat {
                        snapshot = participants.snapshot();
                        msg.all_participants = Some(snapshot.clone());
                    }
                    messages.push(msg);
                }
                Err(reason) => {
                    debug!(file = %file.path.display(), index, %reason, "dropping record");
                    skipped_records.push(RecordSkip {
                        file: file.path.clone(),
                        index,
                        reason,
                    });
                }
            }
        }
    }

    // sort_by_key is stable
    messages.sort_by_key(|m| m.timestamp);

    let stats = compute_stats(&messages, config);

    info!(
        files = files.len(),
        messages = messages.len(),
        participants = participants.len(),
        dropped_records = skipped_records.len(),
        "ingestion finished"
    );

    Ok(Ingestion {
        messages,
        participants,
        stats,
        skipped_files: Vec::new(),
        skipped_records,
    })
}
