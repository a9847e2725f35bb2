//! # memorybook
//!
//! A Rust library for turning an Instagram-style chat archive into a single,
//! time-ordered list of normalized messages plus conversation statistics.
//!
//! ## Overview
//!
//! A data download is a directory tree of per-conversation JSON files. They
//! are often written in an unknown encoding, names and text are frequently
//! mojibake (UTF-8 bytes read back as Latin-1), and media references come in
//! several layouts. The pipeline:
//!
//! 1. **Discovery** finds conversation files under `<root>/inbox` and keeps
//!    those relevant to the target user (or all of them in group mode)
//! 2. **Decoding** tries several encodings plus a corrective re-read
//! 3. **Normalization** repairs text, parses timestamps, extracts emoji and
//!    reactions, and classifies attachments into photos, videos and audio
//! 4. **Aggregation** sorts messages stably by time and computes
//!    [`ConversationStats`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use memorybook::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = ProcessorConfig::for_target("friend_username", "your_username");
//!     let result = ingest("instagram_export".as_ref(), &config)?;
//!
//!     println!("{} messages over {} days",
//!         result.stats.total_messages,
//!         result.stats.conversation_duration_days);
//!
//!     write_json(&result.messages, "messages.json".as_ref())?;
//!     write_stats_json(&result.stats, "stats.json".as_ref())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`ingest`](mod@ingest) — The pipeline entry point ([`ingest()`], [`Ingestion`])
//! - [`discovery`] — Locating and accepting conversation files
//! - [`encoding`] — Multi-encoding decode with corrective fallback
//! - [`repair`] — Mojibake repair and HTML unescaping
//! - [`normalize`] — Raw record → [`NormalizedMessage`], attachment classification
//! - [`matcher`] — Fuzzy display-name matching
//! - [`text`] — Emoji extraction, phrase and mention detection
//! - [`stats`] — [`ConversationStats`] and group metrics
//! - [`output`] / [`format`] — JSON, JSONL and CSV writers
//! - [`config`] — [`ProcessorConfig`]
//! - [`error`] — [`MemoryBookError`], [`Result`] and skip reasons
//! - [`prelude`] — Convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod discovery;
pub mod encoding;
pub mod error;
pub mod format;
pub mod ingest;
pub mod matcher;
pub mod message;
pub mod normalize;
pub mod output;
pub mod repair;
pub mod stats;
pub mod text;

// Re-export the main types at the crate root for convenience
pub use config::ProcessorConfig;
pub use error::{MemoryBookError, Result};
pub use ingest::{Ingestion, ingest};
pub use message::{NormalizedMessage, Reaction};
pub use stats::ConversationStats;

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use memorybook::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::config::ProcessorConfig;
    pub use crate::message::{NormalizedMessage, Reaction};
    pub use crate::stats::{ConversationStats, GroupStats};

    // Error types
    pub use crate::error::{FileSkip, FileSkipReason, MemoryBookError, RecordSkip, RecordSkipReason, Result};

    // Pipeline
    pub use crate::ingest::{Ingestion, ParticipantSet, ingest};

    // Output (file writers and string converters)
    #[cfg(feature = "csv-output")]
    pub use crate::output::{to_csv, write_csv};
    pub use crate::output::{to_json, to_jsonl, write_json, write_jsonl, write_stats_json};

    pub use crate::format::{OutputFormat, write_to_format};
}
