//! Report writers.
//!
//! Writers are pure consumers of the ingestion result: they never modify the
//! messages and apply only the escaping their format needs.
//!
//! - [`write_json`] / [`to_json`]: pretty JSON array of messages
//! - [`write_jsonl`] / [`to_jsonl`]: one JSON message per line
//! - [`write_csv`] / [`to_csv`]: semicolon CSV, one row per message (requires `csv-output`)
//! - [`write_stats_json`]: the [`ConversationStats`](crate::stats::ConversationStats) snapshot
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> memorybook::Result<()> {
//! use memorybook::config::ProcessorConfig;
//! use memorybook::ingest::ingest;
//! use memorybook::output::{write_jsonl, write_stats_json};
//!
//! let result = ingest("export".as_ref(), &ProcessorConfig::for_target("sam", "alex"))?;
//! write_jsonl(&result.messages, "messages.jsonl".as_ref())?;
//! write_stats_json(&result.stats, "stats.json".as_ref())?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
mod json_writer;
mod jsonl_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_csv, write_csv};
pub use json_writer::{to_json, to_stats_json, write_json, write_stats_json};
pub use jsonl_writer::{to_jsonl, write_jsonl};
