//! JSON output writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::message::NormalizedMessage;
use crate::stats::ConversationStats;

/// Writes messages to a file as a pretty-printed JSON array.
///
/// # Format
/// ```json
/// [
///   {"sender": "sam", "timestamp": "2024-06-15T09:30:00+02:00", "date": "2024-06-15", ...},
///   {"sender": "alex", ...}
/// ]
/// ```
pub fn write_json(messages: &[NormalizedMessage], path: &Path) -> Result<()> {
    let json = to_json(messages)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Same as [`write_json`], returned as a string.
pub fn to_json(messages: &[NormalizedMessage]) -> Result<String> {
    Ok(serde_json::to_string_pretty(messages)?)
}

/// Writes the statistics snapshot as pretty-printed JSON.
pub fn write_stats_json(stats: &ConversationStats, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, stats)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Same as [`write_stats_json`], returned as a string.
pub fn to_stats_json(stats: &ConversationStats) -> Result<String> {
    Ok(serde_json::to_string_pretty(stats)?)
}
