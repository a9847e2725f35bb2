//! JSON Lines (JSONL) output writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::message::NormalizedMessage;

/// Writes messages to JSONL, one object per line.
///
/// ```jsonl
/// {"sender":"sam","timestamp":"2024-06-15T09:30:00+02:00","content":"Hello",...}
/// {"sender":"alex","timestamp":"2024-06-15T09:31:00+02:00","content":"Hi",...}
/// ```
pub fn write_jsonl(messages: &[NormalizedMessage], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_lines(messages, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Same as [`write_jsonl`], returned as a string.
pub fn to_jsonl(messages: &[NormalizedMessage]) -> Result<String> {
    let mut buf = Vec::new();
    write_lines(messages, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_lines<W: Write>(messages: &[NormalizedMessage], writer: &mut W) -> Result<()> {
    for msg in messages {
        let line = serde_json::to_string(msg)?;
        writeln!(writer, "{line}")?;
    }
    Ok(())
}
