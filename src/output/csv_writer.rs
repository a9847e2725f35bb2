//! CSV output writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::message::NormalizedMessage;

const HEADER: [&str; 9] = [
    "Date", "Time", "Sender", "Content", "Emojis", "Reactions", "Photos", "Videos", "Audio",
];

/// Writes messages to CSV with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - Columns: `Date`, `Time`, `Sender`, `Content`, `Emojis`, `Reactions`,
///   `Photos`, `Videos`, `Audio`
/// - List cells are joined with `|`; reactions render as `glyph:actor`
/// - Encoding: UTF-8
pub fn write_csv(messages: &[NormalizedMessage], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_records(messages, file)
}

/// Same as [`write_csv`], returned as a string.
pub fn to_csv(messages: &[NormalizedMessage]) -> Result<String> {
    let mut buf = Vec::new();
    write_records(messages, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_records<W: Write>(messages: &[NormalizedMessage], out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(out);
    writer.write_record(HEADER)?;
    for msg in messages {
        writer.write_record(build_record(msg))?;
    }
    writer.flush()?;
    Ok(())
}

fn build_record(msg: &NormalizedMessage) -> [String; 9] {
    let reactions = msg
        .reactions
        .iter()
        .map(|r| format!("{}:{}", r.reaction, r.actor))
        .collect::<Vec<_>>()
        .join("|");
    [
        msg.date.clone(),
        msg.time.clone(),
        msg.sender.clone(),
        msg.content.clone(),
        msg.emojis.join(""),
        reactions,
        msg.photos.join("|"),
        msg.videos.join("|"),
        msg.audio.join("|"),
    ]
}
