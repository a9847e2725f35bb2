//! Encoding resolution for archive files.
//!
//! Most archives are valid UTF-8, but the platform's own export tooling has
//! produced Latin-1, Windows-1252 and UTF-16 files over the years, as well as
//! UTF-8 files that only parse once a byte-order mark is dropped.
//!
//! [`resolve_json`] probes a fixed list of encodings in order and keeps the
//! first one that both decodes the bytes and parses as JSON. The probe is
//! deterministic; nothing is retried.
//!
//! Latin-1 maps every byte to a character and JSON strings accept C1
//! controls, so any non-UTF-8 file that is well-formed JSON resolves as
//! Latin-1. The Windows-1252 stage stays in the order but is only reached
//! through [`decode_with`]; a Windows-1252 `€` (`0x80`) comes out of
//! [`resolve_json`] as U+0080.
//!
//! ```rust
//! use memorybook::encoding::{DecodeStrategy, TextEncoding, resolve_json};
//!
//! let resolved = resolve_json(br#"{"messages": []}"#)?;
//! assert_eq!(resolved.strategy, DecodeStrategy::Direct(TextEncoding::Utf8));
//! # Ok::<(), memorybook::MemoryBookError>(())
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use encoding_rs::{UTF_16BE, UTF_16LE, WINDOWS_1252};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{MemoryBookError, Result};

const UTF8_BOM_AS_LATIN1: &str = "\u{EF}\u{BB}\u{BF}";

/// A text encoding tried while decoding an archive file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
    Utf16,
}

impl TextEncoding {
    /// Probe order used by [`resolve_json`].
    pub const ALL: [TextEncoding; 4] = [
        TextEncoding::Utf8,
        TextEncoding::Latin1,
        TextEncoding::Windows1252,
        TextEncoding::Utf16,
    ];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Latin1 => "Latin-1",
            TextEncoding::Windows1252 => "Windows-1252",
            TextEncoding::Utf16 => "UTF-16",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a file's bytes were finally turned into JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeStrategy {
    /// Decoded directly with one encoding.
    Direct(TextEncoding),
    /// Recovered by the Latin-1 round trip of [`corrective_decode`].
    Corrective,
}

impl DecodeStrategy {
    pub fn name(self) -> &'static str {
        match self {
            DecodeStrategy::Direct(encoding) => encoding.name(),
            DecodeStrategy::Corrective => "Latin-1 round trip",
        }
    }
}

impl fmt::Display for DecodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsed JSON together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedJson {
    pub value: Value,
    pub strategy: DecodeStrategy,
}

/// Decodes `bytes` with a single encoding.
///
/// Returns `None` when the bytes are malformed for that encoding. Latin-1
/// accepts every byte sequence.
pub fn decode_with(bytes: &[u8], encoding: TextEncoding) -> Option<String> {
    match encoding {
        TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
        TextEncoding::Latin1 => Some(decode_latin1(bytes)),
        TextEncoding::Windows1252 => WINDOWS_1252
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned()),
        TextEncoding::Utf16 => decode_utf16(bytes),
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let (encoding, body) = match encoding_rs::Encoding::for_bom(bytes) {
        Some((enc, bom_len)) if enc == UTF_16LE || enc == UTF_16BE => (enc, &bytes[bom_len..]),
        // Without a BOM the platform writes little-endian.
        _ => (UTF_16LE, bytes),
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
}

/// Final probe: read the bytes as Latin-1, take every character back to its
/// single byte and decode that as UTF-8, ignoring a leading byte-order mark.
///
/// This recovers UTF-8 text that went through a Latin-1 stage in an earlier
/// export pipeline and picked up a BOM on the way.
pub fn corrective_decode(bytes: &[u8]) -> Option<String> {
    let latin1 = decode_latin1(bytes);
    let body = latin1.strip_prefix(UTF8_BOM_AS_LATIN1).unwrap_or(&latin1);
    let reencoded: Vec<u8> = body.chars().map(|c| c as u8).collect();
    String::from_utf8(reencoded).ok()
}

/// Decodes and parses archive bytes.
///
/// # Errors
///
/// Returns [`MemoryBookError::Decode`] (without a path) listing every strategy
/// tried when none yields valid JSON.
pub fn resolve_json(bytes: &[u8]) -> Result<ResolvedJson> {
    let mut attempts = Vec::with_capacity(TextEncoding::ALL.len() + 1);

    for encoding in TextEncoding::ALL {
        attempts.push(encoding.name());
        let Some(text) = decode_with(bytes, encoding) else {
            debug!(encoding = encoding.name(), "bytes are malformed for encoding");
            continue;
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => {
                return Ok(ResolvedJson {
                    value,
                    strategy: DecodeStrategy::Direct(encoding),
                });
            }
            Err(e) => debug!(encoding = encoding.name(), error = %e, "decoded text is not JSON"),
        }
    }

    attempts.push(DecodeStrategy::Corrective.name());
    if let Some(text) = corrective_decode(bytes) {
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            return Ok(ResolvedJson {
                value,
                strategy: DecodeStrategy::Corrective,
            });
        }
    }

    Err(MemoryBookError::decode(None, attempts))
}

/// Reads a file and resolves its JSON.
///
/// # Errors
///
/// I/O failures propagate as [`MemoryBookError::Io`]; decode failures carry
/// the file path.
pub fn read_json_file(path: &Path) -> Result<ResolvedJson> {
    let bytes = fs::read(path)?;
    match resolve_json(&bytes) {
        Ok(resolved) => {
            if resolved.strategy != DecodeStrategy::Direct(TextEncoding::Utf8) {
                info!(path = %path.display(), strategy = %resolved.strategy, "decoded with fallback strategy");
            }
            Ok(resolved)
        }
        Err(MemoryBookError::Decode { attempts, .. }) => {
            Err(MemoryBookError::decode(Some(path.to_path_buf()), attempts))
        }
        Err(e) => Err(e),
    }
}
