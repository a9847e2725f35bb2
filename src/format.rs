//! Output format selection.
//!
//! # Example
//!
//! ```rust
//! use memorybook::format::OutputFormat;
//!
//! let format = OutputFormat::from_path("messages.jsonl")?;
//! assert_eq!(format, OutputFormat::Jsonl);
//! # Ok::<(), memorybook::MemoryBookError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MemoryBookError, Result};
use crate::message::NormalizedMessage;

/// Output format for the normalized message sequence.
///
/// - [`Json`](OutputFormat::Json) - pretty JSON array, every field
/// - [`Jsonl`](OutputFormat::Jsonl) - one JSON object per line
/// - [`Csv`](OutputFormat::Csv) - semicolon table for spreadsheets
///
/// # Example
///
/// ```rust
/// use memorybook::format::OutputFormat;
/// use std::str::FromStr;
///
/// let format = OutputFormat::from_str("jsonl").unwrap();
/// assert_eq!(format, OutputFormat::Jsonl);
/// assert_eq!(format.extension(), "jsonl");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// JSON array of messages (default)
    #[default]
    Json,

    /// JSON Lines - one JSON object per line. Also known as NDJSON.
    Jsonl,

    /// CSV with semicolon delimiter
    Csv,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    ///
    /// # Example
    ///
    /// ```rust
    /// use memorybook::format::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::Csv.extension(), "csv");
    /// assert_eq!(OutputFormat::Json.extension(), "json");
    /// assert_eq!(OutputFormat::Jsonl.extension(), "jsonl");
    /// ```
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
        }
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["json", "jsonl", "ndjson", "csv"]
    }

    /// Returns all available formats.
    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Json, OutputFormat::Jsonl, OutputFormat::Csv]
    }

    /// Returns the MIME type for this format.
    ///
    /// # Example
    ///
    /// ```rust
    /// use memorybook::format::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::Json.mime_type(), "application/json");
    /// ```
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "text/csv",
            OutputFormat::Json => "application/json",
            OutputFormat::Jsonl => "application/x-ndjson",
        }
    }

    /// Detects format from a file path based on extension.
    ///
    /// # Example
    ///
    /// ```rust
    /// use memorybook::format::OutputFormat;
    ///
    /// let format = OutputFormat::from_path("output.jsonl").unwrap();
    /// assert_eq!(format, OutputFormat::Jsonl);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(MemoryBookError::invalid_format(
                "output",
                format!("Unknown file extension: '.{ext}'. Expected one of: csv, json, jsonl"),
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "CSV"),
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Jsonl => write!(f, "JSONL"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}

/// Writes messages to `path` in the given format.
///
/// # Errors
///
/// Returns an error if the file cannot be written, or if CSV is requested
/// without the `csv-output` feature.
pub fn write_to_format(
    messages: &[NormalizedMessage],
    path: &Path,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => crate::output::write_json(messages, path),
        OutputFormat::Jsonl => crate::output::write_jsonl(messages, path),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::output::write_csv(messages, path),
        #[allow(unreachable_patterns)]
        _ => Err(feature_missing(format)),
    }
}

/// Renders messages to a string in the given format.
pub fn to_format_string(messages: &[NormalizedMessage], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => crate::output::to_json(messages),
        OutputFormat::Jsonl => crate::output::to_jsonl(messages),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::output::to_csv(messages),
        #[allow(unreachable_patterns)]
        _ => Err(feature_missing(format)),
    }
}

#[allow(dead_code)]
fn feature_missing(format: OutputFormat) -> MemoryBookError {
    MemoryBookError::invalid_format(
        "output",
        format!("Output format {format} requires the 'csv-output' feature to be enabled"),
    )
}
