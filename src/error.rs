//! Unified error types for memorybook.
//!
//! This module provides a single [`MemoryBookError`] enum covering every
//! failure that can reach a caller, plus the skip reasons recorded when a
//! file or a single record contributes nothing to the result.
//!
//! # Error Handling Philosophy
//!
//! - **Files** that cannot be read, decoded or classified are skipped and
//!   reported as [`FileSkip`], never as errors.
//! - **Records** that are not well-formed messages are dropped and reported
//!   as [`RecordSkip`].
//! - **Text repair** failures keep the original text and are not reported.
//! - Only pipeline-level conditions such as [`MemoryBookError::EmptyResult`]
//!   and I/O on explicitly requested paths surface as errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// A specialized [`Result`] type for memorybook operations.
///
/// # Example
///
/// ```rust
/// use memorybook::error::Result;
/// use memorybook::NormalizedMessage;
///
/// fn load() -> Result<Vec<NormalizedMessage>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, MemoryBookError>;

/// The error type for all memorybook operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MemoryBookError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The data directory or config file doesn't exist
    /// - Permission denied
    /// - Disk is full (when writing output)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing/serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No supported encoding produced parseable JSON.
    #[error("Could not decode{}: tried {}", path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default(), attempts.join(", "))]
    Decode {
        /// The file path, if available
        path: Option<PathBuf>,
        /// Names of the strategies that were tried, in order
        attempts: Vec<&'static str>,
    },

    /// The input doesn't match the expected structure.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was expected
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// The processor configuration was rejected.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong
        message: String,
    },

    /// Discovery found no conversation file that qualifies.
    ///
    /// Returned instead of computing statistics over no data.
    #[error("No conversation files found under {} ({skipped} skipped)", root.display())]
    EmptyResult {
        /// The directory that was searched
        root: PathBuf,
        /// How many candidate files were rejected
        skipped: usize,
    },
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl MemoryBookError {
    /// Creates a decode error.
    pub fn decode(path: Option<PathBuf>, attempts: Vec<&'static str>) -> Self {
        MemoryBookError::Decode { path, attempts }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        MemoryBookError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        MemoryBookError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates the empty-result signal.
    pub fn empty_result(root: impl Into<PathBuf>, skipped: usize) -> Self {
        MemoryBookError::EmptyResult {
            root: root.into(),
            skipped,
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, MemoryBookError::Io(_))
    }

    /// Returns `true` if this is a decode error.
    pub fn is_decode(&self) -> bool {
        matches!(self, MemoryBookError::Decode { .. })
    }

    /// Returns `true` if this is an invalid configuration error.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, MemoryBookError::InvalidConfig { .. })
    }

    /// Returns `true` if discovery produced nothing to ingest.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, MemoryBookError::EmptyResult { .. })
    }
}

// ============================================================================
// Skip reasons
// ============================================================================

/// Why a candidate file contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FileSkipReason {
    /// The file could not be read.
    Unreadable(String),
    /// No supported encoding produced parseable JSON.
    Undecodable,
    /// The document has no `messages` array.
    MissingMessages,
    /// Individual mode: no participant matched the target user.
    TargetNotParticipant,
}

impl fmt::Display for FileSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSkipReason::Unreadable(e) => write!(f, "unreadable: {e}"),
            FileSkipReason::Undecodable => write!(f, "no supported encoding yields valid JSON"),
            FileSkipReason::MissingMessages => write!(f, "no messages array"),
            FileSkipReason::TargetNotParticipant => write!(f, "target user is not a participant"),
        }
    }
}

/// A skipped file and the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSkip {
    pub path: PathBuf,
    pub reason: FileSkipReason,
}

impl fmt::Display for FileSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Why a raw record was not turned into a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RecordSkipReason {
    /// The record is not a JSON object.
    NotAnObject,
    /// Neither `sender_name` nor `sender` holds a non-empty string.
    MissingSender,
    /// Neither `timestamp_ms` nor `timestamp` holds a number.
    MissingTimestamp,
    /// The timestamp is present but not a representable instant.
    InvalidTimestamp(i64),
}

impl fmt::Display for RecordSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSkipReason::NotAnObject => write!(f, "record is not an object"),
            RecordSkipReason::MissingSender => write!(f, "missing sender"),
            RecordSkipReason::MissingTimestamp => write!(f, "missing timestamp"),
            RecordSkipReason::InvalidTimestamp(ms) => write!(f, "invalid timestamp {ms}"),
        }
    }
}

/// A dropped record, located by file and position in its `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSkip {
    pub file: PathBuf,
    pub index: usize,
    pub reason: RecordSkipReason,
}

impl fmt::Display for RecordSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [message #{}]: {}",
            self.file.display(),
            self.index,
            self.reason
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
