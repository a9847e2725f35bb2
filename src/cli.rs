//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure
//! - [`OutputFormat`] - Output format options, convertible to
//!   [`format::OutputFormat`](crate::format::OutputFormat)
//!
//! Flags override values loaded from `--config`, so a shared JSON config can
//! be reused across conversations:
//!
//! ```rust
//! use clap::Parser;
//! use memorybook::cli::Args;
//!
//! let args = Args::parse_from(["memorybook", "export/", "--target-user", "sam", "--my-name", "alex"]);
//! let config = args.to_config()?;
//! assert_eq!(config.target_user, "sam");
//! # Ok::<(), memorybook::MemoryBookError>(())
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::ProcessorConfig;
use crate::error::Result;

/// Default output file stem, completed with the format's extension.
pub const DEFAULT_OUTPUT_STEM: &str = "memorybook_messages";

/// Normalize an Instagram-style chat export into a single, time-ordered
/// message list with conversation statistics.
#[derive(Parser, Debug, Clone)]
#[command(name = "memorybook")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    memorybook ~/instagram_export --target-user sam --my-name alex
    memorybook export/ --target-user sam -f csv -o sam.csv --stats sam_stats.json
    memorybook export/ --group --my-name alex -f jsonl
    memorybook export/ --config memorybook.json -v")]
pub struct Args {
    /// Path to the export root (the folder containing `inbox/`)
    pub data_path: PathBuf,

    /// Display name of the person the conversation is analysed for
    #[arg(long, value_name = "NAME")]
    pub target_user: Option<String>,

    /// Your own display name
    #[arg(long, value_name = "NAME")]
    pub my_name: Option<String>,

    /// Treat every conversation file as one group chat
    #[arg(long)]
    pub group: bool,

    /// JSON configuration file; flags override its values
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Accept files with messages even when the target is not a participant
    #[arg(long)]
    pub allow_unmatched: bool,

    /// Path to output file [default: memorybook_messages.<format>]
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Also write conversation statistics as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub stats: Option<PathBuf>,

    /// Log debug events, including every dropped record
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Builds and validates the processor configuration.
    pub fn to_config(&self) -> Result<ProcessorConfig> {
        let mut config = match &self.config {
            Some(path) => ProcessorConfig::from_file(path)?,
            None => ProcessorConfig::default(),
        };
        if let Some(target) = &self.target_user {
            config.target_user.clone_from(target);
        }
        if let Some(me) = &self.my_name {
            config.my_name.clone_from(me);
        }
        config.group_chat |= self.group;
        config.accept_unmatched_files |= self.allow_unmatched;

        config.validate()?;
        Ok(config)
    }

    /// The output path, defaulting to `memorybook_messages.<ext>`.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let format: crate::format::OutputFormat = self.format.into();
            PathBuf::from(format!("{DEFAULT_OUTPUT_STEM}.{}", format.extension()))
        })
    }

    /// Default `tracing` filter directive for the chosen verbosity.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "memorybook=debug"
        } else {
            "memorybook=info"
        }
    }
}

/// Output format options.
///
/// - [`Json`](OutputFormat::Json) - Structured array with every field
/// - [`Jsonl`](OutputFormat::Jsonl) - One JSON per line
/// - [`Csv`](OutputFormat::Csv) - Semicolon table for spreadsheets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON array of messages (default)
    #[default]
    Json,

    /// JSON Lines - one JSON object per line
    #[value(alias = "ndjson")]
    Jsonl,

    /// CSV with semicolon delimiter
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::format::OutputFormat::from(*self))
    }
}

// Conversion to library format type
impl From<OutputFormat> for crate::format::OutputFormat {
    fn from(format: OutputFormat) -> crate::format::OutputFormat {
        match format {
            OutputFormat::Csv => crate::format::OutputFormat::Csv,
            OutputFormat::Json => crate::format::OutputFormat::Json,
            OutputFormat::Jsonl => crate::format::OutputFormat::Jsonl,
        }
    }
}
