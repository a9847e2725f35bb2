//! Conversation file discovery.
//!
//! An export keeps one folder per conversation under `inbox/`, each holding
//! `message_1.json`, `message_2.json` and so on. [`discover`] walks that tree
//! (or the root itself when there is no `inbox/`), decodes every `*.json`
//! file and keeps the ones that belong to the conversation under analysis.
//!
//! Discovery fails soft. A file that cannot be read, decoded or classified is
//! recorded as a [`FileSkip`] and logged; only an empty final result is an
//! error.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::ProcessorConfig;
use crate::encoding::{DecodeStrategy, read_json_file};
use crate::error::{FileSkip, FileSkipReason, MemoryBookError, Result};
use crate::matcher::{MatchRule, ParticipantMatcher};
use crate::repair::repair_value;

/// Directory the platform's export places conversations in.
const INBOX_DIR: &str = "inbox";

/// Whether files are matched against a target user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One-to-one analysis: files must list the target as a participant.
    Individual,
    /// Every structurally valid file is part of the conversation.
    Group,
}

impl From<&ProcessorConfig> for Mode {
    fn from(config: &ProcessorConfig) -> Self {
        if config.group_chat {
            Mode::Group
        } else {
            Mode::Individual
        }
    }
}

/// An accepted conversation file, decoded and parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationFile {
    pub path: PathBuf,
    pub document: Value,
    pub strategy: DecodeStrategy,
    /// The rule that matched the target. `None` in group mode and when the
    /// unmatched-file fallback accepted the file.
    pub matched_by: Option<MatchRule>,
}

impl ConversationFile {
    /// The raw `messages` records.
    pub fn messages(&self) -> &[Value] {
        self.document
            .get("messages")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Names listed in the `participants` roster.
    pub fn participant_names(&self) -> Vec<String> {
        roster(&self.document)
    }
}

/// The outcome of a discovery pass.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub files: Vec<ConversationFile>,
    pub skipped: Vec<FileSkip>,
}

/// The directory actually searched for `root`.
pub fn search_root(root: &Path) -> PathBuf {
    let inbox = root.join(INBOX_DIR);
    if inbox.is_dir() { inbox } else { root.to_path_buf() }
}

/// Lists candidate `*.json` files under `dir`, recursively, sorted by path.
///
/// Entries that cannot be walked are returned as skips.
pub fn candidate_files(dir: &Path) -> (Vec<PathBuf>, Vec<FileSkip>) {
    let mut files = Vec::new();
    let mut skipped = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_json(entry.path()) => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => skipped.push(FileSkip {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf()),
                reason: FileSkipReason::Unreadable(e.to_string()),
            }),
        }
    }

    files.sort();
    (files, skipped)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Finds every conversation file under `root` for the configured mode.
///
/// # Errors
///
/// Returns [`MemoryBookError::Io`] if `root` does not exist and
/// [`MemoryBookError::EmptyResult`] if no file qualifies.
pub fn discover(root: &Path, config: &ProcessorConfig) -> Result<Discovery> {
    if !root.exists() {
        return Err(MemoryBookError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("data path {} does not exist", root.display()),
        )));
    }

    let dir = search_root(root);
    let matcher = ParticipantMatcher::new(&config.target_user, &config.my_name);
    let (candidates, mut skipped) = candidate_files(&dir);
    for skip in &skipped {
        warn!(path = %skip.path.display(), reason = %skip.reason, "skipping file");
    }

    let mut files = Vec::new();
    for path in candidates {
        let outcome = match read_json_file(&path) {
            Ok(resolved) => {
                classify_document(&path, resolved.value, resolved.strategy, config, &matcher)
            }
            Err(e) if e.is_decode() => Err(FileSkipReason::Undecodable),
            Err(e) => Err(FileSkipReason::Unreadable(e.to_string())),
        };
        match outcome {
            Ok(file) => files.push(file),
            Err(reason) => {
                warn!(path = %path.display(), reason = %reason, "skipping file");
                skipped.push(FileSkip { path, reason });
            }
        }
    }

    info!(
        root = %dir.display(),
        accepted = files.len(),
        skipped = skipped.len(),
        "discovery finished"
    );

    if files.is_empty() {
        return Err(MemoryBookError::empty_result(dir, skipped.len()));
    }
    Ok(Discovery { files, skipped })
}

/// Decides whether a parsed document belongs to the conversation.
///
/// Participant names are repaired before matching when repair is enabled.
///
/// # Errors
///
/// Returns the skip reason when the document has no `messages` array, or, in
/// individual mode, when no participant matches the target and the
/// unmatched-file fallback is disabled.
pub fn classify_document(
    path: &Path,
    mut document: Value,
    strategy: DecodeStrategy,
    config: &ProcessorConfig,
    matcher: &ParticipantMatcher,
) -> std::result::Result<ConversationFile, FileSkipReason> {
    let message_count = document
        .get("messages")
        .and_then(Value::as_array)
        .map(Vec::len)
        .ok_or(FileSkipReason::MissingMessages)?;

    if config.repair_encoding {
        if let Some(participants) = document.get_mut("participants") {
            repair_value(participants);
        }
    }

    let matched_by = match Mode::from(config) {
        Mode::Group => None,
        Mode::Individual => match matcher.roster_contains_target(&roster(&document)) {
            Some(rule) => Some(rule),
            None if config.accept_unmatched_files && message_count > 0 => {
                warn!(
                    path = %path.display(),
                    target = matcher.target(),
                    "no participant matches the target, accepting file anyway"
                );
                None
            }
            None => return Err(FileSkipReason::TargetNotParticipant),
        },
    };

    Ok(ConversationFile {
        path: path.to_path_buf(),
        document,
        strategy,
        matched_by,
    })
}

/// Names in a document's `participants` array. Entries are `{"name": ..}`
/// objects or bare strings.
fn roster(document: &Value) -> Vec<String> {
    document
        .get("participants")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|p| p.get("name").and_then(Value::as_str).or_else(|| p.as_str()))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
