//! Attachment schema reconciliation.
//!
//! Export versions have recorded media under six different shapes. Each shape
//! is an [`AttachmentSource`] and is scanned in this fixed order:
//!
//! | Source | Keys | Kind decided by |
//! |--------|------|-----------------|
//! | `TypedArray` | `photos`, `videos`, `audio_files` | key |
//! | `DataArray` | `photos_data`, `photo_data`, `videos_data`, `video_data`, `audio_data`, `audio_files_data` | key |
//! | `Image` | `image` | key (always a photo) |
//! | `Attachment` | `attachments` | `type` field, else keyword in the serialized entry |
//! | `File` | `files` | `file_type` field, else file extension |
//! | `VoiceMessage` | `voice_messages` | key (always audio) |
//!
//! The scan never stops early: a record carrying both a legacy and a modern
//! field yields one reference per occurrence. [`reconcile`] then flattens the
//! references into a [`MediaSet`].

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Sub-keys that may hold an attachment location, in priority order.
const LOCATION_KEYS: [&str; 3] = ["uri", "path", "filename"];

const TYPED_ARRAYS: [(&str, MediaKind); 3] = [
    ("photos", MediaKind::Photo),
    ("videos", MediaKind::Video),
    ("audio_files", MediaKind::Audio),
];

const DATA_ARRAYS: [(&str, MediaKind); 6] = [
    ("photos_data", MediaKind::Photo),
    ("photo_data", MediaKind::Photo),
    ("videos_data", MediaKind::Video),
    ("video_data", MediaKind::Video),
    ("audio_data", MediaKind::Audio),
    ("audio_files_data", MediaKind::Audio),
];

/// Keywords searched in a serialized attachment, in priority order.
const KEYWORDS: [(&str, MediaKind); 5] = [
    ("photo", MediaKind::Photo),
    ("image", MediaKind::Photo),
    ("video", MediaKind::Video),
    ("audio", MediaKind::Audio),
    ("voice", MediaKind::Audio),
];

const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic", "bmp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "3gp", "m4v"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "aac", "wav", "ogg", "opus", "amr", "flac"];

/// The kind of media an attachment holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
}

impl MediaKind {
    /// Maps a type discriminator such as `"photo"`, `"Image"` or
    /// `"voice_message"` to a kind.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(keyword, _)| name.contains(keyword))
            .map(|(_, kind)| *kind)
    }

    /// Infers a kind from the file extension of `uri`.
    pub fn from_extension(uri: &str) -> Option<Self> {
        let file_name = uri.rsplit(['/', '\\']).next().unwrap_or(uri);
        let (_, ext) = file_name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        if PHOTO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Photo)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Audio)
        } else {
            None
        }
    }
}

/// The schema shape an attachment was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentSource {
    TypedArray,
    DataArray,
    Image,
    Attachment,
    File,
    VoiceMessage,
}

/// How the kind of an attachment was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifiedBy {
    /// The field the attachment sits in determines the kind.
    Location,
    /// An explicit `type` or `file_type` discriminator.
    TypeField,
    /// Last resort: a type keyword in the serialized entry.
    Keyword,
    /// Last resort: the file extension.
    Extension,
}

/// One attachment occurrence, flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentRef {
    pub kind: MediaKind,
    pub uri: String,
    pub source: AttachmentSource,
    pub classified_by: ClassifiedBy,
}

/// Reconciled attachment URIs, one list per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaSet {
    pub photos: Vec<String>,
    pub videos: Vec<String>,
    pub audio: Vec<String>,
}

impl MediaSet {
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty() && self.videos.is_empty() && self.audio.is_empty()
    }

    pub fn len(&self) -> usize {
        self.photos.len() + self.videos.len() + self.audio.len()
    }

    fn list(&self, kind: MediaKind) -> &Vec<String> {
        match kind {
            MediaKind::Photo => &self.photos,
            MediaKind::Video => &self.videos,
            MediaKind::Audio => &self.audio,
        }
    }

    fn list_mut(&mut self, kind: MediaKind) -> &mut Vec<String> {
        match kind {
            MediaKind::Photo => &mut self.photos,
            MediaKind::Video => &mut self.videos,
            MediaKind::Audio => &mut self.audio,
        }
    }
}

/// Returns the location held by an attachment entry.
///
/// An entry is either a bare string or an object with `uri`, `path` or
/// `filename`, possibly nested one level down under `data`.
fn location(entry: &Value) -> Option<&str> {
    match entry {
        Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
        Value::Object(map) => direct_location(map).or_else(|| {
            map.get("data")
                .and_then(Value::as_object)
                .and_then(direct_location)
        }),
        _ => None,
    }
}

fn direct_location(map: &Map<String, Value>) -> Option<&str> {
    LOCATION_KEYS
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
}

fn entries<'a>(record: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    record
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Collects every attachment reference in `record`, in scan order.
///
/// Entries with no location, or whose kind cannot be decided, are skipped
/// with a debug event. They never cause the record itself to be dropped.
pub fn collect_attachments(record: &Map<String, Value>) -> Vec<AttachmentRef> {
    let mut refs = Vec::new();

    for (key, kind) in TYPED_ARRAYS {
        for entry in entries(record, key) {
            push_located(&mut refs, entry, kind, AttachmentSource::TypedArray);
        }
    }

    for (key, kind) in DATA_ARRAYS {
        for entry in entries(record, key) {
            push_located(&mut refs, entry, kind, AttachmentSource::DataArray);
        }
    }

    if let Some(image) = record.get("image") {
        push_located(&mut refs, image, MediaKind::Photo, AttachmentSource::Image);
    }

    for entry in entries(record, "attachments") {
        if let Some(found) = classify_attachment(entry) {
            refs.push(found);
        }
    }

    for entry in entries(record, "files") {
        if let Some(found) = classify_file(entry) {
            refs.push(found);
        }
    }

    for entry in entries(record, "voice_messages") {
        push_located(
            &mut refs,
            entry,
            MediaKind::Audio,
            AttachmentSource::VoiceMessage,
        );
    }

    refs
}

fn push_located(
    refs: &mut Vec<AttachmentRef>,
    entry: &Value,
    kind: MediaKind,
    source: AttachmentSource,
) {
    match location(entry) {
        Some(uri) => refs.push(AttachmentRef {
            kind,
            uri: uri.to_owned(),
            source,
            classified_by: ClassifiedBy::Location,
        }),
        None => debug!(?source, "attachment entry without a location"),
    }
}

fn classify_attachment(entry: &Value) -> Option<AttachmentRef> {
    let Some(uri) = location(entry) else {
        debug!("attachment entry without a location");
        return None;
    };

    let typed = entry
        .get("type")
        .and_then(Value::as_str)
        .and_then(MediaKind::from_type_name)
        .map(|kind| (kind, ClassifiedBy::TypeField));

    let classified = typed.or_else(|| {
        let serialized = entry.to_string().to_lowercase();
        KEYWORDS
            .iter()
            .find(|(keyword, _)| serialized.contains(keyword))
            .map(|(_, kind)| (*kind, ClassifiedBy::Keyword))
    });

    match classified {
        Some((kind, classified_by)) => Some(AttachmentRef {
            kind,
            uri: uri.to_owned(),
            source: AttachmentSource::Attachment,
            classified_by,
        }),
        None => {
            debug!(uri, "unrecognized attachment type");
            None
        }
    }
}

fn classify_file(entry: &Value) -> Option<AttachmentRef> {
    let Some(uri) = location(entry) else {
        debug!("file entry without a location");
        return None;
    };

    let classified = entry
        .get("file_type")
        .and_then(Value::as_str)
        .and_then(MediaKind::from_type_name)
        .map(|kind| (kind, ClassifiedBy::TypeField))
        .or_else(|| MediaKind::from_extension(uri).map(|kind| (kind, ClassifiedBy::Extension)));

    match classified {
        Some((kind, classified_by)) => Some(AttachmentRef {
            kind,
            uri: uri.to_owned(),
            source: AttachmentSource::File,
            classified_by,
        }),
        None => {
            debug!(uri, "file is not a known media type");
            None
        }
    }
}

/// Flattens references into per-kind URI lists.
///
/// Repeated occurrences within a kind are all kept. A URI already assigned to
/// one kind is never added to another, so the first reference decides.
pub fn reconcile(refs: impl IntoIterator<Item = AttachmentRef>) -> MediaSet {
    let mut media = MediaSet::default();
    for attachment in refs {
        let claimed_elsewhere = [MediaKind::Photo, MediaKind::Video, MediaKind::Audio]
            .into_iter()
            .filter(|kind| *kind != attachment.kind)
            .any(|kind| media.list(kind).contains(&attachment.uri));
        if claimed_elsewhere {
            debug!(uri = %attachment.uri, kind = ?attachment.kind, "URI already assigned to another media kind");
            continue;
        }
        media.list_mut(attachment.kind).push(attachment.uri);
    }
    media
}
