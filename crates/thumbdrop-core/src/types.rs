//! Shared types for the thumbdrop upload model.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// MIME type used when a file's extension is unknown.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Image extensions recognised by [`mime_from_name`], with their MIME types.
const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("avif", "image/avif"),
];

/// Infer a MIME type from a filename's extension (case-insensitive).
///
/// Falls back to [`FALLBACK_MIME`] for unknown or missing extensions.
#[must_use]
pub fn mime_from_name(name: &str) -> &'static str {
    name.rsplit_once('.')
        .and_then(|(_, ext)| {
            IMAGE_EXTENSIONS
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        })
        .map_or(FALLBACK_MIME, |&(_, mime)| mime)
}

/// A file the user selected, as handed to the completion callback.
///
/// Contents are reference counted so handles clone cheaply between
/// batch snapshots. A handle made by [`FileHandle::declared`] carries
/// only the platform's metadata until [`FileHandle::with_contents`]
/// attaches the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    name: String,
    mime_type: String,
    size: u64,
    contents: Arc<[u8]>,
}

impl FileHandle {
    /// Create a handle, inferring the MIME type from the file extension.
    #[must_use]
    pub fn new(name: impl Into<String>, contents: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let mime_type = mime_from_name(&name).to_owned();
        Self::with_mime_type(name, mime_type, contents)
    }

    /// Create a handle with an explicit MIME type.
    #[must_use]
    pub fn with_mime_type(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        contents: impl Into<Arc<[u8]>>,
    ) -> Self {
        let contents = contents.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: byte_len(&contents),
            contents,
        }
    }

    /// Create a handle from platform metadata alone, before any bytes
    /// have been read.
    ///
    /// The platform's content type wins when it has one; an absent or
    /// empty type is inferred from the extension.
    #[must_use]
    pub fn declared(name: impl Into<String>, content_type: Option<&str>, size: u64) -> Self {
        let name = name.into();
        let mime_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| mime_from_name(&name))
            .to_owned();
        Self {
            name,
            mime_type,
            size,
            contents: Arc::from(Vec::new()),
        }
    }

    /// The same file with its bytes attached. The size becomes the
    /// length of `contents`.
    #[must_use]
    pub fn with_contents(self, contents: impl Into<Arc<[u8]>>) -> Self {
        let contents = contents.into();
        Self {
            size: byte_len(&contents),
            contents,
            ..self
        }
    }

    /// The original filename.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared or inferred MIME type.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Raw file bytes. Empty until read.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// File size in bytes, as read or as declared by the platform.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }
}

fn byte_len(bytes: &[u8]) -> u64 {
    u64::try_from(bytes.len()).unwrap_or(u64::MAX)
}

/// Encoded, displayable representation of a file (a `data:` URL).
///
/// Backed by `Arc<str>`: previews can be megabytes long and are cloned
/// with every batch snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewData(Arc<str>);

impl PreviewData {
    /// Wrap an already-encoded URL.
    #[must_use]
    pub fn new(url: impl Into<Arc<str>>) -> Self {
        Self(url.into())
    }

    /// The URL, suitable for an `<img src>`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the URL in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the URL is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PreviewData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome status of an entry.
///
/// Loading entries are always [`EntryStatus::Ok`]; only a failed
/// preview job moves an entry to [`EntryStatus::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Loading, or loaded with a preview.
    Ok,
    /// Preview generation failed.
    Error,
}

impl EntryStatus {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Identity of the preview job allowed to settle an entry.
///
/// A fresh ticket is issued every time an entry is (re)created, so a
/// job started for an earlier entry of the same name cannot settle the
/// current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub(crate) u64);

impl Ticket {
    /// Raw ticket number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tracked state for one selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub(crate) name: String,
    pub(crate) file: FileHandle,
    pub(crate) preview: Option<PreviewData>,
    pub(crate) status: EntryStatus,
    pub(crate) is_loading: bool,
    pub(crate) ticket: Ticket,
}

impl FileEntry {
    /// A freshly selected entry: loading, no preview.
    pub(crate) const fn loading(name: String, file: FileHandle, ticket: Ticket) -> Self {
        Self {
            name,
            file,
            preview: None,
            status: EntryStatus::Ok,
            is_loading: true,
            ticket,
        }
    }

    /// Key of this entry within its batch.
    ///
    /// Usually the file's name; differs only when the entry was renamed
    /// under [`ConflictPolicy::Rename`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type of the underlying file.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        self.file.mime_type()
    }

    /// The underlying file handle.
    #[must_use]
    pub const fn file(&self) -> &FileHandle {
        &self.file
    }

    /// Encoded preview, once loaded successfully.
    #[must_use]
    pub const fn preview(&self) -> Option<&PreviewData> {
        self.preview.as_ref()
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> EntryStatus {
        self.status
    }

    /// Whether the preview job has not settled yet.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Ticket of the job allowed to settle this entry.
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        self.ticket
    }
}

/// Which files the uploader accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptFilter {
    /// Only `image/*` files.
    #[default]
    Images,
    /// Any file.
    Any,
}

impl AcceptFilter {
    /// Whether `file` passes the filter.
    #[must_use]
    pub fn matches(self, file: &FileHandle) -> bool {
        match self {
            Self::Images => file.mime_type().starts_with("image/"),
            Self::Any => true,
        }
    }

    /// Value for the picker's `accept` attribute.
    #[must_use]
    pub const fn input_accept(self) -> &'static str {
        match self {
            Self::Images => "image/*",
            Self::Any => "",
        }
    }
}

/// What happens when a selected file's name is already in the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Replace the existing entry in place and restart its loading.
    #[default]
    Replace,
    /// Keep the existing entry and reject the new file.
    Reject,
    /// Keep both, inserting the new file as `stem (n).ext`.
    Rename,
}

/// Uploader configuration.
///
/// Hosts may ship this as JSON; missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploaderConfig {
    /// Allow selecting more than one file at a time.
    pub multiple: bool,

    /// Artificial delay applied before a successful preview settles,
    /// in milliseconds. Stands in for network latency; nothing is
    /// transferred.
    pub latency_ms: u64,

    /// File type restriction, applied to picker and drop alike.
    pub accept: AcceptFilter,

    /// Name collision handling.
    pub on_conflict: ConflictPolicy,
}

impl UploaderConfig {
    /// Default for [`multiple`](Self::multiple).
    pub const DEFAULT_MULTIPLE: bool = false;
    /// Default for [`latency_ms`](Self::latency_ms).
    pub const DEFAULT_LATENCY_MS: u64 = 3000;

    /// The artificial latency as a [`Duration`].
    #[must_use]
    pub const fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            multiple: Self::DEFAULT_MULTIPLE,
            latency_ms: Self::DEFAULT_LATENCY_MS,
            accept: AcceptFilter::default(),
            on_conflict: ConflictPolicy::default(),
        }
    }
}
