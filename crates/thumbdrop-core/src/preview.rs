//! Preview generation: file bytes to an inline `data:` URL.
//!
//! Raster formats are identified by their magic bytes rather than the
//! declared MIME type, so a renamed file still previews correctly and a
//! non-image with an image extension fails cleanly.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::types::{FileHandle, PreviewData, Ticket};

/// MIME type for SVG documents.
const SVG_MIME: &str = "image/svg+xml";

/// How far into an SVG file to look for the root element.
const SVG_SNIFF_LEN: usize = 1024;

/// Errors that can occur while generating a preview.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    /// The file has no contents (or could not be read).
    #[error("file is empty")]
    Empty,

    /// The bytes are not a recognised image format.
    #[error("unrecognized image data (declared as {mime})")]
    UnrecognizedFormat {
        /// MIME type the file was declared or inferred as.
        mime: String,
    },
}

/// Encode a file's bytes as a `data:` URL for inline display.
///
/// Stricter than a plain bytes-to-data-URL conversion: empty input and
/// bytes that are not a recognisable image are errors rather than
/// URLs the browser cannot render.
///
/// # Errors
///
/// Returns [`PreviewError::Empty`] if `bytes` is empty.
/// Returns [`PreviewError::UnrecognizedFormat`] if the bytes are neither
/// a raster format known to the `image` crate nor an SVG document.
pub fn encode(bytes: &[u8], declared_mime: &str) -> Result<PreviewData, PreviewError> {
    if bytes.is_empty() {
        return Err(PreviewError::Empty);
    }

    let mime = match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type(),
        Err(_) if declared_mime == SVG_MIME && looks_like_svg(bytes) => SVG_MIME,
        Err(_) => {
            return Err(PreviewError::UnrecognizedFormat {
                mime: declared_mime.to_owned(),
            });
        }
    };

    Ok(PreviewData::new(data_url(mime, bytes)))
}

/// Build `data:<mime>;base64,<payload>`.
fn data_url(mime: &str, bytes: &[u8]) -> String {
    let prefix = format!("data:{mime};base64,");
    let mut url = String::with_capacity(prefix.len() + bytes.len().div_ceil(3) * 4);
    url.push_str(&prefix);
    STANDARD.encode_string(bytes, &mut url);
    url
}

/// Whether the head of `bytes` contains an `<svg` root element.
fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_LEN)];
    head.windows(4).any(|w| w.eq_ignore_ascii_case(b"<svg"))
}

/// A pending preview job for one entry.
///
/// Produced by [`Batch::select`](crate::Batch::select). Attach the
/// file's bytes if they were not read up front, run it (off the event
/// handler), wait [`PreviewOutcome::delay`], then feed the outcome to
/// [`Batch::settle`](crate::Batch::settle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewJob {
    pub(crate) name: String,
    pub(crate) ticket: Ticket,
    pub(crate) file: FileHandle,
    pub(crate) source: usize,
}

impl PreviewJob {
    /// Entry name this job settles.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ticket of the entry this job was started for.
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// The file being previewed.
    #[must_use]
    pub const fn file(&self) -> &FileHandle {
        &self.file
    }

    /// Position of this job's file among the files passed to
    /// [`Batch::select`](crate::Batch::select).
    #[must_use]
    pub const fn source(&self) -> usize {
        self.source
    }

    /// Attach bytes read after selection.
    #[must_use]
    pub fn with_contents(self, contents: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file: self.file.with_contents(contents),
            ..self
        }
    }

    /// Encode the file.
    ///
    /// A job whose bytes were never attached fails as
    /// [`PreviewError::Empty`].
    #[must_use]
    pub fn run(self) -> PreviewOutcome {
        let result = encode(self.file.contents(), self.file.mime_type());
        if let Err(ref e) = result {
            tracing::warn!(name = %self.name, ticket = %self.ticket, "preview failed: {e}");
        }
        PreviewOutcome {
            name: self.name,
            ticket: self.ticket,
            file: self.file,
            result,
        }
    }
}

/// Result of running a [`PreviewJob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOutcome {
    pub(crate) name: String,
    pub(crate) ticket: Ticket,
    pub(crate) file: FileHandle,
    pub(crate) result: Result<PreviewData, PreviewError>,
}

impl PreviewOutcome {
    /// Entry name this outcome settles.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ticket of the job that produced this outcome.
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// The file as it was previewed, with any attached bytes.
    #[must_use]
    pub const fn file(&self) -> &FileHandle {
        &self.file
    }

    /// The encoded preview or the failure.
    #[must_use]
    pub const fn result(&self) -> &Result<PreviewData, PreviewError> {
        &self.result
    }

    /// Whether encoding succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// How long to wait before settling.
    ///
    /// Successes wait the simulated `latency`; failures settle
    /// immediately.
    #[must_use]
    pub const fn delay(&self, latency: Duration) -> Option<Duration> {
        if self.result.is_ok() {
            Some(latency)
        } else {
            None
        }
    }
}
