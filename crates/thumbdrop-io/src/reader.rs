//! Turning browser-selected files into [`FileHandle`]s.
//!
//! The picker and the drop target both hand over `FileData`. Its
//! metadata is available immediately, so entries can appear the moment
//! files are chosen; the bytes are read later, one task per file.

use dioxus::html::FileData;
use thumbdrop_core::FileHandle;

/// Errors that can occur while reading a selected file.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The browser failed to deliver the file contents.
    #[error("failed to read {name}: {message}")]
    Browser {
        /// Name of the file.
        name: String,
        /// Error reported by the platform.
        message: String,
    },
}

/// A contents-free handle built from the platform's metadata.
///
/// The browser's content type is kept when it reports one, so a file the
/// native picker offers as an image passes the image filter even when
/// its extension is unfamiliar.
#[must_use]
pub fn declared_handle(file: &FileData) -> FileHandle {
    let content_type = file.content_type();
    FileHandle::declared(file.name(), content_type.as_deref(), file.size())
}

/// Read one file's bytes.
///
/// # Errors
///
/// Returns [`ReadError::Browser`] if the platform read fails.
#[allow(clippy::future_not_send)] // WASM is single-threaded; FileData is !Send
pub async fn read_contents(file: &FileData) -> Result<Vec<u8>, ReadError> {
    let bytes = file.read_bytes().await.map_err(|e| ReadError::Browser {
        name: file.name(),
        message: e.to_string(),
    })?;
    Ok(bytes.to_vec())
}
