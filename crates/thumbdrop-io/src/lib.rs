//! thumbdrop-io: Browser I/O and Dioxus component library.
//!
//! Reads browser-selected files, tracks per-file preview tasks, and
//! provides the uploader widget and its parts. All state transitions
//! are delegated to `thumbdrop-core`.

pub mod components;
pub mod reader;
pub mod tasks;

pub use components::{DropZone, EntryList, EntryRow, FileUploader};

/// Stylesheet for the uploader widget's class names.
///
/// Hosts inline it once, e.g. `style { dangerous_inner_html: STYLESHEET }`.
pub const STYLESHEET: &str = include_str!("../assets/uploader.css");
