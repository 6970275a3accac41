//! Dioxus UI components for thumbdrop.
//!
//! Provides the drop zone with its hidden file picker, the preview
//! list, and the uploader widget that ties them to the batch model.

mod drop_zone;
mod entry_list;
mod uploader;

pub use drop_zone::DropZone;
pub use entry_list::{EntryList, EntryRow};
pub use uploader::FileUploader;
