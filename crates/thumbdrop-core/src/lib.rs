//! thumbdrop-core: Pure upload batch model (sans-IO).
//!
//! Tracks the files a user selected into an uploader widget:
//! selection -> per-file preview job -> settle -> completion.
//!
//! Every [`Batch`] operation returns a new snapshot, and preview jobs
//! are plain values carrying a [`Ticket`], so the whole lifecycle
//! (including late results for deleted or replaced entries) can be
//! driven and tested without a browser or async runtime. Reading files,
//! timers, and rendering live in `thumbdrop-io`.

pub mod batch;
pub mod preview;
pub mod size;
pub mod types;

#[cfg(test)]
mod testing;

pub use batch::{Batch, RejectReason, Rejection, Selection, Transition};
pub use preview::{PreviewError, PreviewJob, PreviewOutcome};
pub use size::format_size;
pub use types::{
    AcceptFilter, ConflictPolicy, EntryStatus, FileEntry, FileHandle, PreviewData, Ticket,
    UploaderConfig, mime_from_name,
};
