//! The file uploader widget.
//!
//! Owns the [`Batch`] for its lifetime. Selected files become loading
//! entries immediately, from the browser's metadata. Each then gets its
//! own task that reads the bytes, encodes the preview, waits out the
//! simulated latency on success, and settles the entry. Deleting or
//! replacing an entry cancels its task; any result that still arrives is
//! discarded by the ticket check in [`Batch::settle`].

use std::time::Duration;

use dioxus::html::FileData;
use dioxus::logger::tracing;
use dioxus::prelude::*;
use thumbdrop_core::{Batch, FileHandle, PreviewJob, Rejection, Transition, UploaderConfig};

use super::{DropZone, EntryList};
use crate::reader;
use crate::tasks::TaskSlots;

/// Props for the [`FileUploader`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploaderProps {
    /// Selection mode, latency, accept filter, and conflict policy.
    #[props(default)]
    config: UploaderConfig,
    /// Called with every file in the batch, in order, each time the
    /// last loading entry finishes.
    on_finish: EventHandler<Vec<FileHandle>>,
}

/// Drag-and-drop / click-to-select image uploader with previews.
#[component]
pub fn FileUploader(props: FileUploaderProps) -> Element {
    let uploader = Uploader {
        batch: use_signal(Batch::new),
        tasks: use_signal(TaskSlots::default),
        notice: use_signal(|| Option::<String>::None),
        on_finish: props.on_finish,
    };

    let config = props.config;
    let on_files = move |files: Vec<FileData>| {
        if !files.is_empty() {
            uploader.select(files, config);
        }
    };

    let (status, entries) = {
        let batch = uploader.batch.read();
        (status_line(&batch), batch.entries().to_vec())
    };
    let notice = uploader.notice.cloned();

    rsx! {
        div { class: "thumbdrop",
            h1 { class: "thumbdrop__title", "Upload file" }

            DropZone {
                multiple: config.multiple,
                accept: config.accept.input_accept(),
                on_files: on_files,
            }

            if let Some(ref msg) = notice {
                p { class: "thumbdrop__notice", role: "alert", "{msg}" }
            }

            if let Some(ref status) = status {
                p { class: "thumbdrop__status", "{status}" }
            }

            EntryList {
                entries: entries,
                on_delete: move |name: String| uploader.delete(&name),
            }
        }
    }
}

/// Handles to the widget's state, shared by event handlers and tasks.
#[derive(Clone, Copy)]
struct Uploader {
    batch: Signal<Batch>,
    /// In-flight preview task per entry name.
    tasks: Signal<TaskSlots<Task>>,
    /// Most recent rejection message.
    notice: Signal<Option<String>>,
    on_finish: EventHandler<Vec<FileHandle>>,
}

impl Uploader {
    /// Add the files to the batch as loading entries and start their jobs.
    fn select(mut self, files: Vec<FileData>, config: UploaderConfig) {
        let handles: Vec<FileHandle> = files.iter().map(reader::declared_handle).collect();
        let selection = self.batch.peek().select(handles, &config);

        for rejection in &selection.rejected {
            tracing::info!("rejected {rejection}");
        }
        self.notice.set(notice_for(&selection.rejected));
        self.batch.set(selection.batch);

        let mut files: Vec<Option<FileData>> = files.into_iter().map(Some).collect();
        for job in selection.jobs {
            if let Some(file) = files.get_mut(job.source()).and_then(Option::take) {
                self.start(job, file, config.latency());
            }
        }
    }

    /// Spawn the task for one preview job.
    fn start(mut self, job: PreviewJob, file: FileData, latency: Duration) {
        let name = job.name().to_owned();
        let ticket = job.ticket();

        let task = spawn(async move {
            let job = match reader::read_contents(&file).await {
                Ok(bytes) => job.with_contents(bytes),
                Err(e) => {
                    tracing::warn!("{e}");
                    job
                }
            };
            let outcome = job.run();
            if let Some(delay) = outcome.delay(latency) {
                gloo_timers::future::TimeoutFuture::new(delay_millis(delay)).await;
            }

            let transition = self.tasks.write().settle(&self.batch.peek(), outcome);
            self.apply(transition);
        });

        if let Some(previous) = self.tasks.write().start(name, ticket, task) {
            previous.cancel();
        }
    }

    /// Delete an entry and cancel its task.
    fn delete(mut self, name: &str) {
        let (transition, task) = self.tasks.write().delete(&self.batch.peek(), name);
        if let Some(task) = task {
            task.cancel();
        }
        self.apply(transition);
    }

    /// Install the next snapshot and report completion.
    fn apply(mut self, transition: Transition) {
        self.batch.set(transition.batch);
        if let Some(files) = transition.completed {
            tracing::debug!(count = files.len(), "batch complete");
            self.on_finish.call(files);
        }
    }
}

/// Message shown above the list after a selection.
fn notice_for(rejected: &[Rejection]) -> Option<String> {
    match rejected {
        [] => None,
        [only] => Some(only.to_string()),
        [first, rest @ ..] => Some(format!("{first} (and {} more)", rest.len())),
    }
}

/// Progress summary, e.g. `"1 of 3 ready"`.
fn status_line(batch: &Batch) -> Option<String> {
    if batch.is_empty() {
        return None;
    }
    let ready = batch.len() - batch.loading_count();
    Some(format!("{ready} of {} ready", batch.len()))
}

/// Timer milliseconds, saturating at `u32::MAX`.
fn delay_millis(delay: Duration) -> u32 {
    u32::try_from(delay.as_millis()).unwrap_or(u32::MAX)
}
