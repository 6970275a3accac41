//! The entry collection and its transitions.
//!
//! A [`Batch`] is an immutable snapshot. Every operation takes `&self`
//! and returns the next snapshot, so the owner installs updates by
//! replacing the whole value. Completion is reported on the transition
//! where the completion flag goes from false to true, never on the
//! snapshot itself.

use crate::preview::{PreviewJob, PreviewOutcome};
use crate::types::{ConflictPolicy, FileEntry, FileHandle, Ticket, UploaderConfig};

/// Why a selected file was not added to the batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    /// The file type does not pass the configured [`AcceptFilter`](crate::AcceptFilter).
    #[error("{mime} is not an accepted file type")]
    NotAccepted {
        /// The file's MIME type.
        mime: String,
    },

    /// An entry with this name exists and the policy is
    /// [`ConflictPolicy::Reject`].
    #[error("a file with this name is already selected")]
    NameTaken,

    /// More than one file was offered while `multiple` is off.
    #[error("only one file can be selected at a time")]
    SingleFileOnly,
}

/// A file left out of a selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{name}: {reason}")]
pub struct Rejection {
    /// Name of the rejected file.
    pub name: String,
    /// Why it was rejected.
    pub reason: RejectReason,
}

/// Result of [`Batch::select`].
#[derive(Debug, Clone)]
#[must_use]
pub struct Selection {
    /// The batch with the new loading entries.
    pub batch: Batch,
    /// One job per inserted entry, in selection order.
    pub jobs: Vec<PreviewJob>,
    /// Files that were not inserted.
    pub rejected: Vec<Rejection>,
}

/// Result of [`Batch::settle`] and [`Batch::remove`].
#[derive(Debug, Clone)]
#[must_use]
pub struct Transition {
    /// The next snapshot.
    pub batch: Batch,
    /// `Some` with every current file, in batch order, when this
    /// transition made the batch complete.
    pub completed: Option<Vec<FileHandle>>,
}

impl Transition {
    const fn unchanged(batch: Batch) -> Self {
        Self {
            batch,
            completed: None,
        }
    }
}

/// Ordered collection of file entries keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    entries: Vec<FileEntry>,
    /// Last issued ticket number.
    last_ticket: u64,
    /// Value of the completion flag after the previous transition.
    was_complete: bool,
}

impl Batch {
    /// An empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in selection order.
    #[must_use]
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Look up an entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the batch has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries still loading.
    #[must_use]
    pub fn loading_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_loading).count()
    }

    /// The completion flag: non-empty and nothing loading.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| !e.is_loading)
    }

    /// Handles of all entries in batch order.
    #[must_use]
    pub fn files(&self) -> Vec<FileHandle> {
        self.entries.iter().map(|e| e.file.clone()).collect()
    }

    /// Add newly selected files.
    ///
    /// Picker and drop selections both come through here. An empty
    /// `files` leaves the batch unchanged. With `multiple` off only the
    /// first file is considered; the rest are rejected. Files failing
    /// the accept filter are rejected. Name collisions follow
    /// `config.on_conflict`.
    pub fn select(
        &self,
        files: impl IntoIterator<Item = FileHandle>,
        config: &UploaderConfig,
    ) -> Selection {
        let mut next = self.clone();
        let mut jobs = Vec::new();
        let mut rejected = Vec::new();

        for (index, file) in files.into_iter().enumerate() {
            let reject = |reason| Rejection {
                name: file.name().to_owned(),
                reason,
            };

            if index > 0 && !config.multiple {
                rejected.push(reject(RejectReason::SingleFileOnly));
                continue;
            }
            if !config.accept.matches(&file) {
                rejected.push(reject(RejectReason::NotAccepted {
                    mime: file.mime_type().to_owned(),
                }));
                continue;
            }

            let name = if next.position(file.name()).is_none() {
                file.name().to_owned()
            } else {
                match config.on_conflict {
                    ConflictPolicy::Replace => file.name().to_owned(),
                    ConflictPolicy::Reject => {
                        rejected.push(reject(RejectReason::NameTaken));
                        continue;
                    }
                    ConflictPolicy::Rename => next.free_name(file.name()),
                }
            };

            let ticket = next.issue_ticket();
            let entry = FileEntry::loading(name.clone(), file.clone(), ticket);
            match next.position(&name) {
                Some(existing) => next.entries[existing] = entry,
                None => next.entries.push(entry),
            }
            tracing::debug!(%name, %ticket, "entry selected");
            jobs.push(PreviewJob {
                name,
                ticket,
                file,
                source: index,
            });
        }

        // A name repeated within one selection leaves only the last
        // job current.
        jobs.retain(|job| next.holds(&job.name, job.ticket));
        next.was_complete = next.is_complete();

        Selection {
            batch: next,
            jobs,
            rejected,
        }
    }

    /// Apply a finished preview job.
    ///
    /// Outcomes whose entry was deleted, replaced, or already settled
    /// are discarded and the batch is returned unchanged.
    pub fn settle(&self, outcome: PreviewOutcome) -> Transition {
        let Some(index) = self
            .entries
            .iter()
            .position(|e| e.name == outcome.name && e.ticket == outcome.ticket && e.is_loading)
        else {
            tracing::debug!(
                name = %outcome.name,
                ticket = %outcome.ticket,
                "discarding stale preview outcome"
            );
            return Transition::unchanged(self.clone());
        };

        let mut next = self.clone();
        let entry = &mut next.entries[index];
        entry.file = outcome.file;
        match outcome.result {
            Ok(preview) => {
                entry.preview = Some(preview);
                entry.status = crate::EntryStatus::Ok;
            }
            Err(_) => {
                entry.preview = None;
                entry.status = crate::EntryStatus::Error;
            }
        }
        entry.is_loading = false;
        tracing::debug!(name = %entry.name, status = %entry.status, "entry settled");

        next.finish()
    }

    /// Delete an entry by name.
    ///
    /// Unknown names leave the batch unchanged.
    pub fn remove(&self, name: &str) -> Transition {
        let Some(index) = self.position(name) else {
            return Transition::unchanged(self.clone());
        };

        let mut next = self.clone();
        next.entries.remove(index);
        tracing::debug!(%name, "entry removed");

        next.finish()
    }

    /// Record the completion flag, reporting a false-to-true edge.
    fn finish(mut self) -> Transition {
        let complete = self.is_complete();
        let completed = (complete && !self.was_complete).then(|| self.files());
        self.was_complete = complete;
        Transition {
            batch: self,
            completed,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    fn holds(&self, name: &str, ticket: Ticket) -> bool {
        self.get(name).is_some_and(|e| e.ticket == ticket)
    }

    const fn issue_ticket(&mut self) -> Ticket {
        self.last_ticket += 1;
        Ticket(self.last_ticket)
    }

    /// First `stem (n).ext` not already in the batch.
    fn free_name(&self, name: &str) -> String {
        let candidate = |n: u32| match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
            _ => format!("{name} ({n})"),
        };
        (1..)
            .map(candidate)
            .find(|c| self.position(c).is_none())
            .unwrap_or_else(|| name.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::tiny_png;
    use crate::{AcceptFilter, EntryStatus};

    fn png(name: &str) -> FileHandle {
        FileHandle::new(name, tiny_png())
    }

    fn multi() -> UploaderConfig {
        UploaderConfig {
            multiple: true,
            ..UploaderConfig::default()
        }
    }

    /// Run every job and settle the outcomes in the given order.
    fn settle_all(mut batch: Batch, jobs: Vec<PreviewJob>) -> (Batch, Vec<Vec<FileHandle>>) {
        let mut completions = Vec::new();
        for job in jobs {
            let t = batch.settle(job.run());
            batch = t.batch;
            completions.extend(t.completed);
        }
        (batch, completions)
    }

    #[test]
    fn selecting_nothing_is_a_noop() {
        let batch = Batch::new();
        let sel = batch.select(Vec::new(), &multi());
        assert_eq!(sel.batch, batch);
        assert!(sel.jobs.is_empty());
        assert!(sel.rejected.is_empty());
    }

    #[test]
    fn selected_entries_start_loading() {
        let sel = Batch::new().select([png("a.png"), png("b.png")], &multi());
        assert_eq!(sel.batch.len(), 2);
        assert_eq!(sel.jobs.len(), 2);
        for entry in sel.batch.entries() {
            assert!(entry.is_loading());
            assert_eq!(entry.status(), EntryStatus::Ok);
            assert!(entry.preview().is_none());
        }
        assert!(!sel.batch.is_complete());
    }

    #[test]
    fn single_mode_takes_only_first_file() {
        let sel = Batch::new().select([png("a.png"), png("b.png")], &UploaderConfig::default());
        assert_eq!(sel.batch.len(), 1);
        assert!(sel.batch.get("a.png").is_some());
        assert_eq!(
            sel.rejected,
            vec![Rejection {
                name: "b.png".into(),
                reason: RejectReason::SingleFileOnly,
            }]
        );
    }

    #[test]
    fn non_images_are_rejected() {
        let text = FileHandle::new("notes.txt", b"hello".to_vec());
        let sel = Batch::new().select([text.clone()], &multi());
        assert!(sel.batch.is_empty());
        assert!(matches!(
            sel.rejected[0].reason,
            RejectReason::NotAccepted { ref mime } if mime == "application/octet-stream"
        ));

        let any = UploaderConfig {
            accept: AcceptFilter::Any,
            ..multi()
        };
        let sel = Batch::new().select([text], &any);
        assert_eq!(sel.batch.len(), 1);
    }

    #[test]
    fn successful_job_settles_ok_with_preview() {
        let sel = Batch::new().select([png("a.png")], &UploaderConfig::default());
        let (batch, completions) = settle_all(sel.batch, sel.jobs);

        let entry = batch.get("a.png").unwrap();
        assert!(!entry.is_loading());
        assert_eq!(entry.status(), EntryStatus::Ok);
        assert!(entry.preview().unwrap().as_str().starts_with("data:image/png"));
        assert_eq!(completions, vec![vec![png("a.png")]]);
    }

    #[test]
    fn failed_job_settles_error_without_preview() {
        let bad = FileHandle::new("bad.png", b"not a png".to_vec());
        let sel = Batch::new().select([bad.clone()], &UploaderConfig::default());
        let (batch, completions) = settle_all(sel.batch, sel.jobs);

        let entry = batch.get("bad.png").unwrap();
        assert!(!entry.is_loading());
        assert_eq!(entry.status(), EntryStatus::Error);
        assert!(entry.preview().is_none());
        assert_eq!(completions, vec![vec![bad]]);
    }

    #[test]
    fn completion_waits_for_every_entry() {
        let sel = Batch::new().select([png("a.png"), png("b.png")], &multi());
        let mut jobs = sel.jobs.into_iter();
        let first = jobs.next().unwrap();
        let second = jobs.next().unwrap();

        let t = sel.batch.settle(first.run());
        assert!(t.completed.is_none());
        assert!(!t.batch.is_complete());

        let t = t.batch.settle(second.run());
        assert_eq!(t.completed, Some(vec![png("a.png"), png("b.png")]));
    }

    #[test]
    fn completion_reports_batch_order_regardless_of_settle_order() {
        let sel = Batch::new().select([png("a.png"), png("b.png")], &multi());
        let mut jobs = sel.jobs;
        jobs.reverse();
        let (_, completions) = settle_all(sel.batch, jobs);
        assert_eq!(completions, vec![vec![png("a.png"), png("b.png")]]);
    }

    #[test]
    fn mixed_success_and_error_still_completes() {
        let bad = FileHandle::new("bad.png", Vec::new());
        let sel = Batch::new().select([png("a.png"), bad.clone()], &multi());
        let (batch, completions) = settle_all(sel.batch, sel.jobs);
        assert_eq!(batch.get("bad.png").unwrap().status(), EntryStatus::Error);
        assert_eq!(completions, vec![vec![png("a.png"), bad]]);
    }

    #[test]
    fn completion_fires_again_after_new_files_finish() {
        let sel = Batch::new().select([png("a.png")], &multi());
        let (batch, first) = settle_all(sel.batch, sel.jobs);
        assert_eq!(first.len(), 1);

        let sel = batch.select([png("b.png")], &multi());
        assert!(!sel.batch.is_complete());
        let (_, second) = settle_all(sel.batch, sel.jobs);
        assert_eq!(second, vec![vec![png("a.png"), png("b.png")]]);
    }

    #[test]
    fn deleting_only_entry_does_not_complete() {
        let sel = Batch::new().select([png("a.png")], &UploaderConfig::default());
        let t = sel.batch.remove("a.png");
        assert!(t.batch.is_empty());
        assert!(t.completed.is_none());

        let (_, completions) = settle_all(sel.batch, sel.jobs);
        assert_eq!(completions.len(), 1);
    }

    #[test]
    fn deleting_only_finished_entry_does_not_complete() {
        let sel = Batch::new().select([png("a.png")], &UploaderConfig::default());
        let (batch, _) = settle_all(sel.batch, sel.jobs);
        let t = batch.remove("a.png");
        assert!(t.batch.is_empty());
        assert!(t.completed.is_none());
    }

    #[test]
    fn deleting_last_loading_entry_completes_the_rest() {
        let sel = Batch::new().select([png("a.png"), png("b.png")], &multi());
        let first = sel.jobs[0].clone();
        let t = sel.batch.settle(first.run());
        assert!(t.completed.is_none());

        let t = t.batch.remove("b.png");
        assert_eq!(t.completed, Some(vec![png("a.png")]));
    }

    #[test]
    fn deleted_entry_does_not_reappear_when_job_settles() {
        let sel = Batch::new().select([png("a.png")], &UploaderConfig::default());
        let removed = sel.batch.remove("a.png").batch;

        let (batch, completions) = settle_all(removed, sel.jobs);
        assert!(batch.is_empty());
        assert!(completions.is_empty());
    }

    #[test]
    fn removing_unknown_name_is_unchanged() {
        let sel = Batch::new().select([png("a.png")], &UploaderConfig::default());
        let t = sel.batch.remove("zzz.png");
        assert_eq!(t.batch, sel.batch);
        assert!(t.completed.is_none());
    }

    #[test]
    fn replace_discards_the_superseded_job() {
        let old = FileHandle::new("a.png", b"old, broken".to_vec());
        let sel = Batch::new().select([old], &UploaderConfig::default());
        let stale_jobs = sel.jobs;

        let sel = sel.batch.select([png("a.png")], &UploaderConfig::default());
        assert_eq!(sel.batch.len(), 1);
        assert!(sel.batch.get("a.png").unwrap().is_loading());

        // The old (failing) job lands first and must not touch the new entry.
        let (batch, completions) = settle_all(sel.batch.clone(), stale_jobs);
        assert!(batch.get("a.png").unwrap().is_loading());
        assert!(completions.is_empty());

        let (batch, completions) = settle_all(batch, sel.jobs);
        assert_eq!(batch.get("a.png").unwrap().status(), EntryStatus::Ok);
        assert_eq!(completions, vec![vec![png("a.png")]]);
    }

    #[test]
    fn replace_keeps_position() {
        let sel = Batch::new().select([png("a.png"), png("b.png")], &multi());
        let sel = sel.batch.select([png("a.png")], &multi());
        let names: Vec<_> = sel.batch.entries().iter().map(FileEntry::name).collect();
        assert_eq!(names, ["a.png", "b.png"]);
    }

    #[test]
    fn duplicate_names_in_one_selection_keep_last_job_only() {
        let first = FileHandle::new("a.png", b"first".to_vec());
        let second = png("a.png");
        let sel = Batch::new().select([first, second.clone()], &multi());
        assert_eq!(sel.batch.len(), 1);
        assert_eq!(sel.jobs.len(), 1);
        assert_eq!(sel.jobs[0].file(), &second);
    }

    #[test]
    fn reject_policy_keeps_existing_entry() {
        let config = UploaderConfig {
            on_conflict: ConflictPolicy::Reject,
            ..multi()
        };
        let sel = Batch::new().select([png("a.png")], &config);
        let ticket = sel.batch.get("a.png").unwrap().ticket();

        let again = sel.batch.select([png("a.png")], &config);
        assert_eq!(again.batch.get("a.png").unwrap().ticket(), ticket);
        assert!(again.jobs.is_empty());
        assert_eq!(again.rejected[0].reason, RejectReason::NameTaken);
    }

    #[test]
    fn rename_policy_picks_first_free_suffix() {
        let config = UploaderConfig {
            on_conflict: ConflictPolicy::Rename,
            ..multi()
        };
        let sel = Batch::new().select([png("a.png"), png("a.png"), png("a.png")], &config);
        let names: Vec<_> = sel.batch.entries().iter().map(FileEntry::name).collect();
        assert_eq!(names, ["a.png", "a (1).png", "a (2).png"]);
        assert_eq!(sel.jobs.len(), 3);
        // The handle keeps the original filename.
        assert_eq!(sel.batch.get("a (1).png").unwrap().file().name(), "a.png");
    }

    #[test]
    fn rename_without_extension() {
        let config = UploaderConfig {
            on_conflict: ConflictPolicy::Rename,
            accept: AcceptFilter::Any,
            ..multi()
        };
        let file = FileHandle::new("README", Vec::new());
        let sel = Batch::new().select([file.clone(), file], &config);
        assert!(sel.batch.get("README (1)").is_some());
    }

    #[test]
    fn settled_entry_ignores_repeat_outcome() {
        let sel = Batch::new().select([png("a.png")], &UploaderConfig::default());
        let job = sel.jobs[0].clone();
        let t = sel.batch.settle(job.clone().run());
        let again = t.batch.settle(job.run());
        assert_eq!(again.batch, t.batch);
        assert!(again.completed.is_none());
    }

    #[test]
    fn tickets_are_unique() {
        let sel = Batch::new().select([png("a.png"), png("b.png")], &multi());
        let sel = sel.batch.select([png("a.png")], &multi());
        let mut tickets: Vec<_> = sel.batch.entries().iter().map(FileEntry::ticket).collect();
        tickets.sort();
        tickets.dedup();
        assert_eq!(tickets.len(), 2);
        assert_eq!(sel.batch.get("a.png").unwrap().ticket().get(), 3);
    }

    #[test]
    fn platform_image_type_passes_filter_whatever_the_name() {
        let files = [
            FileHandle::declared("IMG_0001.HEIC", Some("image/heic"), 4_096),
            FileHandle::declared("scan", Some("image/png"), 70),
        ];
        let sel = Batch::new().select(files, &multi());
        assert!(sel.rejected.is_empty(), "{:?}", sel.rejected);
        assert_eq!(sel.batch.len(), 2);
    }

    #[test]
    fn entries_exist_before_contents_are_read() {
        let files = [
            FileHandle::declared("a.png", None, 1_000),
            FileHandle::declared("b.png", None, 2_000),
        ];
        let sel = Batch::new().select(files, &multi());
        assert_eq!(sel.batch.loading_count(), 2);
        assert_eq!(sel.batch.get("b.png").unwrap().file().size(), 2_000);
    }

    #[test]
    fn job_source_points_back_into_selection() {
        let files = [
            png("a.png"),
            FileHandle::new("notes.txt", Vec::new()),
            png("a.png"),
            png("c.png"),
        ];
        let config = UploaderConfig {
            on_conflict: crate::ConflictPolicy::Rename,
            ..multi()
        };
        let sel = Batch::new().select(files, &config);
        let sources: Vec<_> = sel.jobs.iter().map(|j| (j.name().to_owned(), j.source())).collect();
        assert_eq!(
            sources,
            [("a.png".to_owned(), 0), ("a (1).png".to_owned(), 2), ("c.png".to_owned(), 3)]
        );
    }

    #[test]
    fn settling_installs_the_read_file_for_completion() {
        let sel = Batch::new().select([FileHandle::declared("scan", Some("image/png"), 9)], &multi());
        let job = sel.jobs.into_iter().next().unwrap();
        let t = sel.batch.settle(job.with_contents(tiny_png()).run());
        assert_eq!(t.batch.get("scan").unwrap().status(), EntryStatus::Ok);
        let files = t.completed.unwrap();
        assert_eq!(files[0].contents(), tiny_png().as_slice());
        assert_eq!(files[0].mime_type(), "image/png");
    }

    #[test]
    fn unreadable_file_keeps_declared_size() {
        let sel = Batch::new().select([FileHandle::declared("big.png", None, 3_000)], &multi());
        let job = sel.jobs.into_iter().next().unwrap();
        let t = sel.batch.settle(job.run());
        let entry = t.batch.get("big.png").unwrap();
        assert_eq!(entry.status(), EntryStatus::Error);
        assert_eq!(entry.file().size(), 3_000);
    }
}
