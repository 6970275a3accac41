//! Per-entry task bookkeeping for the uploader.
//!
//! Each loading entry has at most one in-flight task, recorded with the
//! ticket it was started for. The slot map decides which task to cancel
//! and when a finishing task may clear its own slot; the batch decides
//! whether the outcome still applies. Generic over the task handle so
//! it runs without a Dioxus runtime.

use std::collections::HashMap;

use thumbdrop_core::{Batch, PreviewOutcome, Ticket, Transition};

/// In-flight tasks keyed by entry name.
#[derive(Debug)]
pub struct TaskSlots<T> {
    slots: HashMap<String, (Ticket, T)>,
}

impl<T> Default for TaskSlots<T> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }
}

impl<T> TaskSlots<T> {
    /// Record the task started for `name` under `ticket`.
    ///
    /// Returns the task it displaces, which the caller must cancel.
    pub fn start(&mut self, name: String, ticket: Ticket, task: T) -> Option<T> {
        self.slots.insert(name, (ticket, task)).map(|(_, previous)| previous)
    }

    /// Settle a finished job against `batch`.
    ///
    /// The slot is cleared only if it still belongs to this job's ticket,
    /// so a superseded task never evicts its replacement.
    pub fn settle(&mut self, batch: &Batch, outcome: PreviewOutcome) -> Transition {
        if self
            .slots
            .get(outcome.name())
            .is_some_and(|(ticket, _)| *ticket == outcome.ticket())
        {
            self.slots.remove(outcome.name());
        }
        batch.settle(outcome)
    }

    /// Delete the entry `name`.
    ///
    /// Returns the next batch and the entry's task, if any, to cancel.
    pub fn delete(&mut self, batch: &Batch, name: &str) -> (Transition, Option<T>) {
        let task = self.slots.remove(name).map(|(_, task)| task);
        (batch.remove(name), task)
    }

    /// Ticket of the task tracked for `name`.
    #[must_use]
    pub fn ticket(&self, name: &str) -> Option<Ticket> {
        self.slots.get(name).map(|(ticket, _)| *ticket)
    }

    /// Number of tracked tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no task is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
