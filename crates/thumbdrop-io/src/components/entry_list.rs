//! Preview list of selected files.
//!
//! One row per entry: thumbnail once loaded, a spinner while loading,
//! an error glyph if the preview failed, then name, size, and a delete
//! button.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdBan, LdLoader, LdX};
use thumbdrop_core::{EntryStatus, FileEntry, format_size};

/// Props for the [`EntryList`] component.
#[derive(Props, Clone, PartialEq)]
pub struct EntryListProps {
    /// Entries in batch order.
    entries: Vec<FileEntry>,
    /// Called with the entry name when its delete button is clicked.
    on_delete: EventHandler<String>,
}

/// Vertical list of [`EntryRow`]s.
#[component]
pub fn EntryList(props: EntryListProps) -> Element {
    if props.entries.is_empty() {
        return rsx! {};
    }

    rsx! {
        ul { class: "thumbdrop-list",
            for entry in props.entries.iter() {
                EntryRow {
                    key: "{entry.name()}",
                    entry: entry.clone(),
                    on_delete: props.on_delete,
                }
            }
        }
    }
}

/// Props for the [`EntryRow`] component.
#[derive(Props, Clone, PartialEq)]
pub struct EntryRowProps {
    entry: FileEntry,
    on_delete: EventHandler<String>,
}

/// A single preview row.
#[component]
pub fn EntryRow(props: EntryRowProps) -> Element {
    let entry = &props.entry;
    let name = entry.name().to_owned();
    let size = format_size(entry.file().size());
    let failed = entry.status() == EntryStatus::Error;

    let onclick = {
        let on_delete = props.on_delete;
        let name = name.clone();
        move |_| on_delete.call(name.clone())
    };

    rsx! {
        li { class: "thumbdrop-item",
            if let Some(preview) = entry.preview() {
                img {
                    class: "thumbdrop-item__thumb",
                    src: "{preview}",
                    alt: "{name}",
                }
            }
            if entry.is_loading() {
                div { class: "thumbdrop-item__thumb thumbdrop-item__spinner",
                    aria_label: "Loading",
                    Icon { icon: LdLoader, width: 24, height: 24 }
                }
            }
            if failed {
                div { class: "thumbdrop-item__thumb thumbdrop-item__error",
                    title: "Preview failed",
                    Icon { icon: LdBan, width: 24, height: 24 }
                }
            }

            div { class: "thumbdrop-item__description",
                p { class: "thumbdrop-item__name", "{name}" }
                p { class: "thumbdrop-item__size", "{size}" }
            }

            button {
                class: "thumbdrop-item__delete",
                aria_label: "Remove {name}",
                onclick: onclick,
                Icon { icon: LdX, width: 16, height: 16 }
            }
        }
    }
}
