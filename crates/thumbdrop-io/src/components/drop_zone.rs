//! Drop target wrapping a hidden file picker.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdDownload, LdHardDrive};

/// Props for the [`DropZone`] component.
#[derive(Props, Clone, PartialEq)]
pub struct DropZoneProps {
    /// Let the picker select more than one file.
    multiple: bool,
    /// Value of the picker's `accept` attribute (empty for any).
    accept: &'static str,
    /// Called with the files from either the picker or a drop.
    on_files: EventHandler<Vec<FileData>>,
}

/// A clickable drop zone.
///
/// Clicking opens the native picker; dropping files onto it delivers
/// them through the same `on_files` callback, so selection logic lives
/// in one place. Drag-over and drag-leave suppress the browser's
/// default of opening the dropped file.
#[component]
pub fn DropZone(props: DropZoneProps) -> Element {
    let mut dragging = use_signal(|| false);
    let on_files = props.on_files;

    let zone_class = if dragging() {
        "thumbdrop-zone thumbdrop-zone--active"
    } else {
        "thumbdrop-zone"
    };

    rsx! {
        label {
            class: "{zone_class}",
            ondragover: move |evt: DragEvent| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |evt: DragEvent| {
                evt.prevent_default();
                dragging.set(false);
            },
            ondrop: move |evt: DragEvent| {
                evt.prevent_default();
                dragging.set(false);
                on_files.call(evt.files());
            },

            span { class: "thumbdrop-zone__icon",
                if dragging() {
                    Icon { icon: LdDownload, width: 40, height: 40 }
                } else {
                    Icon { icon: LdHardDrive, width: 40, height: 40 }
                }
            }
            span { class: "thumbdrop-zone__hint",
                if props.multiple {
                    "Drop images here or click to choose"
                } else {
                    "Drop an image here or click to choose"
                }
            }

            input {
                r#type: "file",
                accept: props.accept,
                multiple: props.multiple,
                class: "thumbdrop-zone__input",
                onchange: move |evt: FormEvent| on_files.call(evt.files()),
            }
        }
    }
}
