use dioxus::logger::tracing;
use dioxus::prelude::*;
use thumbdrop_core::{FileHandle, UploaderConfig, format_size};
use thumbdrop_io::{FileUploader, STYLESHEET};

fn main() {
    dioxus::launch(app);
}

/// Root application component.
///
/// Hosts one uploader and shows the files it last reported as complete.
/// Changing the selection mode remounts the uploader, which starts it
/// over with an empty batch.
fn app() -> Element {
    let mut multiple = use_signal(|| UploaderConfig::DEFAULT_MULTIPLE);
    let mut finished = use_signal(Vec::<FileHandle>::new);

    let config = UploaderConfig {
        multiple: multiple(),
        ..UploaderConfig::default()
    };

    let on_finish = move |files: Vec<FileHandle>| {
        tracing::info!(count = files.len(), "upload batch finished");
        finished.set(files);
    };

    rsx! {
        style { dangerous_inner_html: STYLESHEET }

        div { style: "max-width: 36rem; margin: 2rem auto; font-family: system-ui, sans-serif;",
            header {
                h1 { "thumbdrop" }
                p { "Drop images or click to choose; each one previews after a short delay." }
            }

            label {
                input {
                    r#type: "checkbox",
                    checked: multiple(),
                    onchange: move |e: FormEvent| {
                        multiple.set(e.checked());
                        finished.set(Vec::new());
                    },
                }
                " Allow multiple files"
            }

            FileUploader {
                key: "{multiple()}",
                config: config,
                on_finish: on_finish,
            }

            section {
                h2 { "Last completed batch" }
                if finished.read().is_empty() {
                    p { "Nothing yet." }
                } else {
                    ul {
                        for file in finished.read().iter() {
                            li { key: "{file.name()}",
                                "{file.name()} ({format_size(file.size())})"
                            }
                        }
                    }
                }
            }
        }
    }
}
