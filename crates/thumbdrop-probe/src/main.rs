//! thumbdrop-probe: run files through the uploader's batch model.
//!
//! Reads the given files, selects them into a batch with the configured
//! policy, runs every preview job, and prints what the widget would end
//! up showing. Useful for:
//!
//! - Checking which files a filter or conflict policy lets through
//! - Seeing which files fail to produce a preview, and why
//! - Confirming when the completion callback would fire
//!
//! # Usage
//!
//! ```text
//! cargo run --bin thumbdrop-probe -- [OPTIONS] <FILES>...
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use thumbdrop_core::{
    AcceptFilter, Batch, ConflictPolicy, EntryStatus, FileHandle, PreviewOutcome, UploaderConfig,
    format_size,
};

/// Run files through the thumbdrop batch model.
///
/// Selects the files into a fresh batch, encodes their previews, and
/// reports each entry's final state, any rejected files, and whether the
/// batch completed.
#[derive(Parser)]
#[command(name = "thumbdrop-probe", version)]
struct Cli {
    /// Files to select, in order.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Accept more than one file.
    #[arg(long)]
    multiple: bool,

    /// Simulated latency before a successful preview settles.
    #[arg(long, default_value_t = UploaderConfig::DEFAULT_LATENCY_MS)]
    latency_ms: u64,

    /// What to do when a file's name is already in the batch.
    #[arg(long, value_enum, default_value_t = Conflict::Replace)]
    on_conflict: Conflict,

    /// Which file types to accept.
    #[arg(long, value_enum, default_value_t = Accept::Images)]
    accept: Accept,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Full uploader config as a JSON string.
    ///
    /// When provided, all other config flags are ignored.
    #[arg(long)]
    config_json: Option<String>,
}

/// Name conflict policy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Conflict {
    /// Replace the existing entry.
    Replace,
    /// Keep the existing entry and reject the new file.
    Reject,
    /// Add the new file under a numbered name.
    Rename,
}

/// Accept filter selection.
#[derive(Clone, Copy, ValueEnum)]
enum Accept {
    /// Image types only.
    Images,
    /// Any file type.
    Any,
}

/// Build an [`UploaderConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<UploaderConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(UploaderConfig {
        multiple: cli.multiple,
        latency_ms: cli.latency_ms,
        accept: match cli.accept {
            Accept::Images => AcceptFilter::Images,
            Accept::Any => AcceptFilter::Any,
        },
        on_conflict: match cli.on_conflict {
            Conflict::Replace => ConflictPolicy::Replace,
            Conflict::Reject => ConflictPolicy::Reject,
            Conflict::Rename => ConflictPolicy::Rename,
        },
    })
}

/// Read a path into a handle named after its final component.
///
/// An unreadable path yields empty contents, which later surfaces as an
/// error entry.
fn read_handle(path: &Path) -> FileHandle {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    match std::fs::read(path) {
        Ok(bytes) => FileHandle::new(name, bytes),
        Err(e) => {
            tracing::warn!("failed to read {}: {e}", path.display());
            FileHandle::new(name, Vec::new())
        }
    }
}

/// Final state of one entry.
#[derive(Debug, Serialize)]
struct EntryReport {
    name: String,
    mime_type: String,
    size: u64,
    status: EntryStatus,
    preview_len: usize,
}

/// A file left out of the batch.
#[derive(Debug, Serialize)]
struct RejectionReport {
    name: String,
    reason: String,
}

/// Everything the probe observed.
#[derive(Debug, Serialize)]
struct Report {
    entries: Vec<EntryReport>,
    rejected: Vec<RejectionReport>,
    /// Names passed to the completion callback, once per firing.
    completions: Vec<Vec<String>>,
}

/// Human-readable report, one line per entry, rejection, and completion.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.entries {
            writeln!(
                f,
                "{:<32} {:>10}  {:<5}  preview {} chars",
                e.name,
                format_size(e.size),
                e.status,
                e.preview_len,
            )?;
        }
        for r in &self.rejected {
            writeln!(f, "rejected {}: {}", r.name, r.reason)?;
        }
        if self.completions.is_empty() {
            writeln!(f, "batch did not complete")?;
        }
        for names in &self.completions {
            writeln!(f, "completed with {} file(s): {}", names.len(), names.join(", "))?;
        }
        Ok(())
    }
}

/// Select `files` into a fresh batch and settle every job.
///
/// Jobs run concurrently in the widget, so failures settle first and the
/// successes settle together after one latency wait.
fn probe(files: Vec<FileHandle>, config: &UploaderConfig, sleep: impl Fn(Duration)) -> Report {
    let selection = Batch::new().select(files, config);
    let rejected = selection
        .rejected
        .iter()
        .map(|r| RejectionReport {
            name: r.name.clone(),
            reason: r.reason.to_string(),
        })
        .collect();

    let (ready, delayed): (Vec<PreviewOutcome>, Vec<PreviewOutcome>) = selection
        .jobs
        .into_iter()
        .map(thumbdrop_core::PreviewJob::run)
        .partition(|o| o.delay(config.latency()).is_none());

    let mut batch = selection.batch;
    let mut completions = Vec::new();
    let mut settle_all = |batch: &mut Batch, outcomes: Vec<PreviewOutcome>| {
        for outcome in outcomes {
            let transition = batch.settle(outcome);
            *batch = transition.batch;
            if let Some(files) = transition.completed {
                completions.push(files.iter().map(|f| f.name().to_owned()).collect());
            }
        }
    };

    settle_all(&mut batch, ready);
    if !delayed.is_empty() {
        sleep(config.latency());
    }
    settle_all(&mut batch, delayed);

    Report {
        entries: batch
            .entries()
            .iter()
            .map(|e| EntryReport {
                name: e.name().to_owned(),
                mime_type: e.mime_type().to_owned(),
                size: e.file().size(),
                status: e.status(),
                preview_len: e.preview().map_or(0, |p| p.len()),
            })
            .collect(),
        rejected,
        completions,
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(?config, "probe config");

    let files = cli.files.iter().map(|p| read_handle(p)).collect();
    let report = probe(files, &config, std::thread::sleep);

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{report}");
    }

    ExitCode::SUCCESS
}
