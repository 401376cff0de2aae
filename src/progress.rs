//! Reindex progress reporting.
//!
//! Reports observable progress during `rdx run` so operators see which
//! content type is being processed, how much is left, and how many
//! errors accumulated. Progress is emitted on **stderr** so stdout
//! remains parseable for scripts.

use std::io::Write;

/// A single progress event for a reindex run.
#[derive(Clone, Debug)]
pub enum ReindexProgressEvent {
    /// Phase A: retrieving content types (no totals yet).
    Discovering,
    /// Phase B: listing and purging one content type.
    Listing { content_type: String },
    /// Phase C: n items of this type processed out of total.
    Indexing {
        content_type: String,
        n: u64,
        total: u64,
    },
    /// Terminal summary.
    Done { items: u64, errors: u64 },
}

/// Reports reindex progress. Implementations write to stderr (human or
/// JSON).
pub trait ReindexProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the run driver.
    fn report(&self, event: ReindexProgressEvent);
}

/// Human-friendly progress on stderr:
/// `"reindex article  indexing  1,234 / 5,000 items"`.
pub struct StderrProgress;

impl ReindexProgressReporter for StderrProgress {
    fn report(&self, event: ReindexProgressEvent) {
        let line = match &event {
            ReindexProgressEvent::Discovering => "reindex  retrieving content types...\n".to_string(),
            ReindexProgressEvent::Listing { content_type } => {
                format!("reindex {}  listing...\n", content_type)
            }
            ReindexProgressEvent::Indexing {
                content_type,
                n,
                total,
            } => {
                format!(
                    "reindex {}  indexing  {} / {} items\n",
                    content_type,
                    format_number(*n),
                    format_number(*total)
                )
            }
            ReindexProgressEvent::Done { items, errors } => {
                format!(
                    "reindex done  {} items, {} errors\n",
                    format_number(*items),
                    format_number(*errors)
                )
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ReindexProgressReporter for JsonProgress {
    fn report(&self, event: ReindexProgressEvent) {
        let obj = match &event {
            ReindexProgressEvent::Discovering => serde_json::json!({
                "event": "progress",
                "phase": "discovering"
            }),
            ReindexProgressEvent::Listing { content_type } => serde_json::json!({
                "event": "progress",
                "phase": "listing",
                "content_type": content_type
            }),
            ReindexProgressEvent::Indexing {
                content_type,
                n,
                total,
            } => serde_json::json!({
                "event": "progress",
                "phase": "indexing",
                "content_type": content_type,
                "n": n,
                "total": total
            }),
            ReindexProgressEvent::Done { items, errors } => serde_json::json!({
                "event": "done",
                "items": items,
                "errors": errors
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ReindexProgressReporter for NoProgress {
    fn report(&self, _event: ReindexProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode. Caller passes it to the run driver.
    pub fn reporter(&self) -> Box<dyn ReindexProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
