//! Run status accumulation.
//!
//! [`RunStatus`] is a pure accumulator: the driver feeds it the outcome
//! of each phase call and it exposes a snapshot for display. It never
//! fails, preserves error order (first encountered first), and never
//! deduplicates — repeated failures on retries all appear.

use serde::Serialize;

use crate::error::ReindexError;

/// Where a run currently is in the three-phase protocol.
///
/// `ListingItems` and `Indexing` alternate per content type. There is no
/// separate error terminal: a run with recorded errors still reaches
/// `Done` and is reported as "success with N errors", unless Phase A
/// itself failed (which also ends in `Done`, with a single fatal error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    DiscoveringTypes,
    ListingItems,
    Indexing,
    Done,
}

/// One recorded failure, scoped to a type and optionally an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunError {
    pub content_type: String,
    pub item_id: Option<String>,
    pub message: String,
}

/// Cumulative status of one reindex run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStatus {
    pub phase: RunPhase,
    pub current_type: Option<String>,
    pub current_item: Option<String>,
    pub errors: Vec<RunError>,
    pub items_processed: u64,
    /// Total items for the current type. Unknown until that type's
    /// listing completes.
    pub items_total: Option<u64>,
}

impl RunStatus {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Idle,
            current_type: None,
            current_item: None,
            errors: Vec::new(),
            items_processed: 0,
            items_total: None,
        }
    }

    pub fn begin_discovery(&mut self) {
        self.phase = RunPhase::DiscoveringTypes;
    }

    pub fn begin_listing(&mut self, content_type: &str) {
        self.phase = RunPhase::ListingItems;
        self.current_type = Some(content_type.to_string());
        self.current_item = None;
        self.items_total = None;
    }

    pub fn listed(&mut self, total: u64) {
        self.items_total = Some(total);
    }

    pub fn begin_item(&mut self, item_id: &str) {
        self.phase = RunPhase::Indexing;
        self.current_item = Some(item_id.to_string());
    }

    pub fn item_done(&mut self) {
        self.items_processed += 1;
    }

    /// Record a failure. Fatal or not, it is appended in encounter order.
    pub fn record(&mut self, err: &ReindexError) {
        self.errors.push(RunError {
            content_type: err.content_type().unwrap_or("registry").to_string(),
            item_id: err.item_id().map(str::to_string),
            message: err.to_string(),
        });
    }

    pub fn finish(&mut self) {
        self.phase = RunPhase::Done;
        self.current_type = None;
        self.current_item = None;
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Human-readable error summary: `"No Errors"` for a clean run,
    /// otherwise one `type:id  message` line per recorded failure.
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "No Errors".to_string();
        }
        let mut out = String::new();
        for err in &self.errors {
            let id = err.item_id.as_deref().unwrap_or("-");
            out.push_str(&format!("{}:{}  {}\n", err.content_type, id, err.message));
        }
        out
    }
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::new()
    }
}
