//! Typed errors for the reindex protocol.
//!
//! The taxonomy mirrors the failure scoping of the three-phase protocol:
//! only [`ReindexError::RegistryUnavailable`] aborts a run; every other
//! variant is recorded against its unit of work (type, item, or comment)
//! and processing continues at the next unit.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReindexError {
    /// Content type enumeration failed. Fatal: the run ends immediately
    /// with this as its single error.
    #[error("unable to retrieve content types: {0}")]
    RegistryUnavailable(String),

    /// A provider failed while listing or serving a whole content type.
    /// Scoped to that type: its purge and indexing are skipped.
    #[error("provider error for '{content_type}': {message}")]
    Provider {
        content_type: String,
        message: String,
    },

    /// The item no longer exists at the provider.
    #[error("item '{content_type}:{item_id}' not found")]
    NotFound {
        content_type: String,
        item_id: String,
    },

    /// The provider returned an item missing required fields (typically
    /// permission sub-fields, which are never silently defaulted).
    #[error("malformed item '{content_type}:{item_id}': {message}")]
    MalformedItem {
        content_type: String,
        item_id: String,
        message: String,
    },

    /// A comment lookup or comment indexing failed. Scoped to that
    /// comment: the parent item still counts as indexed.
    #[error("comment '{comment_id}' of '{content_type}:{item_id}': {message}")]
    Comment {
        content_type: String,
        item_id: String,
        comment_id: String,
        message: String,
    },

    /// The index store rejected a write for one document. Scoped to that
    /// item.
    #[error("index write failed for '{content_type}:{item_id}': {message}")]
    IndexWrite {
        content_type: String,
        item_id: String,
        message: String,
    },
}

impl ReindexError {
    /// Whether this error aborts the whole run. True only for
    /// [`ReindexError::RegistryUnavailable`]; a run with any number of
    /// non-fatal errors still completes as "success with N errors".
    pub fn is_fatal(&self) -> bool {
        matches!(self, ReindexError::RegistryUnavailable(_))
    }

    /// The content type this error is scoped to, if any.
    pub fn content_type(&self) -> Option<&str> {
        match self {
            ReindexError::RegistryUnavailable(_) => None,
            ReindexError::Provider { content_type, .. }
            | ReindexError::NotFound { content_type, .. }
            | ReindexError::MalformedItem { content_type, .. }
            | ReindexError::Comment { content_type, .. }
            | ReindexError::IndexWrite { content_type, .. } => Some(content_type),
        }
    }

    /// The item id this error is scoped to, if any.
    pub fn item_id(&self) -> Option<&str> {
        match self {
            ReindexError::NotFound { item_id, .. }
            | ReindexError::MalformedItem { item_id, .. }
            | ReindexError::Comment { item_id, .. }
            | ReindexError::IndexWrite { item_id, .. } => Some(item_id),
            _ => None,
        }
    }
}
