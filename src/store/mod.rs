//! Storage abstraction for the search index.
//!
//! The [`SearchIndex`] trait is the reindexer's only view of the search
//! engine: submit or overwrite a document, purge a content type, remove a
//! single document. The engine's internals (tokenization, ranking) live
//! behind this port and are not this crate's concern.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::IndexDocument;

/// The index store port.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`remove_all`](SearchIndex::remove_all) | Purge every document of a content type |
/// | [`upsert`](SearchIndex::upsert) | Insert or overwrite by `(content_type, item_id)` |
/// | [`remove`](SearchIndex::remove) | Delete a single document |
/// | [`documents`](SearchIndex::documents) | List a type's documents (verification, tests) |
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Delete every document indexed under `content_type`. Idempotent:
    /// purging a type with no documents succeeds silently.
    async fn remove_all(&self, content_type: &str) -> Result<()>;

    /// Insert or overwrite the document identified by
    /// `(content_type, item_id)`.
    async fn upsert(&self, doc: &IndexDocument) -> Result<()>;

    /// Delete a single document. Succeeds silently if absent.
    async fn remove(&self, content_type: &str, item_id: &str) -> Result<()>;

    /// All documents currently indexed under `content_type`, ordered by
    /// item id.
    async fn documents(&self, content_type: &str) -> Result<Vec<IndexDocument>>;
}
