//! The content provider port.
//!
//! Each content type on the platform (articles, forum posts, wiki pages,
//! plugin content) implements [`ContentProvider`] to expose its item
//! listing, item detail, and comment lookups to the reindexer. Built-in
//! providers are SQL-backed ([`crate::provider_sql::SqlProvider`]);
//! tests register their own in-memory implementations.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{SourceComment, SourceItem};

/// Failure reported by a provider operation, before the orchestrator
/// attaches type/item context to it.
#[derive(Debug, Error)]
pub enum ProviderFailure {
    /// The requested item or comment does not exist.
    #[error("not found")]
    NotFound,
    /// The record exists but is missing required fields (e.g. NULL
    /// permission columns). Never silently defaulted.
    #[error("malformed record: {0}")]
    Malformed(String),
    /// The provider's backend failed (query error, connection loss).
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// A content type's listing and detail interface.
///
/// # Lifecycle
///
/// 1. Providers are registered in a [`ProviderRegistry`] when the
///    application starts (from config, or programmatically).
/// 2. The registry's indexable providers become discoverable content
///    types.
/// 3. During a reindex, `list_item_ids` is called once per type and
///    `get_item` once per item; comment lookups run only for types
///    outside the comment-exclusion set.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// The content type this provider serves (e.g. `"article"`,
    /// `"forum"`, a plugin name).
    fn content_type(&self) -> &str;

    /// Whether this provider exposes item detail for indexing. Declared
    /// up front so the registry never probes capabilities at runtime.
    /// Non-indexable providers are skipped by type discovery.
    fn indexable(&self) -> bool {
        true
    }

    /// List every item id of this type, in a stable order. An empty list
    /// is valid (the type currently has no items).
    async fn list_item_ids(&self) -> Result<Vec<String>, ProviderFailure>;

    /// Fetch one item's indexable detail: title, raw searchable content,
    /// and the full permission set.
    async fn get_item(&self, item_id: &str) -> Result<SourceItem, ProviderFailure>;

    /// List the comment ids attached to an item, in a stable order.
    /// Defaults to no comments.
    async fn list_comment_ids(&self, _item_id: &str) -> Result<Vec<String>, ProviderFailure> {
        Ok(Vec::new())
    }

    /// Fetch one comment's detail.
    async fn get_comment(
        &self,
        _item_id: &str,
        _comment_id: &str,
    ) -> Result<SourceComment, ProviderFailure> {
        Err(ProviderFailure::NotFound)
    }
}

/// Registry of content providers, one per content type.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn ContentProvider>>,
}

impl ProviderRegistry {
    /// Create an empty provider registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Register a provider. Later registrations for the same content
    /// type shadow earlier ones in [`find`](ProviderRegistry::find).
    pub fn register(&mut self, provider: Box<dyn ContentProvider>) {
        self.providers.push(provider);
    }

    /// Find the provider for a content type.
    pub fn find(&self, content_type: &str) -> Option<&dyn ContentProvider> {
        self.providers
            .iter()
            .rev()
            .find(|p| p.content_type() == content_type)
            .map(|p| p.as_ref())
    }

    /// Content types of all registered providers that declare themselves
    /// indexable, in registration order.
    pub fn indexable_types(&self) -> Vec<String> {
        self.providers
            .iter()
            .filter(|p| p.indexable())
            .map(|p| p.content_type().to_string())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
