//! End-to-end tests for the three-phase reindex protocol.
//!
//! These drive the orchestrator over in-memory providers and the
//! in-memory index store, proving the protocol's ordering, scoping, and
//! fan-out guarantees without a database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use reindexer::error::ReindexError;
use reindexer::models::{Permissions, SourceComment, SourceItem};
use reindexer::progress::NoProgress;
use reindexer::provider::{ContentProvider, ProviderFailure, ProviderRegistry};
use reindexer::registry::{ContentTypeRegistry, TypeRegistry};
use reindexer::reindex::{run_full, Reindexer};
use reindexer::status::{RunPhase, RunStatus};
use reindexer::store::memory::MemoryIndex;
use reindexer::store::SearchIndex;

// ─── Test provider ──────────────────────────────────────────────────

/// In-memory content provider: a listing, per-item detail, and per-item
/// comments. Items can be listed without having detail (vanished between
/// phases), and listing or comment enumeration can be made to fail.
struct MemProvider {
    ty: String,
    listing: Vec<String>,
    details: HashMap<String, SourceItem>,
    malformed: HashMap<String, String>,
    comments: HashMap<String, Vec<SourceComment>>,
    fail_listing: bool,
    fail_comments: bool,
}

impl MemProvider {
    fn new(ty: &str) -> Self {
        Self {
            ty: ty.to_string(),
            listing: Vec::new(),
            details: HashMap::new(),
            malformed: HashMap::new(),
            comments: HashMap::new(),
            fail_listing: false,
            fail_comments: false,
        }
    }

    fn with_item(mut self, id: &str, content: &str, perms: Permissions) -> Self {
        self.listing.push(id.to_string());
        self.details.insert(
            id.to_string(),
            SourceItem {
                id: id.to_string(),
                title: Some(format!("{} {}", self.ty, id)),
                content: content.to_string(),
                perms,
            },
        );
        self
    }

    /// Listed but gone by the time detail is fetched.
    fn with_vanished_item(mut self, id: &str) -> Self {
        self.listing.push(id.to_string());
        self
    }

    /// Listed, but its record is missing required fields.
    fn with_malformed_item(mut self, id: &str, reason: &str) -> Self {
        self.listing.push(id.to_string());
        self.malformed.insert(id.to_string(), reason.to_string());
        self
    }

    fn with_comment(mut self, item_id: &str, comment_id: &str, content: &str) -> Self {
        self.comments
            .entry(item_id.to_string())
            .or_default()
            .push(SourceComment {
                id: comment_id.to_string(),
                title: None,
                content: content.to_string(),
            });
        self
    }

    fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    fn failing_comments(mut self) -> Self {
        self.fail_comments = true;
        self
    }
}

#[async_trait]
impl ContentProvider for MemProvider {
    fn content_type(&self) -> &str {
        &self.ty
    }

    async fn list_item_ids(&self) -> Result<Vec<String>, ProviderFailure> {
        if self.fail_listing {
            return Err(ProviderFailure::Backend(anyhow::anyhow!(
                "content table unavailable"
            )));
        }
        Ok(self.listing.clone())
    }

    async fn get_item(&self, item_id: &str) -> Result<SourceItem, ProviderFailure> {
        if let Some(reason) = self.malformed.get(item_id) {
            return Err(ProviderFailure::Malformed(reason.clone()));
        }
        self.details
            .get(item_id)
            .cloned()
            .ok_or(ProviderFailure::NotFound)
    }

    async fn list_comment_ids(&self, item_id: &str) -> Result<Vec<String>, ProviderFailure> {
        if self.fail_comments {
            return Err(ProviderFailure::Backend(anyhow::anyhow!(
                "comments table unavailable"
            )));
        }
        Ok(self
            .comments
            .get(item_id)
            .map(|cs| cs.iter().map(|c| c.id.clone()).collect())
            .unwrap_or_default())
    }

    async fn get_comment(
        &self,
        item_id: &str,
        comment_id: &str,
    ) -> Result<SourceComment, ProviderFailure> {
        self.comments
            .get(item_id)
            .and_then(|cs| cs.iter().find(|c| c.id == comment_id))
            .cloned()
            .ok_or(ProviderFailure::NotFound)
    }
}

/// A registry whose enumeration is down — the Phase A fatal path.
struct UnavailableRegistry;

#[async_trait]
impl TypeRegistry for UnavailableRegistry {
    async fn list_content_types(&self) -> Result<Vec<String>, ReindexError> {
        Err(ReindexError::RegistryUnavailable(
            "plugin enumeration unavailable".to_string(),
        ))
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn perms(owner_id: i64) -> Permissions {
    Permissions {
        owner_id,
        group_id: 13,
        perm_owner: 3,
        perm_group: 2,
        perm_members: 2,
        perm_anon: 2,
    }
}

fn build(providers: Vec<MemProvider>, exclusions: &[&str]) -> (Reindexer, Arc<MemoryIndex>) {
    let mut registry_providers = ProviderRegistry::new();
    for provider in providers {
        registry_providers.register(Box::new(provider));
    }
    let registry = ContentTypeRegistry::new("article", &registry_providers);
    let index = Arc::new(MemoryIndex::new());
    let reindexer = Reindexer::new(
        Box::new(registry),
        registry_providers,
        index.clone(),
        exclusions.iter().map(|s| s.to_string()),
    );
    (reindexer, index)
}

// ─── Tests ──────────────────────────────────────────────────────────

/// Phase B always purges before any Phase C upsert for the type, and
/// purges even when the type has no items.
#[tokio::test]
async fn purge_precedes_upserts_and_runs_for_empty_types() {
    let (reindexer, index) = build(
        vec![
            MemProvider::new("article").with_item("1", "hello", perms(2)),
            MemProvider::new("staticpages"), // no items
        ],
        &[],
    );

    let status = run_full(&reindexer, &NoProgress).await;
    assert_eq!(status.phase, RunPhase::Done);
    assert_eq!(status.error_count(), 0);

    let ops = index.ops();
    let purge_pos = ops.iter().position(|o| o == "remove_all:article").unwrap();
    let upsert_pos = ops.iter().position(|o| o == "upsert:article:1").unwrap();
    assert!(purge_pos < upsert_pos, "purge must precede upserts: {:?}", ops);
    assert!(
        ops.contains(&"remove_all:staticpages".to_string()),
        "empty types are still purged: {:?}",
        ops
    );
}

/// Running the full sequence twice over unchanged content leaves the
/// index equal to a single run.
#[tokio::test]
async fn reindex_is_idempotent() {
    let (reindexer, index) = build(
        vec![MemProvider::new("article")
            .with_item("1", "first", perms(2))
            .with_item("2", "second", perms(3))
            .with_comment("1", "7", "nice post")],
        &[],
    );

    run_full(&reindexer, &NoProgress).await;
    let after_once = index.documents("article").await.unwrap();

    run_full(&reindexer, &NoProgress).await;
    let after_twice = index.documents("article").await.unwrap();

    assert_eq!(after_once, after_twice);
    assert_eq!(after_once.len(), 3); // two items + one comment
}

/// Excluded types never trigger comment fan-out.
#[tokio::test]
async fn excluded_types_skip_comment_fanout() {
    let (reindexer, index) = build(
        vec![MemProvider::new("forum")
            .with_item("10", "topic", perms(2))
            .with_comment("10", "1", "reply")],
        &["forum", "dokuwiki"],
    );

    run_full(&reindexer, &NoProgress).await;

    let docs = index.documents("forum").await.unwrap();
    assert_eq!(docs.len(), 1, "no comment documents for excluded types");
    assert_eq!(docs[0].item_id, "10");
}

/// Comments are indexed with the parent's permissions, under the
/// parent's type, keyed so the type purge removes them too.
#[tokio::test]
async fn comments_inherit_parent_permissions() {
    let (reindexer, index) = build(
        vec![MemProvider::new("article")
            .with_item("42", "body", perms(99))
            .with_comment("42", "7", "first!")
            .with_comment("42", "8", "second!")],
        &[],
    );

    run_full(&reindexer, &NoProgress).await;

    let docs = index.documents("article").await.unwrap();
    assert_eq!(docs.len(), 3);
    let comment = docs.iter().find(|d| d.item_id == "42::7").unwrap();
    assert_eq!(comment.perms, perms(99));
    assert_eq!(comment.parent_id.as_deref(), Some("42"));

    // A fresh purge takes the comments with it.
    index.remove_all("article").await.unwrap();
    assert!(index.documents("article").await.unwrap().is_empty());
}

/// A comment failure is recorded but the parent item still indexes.
#[tokio::test]
async fn comment_failure_does_not_fail_parent() {
    let (reindexer, index) = build(
        vec![MemProvider::new("article")
            .with_item("1", "body", perms(2))
            .failing_comments()],
        &[],
    );

    let status = run_full(&reindexer, &NoProgress).await;

    assert_eq!(index.documents("article").await.unwrap().len(), 1);
    assert_eq!(status.error_count(), 1);
    assert_eq!(status.errors[0].content_type, "article");
    assert_eq!(status.items_processed, 1);
}

/// The canonical driving scenario: article with items 1 and 2, item 2 vanished.
/// Phase calls succeed/fail as [ok, ok, ok, err]; one purge, one upsert,
/// one recorded error.
#[tokio::test]
async fn vanished_item_records_one_error_and_no_upsert() {
    let (reindexer, index) = build(
        vec![MemProvider::new("article")
            .with_item("1", "still here", perms(2))
            .with_vanished_item("2")],
        &[],
    );

    let types = reindexer.discover_types().await.unwrap();
    assert_eq!(types, vec!["article"]);

    let items = reindexer.list_items("article").await.unwrap();
    assert_eq!(
        items.iter().map(|i| i.item_id.as_str()).collect::<Vec<_>>(),
        vec!["1", "2"]
    );

    assert!(reindexer.index_item("article", "1").await.is_ok());
    let err = reindexer.index_item("article", "2").await.unwrap_err();
    assert!(matches!(err, ReindexError::NotFound { .. }));

    let mut status = RunStatus::new();
    status.record(&err);
    assert_eq!(status.error_count(), 1);
    assert_eq!(status.errors[0].content_type, "article");
    assert_eq!(status.errors[0].item_id.as_deref(), Some("2"));

    let ops = index.ops();
    assert_eq!(
        ops.iter().filter(|o| *o == "remove_all:article").count(),
        1
    );
    assert_eq!(
        ops.iter().filter(|o| o.starts_with("upsert:")).count(),
        1
    );
}

/// An item whose record is missing required permission fields is a
/// recorded malformed-item error with no document written, never a
/// silently defaulted one. The run continues past it.
#[tokio::test]
async fn malformed_item_records_error_without_upsert() {
    let (reindexer, index) = build(
        vec![MemProvider::new("article")
            .with_item("1", "fine", perms(2))
            .with_malformed_item("2", "perm_anon is NULL")],
        &[],
    );

    let err = reindexer.index_item("article", "2").await.unwrap_err();
    assert!(matches!(err, ReindexError::MalformedItem { .. }));

    let status = run_full(&reindexer, &NoProgress).await;

    assert_eq!(status.phase, RunPhase::Done);
    assert_eq!(status.error_count(), 1);
    assert_eq!(status.errors[0].content_type, "article");
    assert_eq!(status.errors[0].item_id.as_deref(), Some("2"));
    assert!(status.errors[0].message.contains("perm_anon"));
    assert_eq!(status.items_processed, 2);

    let ops = index.ops();
    assert!(!ops.contains(&"upsert:article:2".to_string()), "{:?}", ops);
    let docs = index.documents("article").await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].item_id, "1");
}

/// A failed listing skips the purge for that type and the run still
/// completes.
#[tokio::test]
async fn listing_failure_skips_purge_and_continues() {
    let (reindexer, index) = build(
        vec![
            MemProvider::new("article").with_item("1", "a", perms(2)),
            MemProvider::new("wiki").failing_listing(),
        ],
        &[],
    );

    // Seed a stale wiki document to prove the purge is skipped.
    index
        .upsert(&reindexer::models::IndexDocument {
            item_id: "stale".to_string(),
            content_type: "wiki".to_string(),
            parent_id: None,
            title: None,
            content: "old".to_string(),
            perms: perms(1),
        })
        .await
        .unwrap();

    let status = run_full(&reindexer, &NoProgress).await;

    assert_eq!(status.phase, RunPhase::Done);
    assert_eq!(status.error_count(), 1);
    assert_eq!(status.errors[0].content_type, "wiki");

    let ops = index.ops();
    assert!(
        !ops.contains(&"remove_all:wiki".to_string()),
        "never purge without a fresh listing: {:?}",
        ops
    );
    assert_eq!(index.documents("wiki").await.unwrap().len(), 1);
    assert_eq!(index.documents("article").await.unwrap().len(), 1);
}

/// Error order is stable: failures appear first-encountered-first.
#[tokio::test]
async fn error_order_is_stable() {
    let (reindexer, _index) = build(
        vec![MemProvider::new("article")
            .with_vanished_item("1")
            .with_vanished_item("2")],
        &[],
    );

    let status = run_full(&reindexer, &NoProgress).await;

    assert_eq!(status.error_count(), 2);
    assert_eq!(status.errors[0].item_id.as_deref(), Some("1"));
    assert_eq!(status.errors[1].item_id.as_deref(), Some("2"));
}

/// A registry failure is fatal: the run goes straight to Done with one
/// error and touches nothing.
#[tokio::test]
async fn registry_failure_aborts_the_run() {
    let index = Arc::new(MemoryIndex::new());
    let reindexer = Reindexer::new(
        Box::new(UnavailableRegistry),
        ProviderRegistry::new(),
        index.clone(),
        Vec::new(),
    );

    let status = run_full(&reindexer, &NoProgress).await;

    assert_eq!(status.phase, RunPhase::Done);
    assert_eq!(status.error_count(), 1);
    assert_eq!(status.errors[0].content_type, "registry");
    assert_eq!(status.items_processed, 0);
    assert!(index.ops().is_empty());
}
