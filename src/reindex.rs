//! The three-phase reindex orchestrator.
//!
//! Phase A discovers content types, Phase B lists one type's items and
//! purges its stale index entries, Phase C indexes one item (with
//! comment fan-out for non-excluded types). Each phase call is stateless:
//! the caller carries the cursor (current type, current item list)
//! between calls, so a browser, the CLI driver, or an HTTP client can
//! all drive a run one bounded step at a time and show incremental
//! progress.
//!
//! Failure scoping follows the protocol contract: only a type-discovery
//! failure aborts a run. A type whose listing fails is skipped (purge
//! deliberately included — never delete without a fresh listing); an
//! item that fails is recorded and skipped; a comment that fails never
//! fails its parent item.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ReindexError;
use crate::models::{IndexDocument, ItemRef};
use crate::progress::{ReindexProgressEvent, ReindexProgressReporter};
use crate::provider::{ProviderFailure, ProviderRegistry};
use crate::registry::TypeRegistry;
use crate::status::RunStatus;
use crate::store::SearchIndex;

/// Outcome of indexing one item, including the comment fan-out.
///
/// Comment errors are carried here rather than raised: the parent item
/// still counts as indexed.
#[derive(Debug)]
pub struct ItemIndexed {
    pub comments_indexed: u64,
    pub comment_errors: Vec<ReindexError>,
}

pub struct Reindexer {
    registry: Box<dyn TypeRegistry>,
    providers: ProviderRegistry,
    index: Arc<dyn SearchIndex>,
    /// Types whose comments are indexed by the type itself; the generic
    /// fan-out must skip them.
    comment_exclusions: HashSet<String>,
}

impl Reindexer {
    pub fn new(
        registry: Box<dyn TypeRegistry>,
        providers: ProviderRegistry,
        index: Arc<dyn SearchIndex>,
        comment_exclusions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            registry,
            providers,
            index,
            comment_exclusions: comment_exclusions.into_iter().collect(),
        }
    }

    /// Phase A: the full ordered content type list, or the run's single
    /// fatal error.
    pub async fn discover_types(&self) -> Result<Vec<String>, ReindexError> {
        self.registry.list_content_types().await
    }

    /// Phase B: list one type's items and purge its index entries.
    ///
    /// The purge runs unconditionally after a successful listing — even
    /// when the list is empty — so documents for items removed since the
    /// last run never survive. When the listing fails the purge is
    /// skipped: never delete without a successful fresh listing.
    pub async fn list_items(&self, content_type: &str) -> Result<Vec<ItemRef>, ReindexError> {
        let provider =
            self.providers
                .find(content_type)
                .ok_or_else(|| ReindexError::Provider {
                    content_type: content_type.to_string(),
                    message: "no provider registered".to_string(),
                })?;

        let ids = provider
            .list_item_ids()
            .await
            .map_err(|e| ReindexError::Provider {
                content_type: content_type.to_string(),
                message: format!("listing failed: {}", e),
            })?;

        self.index
            .remove_all(content_type)
            .await
            .map_err(|e| ReindexError::Provider {
                content_type: content_type.to_string(),
                message: format!("purge failed: {}", e),
            })?;

        Ok(ids
            .into_iter()
            .map(|id| ItemRef::new(content_type, id))
            .collect())
    }

    /// Phase C: index one item, then fan out over its comments unless
    /// the type is excluded.
    pub async fn index_item(
        &self,
        content_type: &str,
        item_id: &str,
    ) -> Result<ItemIndexed, ReindexError> {
        let provider =
            self.providers
                .find(content_type)
                .ok_or_else(|| ReindexError::Provider {
                    content_type: content_type.to_string(),
                    message: "no provider registered".to_string(),
                })?;

        // The detail contract has exactly three outcomes: fields,
        // NotFound, or MalformedItem. Backend failures surface as the
        // latter so the error stays item-scoped.
        let item = provider.get_item(item_id).await.map_err(|e| match e {
            ProviderFailure::NotFound => ReindexError::NotFound {
                content_type: content_type.to_string(),
                item_id: item_id.to_string(),
            },
            ProviderFailure::Malformed(msg) => ReindexError::MalformedItem {
                content_type: content_type.to_string(),
                item_id: item_id.to_string(),
                message: msg,
            },
            ProviderFailure::Backend(err) => ReindexError::MalformedItem {
                content_type: content_type.to_string(),
                item_id: item_id.to_string(),
                message: err.to_string(),
            },
        })?;

        let doc = IndexDocument::from_item(content_type, &item);
        self.index
            .upsert(&doc)
            .await
            .map_err(|e| ReindexError::IndexWrite {
                content_type: content_type.to_string(),
                item_id: item_id.to_string(),
                message: e.to_string(),
            })?;

        if self.comment_exclusions.contains(content_type) {
            return Ok(ItemIndexed {
                comments_indexed: 0,
                comment_errors: Vec::new(),
            });
        }

        let parent = ItemRef::new(content_type, item_id);
        let mut comments_indexed = 0;
        let mut comment_errors = Vec::new();

        let comment_ids = match provider.list_comment_ids(item_id).await {
            Ok(ids) => ids,
            Err(e) => {
                comment_errors.push(ReindexError::Comment {
                    content_type: content_type.to_string(),
                    item_id: item_id.to_string(),
                    comment_id: "*".to_string(),
                    message: format!("comment listing failed: {}", e),
                });
                Vec::new()
            }
        };

        for comment_id in comment_ids {
            let comment = match provider.get_comment(item_id, &comment_id).await {
                Ok(c) => c,
                Err(e) => {
                    comment_errors.push(ReindexError::Comment {
                        content_type: content_type.to_string(),
                        item_id: item_id.to_string(),
                        comment_id: comment_id.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            let comment_doc = IndexDocument::from_comment(&parent, item.perms, &comment);
            match self.index.upsert(&comment_doc).await {
                Ok(()) => comments_indexed += 1,
                Err(e) => comment_errors.push(ReindexError::Comment {
                    content_type: content_type.to_string(),
                    item_id: item_id.to_string(),
                    comment_id,
                    message: e.to_string(),
                }),
            }
        }

        Ok(ItemIndexed {
            comments_indexed,
            comment_errors,
        })
    }
}

/// Drive a complete run: A → (B → C×n) per type, in registry order.
///
/// Owns the [`RunStatus`] accumulator and the continue-on-error policy.
/// Always reaches `Done`; a Phase-A failure short-circuits there with a
/// single fatal error. `items_processed` counts attempted items, failed
/// ones included.
pub async fn run_full(
    reindexer: &Reindexer,
    reporter: &dyn ReindexProgressReporter,
) -> RunStatus {
    let mut status = RunStatus::new();

    status.begin_discovery();
    reporter.report(ReindexProgressEvent::Discovering);

    let types = match reindexer.discover_types().await {
        Ok(types) => types,
        Err(e) => {
            status.record(&e);
            status.finish();
            reporter.report(ReindexProgressEvent::Done {
                items: 0,
                errors: status.error_count() as u64,
            });
            return status;
        }
    };

    for content_type in &types {
        status.begin_listing(content_type);
        reporter.report(ReindexProgressEvent::Listing {
            content_type: content_type.clone(),
        });

        let items = match reindexer.list_items(content_type).await {
            Ok(items) => items,
            Err(e) => {
                // Type-scoped failure: record it and move to the next
                // type with an empty item list.
                status.record(&e);
                continue;
            }
        };

        let total = items.len() as u64;
        status.listed(total);

        for (n, item) in items.iter().enumerate() {
            status.begin_item(&item.item_id);
            match reindexer.index_item(content_type, &item.item_id).await {
                Ok(outcome) => {
                    for comment_error in &outcome.comment_errors {
                        status.record(comment_error);
                    }
                }
                Err(e) => status.record(&e),
            }
            status.item_done();
            reporter.report(ReindexProgressEvent::Indexing {
                content_type: content_type.clone(),
                n: (n + 1) as u64,
                total,
            });
        }
    }

    status.finish();
    reporter.report(ReindexProgressEvent::Done {
        items: status.items_processed,
        errors: status.error_count() as u64,
    });
    status
}
