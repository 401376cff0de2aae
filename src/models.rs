//! Core data models used throughout the reindexer.
//!
//! These types represent the content references, permission metadata, and
//! index documents that flow from the content providers into the search
//! index store.

use serde::{Deserialize, Serialize};

/// Reference to one content item within a content type.
///
/// The `item_id` is unique within its `content_type`; the pair identifies
/// exactly one indexable item across the whole platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemRef {
    pub content_type: String,
    pub item_id: String,
}

impl ItemRef {
    pub fn new(content_type: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            item_id: item_id.into(),
        }
    }
}

/// Access-control metadata copied verbatim from a content provider.
///
/// The reindexer never interprets these bits; they travel with the
/// document so the search frontend can filter results by viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub owner_id: i64,
    pub group_id: i64,
    pub perm_owner: u8,
    pub perm_group: u8,
    pub perm_members: u8,
    pub perm_anon: u8,
}

/// The unit submitted to the index store.
///
/// `(content_type, item_id)` is the document key: resubmitting the same
/// key overwrites the existing document, never duplicates it. Comment
/// documents are indexed under their parent's `content_type` with
/// `parent_id` set and an item id of the form `"{parent}::{comment}"`,
/// so purging a type removes its comments together with its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub item_id: String,
    pub content_type: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub title: Option<String>,
    pub content: String,
    pub perms: Permissions,
}

impl IndexDocument {
    /// Build the document for a content item.
    pub fn from_item(content_type: &str, item: &SourceItem) -> Self {
        Self {
            item_id: item.id.clone(),
            content_type: content_type.to_string(),
            parent_id: None,
            title: item.title.clone(),
            content: item.content.clone(),
            perms: item.perms,
        }
    }

    /// Build the document for a comment, inheriting the parent's
    /// permissions (comments are visible to whoever can see the thread).
    pub fn from_comment(
        parent: &ItemRef,
        parent_perms: Permissions,
        comment: &SourceComment,
    ) -> Self {
        Self {
            item_id: format!("{}::{}", parent.item_id, comment.id),
            content_type: parent.content_type.clone(),
            parent_id: Some(parent.item_id.clone()),
            title: comment.title.clone(),
            content: comment.content.clone(),
            perms: parent_perms,
        }
    }
}

/// Item detail as returned by a content provider, before it becomes an
/// [`IndexDocument`]. Permissions are mandatory: a provider that cannot
/// supply them must fail the lookup rather than default them.
#[derive(Debug, Clone)]
pub struct SourceItem {
    pub id: String,
    pub title: Option<String>,
    pub content: String,
    pub perms: Permissions,
}

/// Comment detail as returned by a content provider. Comments carry no
/// permissions of their own; they inherit the parent item's.
#[derive(Debug, Clone)]
pub struct SourceComment {
    pub id: String,
    pub title: Option<String>,
    pub content: String,
}
