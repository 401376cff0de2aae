//! In-memory [`SearchIndex`] implementation for tests.
//!
//! Documents live in a `Vec` behind `std::sync::RwLock`. Every port call
//! is also appended to an operation log so tests can assert call
//! ordering (purge-before-upsert, exclusion of comment fan-out).

use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::IndexDocument;

use super::SearchIndex;

/// In-memory index store with an operation log.
pub struct MemoryIndex {
    docs: RwLock<Vec<IndexDocument>>,
    ops: RwLock<Vec<String>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
            ops: RwLock::new(Vec::new()),
        }
    }

    /// The recorded operations, e.g. `"remove_all:article"`,
    /// `"upsert:article:1"`.
    pub fn ops(&self) -> Vec<String> {
        self.ops.read().unwrap().clone()
    }

    fn log(&self, op: String) {
        self.ops.write().unwrap().push(op);
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn remove_all(&self, content_type: &str) -> Result<()> {
        self.log(format!("remove_all:{}", content_type));
        let mut docs = self.docs.write().unwrap();
        docs.retain(|d| d.content_type != content_type);
        Ok(())
    }

    async fn upsert(&self, doc: &IndexDocument) -> Result<()> {
        self.log(format!("upsert:{}:{}", doc.content_type, doc.item_id));
        let mut docs = self.docs.write().unwrap();
        docs.retain(|d| !(d.content_type == doc.content_type && d.item_id == doc.item_id));
        docs.push(doc.clone());
        Ok(())
    }

    async fn remove(&self, content_type: &str, item_id: &str) -> Result<()> {
        self.log(format!("remove:{}:{}", content_type, item_id));
        let mut docs = self.docs.write().unwrap();
        docs.retain(|d| !(d.content_type == content_type && d.item_id == item_id));
        Ok(())
    }

    async fn documents(&self, content_type: &str) -> Result<Vec<IndexDocument>> {
        let docs = self.docs.read().unwrap();
        let mut out: Vec<IndexDocument> = docs
            .iter()
            .filter(|d| d.content_type == content_type)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Permissions;

    fn doc(ty: &str, id: &str, content: &str) -> IndexDocument {
        IndexDocument {
            item_id: id.to_string(),
            content_type: ty.to_string(),
            parent_id: None,
            title: None,
            content: content.to_string(),
            perms: Permissions {
                owner_id: 1,
                group_id: 1,
                perm_owner: 3,
                perm_group: 2,
                perm_members: 2,
                perm_anon: 2,
            },
        }
    }

    #[tokio::test]
    async fn upsert_overwrites_by_key() {
        let index = MemoryIndex::new();
        index.upsert(&doc("article", "1", "old")).await.unwrap();
        index.upsert(&doc("article", "1", "new")).await.unwrap();
        let docs = index.documents("article").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "new");
    }

    #[tokio::test]
    async fn remove_all_is_type_scoped_and_idempotent() {
        let index = MemoryIndex::new();
        index.upsert(&doc("article", "1", "a")).await.unwrap();
        index.upsert(&doc("forum", "1", "f")).await.unwrap();
        index.remove_all("article").await.unwrap();
        index.remove_all("article").await.unwrap();
        assert!(index.documents("article").await.unwrap().is_empty());
        assert_eq!(index.documents("forum").await.unwrap().len(), 1);
    }
}
