//! SQLite-backed [`SearchIndex`] implementation.
//!
//! Persists whole documents keyed by `(content_type, item_id)` with an
//! FTS5 shadow table kept in lockstep. Permissions are stored as a JSON
//! column; the reindexer never queries them, it only carries them.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::models::{IndexDocument, Permissions};

use super::SearchIndex;

pub struct SqliteIndex {
    pool: SqlitePool,
}

impl SqliteIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchIndex for SqliteIndex {
    async fn remove_all(&self, content_type: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM search_documents WHERE content_type = ?")
            .bind(content_type)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM search_fts WHERE content_type = ?")
            .bind(content_type)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn upsert(&self, doc: &IndexDocument) -> Result<()> {
        let perms_json = serde_json::to_string(&doc.perms)?;
        let now = chrono::Utc::now().timestamp();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO search_documents
                (content_type, item_id, parent_id, title, content, perms_json, indexed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(content_type, item_id) DO UPDATE SET
                parent_id = excluded.parent_id,
                title = excluded.title,
                content = excluded.content,
                perms_json = excluded.perms_json,
                indexed_at = excluded.indexed_at
            "#,
        )
        .bind(&doc.content_type)
        .bind(&doc.item_id)
        .bind(&doc.parent_id)
        .bind(&doc.title)
        .bind(&doc.content)
        .bind(&perms_json)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // FTS5 has no upsert; delete-then-insert keeps the shadow in step.
        sqlx::query("DELETE FROM search_fts WHERE content_type = ? AND item_id = ?")
            .bind(&doc.content_type)
            .bind(&doc.item_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO search_fts (content_type, item_id, title, content) VALUES (?, ?, ?, ?)")
            .bind(&doc.content_type)
            .bind(&doc.item_id)
            .bind(doc.title.as_deref().unwrap_or(""))
            .bind(&doc.content)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove(&self, content_type: &str, item_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM search_documents WHERE content_type = ? AND item_id = ?")
            .bind(content_type)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM search_fts WHERE content_type = ? AND item_id = ?")
            .bind(content_type)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn documents(&self, content_type: &str) -> Result<Vec<IndexDocument>> {
        let rows = sqlx::query(
            "SELECT item_id, parent_id, title, content, perms_json \
             FROM search_documents WHERE content_type = ? ORDER BY item_id",
        )
        .bind(content_type)
        .fetch_all(&self.pool)
        .await?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            let perms_json: String = row.try_get("perms_json")?;
            let perms: Permissions = serde_json::from_str(&perms_json)
                .map_err(|e| anyhow!("corrupt perms_json: {}", e))?;
            docs.push(IndexDocument {
                item_id: row.try_get("item_id")?,
                content_type: content_type.to_string(),
                parent_id: row.try_get("parent_id")?,
                title: row.try_get("title")?,
                content: row.try_get("content")?,
                perms,
            });
        }
        Ok(docs)
    }
}
