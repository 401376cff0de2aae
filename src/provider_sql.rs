//! SQL-backed content provider.
//!
//! Reads items straight from the platform's content tables using the
//! per-provider mapping in the config file, and comments from the shared
//! platform comments table. Permission columns use the platform's
//! conventional names (`owner_id`, `group_id`, `perm_owner`,
//! `perm_group`, `perm_members`, `perm_anon`); a NULL in any of them is
//! reported as a malformed item rather than defaulted.

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::config::{CommentsConfig, ProviderConfig};
use crate::models::{Permissions, SourceComment, SourceItem};
use crate::provider::{ContentProvider, ProviderFailure};

pub struct SqlProvider {
    content_type: String,
    pool: SqlitePool,
    cfg: ProviderConfig,
    comments: Option<CommentsConfig>,
}

impl SqlProvider {
    pub fn new(
        content_type: String,
        pool: SqlitePool,
        cfg: ProviderConfig,
        comments: Option<CommentsConfig>,
    ) -> Self {
        Self {
            content_type,
            pool,
            cfg,
            comments,
        }
    }
}

fn perm_bits(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<u8, ProviderFailure> {
    let value: Option<i64> = row
        .try_get(column)
        .map_err(|e| ProviderFailure::Backend(anyhow!(e)))?;
    let value = value.ok_or_else(|| ProviderFailure::Malformed(format!("{} is NULL", column)))?;
    u8::try_from(value)
        .map_err(|_| ProviderFailure::Malformed(format!("{} out of range: {}", column, value)))
}

#[async_trait]
impl ContentProvider for SqlProvider {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn indexable(&self) -> bool {
        self.cfg.indexable
    }

    async fn list_item_ids(&self) -> Result<Vec<String>, ProviderFailure> {
        let sql = format!(
            "SELECT CAST({id} AS TEXT) FROM {table} ORDER BY {id}",
            id = self.cfg.id_column,
            table = self.cfg.table,
        );
        let ids: Vec<String> = sqlx::query_scalar(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ProviderFailure::Backend(anyhow!(e)))?;
        Ok(ids)
    }

    async fn get_item(&self, item_id: &str) -> Result<SourceItem, ProviderFailure> {
        let sql = format!(
            "SELECT {title} AS title, {content} AS content, \
             owner_id, group_id, perm_owner, perm_group, perm_members, perm_anon \
             FROM {table} WHERE {id} = ?",
            title = self.cfg.title_column,
            content = self.cfg.content_column,
            table = self.cfg.table,
            id = self.cfg.id_column,
        );
        let row = sqlx::query(&sql)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ProviderFailure::Backend(anyhow!(e)))?
            .ok_or(ProviderFailure::NotFound)?;

        let title: Option<String> = row
            .try_get("title")
            .map_err(|e| ProviderFailure::Backend(anyhow!(e)))?;
        let content: Option<String> = row
            .try_get("content")
            .map_err(|e| ProviderFailure::Backend(anyhow!(e)))?;
        let owner_id: Option<i64> = row
            .try_get("owner_id")
            .map_err(|e| ProviderFailure::Backend(anyhow!(e)))?;
        let group_id: Option<i64> = row
            .try_get("group_id")
            .map_err(|e| ProviderFailure::Backend(anyhow!(e)))?;

        let perms = Permissions {
            owner_id: owner_id
                .ok_or_else(|| ProviderFailure::Malformed("owner_id is NULL".into()))?,
            group_id: group_id
                .ok_or_else(|| ProviderFailure::Malformed("group_id is NULL".into()))?,
            perm_owner: perm_bits(&row, "perm_owner")?,
            perm_group: perm_bits(&row, "perm_group")?,
            perm_members: perm_bits(&row, "perm_members")?,
            perm_anon: perm_bits(&row, "perm_anon")?,
        };

        Ok(SourceItem {
            id: item_id.to_string(),
            title,
            content: content.unwrap_or_default(),
            perms,
        })
    }

    async fn list_comment_ids(&self, item_id: &str) -> Result<Vec<String>, ProviderFailure> {
        let Some(comments) = &self.comments else {
            return Ok(Vec::new());
        };
        let sql = format!(
            "SELECT CAST({id} AS TEXT) FROM {table} WHERE {ty} = ? AND {parent} = ? ORDER BY {id}",
            id = comments.id_column,
            table = comments.table,
            ty = comments.type_column,
            parent = comments.parent_column,
        );
        let ids: Vec<String> = sqlx::query_scalar(&sql)
            .bind(&self.content_type)
            .bind(item_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ProviderFailure::Backend(anyhow!(e)))?;
        Ok(ids)
    }

    async fn get_comment(
        &self,
        item_id: &str,
        comment_id: &str,
    ) -> Result<SourceComment, ProviderFailure> {
        let Some(comments) = &self.comments else {
            return Err(ProviderFailure::NotFound);
        };
        let sql = format!(
            "SELECT {title} AS title, {content} AS content \
             FROM {table} WHERE {ty} = ? AND {parent} = ? AND {id} = ?",
            title = comments.title_column,
            content = comments.content_column,
            table = comments.table,
            ty = comments.type_column,
            parent = comments.parent_column,
            id = comments.id_column,
        );
        let row = sqlx::query(&sql)
            .bind(&self.content_type)
            .bind(item_id)
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ProviderFailure::Backend(anyhow!(e)))?
            .ok_or(ProviderFailure::NotFound)?;

        let title: Option<String> = row
            .try_get("title")
            .map_err(|e| ProviderFailure::Backend(anyhow!(e)))?;
        let content: Option<String> = row
            .try_get("content")
            .map_err(|e| ProviderFailure::Backend(anyhow!(e)))?;

        Ok(SourceComment {
            id: comment_id.to_string(),
            title,
            content: content.unwrap_or_default(),
        })
    }
}
