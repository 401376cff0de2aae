use anyhow::Result;
use sqlx::SqlitePool;

/// Create the index store schema. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS search_documents (
            content_type TEXT NOT NULL,
            item_id TEXT NOT NULL,
            parent_id TEXT,
            title TEXT,
            content TEXT NOT NULL,
            perms_json TEXT NOT NULL,
            indexed_at INTEGER NOT NULL,
            PRIMARY KEY (content_type, item_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // FTS5 CREATE is not idempotent natively, so check first
    let fts_exists: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='search_fts'",
    )
    .fetch_one(pool)
    .await?;

    if !fts_exists {
        sqlx::query(
            r#"
            CREATE VIRTUAL TABLE search_fts USING fts5(
                content_type UNINDEXED,
                item_id UNINDEXED,
                title,
                content
            )
            "#,
        )
        .execute(pool)
        .await?;
    }

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_search_documents_parent \
         ON search_documents(content_type, parent_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
