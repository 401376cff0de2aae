use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::config::Config;

/// Connect to the search index database, creating it if missing.
pub async fn connect_index(config: &Config) -> Result<SqlitePool> {
    connect(&config.index_db.path, true).await
}

/// Connect to the platform content database. Never created by us: a
/// missing content database is a configuration error.
pub async fn connect_content(config: &Config) -> Result<SqlitePool> {
    connect(&config.content_db.path, false).await
}

async fn connect(db_path: &Path, create: bool) -> Result<SqlitePool> {
    if create {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(create)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
