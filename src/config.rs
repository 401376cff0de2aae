use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// The search index database (owned by the reindexer).
    pub index_db: DbConfig,
    /// The platform content database (read-only source of truth).
    pub content_db: DbConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub reindex: ReindexConfig,
    /// Shared comments table used for comment fan-out. Optional: without
    /// it, non-excluded types simply have no comments to index.
    #[serde(default)]
    pub comments: Option<CommentsConfig>,
    /// Content providers keyed by content type name. `BTreeMap` keeps
    /// type discovery deterministic across runs.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8710".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReindexConfig {
    /// The fixed built-in content type, always discovered first.
    #[serde(default = "default_builtin_type")]
    pub builtin_type: String,
    /// Types whose comments are indexed by the type itself and must be
    /// skipped by the generic comment fan-out.
    #[serde(default = "default_comment_exclusions")]
    pub comment_excluded_types: Vec<String>,
}

impl Default for ReindexConfig {
    fn default() -> Self {
        Self {
            builtin_type: default_builtin_type(),
            comment_excluded_types: default_comment_exclusions(),
        }
    }
}

fn default_builtin_type() -> String {
    "article".to_string()
}

fn default_comment_exclusions() -> Vec<String> {
    vec!["forum".to_string(), "dokuwiki".to_string()]
}

/// Table mapping for one content provider.
///
/// Permission column names default to the platform's conventional six
/// (`owner_id`, `group_id`, `perm_owner`, `perm_group`, `perm_members`,
/// `perm_anon`).
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub table: String,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    #[serde(default = "default_title_column")]
    pub title_column: String,
    pub content_column: String,
    /// Whether this provider exposes item detail for indexing. Declared
    /// explicitly here rather than probed at runtime.
    #[serde(default = "default_true")]
    pub indexable: bool,
}

fn default_id_column() -> String {
    "id".to_string()
}

fn default_title_column() -> String {
    "title".to_string()
}

fn default_true() -> bool {
    true
}

/// Mapping for the platform-wide comments table.
#[derive(Debug, Deserialize, Clone)]
pub struct CommentsConfig {
    pub table: String,
    #[serde(default = "default_comment_id_column")]
    pub id_column: String,
    #[serde(default = "default_comment_parent_column")]
    pub parent_column: String,
    #[serde(default = "default_comment_type_column")]
    pub type_column: String,
    #[serde(default = "default_title_column")]
    pub title_column: String,
    #[serde(default = "default_comment_content_column")]
    pub content_column: String,
}

fn default_comment_id_column() -> String {
    "cid".to_string()
}

fn default_comment_parent_column() -> String {
    "sid".to_string()
}

fn default_comment_type_column() -> String {
    "type".to_string()
}

fn default_comment_content_column() -> String {
    "comment".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.reindex.builtin_type.trim().is_empty() {
        anyhow::bail!("reindex.builtin_type must not be empty");
    }

    for (name, provider) in &config.providers {
        if provider.table.trim().is_empty() {
            anyhow::bail!("providers.{}.table must not be empty", name);
        }
        if provider.content_column.trim().is_empty() {
            anyhow::bail!("providers.{}.content_column must not be empty", name);
        }
    }

    if let Some(comments) = &config.comments {
        if comments.table.trim().is_empty() {
            anyhow::bail!("comments.table must not be empty");
        }
    }

    Ok(config)
}
