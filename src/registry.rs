//! Content type discovery.
//!
//! The registry answers Phase A of the reindex protocol: which content
//! types exist and in what order they are processed. The built-in type
//! always comes first, followed by every provider that declares itself
//! indexable, in sorted order — deterministic, so repeated discovery
//! calls during one run agree.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::ReindexError;
use crate::provider::ProviderRegistry;

/// Source of the ordered content type list.
///
/// Failure is all-or-nothing: either the full list is available or the
/// run aborts with [`ReindexError::RegistryUnavailable`]. There is no
/// partial type discovery.
#[async_trait]
pub trait TypeRegistry: Send + Sync {
    async fn list_content_types(&self) -> Result<Vec<String>, ReindexError>;
}

/// Standard registry: built-in type plus configured indexable providers,
/// optionally gated on the platform content database being reachable.
pub struct ContentTypeRegistry {
    types: Vec<String>,
    /// When present, discovery pings this pool first; an unreachable
    /// content database means no provider can be enumerated.
    probe: Option<SqlitePool>,
}

impl ContentTypeRegistry {
    pub fn new(builtin_type: &str, providers: &ProviderRegistry) -> Self {
        let mut provider_types = providers.indexable_types();
        provider_types.sort();
        provider_types.dedup();

        let mut types = vec![builtin_type.to_string()];
        types.extend(
            provider_types
                .into_iter()
                .filter(|t| t != builtin_type),
        );

        Self { types, probe: None }
    }

    /// Gate discovery on the content database answering a ping.
    pub fn with_probe(mut self, pool: SqlitePool) -> Self {
        self.probe = Some(pool);
        self
    }
}

#[async_trait]
impl TypeRegistry for ContentTypeRegistry {
    async fn list_content_types(&self) -> Result<Vec<String>, ReindexError> {
        if let Some(pool) = &self.probe {
            sqlx::query_scalar::<_, i64>("SELECT 1")
                .fetch_one(pool)
                .await
                .map_err(|e| ReindexError::RegistryUnavailable(e.to_string()))?;
        }
        Ok(self.types.clone())
    }
}
