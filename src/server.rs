//! HTTP transport for the reindex protocol.
//!
//! Exposes the three phase exchanges as JSON endpoints so a browser or
//! remote driver can run a reindex one bounded call at a time, exactly
//! like the CLI driver does in-process. Handlers are stateless between
//! calls: the client carries the cursor (current type, remaining item
//! list) from one exchange to the next.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/reindex/content-types` | Phase A: ordered content type list |
//! | `POST` | `/reindex/content-list` | Phase B: item list for one type (purges the type) |
//! | `POST` | `/reindex/item` | Phase C: index one item |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error contract
//!
//! Every reindex response carries `errorCode` (`0` success, negative
//! failure) and a human-readable `statusMessage`. A type-scoped listing
//! failure returns a negative code with an empty `contentList`; the
//! client moves on to the next type.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::db;
use crate::provider::ProviderRegistry;
use crate::provider_sql::SqlProvider;
use crate::registry::ContentTypeRegistry;
use crate::reindex::Reindexer;
use crate::store::sqlite::SqliteIndex;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    reindexer: Arc<Reindexer>,
}

/// Build a [`Reindexer`] over the configured databases: SQL providers
/// for every configured content type, the built-in type first in
/// discovery, and the SQLite index store. The index schema must already
/// exist (`rdx init`).
pub async fn build_reindexer(config: &Config) -> anyhow::Result<Reindexer> {
    let content_pool = db::connect_content(config).await?;
    let index_pool = db::connect_index(config).await?;

    let mut providers = ProviderRegistry::new();
    for (content_type, provider_cfg) in &config.providers {
        providers.register(Box::new(SqlProvider::new(
            content_type.clone(),
            content_pool.clone(),
            provider_cfg.clone(),
            config.comments.clone(),
        )));
    }

    let registry = ContentTypeRegistry::new(&config.reindex.builtin_type, &providers)
        .with_probe(content_pool.clone());

    Ok(Reindexer::new(
        Box::new(registry),
        providers,
        Arc::new(SqliteIndex::new(index_pool)),
        config.reindex.comment_excluded_types.iter().cloned(),
    ))
}

/// Start the reindex HTTP server on the configured bind address. Runs
/// until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let reindexer = Arc::new(build_reindexer(config).await?);
    let state = AppState { reindexer };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/reindex/content-types", post(handle_content_types))
        .route("/reindex/content-list", post(handle_content_list))
        .route("/reindex/item", post(handle_index_item))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("Reindex server listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /reindex/content-types ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentTypesResponse {
    error_code: i32,
    content_types: Vec<String>,
    status_message: String,
}

/// Phase A. A registry failure is the run's single fatal error; the
/// client should stop driving after a negative code here.
async fn handle_content_types(State(state): State<AppState>) -> Json<ContentTypesResponse> {
    match state.reindexer.discover_types().await {
        Ok(content_types) => Json(ContentTypesResponse {
            error_code: 0,
            content_types,
            status_message: "Initialization Successful".to_string(),
        }),
        Err(e) => Json(ContentTypesResponse {
            error_code: -1,
            content_types: Vec::new(),
            status_message: e.to_string(),
        }),
    }
}

// ============ POST /reindex/content-list ============

#[derive(Deserialize)]
struct ContentListRequest {
    #[serde(rename = "type")]
    content_type: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentListResponse {
    error_code: i32,
    content_list: Vec<String>,
    status_message: String,
}

/// Phase B. Purges the type's index entries on a successful listing;
/// on failure the purge was skipped and the list is empty — the client
/// moves to the next type.
async fn handle_content_list(
    State(state): State<AppState>,
    Json(req): Json<ContentListRequest>,
) -> Json<ContentListResponse> {
    match state.reindexer.list_items(&req.content_type).await {
        Ok(items) => Json(ContentListResponse {
            error_code: 0,
            content_list: items.into_iter().map(|i| i.item_id).collect(),
            status_message: "Content List Successful".to_string(),
        }),
        Err(e) => Json(ContentListResponse {
            error_code: -1,
            content_list: Vec::new(),
            status_message: e.to_string(),
        }),
    }
}

// ============ POST /reindex/item ============

#[derive(Deserialize)]
struct IndexItemRequest {
    #[serde(rename = "type")]
    content_type: String,
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexItemResponse {
    error_code: i32,
    status_message: String,
}

/// Phase C. Comment fan-out failures do not fail the item; they are
/// reported in the status message with a success code.
async fn handle_index_item(
    State(state): State<AppState>,
    Json(req): Json<IndexItemRequest>,
) -> Json<IndexItemResponse> {
    match state
        .reindexer
        .index_item(&req.content_type, &req.id)
        .await
    {
        Ok(outcome) if outcome.comment_errors.is_empty() => Json(IndexItemResponse {
            error_code: 0,
            status_message: "Content Item Index Successful".to_string(),
        }),
        Ok(outcome) => Json(IndexItemResponse {
            error_code: 0,
            status_message: format!(
                "Content Item Index Successful ({} comment errors)",
                outcome.comment_errors.len()
            ),
        }),
        Err(e) => Json(IndexItemResponse {
            error_code: -1,
            status_message: e.to_string(),
        }),
    }
}
