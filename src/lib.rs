//! # Reindexer
//!
//! A resumable full-text reindex driver for multi-content-type
//! publishing platforms.
//!
//! The platform hosts heterogeneous content providers (articles, forum
//! posts, wiki pages, plugin content), each exposing an item listing and
//! per-item detail. The reindexer drives a complete rebuild of the
//! search index in three phases — discover content types, list and
//! purge each type, index each item with its access-control metadata —
//! one bounded call at a time, so the caller can show incremental
//! progress and cancel between calls. Comments are fanned out alongside
//! their parent item with the parent's permissions.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────┐
//! │  Providers    │──▶│  Reindexer    │──▶│  SQLite    │
//! │ article/forum │   │  A → B → C    │   │ docs+FTS5  │
//! └──────────────┘   └──────┬───────┘   └───────────┘
//!                           │
//!              ┌────────────┤
//!              ▼            ▼
//!         ┌─────────┐  ┌─────────┐
//!         │   CLI   │  │  HTTP   │
//!         │  (rdx)  │  │ driver  │
//!         └─────────┘  └─────────┘
//! ```
//!
//! ## Quick start
//!
//! ```bash
//! rdx init                     # create the index database
//! rdx types                    # show discoverable content types
//! rdx run                      # full three-phase reindex
//! rdx serve                    # expose the phase calls over HTTP
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Content references, permissions, index documents |
//! | [`error`] | Typed reindex error taxonomy |
//! | [`provider`] | Content provider port and registry |
//! | [`provider_sql`] | SQL-backed content provider |
//! | [`registry`] | Content type discovery |
//! | [`store`] | Index store port (SQLite and in-memory) |
//! | [`reindex`] | The three-phase orchestrator and run driver |
//! | [`status`] | RunStatus accumulator |
//! | [`progress`] | Progress reporting |
//! | [`server`] | HTTP transport for the phase calls |
//! | [`db`] | Database connections |
//! | [`migrate`] | Index schema migration |

pub mod config;
pub mod db;
pub mod error;
pub mod migrate;
pub mod models;
pub mod progress;
pub mod provider;
pub mod provider_sql;
pub mod registry;
pub mod reindex;
pub mod server;
pub mod status;
pub mod store;
pub mod types_cmd;
