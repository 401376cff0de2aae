//! # Reindexer CLI (`rdx`)
//!
//! The `rdx` binary drives full-text reindex runs for a publishing
//! platform: schema initialization, content type inspection, complete
//! three-phase runs with progress output, and an HTTP server exposing
//! the phase calls to remote drivers.
//!
//! ## Usage
//!
//! ```bash
//! rdx --config ./config/rdx.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rdx init` | Create the index database and run schema migrations |
//! | `rdx types` | Show the content types a run would discover |
//! | `rdx run` | Run a complete three-phase reindex |
//! | `rdx serve` | Start the reindex HTTP server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use reindexer::progress::ProgressMode;
use reindexer::{config, db, migrate, reindex, server, types_cmd};

/// Reindexer — rebuild the full-text search index for every content
/// type on the platform.
///
/// All commands accept a `--config` flag pointing to a TOML
/// configuration file. See `config/rdx.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "rdx",
    about = "Reindexer — a resumable full-text reindex driver for publishing platforms",
    version,
    long_about = "Reindexer scans every content type on the platform (the built-in article \
    type plus each configured provider), purges stale index entries, and re-indexes every \
    item with its access-control metadata, fanning out to comments where applicable."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/rdx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the index database schema.
    ///
    /// Creates the SQLite index database and its tables. Idempotent —
    /// running it multiple times is safe.
    Init,

    /// Show the content types a reindex run would discover.
    Types,

    /// Run a complete reindex: discover types, list and purge each
    /// type, index every item with comment fan-out.
    ///
    /// Item-level failures are recorded and the run continues; only a
    /// type-discovery failure aborts it. The final summary prints
    /// "No Errors" or every `(type, id, message)` tuple in encounter
    /// order.
    Run {
        /// Progress output: `off`, `human`, or `json`. Defaults to
        /// `human` when stderr is a TTY, otherwise `off`.
        #[arg(long)]
        progress: Option<String>,
    },

    /// Start the reindex HTTP server.
    ///
    /// Exposes the three phase calls as JSON endpoints on the
    /// configured bind address so a browser or remote driver can run a
    /// reindex one step at a time.
    Serve,
}

fn parse_progress(mode: Option<&str>) -> anyhow::Result<ProgressMode> {
    Ok(match mode {
        None => ProgressMode::default_for_tty(),
        Some("off") => ProgressMode::Off,
        Some("human") => ProgressMode::Human,
        Some("json") => ProgressMode::Json,
        Some(other) => anyhow::bail!("Unknown progress mode: '{}'. Must be off, human, or json.", other),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect_index(&cfg).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Index database initialized successfully.");
        }
        Commands::Types => {
            types_cmd::list_types(&cfg)?;
        }
        Commands::Run { progress } => {
            let reporter = parse_progress(progress.as_deref())?.reporter();
            let reindexer = server::build_reindexer(&cfg).await?;
            let status = reindex::run_full(&reindexer, reporter.as_ref()).await;

            // Errors are diagnostics, not a run failure: partial
            // content in the index beats none.
            println!("reindex complete");
            println!("  items processed: {}", status.items_processed);
            println!("  errors: {}", status.error_count());
            println!("{}", status.error_summary().trim_end());
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
