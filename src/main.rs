//! # scour CLI
//!
//! The `scour` binary indexes a source tree into a Qdrant collection and
//! answers natural-language queries against it.
//!
//! ## Usage
//!
//! ```bash
//! scour --config ./scour.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scour index` | Chunk, embed, and upsert the configured file set |
//! | `scour query <text>...` | Retrieve the most relevant chunks for a query |
//!
//! The final context goes to standard output; progress and diagnostics go
//! to standard error. The process exits non-zero on unrecoverable query
//! failures (embedding, search, or rerank transport errors).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use scour::{config, index, retrieve};

/// scour — local semantic code search.
///
/// All commands read a TOML configuration file naming the vector store,
/// the embedding and generation models, chunking parameters, and the file
/// globs to index.
#[derive(Parser)]
#[command(
    name = "scour",
    about = "Local semantic code search backed by Qdrant and Ollama",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./scour.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the configured file set.
    ///
    /// Walks the configured root, deletes each matched file's stale
    /// vectors, then chunks, embeds, and upserts its current content.
    /// Single-file and single-chunk failures are reported and skipped;
    /// the run itself keeps going.
    Index {
        /// Show file and chunk counts without writing to the store.
        #[arg(long)]
        dry_run: bool,
    },

    /// Query the index and print the most relevant chunks.
    ///
    /// The query is the trailing words, joined with spaces.
    Query {
        /// Query text.
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Index { dry_run } => {
            index::run_index(&cfg, dry_run).await?;
        }
        Commands::Query { text } => {
            let query = text.join(" ");
            retrieve::run_query(&cfg, &query).await?;
        }
    }

    Ok(())
}
