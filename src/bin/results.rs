//! # Results Dump
//!
//! Prints every stored row of the three result tables, oldest first.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin arcade-results -- --database sqlite://resultados.db
//! ```

use clap::Parser;

use puzzle_arcade::common::config::load_config_or_default;
use puzzle_arcade::common::logging::init_logger;
use puzzle_arcade::common::messages::GameKind;
use puzzle_arcade::server::{ResultStore, ServerConfig};

/// Command-line arguments for the results dump
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server configuration file, used for its `[storage]` section
    #[arg(short, long)]
    config: Option<String>,

    /// SQLite database URL, overrides the config file
    #[arg(long)]
    database: Option<String>,

    /// Only dump one game
    #[arg(long)]
    game: Option<GameKind>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();

    let mut config: ServerConfig = load_config_or_default(args.config.as_deref())?;
    if let Some(database) = args.database {
        config.storage.database_url = database;
    }

    let store = ResultStore::open(&config.storage).await?;
    let kinds = match args.game {
        Some(kind) => vec![kind],
        None => GameKind::ALL.to_vec(),
    };

    for kind in kinds {
        let rows = store.all(kind).await?;
        println!("=== {} ({} rows) ===", kind, rows.len());
        for row in rows {
            println!("{}", serde_json::to_string(&row)?);
        }
    }

    store.close().await;
    Ok(())
}
