//! # Server Binary Entry Point
//!
//! Runs the leaderboard server until Ctrl-C.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin arcade-server -- --config config/server.toml
//! cargo run --bin arcade-server -- --address 127.0.0.1:5000 --database sqlite://resultados.db
//! ```

use clap::Parser;
use log::info;

use puzzle_arcade::common::config::load_config_or_default;
use puzzle_arcade::common::logging::init_logger;
use puzzle_arcade::server::{ArcadeServer, ServerConfig};

/// Command-line arguments for the server binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the server configuration file (TOML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Listen address, overrides the config file
    #[arg(long)]
    address: Option<String>,

    /// SQLite database URL, overrides the config file
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();

    let mut config: ServerConfig = load_config_or_default(args.config.as_deref())?;
    if let Some(address) = args.address {
        config.server.address = address;
    }
    if let Some(database) = args.database {
        config.storage.database_url = database;
    }

    let server = ArcadeServer::bind(&config).await?;

    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Shutting down arcade server");
        }
    }

    Ok(())
}
