//! # Client Binary Entry Point
//!
//! Command-line front end for the leaderboard protocol.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin arcade-client -- save nreinas --n 4 --attempts 4 --solved
//! cargo run --bin arcade-client -- save caballo --start "(0, 0)" --moves 63 --completed
//! cargo run --bin arcade-client -- best hanoi
//! cargo run --bin arcade-client -- hint nreinas --n 8 --queen 0,0
//! cargo run --bin arcade-client -- autoplay caballo --size 8 --start 0,0
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;

use puzzle_arcade::client::{spawn_report, ArcadeClient, GameSession};
use puzzle_arcade::common::config::{load_config_or_default, ClientConfig};
use puzzle_arcade::common::logging::init_logger;
use puzzle_arcade::common::messages::{
    GameKind, GameOutcome, GameResult, HanoiResult, KnightTourResult, NQueensResult,
};
use puzzle_arcade::puzzles::hanoi::Towers;
use puzzle_arcade::puzzles::hint::HintQuery;
use puzzle_arcade::puzzles::knight::{KnightTour, DEFAULT_BOARD_SIZE};
use puzzle_arcade::puzzles::nqueens::NQueensBoard;
use puzzle_arcade::puzzles::{Puzzle, Square};

/// Command-line arguments for the client binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the client configuration file (TOML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Server address, overrides the config file
    #[arg(long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report a finished session
    Save {
        #[command(subcommand)]
        game: SaveGame,
    },
    /// Show the five best results of a game
    Best { game: GameKind },
    /// Ask the server for the next move
    Hint {
        #[command(subcommand)]
        game: HintGame,
    },
    /// Play a whole session by following the solver, then report it
    Autoplay {
        game: GameKind,
        /// Board size (nreinas, caballo)
        #[arg(long, default_value_t = 8)]
        size: usize,
        /// Disk count (hanoi)
        #[arg(long, default_value_t = 3)]
        disks: u32,
        /// Knight start square as `col,row`
        #[arg(long, value_parser = parse_square, default_value = "0,0")]
        start: Square,
    },
}

#[derive(Subcommand, Debug)]
enum SaveGame {
    Nreinas {
        #[arg(long)]
        n: u32,
        #[arg(long)]
        attempts: u32,
        #[arg(long)]
        solved: bool,
    },
    Caballo {
        #[arg(long, default_value = "")]
        start: String,
        #[arg(long)]
        moves: u32,
        #[arg(long)]
        completed: bool,
    },
    Hanoi {
        #[arg(long)]
        disks: u32,
        #[arg(long)]
        moves: u32,
        #[arg(long)]
        completed: bool,
    },
}

#[derive(Subcommand, Debug)]
enum HintGame {
    Nreinas {
        #[arg(long)]
        n: usize,
        /// Placed queen as `col,row`; repeat for several
        #[arg(long = "queen", value_parser = parse_square)]
        queens: Vec<Square>,
    },
    Caballo {
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: usize,
        /// Visited square as `col,row`; repeat for several
        #[arg(long = "visited", value_parser = parse_square)]
        visited: Vec<Square>,
        #[arg(long, value_parser = parse_square)]
        current: Square,
    },
    Hanoi {
        #[arg(long)]
        disks: u32,
        /// Moves already made
        #[arg(long, default_value_t = 0)]
        moves: usize,
    },
}

fn parse_square(s: &str) -> Result<Square, String> {
    let (col, row) = s
        .split_once(',')
        .ok_or_else(|| format!("expected col,row but got {s}"))?;
    let col = col.trim().parse().map_err(|e| format!("bad column in {s}: {e}"))?;
    let row = row.trim().parse().map_err(|e| format!("bad row in {s}: {e}"))?;
    Ok(Square::new(col, row))
}

impl SaveGame {
    fn into_outcome(self) -> GameOutcome {
        match self {
            SaveGame::Nreinas { n, attempts, solved } => GameOutcome::NQueens(NQueensResult {
                n,
                solved,
                attempts,
            }),
            SaveGame::Caballo {
                start,
                moves,
                completed,
            } => GameOutcome::KnightTour(KnightTourResult {
                start_square: start,
                moves,
                completed,
            }),
            SaveGame::Hanoi {
                disks,
                moves,
                completed,
            } => GameOutcome::Hanoi(HanoiResult {
                disk_count: disks,
                moves,
                completed,
            }),
        }
    }
}

impl HintGame {
    fn into_query(self) -> HintQuery {
        match self {
            HintGame::Nreinas { n, queens } => HintQuery::NQueens { n, queens },
            HintGame::Caballo {
                size,
                visited,
                current,
            } => HintQuery::KnightTour {
                size,
                visited,
                current: Some(current),
            },
            HintGame::Hanoi { disks, moves } => HintQuery::Hanoi {
                disks,
                moves_made: moves,
            },
        }
    }
}

/// Follow local hints until the session ends; quit when none is left.
fn autoplay<P: Puzzle>(mut session: GameSession<P>) -> anyhow::Result<GameResult> {
    while !session.is_finished() {
        match session.hint() {
            Some(mv) => {
                session.apply(mv)?;
            }
            None => {
                session.abandon();
            }
        }
    }
    session
        .take_report()
        .context("finished session produced no report")
}

fn print_outcome(outcome: &GameOutcome) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(outcome)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();

    let mut config: ClientConfig = load_config_or_default(args.config.as_deref())?;
    if let Some(server) = args.server {
        config.client.server_address = server;
    }
    let client = Arc::new(ArcadeClient::new(config.client));

    match args.command {
        Command::Save { game } => {
            let result = GameResult::new(game.into_outcome());
            client.save_result(&result).await?;
            println!("Resultado guardado");
        }
        Command::Best { game } => {
            let entries = client.request_best(game).await?;
            if entries.is_empty() {
                println!("No {} results yet", game);
            }
            for (rank, entry) in entries.iter().enumerate() {
                println!("{}. {}", rank + 1, serde_json::to_string(entry)?);
            }
        }
        Command::Hint { game } => {
            let reply = client.request_hint(&game.into_query()).await?;
            println!("{}", reply.message);
        }
        Command::Autoplay {
            game,
            size,
            disks,
            start,
        } => {
            let result = match game {
                GameKind::NQueens => autoplay(GameSession::new(NQueensBoard::new(size)?))?,
                GameKind::KnightTour => {
                    let mut session = GameSession::new(KnightTour::new(size)?);
                    session.apply(start)?;
                    autoplay(session)?
                }
                GameKind::Hanoi => autoplay(GameSession::new(Towers::new(disks)?))?,
            };

            print_outcome(&result.outcome)?;
            info!("Reporting {} session", game);
            spawn_report(Arc::clone(&client), result).await??;
        }
    }

    Ok(())
}
