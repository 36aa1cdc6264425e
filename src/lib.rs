//! # Puzzle Arcade
//!
//! Three single-player puzzles (N-Queens, Knight's Tour, Towers of Hanoi)
//! that report finished sessions to a leaderboard server over TCP.
//!
//! - [`common`]: wire protocol, framing, errors, configuration, logging
//! - [`puzzles`]: game rules and solvers
//! - [`server`]: connection handling and the SQLite result store
//! - [`client`]: request helper, game sessions, move assistant

pub mod client;
pub mod common;
pub mod puzzles;
pub mod server;

pub use common::error::{ArcadeError, Result};
pub use common::messages::{GameKind, GameOutcome, GameResult, LeaderboardEntry, Message};
