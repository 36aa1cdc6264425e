//! # Client Components
//!
//! ## Request Helper ([`client`])
//! Talks to the leaderboard server: save a result, fetch the best results,
//! ask for a hint. Connection retries live here.
//!
//! ## Game Sessions ([`session`])
//! Lifecycle of one game and the single result it reports.
//!
//! ## Assistant ([`assistant`])
//! Local move hints and background text suggestions for a running session.

pub mod assistant;
pub mod client;
pub mod session;

pub use client::{spawn_report, ArcadeClient};
pub use session::{GameSession, SessionState, Termination};
