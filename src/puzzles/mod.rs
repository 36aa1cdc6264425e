//! # Puzzle Rules and Solvers
//!
//! Pure, synchronous game logic shared by the client sessions (move
//! validation, local hints) and the server (`request_hint`).
//!
//! ## Modules
//!
//! - [`nqueens`]: queen conflicts, backtracking completion, N-Queens board
//! - [`knight`]: knight moves, Warnsdorff heuristic, tour board
//! - [`hanoi`]: optimal move sequence, three-peg towers
//! - [`hint`]: game state snapshots and the hints computed from them

pub mod hanoi;
pub mod hint;
pub mod knight;
pub mod nqueens;

use std::fmt;

use crate::common::messages::{GameKind, GameOutcome};
use hint::HintQuery;

/// A board cell, column first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub col: usize,
    pub row: usize,
}

impl Square {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    pub fn within(self, size: usize) -> bool {
        self.col < size && self.row < size
    }
}

impl From<(usize, usize)> for Square {
    fn from((col, row): (usize, usize)) -> Self {
        Square::new(col, row)
    }
}

impl From<Square> for (usize, usize) {
    fn from(square: Square) -> Self {
        (square.col, square.row)
    }
}

/// Renders as `(col, row)`, the form stored in `posicion_inicial`.
impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Why a move was rejected. The board is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("board or tower size must be positive")]
    InvalidSize,
    #[error("a tower of {0} disks is too tall (at most {})", hanoi::MAX_DISKS)]
    TooManyDisks(u32),
    #[error("{0} is off the board")]
    OutOfBounds(Square),
    #[error("square {0} is already occupied")]
    Occupied(Square),
    #[error("a queen at {0} would be attacked")]
    Conflict(Square),
    #[error("there is no queen at {0}")]
    NoQueen(Square),
    #[error("{0} is not a knight's jump away")]
    IllegalJump(Square),
    #[error("square {0} was already visited")]
    AlreadyVisited(Square),
    #[error("peg {0} does not exist")]
    NoSuchPeg(usize),
    #[error("peg {0} is empty")]
    EmptyPeg(usize),
    #[error("cannot put a larger disk on a smaller one")]
    LargerOnSmaller,
    #[error("source and destination peg are the same")]
    SamePeg,
    #[error("the session is already finished")]
    SessionFinished,
}

/// Common surface of the three games, driven by [`crate::client::session::GameSession`].
pub trait Puzzle {
    /// One player action.
    type Move: Copy + fmt::Debug;

    fn kind(&self) -> GameKind;

    /// Apply a move, or reject it without changing the board.
    fn apply(&mut self, mv: Self::Move) -> Result<(), MoveError>;

    /// Terminal success condition.
    fn is_won(&self) -> bool;

    /// No legal move remains although the puzzle is not won.
    fn is_stuck(&self) -> bool {
        false
    }

    /// Result fields for the current board; `won` decides `resuelto`/`completado`.
    fn outcome(&self, won: bool) -> GameOutcome;

    /// Locally computed next move, if any.
    fn hint(&self) -> Option<Self::Move>;

    /// Snapshot of the board for a server-side hint.
    fn hint_query(&self) -> HintQuery;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_display_matches_start_square_format() {
        assert_eq!(Square::new(0, 0).to_string(), "(0, 0)");
        assert_eq!(Square::new(3, 7).to_string(), "(3, 7)");
    }

    #[test]
    fn within_bounds() {
        assert!(Square::new(7, 7).within(8));
        assert!(!Square::new(8, 0).within(8));
        assert!(!Square::new(0, 0).within(0));
    }
}
