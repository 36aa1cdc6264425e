//! # Hints
//!
//! A [`HintQuery`] is a snapshot of a game in progress, sent as the `estado`
//! object of a `request_hint` message. Answering it runs the game's solver
//! and yields at most one [`Hint`].
//!
//! ```text
//! nreinas: {"N":8,"reinas":[[0,0],[4,1]]}
//! caballo: {"N":8,"visitadas":[[0,0],[2,1]],"actual":[2,1]}
//! hanoi:   {"discos":3,"movimientos":2}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;

use super::hanoi::{self, Move, PEG_COUNT};
use super::knight::{self, DEFAULT_BOARD_SIZE};
use super::nqueens;
use super::Square;
use crate::common::error::{ArcadeError, Result};
use crate::common::messages::GameKind;

/// Largest N-Queens board the server will search.
pub const MAX_QUEENS_BOARD: usize = 16;
/// Largest knight board accepted in a hint request.
pub const MAX_KNIGHT_BOARD: usize = 64;
/// Largest tower the server will expand into a move list.
pub const MAX_HINT_DISKS: u32 = super::hanoi::MAX_DISKS;

/// Game state a hint is computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintQuery {
    NQueens {
        n: usize,
        queens: Vec<Square>,
    },
    KnightTour {
        size: usize,
        visited: Vec<Square>,
        current: Option<Square>,
    },
    Hanoi {
        disks: u32,
        moves_made: usize,
    },
}

#[derive(Serialize, Deserialize)]
struct QueensState {
    #[serde(rename = "N")]
    n: usize,
    #[serde(rename = "reinas", default)]
    queens: Vec<(usize, usize)>,
}

#[derive(Serialize, Deserialize)]
struct KnightState {
    #[serde(rename = "N", default = "default_knight_board")]
    size: usize,
    #[serde(rename = "visitadas", default)]
    visited: Vec<(usize, usize)>,
    #[serde(rename = "actual", default)]
    current: Option<(usize, usize)>,
}

fn default_knight_board() -> usize {
    DEFAULT_BOARD_SIZE
}

#[derive(Serialize, Deserialize)]
struct HanoiState {
    #[serde(rename = "discos")]
    disks: u32,
    #[serde(rename = "movimientos", default)]
    moves_made: usize,
}

fn squares(cells: Vec<(usize, usize)>) -> Vec<Square> {
    cells.into_iter().map(Square::from).collect()
}

fn cells(squares: &[Square]) -> Vec<(usize, usize)> {
    squares.iter().copied().map(Into::into).collect()
}

impl HintQuery {
    pub fn kind(&self) -> GameKind {
        match self {
            HintQuery::NQueens { .. } => GameKind::NQueens,
            HintQuery::KnightTour { .. } => GameKind::KnightTour,
            HintQuery::Hanoi { .. } => GameKind::Hanoi,
        }
    }

    /// Parse and bound-check an `estado` object.
    pub fn from_state(kind: GameKind, state: &Value) -> Result<Self> {
        let invalid = |e: serde_json::Error| ArcadeError::validation(format!("invalid estado for {kind}: {e}"));

        match kind {
            GameKind::NQueens => {
                let state: QueensState = serde_json::from_value(state.clone()).map_err(invalid)?;
                if state.n == 0 || state.n > MAX_QUEENS_BOARD {
                    return Err(ArcadeError::validation(format!(
                        "N must be between 1 and {MAX_QUEENS_BOARD}"
                    )));
                }
                let queens = squares(state.queens);
                check_bounds(&queens, state.n)?;
                Ok(HintQuery::NQueens { n: state.n, queens })
            }
            GameKind::KnightTour => {
                let state: KnightState = serde_json::from_value(state.clone()).map_err(invalid)?;
                if state.size == 0 || state.size > MAX_KNIGHT_BOARD {
                    return Err(ArcadeError::validation(format!(
                        "N must be between 1 and {MAX_KNIGHT_BOARD}"
                    )));
                }
                let visited = squares(state.visited);
                let current = state.current.map(Square::from);
                check_bounds(&visited, state.size)?;
                check_bounds(current.as_slice(), state.size)?;
                Ok(HintQuery::KnightTour {
                    size: state.size,
                    visited,
                    current,
                })
            }
            GameKind::Hanoi => {
                let state: HanoiState = serde_json::from_value(state.clone()).map_err(invalid)?;
                if state.disks == 0 || state.disks > MAX_HINT_DISKS {
                    return Err(ArcadeError::validation(format!(
                        "discos must be between 1 and {MAX_HINT_DISKS}"
                    )));
                }
                Ok(HintQuery::Hanoi {
                    disks: state.disks,
                    moves_made: state.moves_made,
                })
            }
        }
    }

    /// Encode as an `estado` object.
    pub fn to_state(&self) -> Value {
        let state = match self {
            HintQuery::NQueens { n, queens } => serde_json::to_value(QueensState {
                n: *n,
                queens: cells(queens),
            }),
            HintQuery::KnightTour {
                size,
                visited,
                current,
            } => serde_json::to_value(KnightState {
                size: *size,
                visited: cells(visited),
                current: current.map(Into::into),
            }),
            HintQuery::Hanoi { disks, moves_made } => serde_json::to_value(HanoiState {
                disks: *disks,
                moves_made: *moves_made,
            }),
        };
        state.unwrap_or(Value::Null)
    }

    /// Run the solver for this snapshot. CPU-bound for large boards.
    pub fn answer(&self) -> Option<Hint> {
        match self {
            HintQuery::NQueens { n, queens } => nqueens::next_queen(*n, queens).map(Hint::Queen),
            HintQuery::KnightTour {
                size,
                visited,
                current,
            } => {
                let current = (*current)?;
                let mut seen: HashSet<Square> = visited.iter().copied().collect();
                seen.insert(current);
                knight::warnsdorff(*size, current, &seen).map(Hint::Knight)
            }
            HintQuery::Hanoi { disks, moves_made } => {
                hanoi::generate_solution(*disks, 0, PEG_COUNT - 1, 1)
                    .get(*moves_made)
                    .copied()
                    .map(Hint::Hanoi)
            }
        }
    }
}

fn check_bounds(squares: &[Square], size: usize) -> Result<()> {
    match squares.iter().find(|square| !square.within(size)) {
        Some(square) => Err(ArcadeError::validation(format!("square {square} is off the board"))),
        None => Ok(()),
    }
}

/// A suggested next move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    Queen(Square),
    Knight(Square),
    Hanoi(Move),
}

impl Hint {
    /// `sugerencia` value: `[col, row]` for boards, `[from, to]` for pegs.
    pub fn to_value(&self) -> Value {
        match self {
            Hint::Queen(square) | Hint::Knight(square) => json!([square.col, square.row]),
            Hint::Hanoi(mv) => json!([mv.from, mv.to]),
        }
    }

    pub fn from_value(kind: GameKind, value: &Value) -> Option<Self> {
        let (a, b): (usize, usize) = serde_json::from_value(value.clone()).ok()?;
        Some(match kind {
            GameKind::NQueens => Hint::Queen(Square::new(a, b)),
            GameKind::KnightTour => Hint::Knight(Square::new(a, b)),
            GameKind::Hanoi => Hint::Hanoi(Move::new(a, b)),
        })
    }

    /// Player-facing wording (`mensaje`). Pegs are numbered from 1.
    pub fn describe(&self) -> String {
        match self {
            Hint::Queen(square) => {
                format!("Coloca una reina en la columna {}, fila {}", square.col, square.row)
            }
            Hint::Knight(square) => format!("Mueve el caballo a {square}"),
            Hint::Hanoi(mv) => format!("Mueve disco de pilar {} a {}", mv.from + 1, mv.to + 1),
        }
    }
}

/// `mensaje` when a game has nothing to suggest.
pub fn no_hint_message(kind: GameKind) -> &'static str {
    match kind {
        GameKind::NQueens => "No hay solución desde esta posición.",
        GameKind::KnightTour => "No quedan movimientos legales.",
        GameKind::Hanoi => "No hay más movimientos.",
    }
}

/// A hint as received by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintReply {
    pub hint: Option<Hint>,
    pub message: String,
}
