//! N-Queens rules and the backtracking completion used for hints.

use super::hint::HintQuery;
use super::{MoveError, Puzzle, Square};
use crate::common::messages::{GameKind, GameOutcome, NQueensResult};

/// Two queens attack each other on a shared column, row or diagonal.
pub fn attacks(a: Square, b: Square) -> bool {
    a.col == b.col || a.row == b.row || a.col.abs_diff(b.col) == a.row.abs_diff(b.row)
}

/// True when `candidate` is attacked by none of `queens`.
pub fn is_valid(candidate: Square, queens: &[Square]) -> bool {
    queens.iter().all(|&queen| !attacks(candidate, queen))
}

/// Complete a partial placement to a full solution, one queen per row.
///
/// Rows that already hold a queen are fixed; the remaining rows are filled
/// top to bottom trying columns left to right, so the result is
/// deterministic. Returns `None` if the fixed queens are off the board,
/// share a row, attack each other, or admit no completion.
pub fn solve(n: usize, fixed: &[Square]) -> Option<Vec<Square>> {
    let mut columns: Vec<Option<usize>> = vec![None; n];
    for (i, queen) in fixed.iter().enumerate() {
        if !queen.within(n) || columns[queen.row].is_some() {
            return None;
        }
        if fixed[i + 1..].iter().any(|&other| attacks(*queen, other)) {
            return None;
        }
        columns[queen.row] = Some(queen.col);
    }

    let fixed_rows: Vec<bool> = columns.iter().map(Option::is_some).collect();
    if !place_from(0, &mut columns, &fixed_rows) {
        return None;
    }

    columns
        .into_iter()
        .enumerate()
        .map(|(row, col)| col.map(|col| Square::new(col, row)))
        .collect()
}

fn place_from(row: usize, columns: &mut [Option<usize>], fixed_rows: &[bool]) -> bool {
    let n = columns.len();
    if row == n {
        return true;
    }
    if fixed_rows[row] {
        return place_from(row + 1, columns, fixed_rows);
    }

    for col in 0..n {
        let candidate = Square::new(col, row);
        let safe = columns
            .iter()
            .enumerate()
            .filter_map(|(r, c)| c.map(|c| Square::new(c, r)))
            .all(|queen| !attacks(candidate, queen));

        if safe {
            columns[row] = Some(col);
            if place_from(row + 1, columns, fixed_rows) {
                return true;
            }
            columns[row] = None;
        }
    }
    false
}

/// Next queen to place: the completion's queen in the first empty row.
pub fn next_queen(n: usize, queens: &[Square]) -> Option<Square> {
    let solution = solve(n, queens)?;
    solution
        .into_iter()
        .find(|square| !queens.iter().any(|queen| queen.row == square.row))
}

/// Place or take back a queen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueenMove {
    Place(Square),
    Remove(Square),
}

/// An N×N board that only ever holds non-attacking queens.
#[derive(Debug, Clone)]
pub struct NQueensBoard {
    n: usize,
    queens: Vec<Square>,
    attempts: u32,
}

impl NQueensBoard {
    pub fn new(n: usize) -> Result<Self, MoveError> {
        if n == 0 {
            return Err(MoveError::InvalidSize);
        }
        Ok(Self {
            n,
            queens: Vec::new(),
            attempts: 0,
        })
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn queens(&self) -> &[Square] {
        &self.queens
    }

    /// Accepted placements so far; removals do not count.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn place(&mut self, square: Square) -> Result<(), MoveError> {
        if !square.within(self.n) {
            return Err(MoveError::OutOfBounds(square));
        }
        if self.queens.contains(&square) {
            return Err(MoveError::Occupied(square));
        }
        if !is_valid(square, &self.queens) {
            return Err(MoveError::Conflict(square));
        }
        self.queens.push(square);
        self.attempts += 1;
        Ok(())
    }

    pub fn remove(&mut self, square: Square) -> Result<(), MoveError> {
        let index = self
            .queens
            .iter()
            .position(|&queen| queen == square)
            .ok_or(MoveError::NoQueen(square))?;
        self.queens.remove(index);
        Ok(())
    }

    pub fn is_solved(&self) -> bool {
        self.queens.len() == self.n
    }
}

impl Puzzle for NQueensBoard {
    type Move = QueenMove;

    fn kind(&self) -> GameKind {
        GameKind::NQueens
    }

    fn apply(&mut self, mv: QueenMove) -> Result<(), MoveError> {
        match mv {
            QueenMove::Place(square) => self.place(square),
            QueenMove::Remove(square) => self.remove(square),
        }
    }

    fn is_won(&self) -> bool {
        self.is_solved()
    }

    fn outcome(&self, won: bool) -> GameOutcome {
        GameOutcome::NQueens(NQueensResult {
            n: u32::try_from(self.n).unwrap_or(u32::MAX),
            solved: won,
            attempts: self.attempts,
        })
    }

    fn hint(&self) -> Option<QueenMove> {
        next_queen(self.n, &self.queens).map(QueenMove::Place)
    }

    fn hint_query(&self) -> HintQuery {
        HintQuery::NQueens {
            n: self.n,
            queens: self.queens.clone(),
        }
    }
}
