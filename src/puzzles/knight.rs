//! Knight's Tour rules and the Warnsdorff heuristic.
//!
//! The heuristic always jumps to the unvisited square with the fewest onward
//! moves. It is not guaranteed to finish a tour: from some start squares it
//! runs into a dead end, which the session reports as an incomplete tour.

use std::collections::HashSet;

use super::hint::HintQuery;
use super::{MoveError, Puzzle, Square};
use crate::common::messages::{GameKind, GameOutcome, KnightTourResult};

/// Standard board edge.
pub const DEFAULT_BOARD_SIZE: usize = 8;

/// The eight knight jumps, in the order candidates are considered.
pub const KNIGHT_OFFSETS: [(isize, isize); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

fn jump(size: usize, from: Square, (dc, dr): (isize, isize)) -> Option<Square> {
    let col = from.col.checked_add_signed(dc)?;
    let row = from.row.checked_add_signed(dr)?;
    let target = Square::new(col, row);
    target.within(size).then_some(target)
}

pub fn is_knight_jump(from: Square, to: Square) -> bool {
    let (dc, dr) = (from.col.abs_diff(to.col), from.row.abs_diff(to.row));
    (dc == 1 && dr == 2) || (dc == 2 && dr == 1)
}

/// In-bounds, unvisited squares one jump away from `from`, in offset order.
pub fn legal_moves(size: usize, from: Square, visited: &HashSet<Square>) -> Vec<Square> {
    KNIGHT_OFFSETS
        .iter()
        .filter_map(|&offset| jump(size, from, offset))
        .filter(|square| !visited.contains(square))
        .collect()
}

/// Number of legal moves available after landing on `square`.
pub fn onward_degree(size: usize, square: Square, visited: &HashSet<Square>) -> usize {
    KNIGHT_OFFSETS
        .iter()
        .filter_map(|&offset| jump(size, square, offset))
        .filter(|target| !visited.contains(target))
        .count()
}

/// Warnsdorff choice: the legal move with minimal onward degree, ties going
/// to the earliest candidate in [`KNIGHT_OFFSETS`] order.
pub fn warnsdorff(size: usize, current: Square, visited: &HashSet<Square>) -> Option<Square> {
    legal_moves(size, current, visited)
        .into_iter()
        .min_by_key(|&candidate| onward_degree(size, candidate, visited))
}

/// A tour in progress. The first visited square is the start square.
#[derive(Debug, Clone)]
pub struct KnightTour {
    size: usize,
    visited: HashSet<Square>,
    path: Vec<Square>,
}

impl KnightTour {
    pub fn new(size: usize) -> Result<Self, MoveError> {
        if size == 0 {
            return Err(MoveError::InvalidSize);
        }
        Ok(Self {
            size,
            visited: HashSet::new(),
            path: Vec::new(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn start(&self) -> Option<Square> {
        self.path.first().copied()
    }

    pub fn current(&self) -> Option<Square> {
        self.path.last().copied()
    }

    pub fn path(&self) -> &[Square] {
        &self.path
    }

    /// Jumps made; choosing the start square is not a move.
    pub fn moves(&self) -> u32 {
        u32::try_from(self.path.len().saturating_sub(1)).unwrap_or(u32::MAX)
    }

    /// Choose the start square, or jump to the next one.
    pub fn visit(&mut self, square: Square) -> Result<(), MoveError> {
        if !square.within(self.size) {
            return Err(MoveError::OutOfBounds(square));
        }
        if self.visited.contains(&square) {
            return Err(MoveError::AlreadyVisited(square));
        }
        if let Some(current) = self.current() {
            if !is_knight_jump(current, square) {
                return Err(MoveError::IllegalJump(square));
            }
        }
        self.visited.insert(square);
        self.path.push(square);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.visited.len() == self.size * self.size
    }

    /// Started, not complete, and no unvisited square is a jump away.
    pub fn is_stuck(&self) -> bool {
        match self.current() {
            Some(current) => {
                !self.is_complete() && legal_moves(self.size, current, &self.visited).is_empty()
            }
            None => false,
        }
    }

    pub fn hint(&self) -> Option<Square> {
        warnsdorff(self.size, self.current()?, &self.visited)
    }
}

impl Puzzle for KnightTour {
    type Move = Square;

    fn kind(&self) -> GameKind {
        GameKind::KnightTour
    }

    fn apply(&mut self, square: Square) -> Result<(), MoveError> {
        self.visit(square)
    }

    fn is_won(&self) -> bool {
        self.is_complete()
    }

    fn is_stuck(&self) -> bool {
        KnightTour::is_stuck(self)
    }

    fn outcome(&self, won: bool) -> GameOutcome {
        GameOutcome::KnightTour(KnightTourResult {
            start_square: self.start().map(|s| s.to_string()).unwrap_or_default(),
            moves: self.moves(),
            completed: won,
        })
    }

    fn hint(&self) -> Option<Square> {
        KnightTour::hint(self)
    }

    fn hint_query(&self) -> HintQuery {
        HintQuery::KnightTour {
            size: self.size,
            visited: self.path.clone(),
            current: self.current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_warnsdorff(size: usize, start: Square) -> KnightTour {
        let mut tour = KnightTour::new(size).unwrap();
        tour.visit(start).unwrap();
        while let Some(next) = tour.hint() {
            tour.visit(next).unwrap();
        }
        tour
    }

    #[test]
    fn legal_moves_from_corner() {
        let moves = legal_moves(8, Square::new(0, 0), &HashSet::new());
        assert_eq!(moves, vec![Square::new(2, 1), Square::new(1, 2)]);

        let visited: HashSet<Square> = [Square::new(2, 1)].into_iter().collect();
        assert_eq!(legal_moves(8, Square::new(0, 0), &visited), vec![Square::new(1, 2)]);
    }

    #[test]
    fn centre_of_three_by_three_has_no_moves() {
        assert!(legal_moves(3, Square::new(1, 1), &HashSet::new()).is_empty());
        assert_eq!(warnsdorff(3, Square::new(1, 1), &HashSet::new()), None);
    }

    #[test]
    fn warnsdorff_first_steps_from_corner() {
        let tour = run_warnsdorff(8, Square::new(0, 0));
        assert_eq!(
            &tour.path()[..6],
            &[
                Square::new(0, 0),
                Square::new(2, 1),
                Square::new(0, 2),
                Square::new(1, 0),
                Square::new(3, 1),
                Square::new(5, 0),
            ]
        );
    }

    #[test]
    fn warnsdorff_completes_eight_by_eight_from_corner() {
        let tour = run_warnsdorff(8, Square::new(0, 0));
        assert!(tour.is_complete());
        assert_eq!(tour.moves(), 63);
        assert!(!tour.is_stuck());
    }

    #[test]
    fn warnsdorff_can_dead_end() {
        let tour = run_warnsdorff(5, Square::new(1, 2));
        assert!(!tour.is_complete());
        assert!(tour.is_stuck());
        assert_eq!(tour.path().len(), 8);

        let tour = run_warnsdorff(3, Square::new(0, 0));
        assert_eq!(tour.path().len(), 8);
        assert!(tour.is_stuck());
    }

    #[test]
    fn visit_validation() {
        let mut tour = KnightTour::new(8).unwrap();
        assert_eq!(tour.visit(Square::new(8, 0)), Err(MoveError::OutOfBounds(Square::new(8, 0))));
        tour.visit(Square::new(0, 0)).unwrap();
        assert_eq!(tour.moves(), 0);
        assert_eq!(tour.visit(Square::new(1, 1)), Err(MoveError::IllegalJump(Square::new(1, 1))));
        tour.visit(Square::new(2, 1)).unwrap();
        assert_eq!(tour.visit(Square::new(0, 0)), Err(MoveError::AlreadyVisited(Square::new(0, 0))));
        assert_eq!(tour.moves(), 1);
        assert_eq!(tour.start(), Some(Square::new(0, 0)));
    }

    #[test]
    fn outcome_records_start_square_text() {
        let mut tour = KnightTour::new(8).unwrap();
        tour.visit(Square::new(0, 0)).unwrap();
        tour.visit(Square::new(1, 2)).unwrap();
        assert_eq!(
            tour.outcome(false),
            GameOutcome::KnightTour(KnightTourResult {
                start_square: "(0, 0)".into(),
                moves: 1,
                completed: false
            })
        );
    }
}
