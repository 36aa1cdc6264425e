//! Towers of Hanoi on three pegs.

use serde::{Deserialize, Serialize};

use super::hint::HintQuery;
use super::{MoveError, Puzzle};
use crate::common::messages::{GameKind, GameOutcome, HanoiResult};

pub const PEG_COUNT: usize = 3;
/// Tallest tower a board will build; the hint sequence holds `2^n - 1` moves.
pub const MAX_DISKS: u32 = 20;

/// Move the top disk of peg `from` onto peg `to` (pegs are 0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

impl Move {
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

/// The optimal `2^n - 1` moves taking `n` disks from `source` to
/// `destination` through `auxiliary`.
pub fn generate_solution(n: u32, source: usize, destination: usize, auxiliary: usize) -> Vec<Move> {
    let mut moves = Vec::new();
    push_moves(n, source, destination, auxiliary, &mut moves);
    moves
}

fn push_moves(n: u32, source: usize, destination: usize, auxiliary: usize, out: &mut Vec<Move>) {
    if n == 0 {
        return;
    }
    push_moves(n - 1, source, auxiliary, destination, out);
    out.push(Move::new(source, destination));
    push_moves(n - 1, auxiliary, destination, source, out);
}

/// Three pegs holding disks `1..=n` (1 is the smallest). All disks start on
/// the first peg; the puzzle is solved when the last peg holds all of them.
#[derive(Debug, Clone)]
pub struct Towers {
    pegs: [Vec<u32>; PEG_COUNT],
    disks: u32,
    moves: u32,
    solution: Vec<Move>,
}

impl Towers {
    /// Set up the towers and precompute the optimal sequence used for hints.
    pub fn new(disks: u32) -> Result<Self, MoveError> {
        if disks == 0 {
            return Err(MoveError::InvalidSize);
        }
        if disks > MAX_DISKS {
            return Err(MoveError::TooManyDisks(disks));
        }
        Ok(Self {
            pegs: [(1..=disks).rev().collect(), Vec::new(), Vec::new()],
            disks,
            moves: 0,
            solution: generate_solution(disks, 0, PEG_COUNT - 1, 1),
        })
    }

    pub fn disks(&self) -> u32 {
        self.disks
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Disks on each peg, bottom first.
    pub fn pegs(&self) -> &[Vec<u32>; PEG_COUNT] {
        &self.pegs
    }

    pub fn move_disk(&mut self, mv: Move) -> Result<(), MoveError> {
        for peg in [mv.from, mv.to] {
            if peg >= PEG_COUNT {
                return Err(MoveError::NoSuchPeg(peg));
            }
        }
        if mv.from == mv.to {
            return Err(MoveError::SamePeg);
        }
        let disk = *self.pegs[mv.from].last().ok_or(MoveError::EmptyPeg(mv.from))?;
        if self.pegs[mv.to].last().is_some_and(|&top| top < disk) {
            return Err(MoveError::LargerOnSmaller);
        }

        self.pegs[mv.from].pop();
        self.pegs[mv.to].push(disk);
        self.moves += 1;
        Ok(())
    }

    pub fn is_solved(&self) -> bool {
        self.pegs[PEG_COUNT - 1].len() == self.disks as usize
    }

    /// The optimal move indexed by the number of moves made so far. Only
    /// meaningful while the player has followed the optimal sequence.
    pub fn hint(&self) -> Option<Move> {
        self.solution.get(self.moves as usize).copied()
    }
}

impl Puzzle for Towers {
    type Move = Move;

    fn kind(&self) -> GameKind {
        GameKind::Hanoi
    }

    fn apply(&mut self, mv: Move) -> Result<(), MoveError> {
        self.move_disk(mv)
    }

    fn is_won(&self) -> bool {
        self.is_solved()
    }

    fn outcome(&self, won: bool) -> GameOutcome {
        GameOutcome::Hanoi(HanoiResult {
            disk_count: self.disks,
            moves: self.moves,
            completed: won,
        })
    }

    fn hint(&self) -> Option<Move> {
        Towers::hint(self)
    }

    fn hint_query(&self) -> HintQuery {
        HintQuery::Hanoi {
            disks: self.disks,
            moves_made: self.moves as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solution_lengths() {
        assert!(generate_solution(0, 0, 2, 1).is_empty());
        assert_eq!(generate_solution(1, 0, 2, 1), vec![Move::new(0, 2)]);
        for n in 1..=10 {
            assert_eq!(generate_solution(n, 0, 2, 1).len(), (1usize << n) - 1);
        }
    }

    #[test]
    fn three_disk_sequence() {
        let expected = [(0, 2), (0, 1), (2, 1), (0, 2), (1, 0), (1, 2), (0, 2)];
        let moves: Vec<(usize, usize)> = generate_solution(3, 0, 2, 1)
            .into_iter()
            .map(|m| (m.from, m.to))
            .collect();
        assert_eq!(moves, expected);
    }

    #[test]
    fn following_the_solution_solves_the_towers() {
        for disks in 1..=8 {
            let mut towers = Towers::new(disks).unwrap();
            while let Some(mv) = towers.hint() {
                towers.move_disk(mv).unwrap();
            }
            assert!(towers.is_solved());
            assert_eq!(towers.moves(), (1u32 << disks) - 1);
            assert_eq!(towers.pegs()[2], (1..=disks).rev().collect::<Vec<_>>());
        }
    }

    #[test]
    fn illegal_moves_leave_board_untouched() {
        let mut towers = Towers::new(3).unwrap();
        towers.move_disk(Move::new(0, 1)).unwrap();

        assert_eq!(towers.move_disk(Move::new(0, 1)), Err(MoveError::LargerOnSmaller));
        assert_eq!(towers.move_disk(Move::new(2, 0)), Err(MoveError::EmptyPeg(2)));
        assert_eq!(towers.move_disk(Move::new(1, 1)), Err(MoveError::SamePeg));
        assert_eq!(towers.move_disk(Move::new(0, 3)), Err(MoveError::NoSuchPeg(3)));

        assert_eq!(towers.moves(), 1);
        assert_eq!(towers.pegs()[0], vec![3, 2]);
        assert_eq!(towers.pegs()[1], vec![1]);
    }

    #[test]
    fn tower_height_is_bounded() {
        assert_eq!(Towers::new(0).unwrap_err(), MoveError::InvalidSize);
        assert_eq!(
            Towers::new(MAX_DISKS + 1).unwrap_err(),
            MoveError::TooManyDisks(MAX_DISKS + 1)
        );
        assert_eq!(Towers::new(40).unwrap_err(), MoveError::TooManyDisks(40));

        let tallest = Towers::new(MAX_DISKS).unwrap();
        assert_eq!(tallest.hint(), Some(Move::new(0, 1)));
    }

    #[test]
    fn hint_runs_out_after_optimal_sequence() {
        let mut towers = Towers::new(1).unwrap();
        assert_eq!(towers.hint(), Some(Move::new(0, 2)));
        towers.move_disk(Move::new(0, 2)).unwrap();
        assert_eq!(towers.hint(), None);
    }
}
