//! # Game Sessions
//!
//! A [`GameSession`] wraps one puzzle board and tracks its lifecycle:
//!
//! ```text
//! Idle --first accepted move--> InProgress --won--------> Terminal(Won)
//!   |                               |-------stuck------> Terminal(Abandoned)
//!   '------------abandon()----------'-------abandon()--> Terminal(Abandoned)
//! ```
//!
//! Entering a terminal state produces exactly one [`GameResult`], which the
//! game hands to [`spawn_report`](super::client::spawn_report) via
//! [`GameSession::take_report`]. Moves after that are rejected.

use super::assistant::SuggestionSlot;
use crate::common::messages::GameResult;
use crate::puzzles::{MoveError, Puzzle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Won,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    InProgress,
    Terminal(Termination),
}

pub struct GameSession<P: Puzzle> {
    puzzle: P,
    state: SessionState,
    report: Option<GameResult>,
    suggestions: SuggestionSlot,
}

impl<P: Puzzle> GameSession<P> {
    pub fn new(puzzle: P) -> Self {
        Self {
            puzzle,
            state: SessionState::Idle,
            report: None,
            suggestions: SuggestionSlot::default(),
        }
    }

    pub fn puzzle(&self) -> &P {
        &self.puzzle
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Terminal(_))
    }

    /// Apply a player move.
    ///
    /// A rejected move changes nothing. An accepted move may end the session,
    /// either because the puzzle is won or because no legal move remains.
    pub fn apply(&mut self, mv: P::Move) -> Result<SessionState, MoveError> {
        if self.is_finished() {
            return Err(MoveError::SessionFinished);
        }

        self.puzzle.apply(mv)?;
        self.state = SessionState::InProgress;

        if self.puzzle.is_won() {
            self.finish(Termination::Won);
        } else if self.puzzle.is_stuck() {
            self.finish(Termination::Abandoned);
        }
        Ok(self.state)
    }

    /// Player quit. Reports an unfinished result unless already terminal.
    pub fn abandon(&mut self) -> SessionState {
        if !self.is_finished() {
            self.finish(Termination::Abandoned);
        }
        self.state
    }

    fn finish(&mut self, how: Termination) {
        self.state = SessionState::Terminal(how);
        self.report = Some(GameResult::new(self.puzzle.outcome(how == Termination::Won)));
        self.suggestions.clear();
    }

    /// The result produced on entering the terminal state. `Some` only once.
    pub fn take_report(&mut self) -> Option<GameResult> {
        self.report.take()
    }

    /// Local next-move suggestion; none once the session is over.
    pub fn hint(&self) -> Option<P::Move> {
        if self.is_finished() {
            None
        } else {
            self.puzzle.hint()
        }
    }

    pub fn suggestions(&mut self) -> &mut SuggestionSlot {
        &mut self.suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::messages::{GameOutcome, HanoiResult, KnightTourResult, NQueensResult};
    use crate::puzzles::hanoi::{Move, Towers};
    use crate::puzzles::knight::KnightTour;
    use crate::puzzles::nqueens::{NQueensBoard, QueenMove};
    use crate::puzzles::Square;

    #[test]
    fn nqueens_session_wins_and_reports_once() {
        let mut session = GameSession::new(NQueensBoard::new(4).unwrap());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.take_report().is_none());

        let mut last = SessionState::Idle;
        for (col, row) in [(1, 0), (3, 1), (0, 2), (2, 3)] {
            last = session.apply(QueenMove::Place(Square::new(col, row))).unwrap();
        }
        assert_eq!(last, SessionState::Terminal(Termination::Won));

        let report = session.take_report().unwrap();
        assert_eq!(
            report.outcome,
            GameOutcome::NQueens(NQueensResult {
                n: 4,
                solved: true,
                attempts: 4
            })
        );
        assert!(session.take_report().is_none());
        assert_eq!(
            session.apply(QueenMove::Remove(Square::new(1, 0))),
            Err(MoveError::SessionFinished)
        );
    }

    #[test]
    fn rejected_move_keeps_session_idle() {
        let mut session = GameSession::new(NQueensBoard::new(4).unwrap());
        assert!(session.apply(QueenMove::Remove(Square::new(0, 0))).is_err());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn quitting_reports_unsolved_board() {
        let mut session = GameSession::new(NQueensBoard::new(8).unwrap());
        session.apply(QueenMove::Place(Square::new(0, 0))).unwrap();
        session.apply(QueenMove::Place(Square::new(4, 1))).unwrap();
        session.apply(QueenMove::Remove(Square::new(4, 1))).unwrap();

        assert_eq!(session.abandon(), SessionState::Terminal(Termination::Abandoned));
        let report = session.take_report().unwrap();
        assert_eq!(
            report.outcome,
            GameOutcome::NQueens(NQueensResult {
                n: 8,
                solved: false,
                attempts: 2
            })
        );

        // A second quit changes nothing.
        session.abandon();
        assert!(session.take_report().is_none());
    }

    #[test]
    fn idle_abandon_still_reports() {
        let mut session = GameSession::new(Towers::new(3).unwrap());
        session.abandon();
        assert_eq!(
            session.take_report().unwrap().outcome,
            GameOutcome::Hanoi(HanoiResult {
                disk_count: 3,
                moves: 0,
                completed: false
            })
        );
    }

    #[test]
    fn stuck_knight_ends_the_session() {
        let mut session = GameSession::new(KnightTour::new(3).unwrap());
        assert_eq!(
            session.apply(Square::new(1, 1)).unwrap(),
            SessionState::Terminal(Termination::Abandoned)
        );
        assert_eq!(
            session.take_report().unwrap().outcome,
            GameOutcome::KnightTour(KnightTourResult {
                start_square: "(1, 1)".into(),
                moves: 0,
                completed: false
            })
        );
    }

    #[test]
    fn hanoi_session_follows_hints_to_the_end() {
        let mut session = GameSession::new(Towers::new(4).unwrap());
        while let Some(mv) = session.hint() {
            session.apply(mv).unwrap();
        }
        assert_eq!(session.state(), SessionState::Terminal(Termination::Won));
        assert_eq!(session.puzzle().moves(), 15);
        assert!(session.hint().is_none());
        assert_eq!(session.apply(Move::new(2, 0)), Err(MoveError::SessionFinished));
    }
}
