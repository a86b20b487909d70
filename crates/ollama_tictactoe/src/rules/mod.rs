//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`]. Rules are kept apart from the board
//! storage so the arbiter and the prompt builder can share them.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{WIN_LINES, WinLine, winning_line};

use super::{Board, Mark};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// A mark filled a line.
    Win {
        /// The winning mark.
        winner: Mark,
        /// The first line (in table order) held by the winner.
        line: WinLine,
    },
    /// Board is full with no line.
    Draw,
    /// Moves remain.
    InProgress,
}

impl Outcome {
    /// Returns true for wins and draws.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Mark> {
        match self {
            Outcome::Win { winner, .. } => Some(*winner),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win { winner, .. } => write!(f, "{} wins", winner),
            Outcome::Draw => write!(f, "Draw"),
            Outcome::InProgress => write!(f, "In progress"),
        }
    }
}

/// Evaluates the board: first completed line wins, a full board draws.
#[instrument(skip(board))]
pub fn detect_outcome(board: &Board) -> Outcome {
    if let Some((winner, line)) = winning_line(board) {
        return Outcome::Win { winner, line };
    }
    if is_full(board) {
        return Outcome::Draw;
    }
    Outcome::InProgress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    fn board_from(symbols: &str) -> Board {
        let mut cells = [Cell::Empty; 9];
        for (index, symbol) in symbols.chars().enumerate() {
            cells[index] = match symbol {
                'X' => Cell::Marked(Mark::X),
                'O' => Cell::Marked(Mark::O),
                _ => Cell::Empty,
            };
        }
        Board::from_cells(cells)
    }

    #[test]
    fn test_empty_board_in_progress() {
        assert_eq!(detect_outcome(&Board::new()), Outcome::InProgress);
    }

    #[test]
    fn test_top_row_win() {
        let outcome = detect_outcome(&board_from("XXX_OO___"));
        assert_eq!(
            outcome,
            Outcome::Win {
                winner: Mark::X,
                line: WinLine::new([0, 1, 2]),
            }
        );
    }

    #[test]
    fn test_full_board_without_line_draws() {
        let outcome = detect_outcome(&board_from("XOXOXXOXO"));
        assert_eq!(outcome, Outcome::Draw);
        assert_eq!(outcome.winner(), None);
        assert!(outcome.is_terminal());
    }

    #[test]
    fn test_win_on_last_cell_beats_draw() {
        let outcome = detect_outcome(&board_from("XOXOXOOXX"));
        assert_eq!(outcome.winner(), Some(Mark::X));
    }

    #[test]
    fn test_row_reported_before_column() {
        // X completes row 0-1-2 and column 2-5-8 with the same move.
        let outcome = detect_outcome(&board_from("XXXOOXOOX"));
        assert_eq!(
            outcome,
            Outcome::Win {
                winner: Mark::X,
                line: WinLine::new([0, 1, 2]),
            }
        );
    }
}
