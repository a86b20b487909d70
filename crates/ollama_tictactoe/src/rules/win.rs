//! Win detection logic for tic-tac-toe.

use super::super::{Board, Cell, Mark};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Three cell indices that win when held by one mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WinLine([usize; 3]);

impl WinLine {
    /// Creates a line from three indices.
    pub const fn new(cells: [usize; 3]) -> Self {
        Self(cells)
    }

    /// The indices that make up the line.
    pub fn cells(&self) -> [usize; 3] {
        self.0
    }

    /// Checks whether the line passes through `index`.
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }
}

/// Winning lines in scan order: rows, then columns, then diagonals.
pub const WIN_LINES: [WinLine; 8] = [
    // Rows
    WinLine::new([0, 1, 2]),
    WinLine::new([3, 4, 5]),
    WinLine::new([6, 7, 8]),
    // Columns
    WinLine::new([0, 3, 6]),
    WinLine::new([1, 4, 7]),
    WinLine::new([2, 5, 8]),
    // Diagonals
    WinLine::new([0, 4, 8]),
    WinLine::new([2, 4, 6]),
];

/// Returns the first line held entirely by one mark, with that mark.
#[instrument(skip(board))]
pub fn winning_line(board: &Board) -> Option<(Mark, WinLine)> {
    for line in WIN_LINES {
        let [a, b, c] = line.cells();
        let cell = board.get(a);
        if let Some(Cell::Marked(mark)) = cell
            && cell == board.get(b)
            && cell == board.get(c)
        {
            return Some((mark, line));
        }
    }

    None
}
