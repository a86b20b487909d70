//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// Divider placed between rendered rows.
const ROW_DIVIDER: &str = "---------";

/// A player's symbol.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Mark {
    /// Player X (the human, moves first).
    X,
    /// Player O (the automated player).
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A single cell on the board.
///
/// Serializes as `null` when empty and as the mark otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<Mark>", into = "Option<Mark>")]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Occupied by a mark.
    Marked(Mark),
}

impl From<Option<Mark>> for Cell {
    fn from(mark: Option<Mark>) -> Self {
        mark.map_or(Cell::Empty, Cell::Marked)
    }
}

impl From<Cell> for Option<Mark> {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => None,
            Cell::Marked(mark) => Some(mark),
        }
    }
}

/// A move that the board refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum IllegalMove {
    /// Index is not in 0-8.
    #[display("Position {} is off the board", _0)]
    OutOfBounds(usize),

    /// The target cell already holds a mark.
    #[display("Position {} is already occupied", _0)]
    Occupied(usize),

    /// The game has already ended.
    #[display("Game is already over")]
    GameOver,
}

impl std::error::Error for IllegalMove {}

/// 3x3 board, row-major (0-2 top row, 3-5 middle, 6-8 bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board from explicit cells.
    pub fn from_cells(cells: [Cell; CELL_COUNT]) -> Self {
        Self { cells }
    }

    /// Gets the cell at `index`, or `None` when off the board.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Checks whether `index` is on the board and empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// Indices of empty cells, ascending.
    pub fn available(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .map(|(index, _)| index)
            .collect()
    }

    /// Returns a copy of the board with `mark` placed at `index`.
    ///
    /// # Errors
    ///
    /// `IllegalMove::OutOfBounds` for indices past 8 and
    /// `IllegalMove::Occupied` when the cell is taken.
    #[instrument(skip(self))]
    pub fn with_move(&self, index: usize, mark: Mark) -> Result<Board, IllegalMove> {
        match self.get(index) {
            None => Err(IllegalMove::OutOfBounds(index)),
            Some(Cell::Marked(_)) => Err(IllegalMove::Occupied(index)),
            Some(Cell::Empty) => {
                let mut next = *self;
                next.cells[index] = Cell::Marked(mark);
                Ok(next)
            }
        }
    }

    /// Renders the board as text for prompts.
    ///
    /// Cells are joined with `" | "` (empty cells as a space) and rows are
    /// separated by a dashed divider line.
    pub fn render(&self) -> String {
        self.cells
            .chunks(3)
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Empty => " ".to_string(),
                        Cell::Marked(mark) => mark.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join(&format!("\n{}\n", ROW_DIVIDER))
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Failure to read a rendered board back.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Malformed board text: {}", _0)]
pub struct BoardParseError(String);

impl std::error::Error for BoardParseError {}

impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = text
            .lines()
            .filter(|line| line.trim() != ROW_DIVIDER)
            .collect();
        if rows.len() != 3 {
            return Err(BoardParseError(format!("expected 3 rows, found {}", rows.len())));
        }

        let mut cells = [Cell::Empty; CELL_COUNT];
        for (row_index, row) in rows.iter().enumerate() {
            let columns: Vec<&str> = row.split('|').map(str::trim).collect();
            if columns.len() != 3 {
                return Err(BoardParseError(format!(
                    "row {} has {} cells",
                    row_index,
                    columns.len()
                )));
            }
            for (col_index, symbol) in columns.iter().enumerate() {
                cells[row_index * 3 + col_index] = match *symbol {
                    "" => Cell::Empty,
                    other => Cell::Marked(
                        Mark::from_str(other)
                            .map_err(|_| BoardParseError(format!("unknown mark {:?}", other)))?,
                    ),
                };
            }
        }

        Ok(Self { cells })
    }
}
