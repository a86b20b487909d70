//! Pure tic-tac-toe logic for the Ollama game hub.
//!
//! Cells are indexed 0-8 in row-major order. Nothing here performs I/O;
//! the hub's arbiter drives [`GameState`] and asks the language model for
//! the automated player's moves.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod rules;
mod state;
mod types;

pub use rules::{Outcome, WIN_LINES, WinLine, detect_outcome, is_full, winning_line};
pub use state::GameState;
pub use types::{Board, BoardParseError, CELL_COUNT, Cell, IllegalMove, Mark};
