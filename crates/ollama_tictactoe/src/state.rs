//! Authoritative game state.

use super::rules::{Outcome, WinLine, detect_outcome};
use super::types::{Board, IllegalMove, Mark};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Complete state of one game.
///
/// `is_game_over` is set exactly when a line is won or the board fills;
/// `current_player` stops alternating from that point on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    current_player: Mark,
    winner: Option<Mark>,
    is_game_over: bool,
    last_move: Option<usize>,
    winning_line: Option<WinLine>,
}

impl GameState {
    /// Creates a fresh game with X to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Mark::X,
            winner: None,
            is_game_over: false,
            last_move: None,
            winning_line: None,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the mark whose turn it is.
    pub fn current_player(&self) -> Mark {
        self.current_player
    }

    /// Returns the winner, if any.
    pub fn winner(&self) -> Option<Mark> {
        self.winner
    }

    /// Returns true once the game is won or drawn.
    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    /// Returns the most recently played index.
    pub fn last_move(&self) -> Option<usize> {
        self.last_move
    }

    /// Returns the line that won the game.
    pub fn winning_line(&self) -> Option<WinLine> {
        self.winning_line
    }

    /// Places the current player's mark at `index` and evaluates the result.
    ///
    /// # Errors
    ///
    /// Any [`IllegalMove`]; the state is untouched on error.
    #[instrument(skip(self), fields(player = %self.current_player))]
    pub fn place(&mut self, index: usize) -> Result<Outcome, IllegalMove> {
        if self.is_game_over {
            return Err(IllegalMove::GameOver);
        }

        let mark = self.current_player;
        self.board = self.board.with_move(index, mark)?;
        self.last_move = Some(index);

        let outcome = detect_outcome(&self.board);
        match outcome {
            Outcome::Win { winner, line } => {
                self.winner = Some(winner);
                self.winning_line = Some(line);
                self.is_game_over = true;
            }
            Outcome::Draw => self.is_game_over = true,
            Outcome::InProgress => self.current_player = mark.opponent(),
        }

        debug!(index, %outcome, "Mark placed");
        Ok(outcome)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    #[test]
    fn test_place_alternates_players() {
        let mut state = GameState::new();
        state.place(4).unwrap();
        assert_eq!(state.current_player(), Mark::O);
        state.place(0).unwrap();
        assert_eq!(state.current_player(), Mark::X);
        assert_eq!(state.last_move(), Some(0));
    }

    #[test]
    fn test_rejected_move_leaves_state_unchanged() {
        let mut state = GameState::new();
        state.place(4).unwrap();
        let before = state.clone();
        assert_eq!(state.place(4), Err(IllegalMove::Occupied(4)));
        assert_eq!(state.place(11), Err(IllegalMove::OutOfBounds(11)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_player_frozen_after_win() {
        let mut state = GameState::new();
        for index in [0, 3, 1, 4] {
            state.place(index).unwrap();
        }
        let outcome = state.place(2).unwrap();
        assert_eq!(outcome.winner(), Some(Mark::X));
        assert!(state.is_game_over());
        assert_eq!(state.winner(), Some(Mark::X));
        assert_eq!(state.winning_line(), Some(WinLine::new([0, 1, 2])));
        assert_eq!(state.current_player(), Mark::X);
        assert_eq!(state.place(8), Err(IllegalMove::GameOver));
        assert_eq!(state.board().get(8), Some(Cell::Empty));
    }

    #[test]
    fn test_draw_ends_game_without_winner() {
        let mut state = GameState::new();
        // X O X / X O O / O X X
        for index in [0, 1, 2, 4, 3, 5, 7, 6, 8] {
            state.place(index).unwrap();
        }
        assert!(state.is_game_over());
        assert_eq!(state.winner(), None);
        assert_eq!(state.winning_line(), None);
    }
}
