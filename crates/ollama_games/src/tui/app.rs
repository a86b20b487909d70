//! Front-end state: the arbiter handle and the cursor.

use super::input::{Action, action_for};
use crate::arbiter::Arbiter;
use crate::session::{Phase, Snapshot};
use crossterm::event::KeyCode;
use ollama_tictactoe::Mark;
use tracing::{debug, info};

/// State kept between frames.
#[derive(Debug)]
pub struct App {
    arbiter: Arbiter,
    cursor: usize,
    quit: bool,
}

impl App {
    /// Creates the front-end around an arbiter.
    pub fn new(arbiter: Arbiter) -> Self {
        Self {
            arbiter,
            cursor: 4,
            quit: false,
        }
    }

    /// Highlighted cell.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True once the user asked to leave.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Current session as the arbiter sees it.
    pub fn snapshot(&self) -> Snapshot {
        self.arbiter.snapshot()
    }

    /// Applies one key press.
    ///
    /// Moves run on a background task so the screen keeps redrawing while
    /// the model thinks. Refused moves are ignored without a message.
    pub fn handle_key(&mut self, key: KeyCode) {
        match action_for(self.cursor, key) {
            Action::Quit => {
                info!("User quit");
                self.quit = true;
            }
            Action::Reset => {
                info!("User reset the game");
                self.arbiter.reset();
            }
            Action::Cursor(cursor) => self.cursor = cursor,
            Action::Play(index) => {
                self.cursor = index;
                let arbiter = self.arbiter.clone();
                tokio::spawn(async move {
                    if let Err(e) = arbiter.play(index).await {
                        debug!(index, error = %e, "Move ignored");
                    }
                });
            }
            Action::None => {}
        }
    }
}

/// One-line status for the bottom of the screen.
pub fn status_line(snapshot: &Snapshot) -> String {
    match snapshot.phase {
        Phase::AwaitingHumanMove => {
            "Your move (X). Keys 1-9 or arrows + Enter, 'r' reset, 'q' quit.".to_string()
        }
        Phase::RequestingAutomatedMove => "Ollama is thinking...".to_string(),
        Phase::Stalled => "Ollama could not move. Press 'r' to reset.".to_string(),
        Phase::GameOver => match snapshot.state.winner() {
            Some(Mark::X) => "You win! Press 'r' to play again.".to_string(),
            Some(Mark::O) => "Ollama wins! Press 'r' to play again.".to_string(),
            None => "It's a draw! Press 'r' to play again.".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GameSession;

    #[test]
    fn test_status_follows_phase() {
        let mut session = GameSession::new();
        assert!(status_line(&session.snapshot()).starts_with("Your move"));

        session.submit_human_move(0).unwrap();
        assert_eq!(status_line(&session.snapshot()), "Ollama is thinking...");
    }
}
