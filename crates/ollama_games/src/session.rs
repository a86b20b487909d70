//! Game session: the turn-sequencing state machine.
//!
//! A [`GameSession`] owns one game's state and log. Every mutation goes
//! through [`GameSession::submit_human_move`],
//! [`GameSession::resolve_automated_move`] or [`GameSession::reset`].
//! Automated moves are requested outside the session; the reply is handed
//! back together with the generation it was issued under, and replies from
//! before a reset are dropped.

use crate::mover::{MoveRequest, MoverError};
use ollama_tictactoe::{GameState, IllegalMove, Mark, Outcome};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Mark played by the human.
pub const HUMAN_MARK: Mark = Mark::X;

/// Mark played by the language model.
pub const AUTOMATED_MARK: Mark = Mark::O;

/// Who produced a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The human player.
    Human,
    /// The language model.
    AutomatedPlayer,
    /// The session itself.
    System,
}

/// One line of the game log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Who produced the line.
    pub origin: Origin,
    /// Display text.
    pub text: String,
}

/// Where the session is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the human to pick a cell.
    AwaitingHumanMove,
    /// A request to the model is outstanding.
    RequestingAutomatedMove,
    /// The model's move was unusable; only a reset continues the game.
    Stalled,
    /// Won or drawn.
    GameOver,
}

/// Why a human move was refused. Refusals leave the session untouched.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SubmitError {
    /// The board refused the move.
    #[display("{}", _0)]
    Illegal(IllegalMove),

    /// The model is still choosing.
    #[display("Waiting for the automated player's move")]
    AwaitingAutomatedMove,

    /// The model's last move was unusable.
    #[display("Game is stalled; reset to play again")]
    Stalled,
}

impl std::error::Error for SubmitError {}

impl From<IllegalMove> for SubmitError {
    fn from(err: IllegalMove) -> Self {
        SubmitError::Illegal(err)
    }
}

/// What happens after an accepted human move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// The human's move ended the game.
    Finished(Outcome),
    /// The model must now be asked for a move.
    AwaitAutomated(MoveRequest),
}

/// What became of a reply from the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The move was played.
    Applied(Outcome),
    /// The reply was unusable and the session stalled.
    Rejected(MoverError),
    /// The reply belonged to an earlier generation and was dropped.
    Stale,
}

/// Serializable view of a session for front-ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Generation of the session.
    pub generation: u64,
    /// Turn-cycle phase.
    pub phase: Phase,
    /// Game state.
    pub state: GameState,
    /// Log lines, oldest first.
    pub log: Vec<LogEntry>,
}

/// One game against the language model.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: GameState,
    log: Vec<LogEntry>,
    phase: Phase,
    generation: u64,
}

impl GameSession {
    /// Creates a fresh session at generation 0.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating new game session");
        Self {
            state: GameState::new(),
            log: Vec::new(),
            phase: Phase::AwaitingHumanMove,
            generation: 0,
        }
    }

    /// Returns the game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Returns the log.
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Returns the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the generation; it increases on every reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns a serializable copy of the session.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            phase: self.phase,
            state: self.state.clone(),
            log: self.log.clone(),
        }
    }

    /// Plays the human's mark at `index`.
    ///
    /// # Errors
    ///
    /// Refused while the model is choosing, while stalled, after the game
    /// ends, or for off-board and occupied cells. Refusals add no log line.
    #[instrument(skip(self), fields(generation = self.generation, phase = %self.phase))]
    pub fn submit_human_move(&mut self, index: usize) -> Result<Turn, SubmitError> {
        match self.phase {
            Phase::AwaitingHumanMove => {}
            Phase::RequestingAutomatedMove => return Err(SubmitError::AwaitingAutomatedMove),
            Phase::Stalled => return Err(SubmitError::Stalled),
            Phase::GameOver => return Err(SubmitError::Illegal(IllegalMove::GameOver)),
        }

        let mark = self.state.current_player();
        let outcome = self.state.place(index).map_err(|e| {
            debug!(error = %e, "Human move refused");
            SubmitError::from(e)
        })?;
        self.push(Origin::Human, format!("Player {} moved to position {}", mark, index));

        if outcome.is_terminal() {
            self.finish(outcome);
            return Ok(Turn::Finished(outcome));
        }

        self.phase = Phase::RequestingAutomatedMove;
        self.push(Origin::System, "Waiting for Ollama to make a move...".to_string());
        Ok(Turn::AwaitAutomated(MoveRequest::new(
            self.generation,
            *self.state.board(),
            index,
        )))
    }

    /// Applies the model's reply to a request issued under `generation`.
    ///
    /// Replies for an older generation, or arriving when no request is
    /// outstanding, are dropped without touching the session.
    #[instrument(skip(self), fields(current_generation = self.generation, phase = %self.phase))]
    pub fn resolve_automated_move(
        &mut self,
        generation: u64,
        reply: Result<usize, MoverError>,
    ) -> Resolution {
        if generation != self.generation || self.phase != Phase::RequestingAutomatedMove {
            warn!(generation, "Discarding stale automated move");
            return Resolution::Stale;
        }

        let index = match reply {
            Ok(index) => index,
            Err(err) => {
                self.stall(&err);
                return Resolution::Rejected(err);
            }
        };

        match self.state.place(index) {
            Ok(outcome) => {
                self.push(
                    Origin::AutomatedPlayer,
                    format!("Ollama ({}) moved to position {}", AUTOMATED_MARK, index),
                );
                if outcome.is_terminal() {
                    self.finish(outcome);
                } else {
                    self.phase = Phase::AwaitingHumanMove;
                }
                Resolution::Applied(outcome)
            }
            Err(illegal) => {
                let err = match illegal {
                    IllegalMove::OutOfBounds(_) => MoverError::OutOfRange(index.to_string()),
                    IllegalMove::Occupied(_) | IllegalMove::GameOver => {
                        MoverError::CellOccupied(index)
                    }
                };
                self.stall(&err);
                Resolution::Rejected(err)
            }
        }
    }

    /// Starts over: fresh state, empty log, next generation.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn reset(&mut self) {
        self.state = GameState::new();
        self.log.clear();
        self.phase = Phase::AwaitingHumanMove;
        self.generation = self.generation.wrapping_add(1);
        info!(new_generation = self.generation, "Session reset");
    }

    fn finish(&mut self, outcome: Outcome) {
        let text = match outcome.winner() {
            Some(winner) => format!("Game Over! {} wins!", winner),
            None => "Game Over! It's a draw!".to_string(),
        };
        self.push(Origin::System, text);
        self.phase = Phase::GameOver;
        info!(%outcome, "Game finished");
    }

    fn stall(&mut self, err: &MoverError) {
        let text = if err.is_transport() {
            format!("Error communicating with Ollama: {}", err)
        } else {
            format!("Ollama made an invalid move: {}. Reset the game to continue.", err)
        };
        warn!(error = %err, "Automated move unusable, session stalled");
        self.push(Origin::System, text);
        self.phase = Phase::Stalled;
    }

    fn push(&mut self, origin: Origin, text: String) {
        debug!(%origin, text = %text, "Log entry");
        self.log.push(LogEntry { origin, text });
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ollama_tictactoe::{Cell, WinLine};

    /// Plays `index` as the human and returns the outstanding request.
    fn human(session: &mut GameSession, index: usize) -> MoveRequest {
        match session.submit_human_move(index).unwrap() {
            Turn::AwaitAutomated(request) => request,
            Turn::Finished(outcome) => panic!("unexpected finish: {}", outcome),
        }
    }

    /// Plays the human move, then answers with `reply`.
    fn round(session: &mut GameSession, index: usize, reply: usize) -> Resolution {
        let request = human(session, index);
        session.resolve_automated_move(request.generation(), Ok(reply))
    }

    #[test]
    fn test_center_opening() {
        let mut session = GameSession::new();
        let request = human(&mut session, 4);

        assert_eq!(session.state().board().get(4), Some(Cell::Marked(Mark::X)));
        assert_eq!(session.state().current_player(), Mark::O);
        assert!(!session.state().is_game_over());
        assert_eq!(session.phase(), Phase::RequestingAutomatedMove);
        assert_eq!(request.human_move(), 4);
        assert_eq!(request.available(), &[0, 1, 2, 3, 5, 6, 7, 8]);

        let human_entries: Vec<_> = session
            .log()
            .iter()
            .filter(|entry| entry.origin == Origin::Human)
            .collect();
        assert_eq!(human_entries.len(), 1);
        assert_eq!(human_entries[0].text, "Player X moved to position 4");
        assert_eq!(
            session.log().last().map(|entry| entry.text.as_str()),
            Some("Waiting for Ollama to make a move...")
        );
    }

    #[test]
    fn test_refusals_leave_no_trace() {
        let mut session = GameSession::new();
        round(&mut session, 4, 0);
        let before = session.snapshot();

        assert_eq!(
            session.submit_human_move(4),
            Err(SubmitError::Illegal(IllegalMove::Occupied(4)))
        );
        assert_eq!(
            session.submit_human_move(9),
            Err(SubmitError::Illegal(IllegalMove::OutOfBounds(9)))
        );
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_submit_refused_while_requesting() {
        let mut session = GameSession::new();
        human(&mut session, 4);
        let before = session.snapshot();
        assert_eq!(
            session.submit_human_move(0),
            Err(SubmitError::AwaitingAutomatedMove)
        );
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_automated_move_applied() {
        let mut session = GameSession::new();
        let resolution = round(&mut session, 4, 0);

        assert_eq!(resolution, Resolution::Applied(Outcome::InProgress));
        assert_eq!(session.phase(), Phase::AwaitingHumanMove);
        assert_eq!(session.state().current_player(), Mark::X);
        assert_eq!(session.state().last_move(), Some(0));
        assert_eq!(
            session.log().last(),
            Some(&LogEntry {
                origin: Origin::AutomatedPlayer,
                text: "Ollama (O) moved to position 0".to_string(),
            })
        );
    }

    #[test]
    fn test_human_completes_top_row() {
        let mut session = GameSession::new();
        round(&mut session, 0, 4);
        round(&mut session, 1, 5);

        let turn = session.submit_human_move(2).unwrap();
        let expected = Outcome::Win {
            winner: Mark::X,
            line: WinLine::new([0, 1, 2]),
        };
        assert_eq!(turn, Turn::Finished(expected));
        assert_eq!(session.phase(), Phase::GameOver);
        assert!(session.state().is_game_over());
        assert_eq!(session.state().winning_line(), Some(WinLine::new([0, 1, 2])));
        assert_eq!(
            session.log().last().map(|entry| entry.text.as_str()),
            Some("Game Over! X wins!")
        );
        assert_eq!(
            session.submit_human_move(8),
            Err(SubmitError::Illegal(IllegalMove::GameOver))
        );
    }

    #[test]
    fn test_automated_player_can_win() {
        let mut session = GameSession::new();
        round(&mut session, 0, 4);
        round(&mut session, 1, 2);
        let resolution = round(&mut session, 8, 6);

        assert_eq!(
            resolution,
            Resolution::Applied(Outcome::Win {
                winner: Mark::O,
                line: WinLine::new([2, 4, 6]),
            })
        );
        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(session.state().winner(), Some(Mark::O));
        assert_eq!(session.state().current_player(), Mark::O);
    }

    #[test]
    fn test_draw_on_last_human_move() {
        let mut session = GameSession::new();
        // X O X / X O O / O X X
        round(&mut session, 0, 1);
        round(&mut session, 2, 4);
        round(&mut session, 3, 5);
        round(&mut session, 7, 6);
        let turn = session.submit_human_move(8).unwrap();

        assert_eq!(turn, Turn::Finished(Outcome::Draw));
        assert_eq!(session.state().winner(), None);
        assert_eq!(
            session.log().last().map(|entry| entry.text.as_str()),
            Some("Game Over! It's a draw!")
        );
    }

    #[test]
    fn test_out_of_range_reply_stalls() {
        let mut session = GameSession::new();
        let request = human(&mut session, 4);
        let board_before = *session.state().board();

        let resolution = session.resolve_automated_move(
            request.generation(),
            Err(MoverError::OutOfRange("9".to_string())),
        );

        assert_eq!(
            resolution,
            Resolution::Rejected(MoverError::OutOfRange("9".to_string()))
        );
        assert_eq!(*session.state().board(), board_before);
        assert_eq!(session.phase(), Phase::Stalled);
        let last = session.log().last().unwrap();
        assert_eq!(last.origin, Origin::System);
        assert!(last.text.contains("9"));
        assert_eq!(session.submit_human_move(0), Err(SubmitError::Stalled));
    }

    #[test]
    fn test_empty_reply_stalls_as_unparseable() {
        let mut session = GameSession::new();
        let request = human(&mut session, 4);
        let board_before = *session.state().board();

        let reply = crate::mover::parse_move("");
        let resolution = session.resolve_automated_move(request.generation(), reply);

        assert_eq!(
            resolution,
            Resolution::Rejected(MoverError::Unparseable(String::new()))
        );
        assert_eq!(*session.state().board(), board_before);
        assert_eq!(session.phase(), Phase::Stalled);
        let last = session.log().last().unwrap();
        assert_eq!(last.origin, Origin::System);
        assert_eq!(
            last.text,
            "Ollama made an invalid move: reply \"\" does not contain a position. \
             Reset the game to continue."
        );
        assert_eq!(session.submit_human_move(0), Err(SubmitError::Stalled));
    }

    #[test]
    fn test_occupied_reply_is_rechecked() {
        let mut session = GameSession::new();
        let request = human(&mut session, 4);
        let resolution = session.resolve_automated_move(request.generation(), Ok(4));

        assert_eq!(resolution, Resolution::Rejected(MoverError::CellOccupied(4)));
        assert_eq!(session.phase(), Phase::Stalled);
        assert_eq!(session.state().board().get(4), Some(Cell::Marked(Mark::X)));
    }

    #[test]
    fn test_transport_error_logged_verbatim() {
        let mut session = GameSession::new();
        let request = human(&mut session, 4);
        session.resolve_automated_move(
            request.generation(),
            Err(MoverError::Transport("connection refused".to_string())),
        );

        assert_eq!(
            session.log().last().map(|entry| entry.text.as_str()),
            Some("Error communicating with Ollama: connection refused")
        );
        assert_eq!(session.phase(), Phase::Stalled);
    }

    #[test]
    fn test_stale_reply_discarded_after_reset() {
        let mut session = GameSession::new();
        let request = human(&mut session, 4);
        session.reset();
        let fresh = session.snapshot();

        let resolution = session.resolve_automated_move(request.generation(), Ok(0));

        assert_eq!(resolution, Resolution::Stale);
        assert_eq!(session.snapshot(), fresh);
    }

    #[test]
    fn test_reply_without_request_is_stale() {
        let mut session = GameSession::new();
        assert_eq!(session.resolve_automated_move(0, Ok(0)), Resolution::Stale);
        assert!(session.log().is_empty());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = GameSession::new();
        round(&mut session, 4, 0);

        session.reset();
        let first = session.snapshot();
        session.reset();
        let second = session.snapshot();

        assert_eq!(first.state, GameState::new());
        assert!(first.log.is_empty());
        assert_eq!(first.state, second.state);
        assert_eq!(first.log, second.log);
        assert_eq!(first.phase, Phase::AwaitingHumanMove);
        assert_eq!(second.generation, first.generation + 1);
    }
}
