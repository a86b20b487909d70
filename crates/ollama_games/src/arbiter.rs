//! Shared handle that drives a [`GameSession`] against the mover client.

use crate::mover::{MoveRequest, MoverClient, MoverError};
use crate::session::{GameSession, Resolution, Snapshot, SubmitError, Turn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, instrument};

/// Owns the single game session and the client that asks for the
/// automated player's moves.
///
/// The session lock is released while the model is being asked, so a
/// reset can land mid-request; the late reply is then dropped by
/// generation. The request runs on its own task, so dropping the caller
/// (a disconnected HTTP client, for one) still settles the session.
#[derive(Debug, Clone)]
pub struct Arbiter {
    session: Arc<Mutex<GameSession>>,
    mover: MoverClient,
}

impl Arbiter {
    /// Creates an arbiter with a fresh session.
    #[instrument(skip(mover))]
    pub fn new(mover: MoverClient) -> Self {
        info!("Creating arbiter");
        Self {
            session: Arc::new(Mutex::new(GameSession::new())),
            mover,
        }
    }

    fn lock(&self) -> MutexGuard<'_, GameSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the current session.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    /// Plays the human's move and, if the game goes on, waits for the
    /// model's reply.
    ///
    /// # Errors
    ///
    /// Any [`SubmitError`]; a refused move never reaches the model.
    #[instrument(skip(self))]
    pub async fn play(&self, index: usize) -> Result<Snapshot, SubmitError> {
        let turn = self.lock().submit_human_move(index)?;

        if let Turn::AwaitAutomated(request) = turn {
            let generation = request.generation();
            let this = self.clone();
            let task = tokio::spawn(async move { this.answer(request).await });

            if let Err(e) = task.await {
                error!(error = %e, "Automated move task failed");
                self.settle(
                    generation,
                    Err(MoverError::Transport(format!("move request aborted: {}", e))),
                );
            }
        }

        Ok(self.snapshot())
    }

    async fn answer(&self, request: MoveRequest) {
        let reply = self.mover.request_move(&request).await;
        self.settle(request.generation(), reply);
    }

    fn settle(&self, generation: u64, reply: Result<usize, MoverError>) {
        let resolution = self.lock().resolve_automated_move(generation, reply);
        debug!(?resolution, "Automated move resolved");
        if resolution == Resolution::Stale {
            info!("Session was reset while the model was thinking");
        }
    }

    /// Starts a new game.
    #[instrument(skip(self))]
    pub fn reset(&self) -> Snapshot {
        let mut session = self.lock();
        session.reset();
        session.snapshot()
    }
}
