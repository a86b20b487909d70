//! External mover client.
//!
//! Renders the board into a prompt, sends it through a [`CompletionGateway`]
//! and turns the model's reply into a cell index. The client only
//! classifies replies; applying the move is the arbiter's job.

use crate::gateway::{ChatReply, ChatRequest};
use crate::ollama_client::{ChatMessage, GatewayError, GatewayErrorKind, OllamaClient};
use ollama_tictactoe::{Board, Mark};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Keeps only ASCII digits from `text`.
pub fn digits_only(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Everything the model needs to pick a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRequest {
    generation: u64,
    board: Board,
    available: Vec<usize>,
    human_move: usize,
}

impl MoveRequest {
    /// Creates a request for `board` after the human played `human_move`.
    pub fn new(generation: u64, board: Board, human_move: usize) -> Self {
        Self {
            generation,
            available: board.available(),
            board,
            human_move,
        }
    }

    /// Session generation the request was issued under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Board as it stood when the request was issued.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Empty cells the model may choose from.
    pub fn available(&self) -> &[usize] {
        &self.available
    }

    /// Index the human just played.
    pub fn human_move(&self) -> usize {
        self.human_move
    }

    /// Builds the prompt text sent to the model.
    pub fn prompt(&self) -> String {
        let available = self
            .available
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "You are playing Tic Tac Toe as player {automated}. The board is:\n\n\
             {board}\n\n\
             Player {human} just took position {human_move}.\n\
             Open positions: {available}.\n\n\
             Choose your move and reply with ONLY one number from the open positions.\n\
             Positions are numbered left to right, top to bottom:\n\
             - 0-2 is the top row\n\
             - 3-5 is the middle row\n\
             - 6-8 is the bottom row\n\
             Reply with the number and nothing else.",
            automated = Mark::O,
            human = Mark::X,
            board = self.board.render(),
            human_move = self.human_move,
        )
    }
}

/// Why the model's move could not be used.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoverError {
    /// The reply contained no digits.
    #[display("reply {:?} does not contain a position", _0)]
    Unparseable(String),

    /// The reply named a number outside 0-8.
    #[display("position {} is not on the board", _0)]
    OutOfRange(String),

    /// The reply named a cell that is already taken.
    #[display("position {} is already occupied", _0)]
    CellOccupied(usize),

    /// The gateway could not be reached or answered badly.
    #[display("{}", _0)]
    Transport(String),
}

impl std::error::Error for MoverError {}

impl MoverError {
    /// True for failures to reach the model, as opposed to bad moves.
    pub fn is_transport(&self) -> bool {
        matches!(self, MoverError::Transport(_))
    }
}

impl From<GatewayError> for MoverError {
    fn from(err: GatewayError) -> Self {
        MoverError::Transport(err.kind.to_string())
    }
}

/// Reduces a raw reply to a board index.
///
/// Non-digits are dropped first, so `"7 (center-bottom)"` reads as 7.
///
/// # Errors
///
/// `Unparseable` when no digits remain, `OutOfRange` when the number is
/// past 8.
#[instrument]
pub fn parse_move(reply: &str) -> Result<usize, MoverError> {
    let digits = digits_only(reply);
    if digits.is_empty() {
        return Err(MoverError::Unparseable(reply.to_string()));
    }

    match digits.parse::<u64>() {
        Ok(value) if value <= 8 => Ok(value as usize),
        _ => Err(MoverError::OutOfRange(digits)),
    }
}

/// Sends chat messages somewhere that answers with text.
#[async_trait::async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Returns the reply text for `messages`.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, GatewayError>;
}

#[async_trait::async_trait]
impl CompletionGateway for OllamaClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, GatewayError> {
        self.chat(&messages).await
    }
}

/// Gateway reached over HTTP at a `/api/chat` route.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    url: String,
}

impl HttpGateway {
    /// Creates a gateway client posting to `url`.
    #[instrument(skip(url), fields(url = %url.as_ref()))]
    pub fn new(url: impl AsRef<str>, timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                GatewayError::new(GatewayErrorKind::Unreachable(format!(
                    "Failed to build HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self {
            http,
            url: url.as_ref().to_string(),
        })
    }

    /// Returns the URL this gateway posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl CompletionGateway for HttpGateway {
    #[instrument(skip(self, messages), fields(url = %self.url))]
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, GatewayError> {
        let response = self
            .http
            .post(&self.url)
            .json(&ChatRequest { messages })
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Gateway request failed");
                GatewayError::new(GatewayErrorKind::Unreachable(e.to_string()))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            GatewayError::new(GatewayErrorKind::InvalidResponse(format!(
                "Failed to read gateway response: {}",
                e
            )))
        })?;
        let reply = serde_json::from_str::<ChatReply>(&body);

        if !status.is_success() {
            let detail = match reply {
                Ok(ChatReply {
                    message,
                    error: Some(error),
                }) => format!("{}: {}", message, error),
                Ok(ChatReply { message, .. }) => message,
                Err(_) => body,
            };
            warn!(status = %status, detail = %detail, "Gateway returned an error");
            return Err(GatewayError::new(GatewayErrorKind::Upstream {
                status: status.as_u16(),
                body: detail,
            }));
        }

        let reply = reply.map_err(|e| {
            GatewayError::new(GatewayErrorKind::InvalidResponse(format!(
                "Malformed gateway payload: {}",
                e
            )))
        })?;
        debug!(message = %reply.message, "Gateway replied");
        Ok(reply.message)
    }
}

/// Asks the model for the automated player's move.
#[derive(Clone)]
pub struct MoverClient {
    gateway: Arc<dyn CompletionGateway>,
}

impl std::fmt::Debug for MoverClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoverClient").finish_non_exhaustive()
    }
}

impl MoverClient {
    /// Creates a client over any completion gateway.
    pub fn new(gateway: Arc<dyn CompletionGateway>) -> Self {
        Self { gateway }
    }

    /// Requests one move. Single shot: no retries.
    ///
    /// # Errors
    ///
    /// Parse and range failures from [`parse_move`], `CellOccupied` when the
    /// model picks a taken cell, `Transport` when the gateway fails.
    #[instrument(skip(self, request), fields(generation = request.generation, human_move = request.human_move))]
    pub async fn request_move(&self, request: &MoveRequest) -> Result<usize, MoverError> {
        let prompt = request.prompt();
        debug!(prompt_length = prompt.len(), available = ?request.available, "Prompting model");

        let reply = self
            .gateway
            .complete(vec![ChatMessage::user(prompt)])
            .await?;

        let index = parse_move(&reply)?;
        if !request.board.is_empty(index) {
            warn!(index, "Model picked an occupied cell");
            return Err(MoverError::CellOccupied(index));
        }

        info!(index, reply = %reply, "Model move accepted");
        Ok(index)
    }
}
