//! Ollama Games: a small game hub where a person plays tic-tac-toe against a
//! locally hosted language model.
//!
//! The hub serves a JSON API for the game, a completion gateway that relays
//! chat requests to Ollama, and a terminal front-end. Every move, human or
//! automated, goes through one [`Arbiter`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod arbiter;
pub mod config;
pub mod gateway;
pub mod mover;
pub mod ollama_client;
pub mod server;
pub mod session;
pub mod tui;

pub use arbiter::Arbiter;
pub use config::{ConfigError, HubConfig};
pub use gateway::{ChatReply, ChatRequest};
pub use mover::{
    CompletionGateway, HttpGateway, MoveRequest, MoverClient, MoverError, digits_only, parse_move,
};
pub use ollama_client::{ChatMessage, GatewayError, GatewayErrorKind, OllamaClient};
pub use server::{ErrorBody, HubEntry, HubStatus, MoveBody, hub_entries};
pub use session::{
    AUTOMATED_MARK, GameSession, HUMAN_MARK, LogEntry, Origin, Phase, Resolution, Snapshot,
    SubmitError, Turn,
};
