//! Completion gateway: `POST /api/chat`.
//!
//! Accepts chat messages from the browser or the move client, forwards them
//! to Ollama with the configured model and generation options, and replies
//! with only the digits of the model's answer.

use crate::mover::digits_only;
use crate::ollama_client::{ChatMessage, GatewayErrorKind, OllamaClient};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Request body accepted by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation forwarded to the model.
    pub messages: Vec<ChatMessage>,
}

/// Response body returned by the gateway.
///
/// On success `message` holds the digit string; on failure it holds a
/// summary and `error` carries the detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Digits of the reply, or a failure summary.
    pub message: String,
    /// Failure detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatReply {
    fn failure(message: &str, error: String) -> Self {
        Self {
            message: message.to_string(),
            error: Some(error),
        }
    }
}

/// Builds the gateway router around an Ollama client.
pub fn router(client: OllamaClient) -> Router {
    info!(endpoint = %client.endpoint(), "Mounting completion gateway at /api/chat");
    Router::new()
        .route("/api/chat", post(chat).fallback(method_not_allowed))
        .with_state(Arc::new(client))
}

#[instrument(skip_all)]
async fn chat(
    State(client): State<Arc<OllamaClient>>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ChatReply>) {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected chat request body");
            return (
                rejection.status(),
                Json(ChatReply::failure(
                    "Invalid request body",
                    rejection.body_text(),
                )),
            );
        }
    };
    debug!(message_count = request.messages.len(), "Forwarding chat request");

    match client.chat(&request.messages).await {
        Ok(content) => {
            let digits = digits_only(&content);
            info!(raw = %content, digits = %digits, "Forwarding cleaned reply");
            (
                StatusCode::OK,
                Json(ChatReply {
                    message: digits,
                    error: None,
                }),
            )
        }
        Err(err) => {
            warn!(error = %err, "Chat request failed");
            match err.kind {
                GatewayErrorKind::Upstream { status, body } => (
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                    Json(ChatReply::failure("Ollama API error", body)),
                ),
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ChatReply::failure(
                        "Error communicating with Ollama",
                        other.to_string(),
                    )),
                ),
            }
        }
    }
}

async fn method_not_allowed() -> (StatusCode, Json<ChatReply>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ChatReply {
            message: "Method not allowed".to_string(),
            error: None,
        }),
    )
}
