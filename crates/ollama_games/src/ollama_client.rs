//! Chat client for a locally hosted Ollama runtime.

use crate::config::HubConfig;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

/// One chat message in the `{role, content}` shape shared by the gateway
/// route and the Ollama API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker role (`user`, `system`, `assistant`).
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: Option<String>,
}

/// Client for `POST {ollama_url}/api/chat` with fixed generation options.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    num_predict: u32,
}

impl OllamaClient {
    /// Creates a client from hub configuration.
    #[instrument(skip(config), fields(model = %config.model(), ollama_url = %config.ollama_url()))]
    pub fn new(config: &HubConfig) -> Result<Self, GatewayError> {
        info!("Creating Ollama client");
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                GatewayError::new(GatewayErrorKind::Unreachable(format!(
                    "Failed to build HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self {
            http,
            endpoint: format!("{}/api/chat", config.ollama_url().trim_end_matches('/')),
            model: config.model().clone(),
            temperature: *config.temperature(),
            num_predict: *config.num_predict(),
        })
    }

    /// Returns the chat endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends `messages` and returns the trimmed reply text.
    #[instrument(skip(self, messages), fields(model = %self.model, message_count = messages.len()))]
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        let request_body = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.num_predict,
            },
        };

        debug!(endpoint = %self.endpoint, "Sending request to Ollama");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Ollama request failed");
                GatewayError::new(GatewayErrorKind::Unreachable(e.to_string()))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Ollama response");
            GatewayError::new(GatewayErrorKind::InvalidResponse(format!(
                "Failed to read response: {}",
                e
            )))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Ollama API error");
            return Err(GatewayError::new(GatewayErrorKind::Upstream {
                status: status.as_u16(),
                body: response_text,
            }));
        }

        let parsed: OllamaChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!(error = ?e, response = %response_text, "Failed to parse Ollama response");
            GatewayError::new(GatewayErrorKind::InvalidResponse(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        let content = parsed
            .message
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                error!("No content in Ollama response");
                GatewayError::new(GatewayErrorKind::InvalidResponse(
                    "Invalid response from Ollama".to_string(),
                ))
            })?;

        info!(content_length = content.len(), "Received completion");
        Ok(content)
    }
}

/// What went wrong talking to a chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GatewayErrorKind {
    /// The endpoint answered with a non-success status.
    #[display("Ollama API error {status}: {body}")]
    Upstream {
        /// HTTP status returned upstream.
        status: u16,
        /// Response body or error detail.
        body: String,
    },

    /// The endpoint could not be reached (connect failure, timeout).
    #[display("Ollama request failed: {_0}")]
    Unreachable(String),

    /// The endpoint answered with something other than the expected JSON.
    #[display("{_0}")]
    InvalidResponse(String),
}

/// Chat gateway error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Gateway error: {} at {}:{}", kind, file, line)]
pub struct GatewayError {
    /// Error classification and detail.
    pub kind: GatewayErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GatewayError {
    /// Creates a new gateway error with caller location tracking.
    #[track_caller]
    #[instrument(skip(kind))]
    pub fn new(kind: GatewayErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_kind = %kind, "Gateway error created");
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
