//! Hub HTTP server: game listing, the tic-tac-toe API and the completion
//! gateway on one router.

use crate::arbiter::Arbiter;
use crate::config::HubConfig;
use crate::gateway;
use crate::mover::{HttpGateway, MoverClient};
use crate::ollama_client::OllamaClient;
use crate::session::{Snapshot, SubmitError};
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

/// Availability of a hub game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum HubStatus {
    /// Playable.
    Available,
    /// Listed but not implemented.
    ComingSoon,
}

/// One entry on the hub's game list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubEntry {
    /// URL slug.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Whether the game can be played.
    pub status: HubStatus,
}

impl HubEntry {
    fn new(slug: &str, title: &str, status: HubStatus) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            status,
        }
    }
}

/// Games shown on the hub.
pub fn hub_entries() -> Vec<HubEntry> {
    vec![
        HubEntry::new("tictactoe", "Tic Tac Toe vs Ollama", HubStatus::Available),
        HubEntry::new("chess", "Chess vs Ollama", HubStatus::ComingSoon),
        HubEntry::new("coming-soon", "More Games", HubStatus::ComingSoon),
    ]
}

/// Body of `POST /api/tictactoe/move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveBody {
    /// Cell the human clicked (0-8).
    pub index: usize,
}

/// Body returned when a move is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Why the move was refused.
    pub message: String,
}

/// Builds the hub API router around an arbiter.
pub fn router(arbiter: Arbiter) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/games", get(list_games))
        .route("/api/tictactoe", get(get_game))
        .route("/api/tictactoe/move", post(make_move))
        .route("/api/tictactoe/reset", post(reset_game))
        .with_state(arbiter)
}

/// Builds the full application: hub API plus completion gateway.
///
/// The move client talks to `config.resolved_gateway_url()`, which is this
/// same server unless configured otherwise.
#[instrument(skip(config))]
pub fn app(config: &HubConfig) -> Result<Router> {
    let ollama = OllamaClient::new(config).context("Failed to create Ollama client")?;
    let gateway_client = HttpGateway::new(config.resolved_gateway_url(), config.request_timeout())
        .context("Failed to create gateway client")?;
    info!(gateway_url = %gateway_client.url(), "Move client configured");

    let arbiter = Arbiter::new(MoverClient::new(Arc::new(gateway_client)));
    Ok(router(arbiter).merge(gateway::router(ollama)))
}

/// Serves the hub until the process is stopped.
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
pub async fn serve(config: &HubConfig) -> Result<()> {
    let app = app(config)?;
    serve_router(config, app, "hub").await
}

/// Serves only the completion gateway.
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
pub async fn serve_gateway(config: &HubConfig) -> Result<()> {
    let ollama = OllamaClient::new(config).context("Failed to create Ollama client")?;
    serve_router(config, gateway::router(ollama), "gateway").await
}

async fn serve_router(config: &HubConfig, router: Router, label: &str) -> Result<()> {
    let app = router.layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
        debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
        req
    }));

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port()))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host(), config.port()))?;
    info!(label, "Server ready at http://{}:{}/", config.host(), config.port());

    axum::serve(listener, app).await.context("Server exited")?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn list_games() -> Json<Vec<HubEntry>> {
    Json(hub_entries())
}

async fn get_game(State(arbiter): State<Arbiter>) -> Json<Snapshot> {
    Json(arbiter.snapshot())
}

#[instrument(skip_all, fields(index = body.index))]
async fn make_move(
    State(arbiter): State<Arbiter>,
    Json(body): Json<MoveBody>,
) -> Result<Json<Snapshot>, (StatusCode, Json<ErrorBody>)> {
    arbiter.play(body.index).await.map(Json).map_err(|e: SubmitError| {
        warn!(error = %e, "Move refused");
        (
            StatusCode::CONFLICT,
            Json(ErrorBody {
                message: e.to_string(),
            }),
        )
    })
}

#[instrument(skip_all)]
async fn reset_game(State(arbiter): State<Arbiter>) -> Json<Snapshot> {
    Json(arbiter.reset())
}
