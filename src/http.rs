//! HTTP routes on the game port
//!
//! `/` upgrades WebSocket requests and otherwise serves the client bundle.
//! `/health` and `/status` report the actor's counters. Any other path is
//! looked up in the static directory.

use std::path::PathBuf;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{error, warn};

use crate::error::AppError;
use crate::handler;
use crate::server::{ServerCommand, ServerStats};

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub cmd_tx: mpsc::Sender<ServerCommand>,
    pub static_dir: PathBuf,
}

/// Build the router for the game port
pub fn routes(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/status", get(status))
        .fallback_service(static_files)
        .with_state(state)
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub players: usize,
    pub games: usize,
    pub waiting: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub active_games: usize,
    pub waiting_players: usize,
    pub total_players: usize,
}

/// WebSocket upgrade, or the bundle's index page
async fn root(
    State(state): State<AppState>,
    ws: Option<WebSocketUpgrade>,
    request: Request,
) -> Response {
    match ws {
        Some(ws) => {
            let cmd_tx = state.cmd_tx.clone();
            ws.on_upgrade(move |socket| async move {
                if let Err(e) = handler::handle_socket(socket, cmd_tx).await {
                    error!("WebSocket handler error: {}", e);
                }
            })
        }
        None => match ServeDir::new(&state.static_dir).oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        },
    }
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let stats = fetch_stats(&state.cmd_tx).await.map_err(unavailable)?;
    Ok(Json(HealthResponse {
        status: "ok",
        players: stats.players,
        games: stats.games,
        waiting: stats.waiting,
    }))
}

async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    let stats = fetch_stats(&state.cmd_tx).await.map_err(unavailable)?;
    Ok(Json(StatusResponse {
        active_games: stats.games,
        waiting_players: stats.waiting,
        total_players: stats.players,
    }))
}

/// Ask the actor for its counters
pub async fn fetch_stats(cmd_tx: &mpsc::Sender<ServerCommand>) -> Result<ServerStats, AppError> {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(ServerCommand::Stats { reply })
        .await
        .map_err(|_| AppError::ChannelSend)?;
    rx.await.map_err(|_| AppError::ChannelSend)
}

fn unavailable(err: AppError) -> StatusCode {
    warn!("Stats unavailable: {}", err);
    StatusCode::SERVICE_UNAVAILABLE
}
