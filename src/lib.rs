//! Two-player Battleship Server Library
//!
//! An authoritative WebSocket game server built with axum on tokio,
//! using the Actor pattern for state management.
//!
//! # Features
//! - FIFO matchmaking lobby
//! - Server-side ship placement validation (no touching ships)
//! - Shot resolution with sunk-ship detection
//! - Strict turn order and phase enforcement
//! - In-game chat
//! - Disconnect and inactivity cleanup
//! - Health/status endpoints and static file serving on the same port
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `GameServer` is the central actor owning the registry, lobby and sessions
//! - `http` routes requests; each WebSocket gets a `handler` task
//!   communicating with the server
//! - No locks needed - every command runs to completion before the next
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use battleship_server::http::{routes, AppState};
//! use battleship_server::{serve, Config, GameServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Arc::new(Config::from_env().unwrap());
//!     let listener = TcpListener::bind(&config.bind_addr).await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(GameServer::new(cmd_rx, &config).run());
//!
//!     let app = routes(AppState { cmd_tx, static_dir: config.static_dir.clone() });
//!     serve(listener, app, config).await;
//! }
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod handler;
pub mod http;
pub mod lobby;
pub mod message;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;
pub mod ship;
pub mod types;

// Re-export main types for convenience
pub use config::Config;
pub use error::{AppError, RuleViolation, SendError};
pub use geometry::{Board, Cell, Shot, ShotGrid, BOARD_SIZE};
pub use handler::{handle_connection, handle_socket, serve};
pub use http::{routes, AppState};
pub use lobby::{JoinOutcome, Lobby};
pub use message::{ClientMessage, ErrorCode, ServerMessage};
pub use registry::{Participant, Registry};
pub use server::{GameServer, ServerCommand, ServerStats};
pub use session::{Phase, Session};
pub use ship::{Fleet, ShipKind};
pub use types::{ClientId, GameId};
