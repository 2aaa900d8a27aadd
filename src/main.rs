//! Battleship Server - Entry Point
//!
//! Starts the TCP listener and GameServer actor, then serves the HTTP
//! router on every accepted connection.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use battleship_server::{routes, serve, AppState, Config, GameServer};

/// Channel buffer size for server commands
const CHANNEL_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=battleship_server=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("battleship_server=info")),
        )
        .init();

    // PORT/HOST/STATIC_DIR from the environment; a first argument overrides the address
    let mut config = Config::from_env()?;
    if let Some(addr) = env::args().nth(1) {
        config = config.with_bind_addr(addr);
    }
    let config = Arc::new(config);

    // Start TCP listener
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Battleship server listening on {}", config.bind_addr);
    info!("Serving static files from {}", config.static_dir.display());

    // Create GameServer actor channel and start
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let server = GameServer::new(cmd_rx, &config);
    tokio::spawn(server.run());

    info!("GameServer actor started");

    let app = routes(AppState {
        cmd_tx,
        static_dir: config.static_dir.clone(),
    });

    // Connection accept loop
    serve(listener, app, config).await;
    Ok(())
}
