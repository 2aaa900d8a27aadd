//! Connection handler
//!
//! Accepts TCP connections, hands each one to hyper with the axum router,
//! and drives upgraded WebSockets: message decoding and bidirectional
//! communication with the GameServer.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::router;
use crate::server::ServerCommand;
use crate::types::ClientId;

/// Accept connections until the listener fails
pub async fn serve(listener: TcpListener, app: Router, config: Arc<Config>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!("New connection from {}", addr);
                let app = app.clone();
                let config = Arc::clone(&config);

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, app, config).await {
                        debug!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Serve one TCP connection over HTTP/1.1
///
/// A peer that sends nothing within `header_timeout`, or stalls inside a
/// request head, is dropped. WebSocket upgrades outlive this call.
pub async fn handle_connection(
    stream: TcpStream,
    app: Router,
    config: Arc<Config>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    match tokio::time::timeout(config.header_timeout, stream.readable()).await {
        Ok(ready) => ready?,
        Err(_) => {
            debug!("Dropping silent connection from {}", peer_addr);
            return Ok(());
        }
    }

    hyper::server::conn::http1::Builder::new()
        .timer(TokioTimer::new())
        .header_read_timeout(config.header_timeout)
        .serve_connection(TokioIo::new(stream), TowerToHyperService::new(app))
        .with_upgrades()
        .await?;

    debug!("Connection from {} closed", peer_addr);
    Ok(())
}

/// Drive an upgraded WebSocket
///
/// Registers a new client with the GameServer and serves it until either
/// side closes.
pub async fn handle_socket(
    socket: WebSocket,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError> {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Generate client ID
    let client_id = ClientId::new();
    info!("Client {} connected", client_id);

    // Create channel for server -> client messages
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Register with GameServer
    if cmd_tx
        .send(ServerCommand::Connect {
            client_id,
            sender: msg_tx.clone(),
        })
        .await
        .is_err()
    {
        error!("Failed to register client {} - server closed", client_id);
        return Err(AppError::ChannelSend);
    }

    // Clone cmd_tx for read task
    let cmd_tx_read = cmd_tx.clone();

    // Spawn read task (WebSocket -> ServerCommand)
    let mut read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match router::decode(&text) {
                    Ok(Some(client_msg)) => {
                        let cmd = ServerCommand::from_client(client_id, client_msg);
                        if cmd_tx_read.send(cmd).await.is_err() {
                            debug!("Server closed, ending read task for {}", client_id);
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Rejected message from {}: {}", client_id, e);
                        // decode errors go straight back to the sender
                        if msg_tx.send(e.into()).is_err() {
                            break;
                        }
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!("Client {} sent close frame", client_id);
                    break;
                }
                Ok(Message::Binary(_)) => {
                    let _ = msg_tx.send(AppError::Protocol.into());
                }
                Ok(_) => {
                    // Ping/pong - answered by the socket itself
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", client_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", client_id);
    });

    // Spawn write task (ServerMessage -> WebSocket)
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json)).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                    // Continue - don't break on serialization errors
                }
            }
        }
        debug!("Write task ended for client");

        // Send close frame when done
        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete; a dead socket ends both
    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", client_id);
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", client_id);
            read_task.abort();
        }
    }

    // Send disconnect command
    let _ = cmd_tx.send(ServerCommand::Disconnect { client_id }).await;

    info!("Client {} disconnected", client_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{self, AppState};
    use crate::server::GameServer;
    use serde_json::Value;
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    const WAIT: Duration = Duration::from_secs(2);

    async fn start_server() -> SocketAddr {
        let config = Arc::new(Config {
            bind_addr: "127.0.0.1:0".to_string(),
            static_dir: PathBuf::from("static"),
            header_timeout: Duration::from_millis(200),
            ..Config::default()
        });
        let listener = TcpListener::bind(&config.bind_addr).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        tokio::spawn(GameServer::new(cmd_rx, &config).run());
        let app = http::routes(AppState {
            cmd_tx,
            static_dir: config.static_dir.clone(),
        });
        tokio::spawn(serve(listener, app, config));
        addr
    }

    /// Send raw bytes and read until the server closes
    async fn exchange(addr: SocketAddr, request: &[u8]) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request).await.unwrap();
        let mut response = Vec::new();
        tokio::time::timeout(WAIT, stream.read_to_end(&mut response))
            .await
            .expect("server kept the connection open")
            .unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    async fn next_json<S>(ws: &mut S) -> Value
    where
        S: futures_util::Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>>
            + Unpin,
    {
        loop {
            let msg = tokio::time::timeout(WAIT, ws.next())
                .await
                .expect("no message from server")
                .unwrap()
                .unwrap();
            if let WsMessage::Text(text) = msg {
                return serde_json::from_str(&text).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_health_over_tcp() {
        let addr = start_server().await;
        let response = exchange(
            addr,
            b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
        assert!(response.contains(r#""status":"ok""#), "{}", response);
    }

    #[tokio::test]
    async fn test_post_body_mentioning_upgrade_gets_http_response() {
        let addr = start_server().await;
        let body = "Connection: Upgrade\r\nUpgrade: websocket\r\n";
        let request = format!(
            "POST /health HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let response = exchange(addr, request.as_bytes()).await;
        assert!(response.starts_with("HTTP/1.1 405"), "{}", response);
    }

    #[tokio::test]
    async fn test_silent_connection_is_dropped() {
        let addr = start_server().await;
        let response = exchange(addr, b"").await;
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_stalled_request_head_is_dropped() {
        let addr = start_server().await;
        // head never terminated
        let response = exchange(addr, b"GET /health HTTP/1.1\r\nHost: localhost\r\n").await;
        assert!(!response.starts_with("HTTP/1.1 200"), "{}", response);
    }

    #[tokio::test]
    async fn test_websocket_players_are_paired() {
        let addr = start_server().await;
        let url = format!("ws://{}/", addr);

        let (mut alice, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        alice
            .send(WsMessage::Text(r#"{"type":"join_game","name":"Alice"}"#.into()))
            .await
            .unwrap();
        assert_eq!(next_json(&mut alice).await["type"], "waiting_for_opponent");

        let (mut bob, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        bob.send(WsMessage::Text(r#"{"type":"join_game","name":"Bob"}"#.into()))
            .await
            .unwrap();

        let alice_start = next_json(&mut alice).await;
        let bob_start = next_json(&mut bob).await;
        assert_eq!(alice_start["type"], "game_start");
        assert_eq!(alice_start["opponent"], "Bob");
        assert_eq!(bob_start["type"], "game_start");
        assert_eq!(bob_start["gameId"], alice_start["gameId"]);
    }

    #[tokio::test]
    async fn test_binary_frame_is_rejected() {
        let addr = start_server().await;
        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/", addr))
            .await
            .unwrap();
        ws.send(WsMessage::Binary(vec![1, 2, 3].into())).await.unwrap();

        let reply = next_json(&mut ws).await;
        assert_eq!(reply["type"], "error");
        assert_eq!(reply["code"], "invalid_format");
    }
}
