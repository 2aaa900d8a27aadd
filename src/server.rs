//! GameServer Actor implementation
//!
//! The central actor that owns all state: the connection registry, the
//! matchmaking lobby and the session table. Every command is handled to
//! completion before the next one is taken, so game state is never touched
//! concurrently and needs no locks.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::lobby::{JoinOutcome, Lobby};
use crate::message::{ClientMessage, ErrorCode, ServerMessage};
use crate::registry::Registry;
use crate::session::{Phase, Session};
use crate::ship::ShipKind;
use crate::types::{ClientId, GameId};

/// Commands sent from connection handlers to the GameServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New client connected
    Connect {
        client_id: ClientId,
        sender: mpsc::UnboundedSender<ServerMessage>,
    },
    /// Client disconnected
    Disconnect { client_id: ClientId },
    /// Enter matchmaking
    JoinGame { client_id: ClientId, name: String },
    /// Place a ship
    PlaceShip {
        client_id: ClientId,
        game_id: String,
        ship: ShipKind,
        row: usize,
        col: usize,
        horizontal: bool,
    },
    /// Fire a shot
    FireShot {
        client_id: ClientId,
        game_id: String,
        row: usize,
        col: usize,
    },
    /// Send a chat message
    Chat {
        client_id: ClientId,
        game_id: String,
        message: String,
    },
    /// Liveness probe
    Ping { client_id: ClientId },
    /// Snapshot of the counters for the health endpoint
    Stats { reply: oneshot::Sender<ServerStats> },
}

impl ServerCommand {
    /// Convert a decoded ClientMessage to a ServerCommand
    pub fn from_client(client_id: ClientId, msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::JoinGame { name } => ServerCommand::JoinGame { client_id, name },
            ClientMessage::PlaceShip {
                game_id,
                ship,
                row,
                col,
                horizontal,
            } => ServerCommand::PlaceShip {
                client_id,
                game_id,
                ship,
                row,
                col,
                horizontal,
            },
            ClientMessage::FireShot { game_id, row, col } => ServerCommand::FireShot {
                client_id,
                game_id,
                row,
                col,
            },
            ClientMessage::Chat { game_id, message } => ServerCommand::Chat {
                client_id,
                game_id,
                message,
            },
            ClientMessage::Ping => ServerCommand::Ping { client_id },
        }
    }
}

/// Live counters reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerStats {
    pub players: usize,
    pub games: usize,
    pub waiting: usize,
}

/// The main GameServer actor
pub struct GameServer {
    /// All connected participants
    registry: Registry,
    /// Participants waiting for an opponent
    lobby: Lobby,
    /// All live sessions: GameId -> Session
    sessions: HashMap<GameId, Session>,
    idle_timeout: Duration,
    sweep_interval: Duration,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl GameServer {
    /// Create a new GameServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>, config: &Config) -> Self {
        Self {
            registry: Registry::new(),
            lobby: Lobby::new(),
            sessions: HashMap::new(),
            idle_timeout: config.idle_timeout,
            sweep_interval: config.sweep_interval,
            receiver,
        }
    }

    /// Run the GameServer event loop
    ///
    /// Processes commands until all senders are dropped, running the idle
    /// sweep between commands.
    pub async fn run(mut self) {
        info!("GameServer started");

        let mut sweep = tokio::time::interval(self.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        sweep.tick().await;

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = sweep.tick() => {
                    self.sweep_idle_sessions(Instant::now());
                }
            }
        }

        info!("GameServer shutting down");
    }

    /// Process a single command
    pub fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect { client_id, sender } => {
                self.handle_connect(client_id, sender);
            }
            ServerCommand::Disconnect { client_id } => {
                self.handle_disconnect(client_id);
            }
            ServerCommand::JoinGame { client_id, name } => {
                self.handle_join(client_id, name);
            }
            ServerCommand::PlaceShip {
                client_id,
                game_id,
                ship,
                row,
                col,
                horizontal,
            } => {
                self.handle_place_ship(client_id, game_id, ship, row, col, horizontal);
            }
            ServerCommand::FireShot {
                client_id,
                game_id,
                row,
                col,
            } => {
                self.handle_fire_shot(client_id, game_id, row, col);
            }
            ServerCommand::Chat {
                client_id,
                game_id,
                message,
            } => {
                self.handle_chat(client_id, game_id, message);
            }
            ServerCommand::Ping { client_id } => {
                self.registry.send_to(client_id, ServerMessage::Pong);
            }
            ServerCommand::Stats { reply } => {
                let _ = reply.send(self.stats());
            }
        }
    }

    /// Current counters
    pub fn stats(&self) -> ServerStats {
        ServerStats {
            players: self.registry.len(),
            games: self.sessions.len(),
            waiting: self.lobby.len(),
        }
    }

    /// Handle new client connection
    fn handle_connect(&mut self, client_id: ClientId, sender: mpsc::UnboundedSender<ServerMessage>) {
        info!("Client {} connected", client_id);
        self.registry.register(client_id, sender);
        debug!(
            "Total clients: {}, Total games: {}",
            self.registry.len(),
            self.sessions.len()
        );
    }

    /// Handle client disconnection
    ///
    /// Leaves the lobby, and tears down any session the client was seated
    /// in. The remaining participant is told only if the game was still on.
    fn handle_disconnect(&mut self, client_id: ClientId) {
        info!("Client {} disconnected", client_id);

        if self.lobby.leave_queue(client_id) {
            debug!("Client {} left the lobby", client_id);
        }

        let game = self.registry.remove(client_id).and_then(|p| p.game);
        if let Some(game_id) = game {
            if let Some(session) = self.sessions.remove(&game_id) {
                if let Some(remaining) = session.handle_disconnect(client_id) {
                    self.registry.send_to(
                        remaining,
                        ServerMessage::OpponentDisconnected {
                            message: "Your opponent has disconnected".to_string(),
                        },
                    );
                }
                for id in session.participants() {
                    self.registry.set_game(id, None);
                }
                info!("Game {} removed after disconnect", game_id);
            }
        }

        debug!(
            "Total clients: {}, Total games: {}",
            self.registry.len(),
            self.sessions.len()
        );
    }

    /// Handle a matchmaking request
    fn handle_join(&mut self, client_id: ClientId, name: String) {
        let Some(participant) = self.registry.get(client_id) else {
            return;
        };

        if let Some(game_id) = participant.game.clone() {
            let running = self
                .sessions
                .get(&game_id)
                .is_some_and(|s| s.phase() != Phase::Finished);
            if running {
                self.send_error(client_id, AppError::AlreadyInGame);
                return;
            }
            self.dismantle_session(&game_id);
            self.registry.set_game(client_id, None);
        }

        if self.lobby.contains(client_id) {
            self.send_error(client_id, AppError::AlreadyWaiting);
            return;
        }

        if let Some(participant) = self.registry.get_mut(client_id) {
            participant.set_name(&name);
        }

        match self.lobby.request_join(client_id) {
            JoinOutcome::Waiting => {
                info!("Client {} is waiting for an opponent", client_id);
                self.registry.send_to(
                    client_id,
                    ServerMessage::WaitingForOpponent {
                        message: "Waiting for another player to join...".to_string(),
                    },
                );
            }
            JoinOutcome::Paired { opponent } => {
                self.create_session(opponent, client_id);
            }
            JoinOutcome::AlreadyQueued => {
                self.send_error(client_id, AppError::AlreadyWaiting);
            }
        }
    }

    /// Pair two participants; `first` moves first
    fn create_session(&mut self, first: ClientId, second: ClientId) {
        // Generate unique game id
        let game_id = loop {
            let id = GameId::generate();
            if !self.sessions.contains_key(&id) {
                break id;
            }
        };

        let first_name = self.registry.display_name(first);
        let second_name = self.registry.display_name(second);
        let session = Session::new(
            game_id.clone(),
            (first, first_name.clone()),
            (second, second_name.clone()),
        );
        self.sessions.insert(game_id.clone(), session);
        self.registry.set_game(first, Some(game_id.clone()));
        self.registry.set_game(second, Some(game_id.clone()));

        info!(
            "Game {} created between {} and {}",
            game_id, first_name, second_name
        );

        self.registry.send_to(
            first,
            ServerMessage::GameStart {
                game_id: game_id.to_string(),
                player_number: 1,
                opponent: second_name,
                player_id: first.to_string(),
            },
        );
        self.registry.send_to(
            second,
            ServerMessage::GameStart {
                game_id: game_id.to_string(),
                player_number: 2,
                opponent: first_name,
                player_id: second.to_string(),
            },
        );
    }

    /// Handle ship placement
    fn handle_place_ship(
        &mut self,
        client_id: ClientId,
        game_id: String,
        ship: ShipKind,
        row: usize,
        col: usize,
        horizontal: bool,
    ) {
        let (session, seat) = match find_session(&mut self.sessions, client_id, game_id) {
            Ok(found) => found,
            Err(e) => {
                self.send_error(client_id, e);
                return;
            }
        };

        let placement = match session.place_ship(seat, ship, row, col, horizontal) {
            Ok(placement) => placement,
            Err(rule) => {
                debug!("Client {} placement rejected: {}", client_id, rule);
                self.registry.send_to(client_id, AppError::Rule(rule).into());
                return;
            }
        };
        session.touch(Instant::now());

        debug!(
            "Client {} placed {} at ({}, {}) in game {}",
            client_id, ship, row, col, session.id
        );

        let participants = session.participants();
        self.registry.broadcast(
            &participants,
            &ServerMessage::ShipPlaced {
                player_id: client_id.to_string(),
                ship_type: ship,
                row,
                col,
                orientation: horizontal,
            },
        );

        if placement.combat_started {
            info!("Game {} entering combat", session.id);
            let first = session.player(session.turn()).id;
            self.registry.broadcast(
                &participants,
                &ServerMessage::CombatStart {
                    current_player: first.to_string(),
                },
            );
        }
    }

    /// Handle a shot
    fn handle_fire_shot(&mut self, client_id: ClientId, game_id: String, row: usize, col: usize) {
        let (session, seat) = match find_session(&mut self.sessions, client_id, game_id) {
            Ok(found) => found,
            Err(e) => {
                self.send_error(client_id, e);
                return;
            }
        };

        let outcome = match session.fire_shot(seat, row, col) {
            Ok(outcome) => outcome,
            Err(rule) => {
                debug!("Client {} shot rejected: {}", client_id, rule);
                self.registry.send_to(client_id, AppError::Rule(rule).into());
                return;
            }
        };
        session.touch(Instant::now());

        let participants = session.participants();
        if let Some(winner) = outcome.winner {
            let winner = session.player(winner);
            let loser = session.player(1 - seat);
            info!(
                "Game {} won by {} after {} shots",
                session.id, winner.name, winner.shots_fired
            );
            self.registry.broadcast(
                &participants,
                &ServerMessage::GameOver {
                    winner: winner.id.to_string(),
                    winner_name: winner.name.clone(),
                    loser_name: loser.name.clone(),
                },
            );
            return;
        }

        let next = session.player(outcome.next_turn);
        self.registry.broadcast(
            &participants,
            &ServerMessage::ShotResult {
                player_id: client_id.to_string(),
                row,
                col,
                hit: outcome.hit,
                ship_sunk: outcome.sunk,
                next_player: next.id.to_string(),
                next_player_name: next.name.clone(),
            },
        );
    }

    /// Handle chat message
    fn handle_chat(&mut self, client_id: ClientId, game_id: String, message: String) {
        let (session, seat) = match find_session(&mut self.sessions, client_id, game_id) {
            Ok(found) => found,
            Err(e) => {
                self.send_error(client_id, e);
                return;
            }
        };
        session.touch(Instant::now());

        let participants = session.participants();
        let player_name = session.player(seat).name.clone();
        self.registry.broadcast(
            &participants,
            &ServerMessage::Chat {
                player_id: client_id.to_string(),
                player_name,
                message,
            },
        );
    }

    /// Remove sessions idle for longer than the timeout
    pub fn sweep_idle_sessions(&mut self, now: Instant) {
        let expired: Vec<GameId> = self
            .sessions
            .values()
            .filter(|s| s.is_idle(now, self.idle_timeout))
            .map(|s| s.id.clone())
            .collect();
        let notice = format!(
            "Game closed after {} of inactivity",
            describe_duration(self.idle_timeout)
        );

        for game_id in expired {
            let Some(session) = self.sessions.remove(&game_id) else {
                continue;
            };
            info!("Removing inactive game {}", game_id);
            for id in session.participants() {
                self.registry.set_game(id, None);
                self.registry.send_to(
                    id,
                    ServerMessage::Error {
                        code: ErrorCode::GameExpired,
                        message: notice.clone(),
                    },
                );
            }
        }
    }

    /// Drop a session and detach both participants, if it still exists
    fn dismantle_session(&mut self, game_id: &GameId) {
        if let Some(session) = self.sessions.remove(game_id) {
            for id in session.participants() {
                self.registry.set_game(id, None);
            }
            debug!("Game {} dismantled", game_id);
        }
    }

    fn send_error(&self, client_id: ClientId, err: AppError) {
        warn!("Client {}: {}", client_id, err);
        self.registry.send_to(client_id, err.into());
    }
}

/// "30 minutes", "1 minute", "45 seconds"
fn describe_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (count, unit) = if secs >= 60 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Find the session `game_id` that has `client_id` seated
fn find_session(
    sessions: &mut HashMap<GameId, Session>,
    client_id: ClientId,
    game_id: String,
) -> Result<(&mut Session, usize), AppError> {
    let game_id = GameId::from_string(game_id);
    match sessions.get_mut(&game_id) {
        Some(session) => match session.seat_of(client_id) {
            Some(seat) => Ok((session, seat)),
            None => Err(AppError::SessionNotFound(game_id.to_string())),
        },
        None => Err(AppError::SessionNotFound(game_id.to_string())),
    }
}
