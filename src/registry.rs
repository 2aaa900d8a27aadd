//! Connection registry
//!
//! Maps each connected participant to its outbound channel plus the
//! inline metadata the server needs: display name and current game.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::{ClientId, GameId};

/// Longest accepted display name, in characters
pub const MAX_NAME_LEN: usize = 20;

/// Connected participant information
#[derive(Debug)]
pub struct Participant {
    /// Unique identifier for this participant
    pub id: ClientId,
    /// Display name (None before joining)
    pub name: Option<String>,
    /// Server → Client message channel
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    /// Session this participant is seated in
    pub game: Option<GameId>,
}

impl Participant {
    /// Create a new participant with the given ID and sender channel
    pub fn new(id: ClientId, sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            id,
            name: None,
            sender,
            game: None,
        }
    }

    /// Queue a message for this participant without waiting
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.send(msg).map_err(|_| SendError::ChannelClosed)
    }

    /// Whether the connection's writer is still alive
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Display name, falling back to "Player XXXXXX"
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => default_name(self.id),
        }
    }

    /// Set the display name, trimmed and truncated; blank names fall back
    /// to the default
    pub fn set_name(&mut self, raw: &str) {
        let name: String = raw.trim().chars().take(MAX_NAME_LEN).collect();
        self.name = Some(if name.is_empty() {
            default_name(self.id)
        } else {
            name
        });
    }
}

fn default_name(id: ClientId) -> String {
    format!("Player {}", id.short())
}

/// All live participants
#[derive(Debug, Default)]
pub struct Registry {
    participants: HashMap<ClientId, Participant>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ClientId, sender: mpsc::UnboundedSender<ServerMessage>) {
        self.participants.insert(id, Participant::new(id, sender));
    }

    pub fn remove(&mut self, id: ClientId) -> Option<Participant> {
        self.participants.remove(&id)
    }

    pub fn get(&self, id: ClientId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn get_mut(&mut self, id: ClientId) -> Option<&mut Participant> {
        self.participants.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn display_name(&self, id: ClientId) -> String {
        self.get(id)
            .map(Participant::display_name)
            .unwrap_or_else(|| default_name(id))
    }

    /// Point a participant at a session, or clear it
    pub fn set_game(&mut self, id: ClientId, game: Option<GameId>) {
        if let Some(participant) = self.participants.get_mut(&id) {
            participant.game = game;
        }
    }

    /// Deliver to one participant, skipping unknown or closed handles
    pub fn send_to(&self, id: ClientId, msg: ServerMessage) {
        let Some(participant) = self.participants.get(&id) else {
            debug!("Dropping message for unknown client {}", id);
            return;
        };
        if !participant.is_open() {
            debug!("Dropping message for closed client {}", id);
            return;
        }
        if participant.send(msg).is_err() {
            debug!("Client {} closed while sending", id);
        }
    }

    /// Deliver the same message to several participants
    pub fn broadcast(&self, ids: &[ClientId], msg: &ServerMessage) {
        for id in ids {
            self.send_to(*id, msg.clone());
        }
    }
}
