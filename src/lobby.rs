//! Matchmaking lobby
//!
//! FIFO queue of participants waiting for an opponent.

use std::collections::VecDeque;

use crate::types::ClientId;

/// Result of a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Queue was empty; the requester now waits
    Waiting,
    /// Paired with the oldest waiting participant, who takes seat 0
    Paired { opponent: ClientId },
    /// Requester was already queued; nothing changed
    AlreadyQueued,
}

#[derive(Debug, Default)]
pub struct Lobby {
    waiting: VecDeque<ClientId>,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair with the oldest waiting participant, or start waiting
    pub fn request_join(&mut self, client_id: ClientId) -> JoinOutcome {
        if self.contains(client_id) {
            return JoinOutcome::AlreadyQueued;
        }
        match self.waiting.pop_front() {
            Some(opponent) => JoinOutcome::Paired { opponent },
            None => {
                self.waiting.push_back(client_id);
                JoinOutcome::Waiting
            }
        }
    }

    /// Remove a participant from the queue; no-op if absent
    ///
    /// Returns true if the participant was queued.
    pub fn leave_queue(&mut self, client_id: ClientId) -> bool {
        match self.waiting.iter().position(|id| *id == client_id) {
            Some(index) => {
                self.waiting.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, client_id: ClientId) -> bool {
        self.waiting.contains(&client_id)
    }

    /// Number of waiting participants
    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}
