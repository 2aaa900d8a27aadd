//! Basic type definitions for the game server
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: UUID-based unique participant identifier
//! - `GameId`: 6-character alphanumeric session identifier

use uuid::Uuid;

/// Length of a generated game id
pub const GAME_ID_LEN: usize = 6;

/// Unique participant identifier (newtype pattern)
///
/// Wraps a UUID v4 for type-safe identification. Stable for the lifetime
/// of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form used for default player names
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..6].to_uppercase()
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Game id (6-character uppercase alphanumeric)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameId(pub String);

impl GameId {
    /// Generate a new random game id
    pub fn generate() -> Self {
        use rand::Rng;
        let code: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(GAME_ID_LEN)
            .map(char::from)
            .collect::<String>()
            .to_uppercase();
        Self(code)
    }

    /// Create a GameId from client input (converts to uppercase)
    pub fn from_string(code: String) -> Self {
        Self(code.to_uppercase())
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
