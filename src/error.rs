//! Error types for the game server
//!
//! Defines application-level errors, game rule violations, and message
//! send errors. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Covers both fatal errors (connection termination) and
/// business errors (send error message to client).
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] axum::Error),

    /// HTTP connection error (fatal)
    #[error("HTTP connection error: {0}")]
    Http(#[from] hyper::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Invalid startup configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Inbound payload could not be decoded at all
    #[error("Invalid message format")]
    Protocol,

    /// A known message type is missing a field or carries a mistyped one
    #[error("Invalid {message_type}: {problem}")]
    Validation {
        message_type: &'static str,
        problem: String,
    },

    /// The request broke a game rule; no state was changed
    #[error(transparent)]
    Rule(#[from] RuleViolation),

    /// No live session with this id includes the sender
    #[error("Game {0} not found")]
    SessionNotFound(String),

    /// Join requested while in a game that is still running
    #[error("You are already in a game")]
    AlreadyInGame,

    /// Join requested while already queued
    #[error("You are already waiting for an opponent")]
    AlreadyWaiting,
}

impl AppError {
    /// Build a validation error for a message field
    pub fn validation(message_type: &'static str, problem: impl Into<String>) -> Self {
        AppError::Validation {
            message_type,
            problem: problem.into(),
        }
    }
}

/// Game rule violations raised by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("That action is not allowed in the current game phase")]
    WrongPhase,

    #[error("Not your turn!")]
    NotYourTurn,

    #[error("Already shot at this position!")]
    AlreadyShot,

    #[error("That ship has already been placed")]
    AlreadyPlaced,

    #[error("Ships must fit on the board and may not touch another ship")]
    IllegalPlacement,
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
