//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol. Outbound messages use Serde's
//! tagged enum with snake_case type names and camelCase fields. Inbound
//! messages are decoded field by field in `router`.

use serde::Serialize;

use crate::error::{AppError, RuleViolation};
use crate::ship::ShipKind;

/// Client → Server message, already validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Enter matchmaking
    JoinGame { name: String },
    /// Place one ship during setup
    PlaceShip {
        game_id: String,
        ship: ShipKind,
        row: usize,
        col: usize,
        horizontal: bool,
    },
    /// Fire at the opponent's board
    FireShot {
        game_id: String,
        row: usize,
        col: usize,
    },
    /// Chat with the opponent
    Chat { game_id: String, message: String },
    /// Liveness probe
    Ping,
}

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Queued, no opponent yet
    WaitingForOpponent { message: String },
    /// Paired into a new session
    #[serde(rename_all = "camelCase")]
    GameStart {
        game_id: String,
        player_number: u8,
        opponent: String,
        player_id: String,
    },
    /// A participant placed a ship (coordinates are the placer's own)
    #[serde(rename_all = "camelCase")]
    ShipPlaced {
        player_id: String,
        ship_type: ShipKind,
        row: usize,
        col: usize,
        orientation: bool,
    },
    /// Both fleets are placed
    #[serde(rename_all = "camelCase")]
    CombatStart { current_player: String },
    /// A shot was resolved and the turn passed
    #[serde(rename_all = "camelCase")]
    ShotResult {
        player_id: String,
        row: usize,
        col: usize,
        hit: bool,
        ship_sunk: bool,
        next_player: String,
        next_player_name: String,
    },
    /// The last ship went down
    #[serde(rename_all = "camelCase")]
    GameOver {
        winner: String,
        winner_name: String,
        loser_name: String,
    },
    /// The opponent's connection closed mid-game
    OpponentDisconnected { message: String },
    /// Chat relayed to both participants
    #[serde(rename = "chat_message", rename_all = "camelCase")]
    Chat {
        player_id: String,
        player_name: String,
        message: String,
    },
    /// Reply to ping
    Pong,
    /// Error occurred
    Error { code: ErrorCode, message: String },
}

/// Error codes for ServerMessage::Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Payload was not a JSON object
    InvalidFormat,
    /// Missing or mistyped field
    InvalidField,
    WrongPhase,
    NotYourTurn,
    AlreadyShot,
    AlreadyPlaced,
    IllegalPlacement,
    /// Unknown game id, or not a participant of it
    GameNotFound,
    AlreadyInGame,
    AlreadyWaiting,
    /// Session removed by the inactivity sweep
    GameExpired,
    Internal,
}

impl From<RuleViolation> for ErrorCode {
    fn from(rule: RuleViolation) -> Self {
        match rule {
            RuleViolation::WrongPhase => ErrorCode::WrongPhase,
            RuleViolation::NotYourTurn => ErrorCode::NotYourTurn,
            RuleViolation::AlreadyShot => ErrorCode::AlreadyShot,
            RuleViolation::AlreadyPlaced => ErrorCode::AlreadyPlaced,
            RuleViolation::IllegalPlacement => ErrorCode::IllegalPlacement,
        }
    }
}

/// Convert AppError to ServerMessage for client notification
impl From<AppError> for ServerMessage {
    fn from(err: AppError) -> Self {
        let code = match &err {
            AppError::Protocol | AppError::Json(_) => ErrorCode::InvalidFormat,
            AppError::Validation { .. } => ErrorCode::InvalidField,
            AppError::Rule(rule) => ErrorCode::from(*rule),
            AppError::SessionNotFound(_) => ErrorCode::GameNotFound,
            AppError::AlreadyInGame => ErrorCode::AlreadyInGame,
            AppError::AlreadyWaiting => ErrorCode::AlreadyWaiting,
            // Fatal errors are not typically converted (connection closes)
            _ => ErrorCode::Internal,
        };
        let message = match code {
            ErrorCode::Internal => "Internal error".to_string(),
            _ => err.to_string(),
        };
        ServerMessage::Error { code, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn to_value(msg: &ServerMessage) -> Value {
        serde_json::to_value(msg).unwrap()
    }

    #[test]
    fn test_game_start_serialize() {
        let msg = ServerMessage::GameStart {
            game_id: "ABC123".to_string(),
            player_number: 1,
            opponent: "Bob".to_string(),
            player_id: "p1".to_string(),
        };
        assert_eq!(
            to_value(&msg),
            json!({
                "type": "game_start",
                "gameId": "ABC123",
                "playerNumber": 1,
                "opponent": "Bob",
                "playerId": "p1"
            })
        );
    }

    #[test]
    fn test_shot_result_serialize() {
        let msg = ServerMessage::ShotResult {
            player_id: "a".to_string(),
            row: 3,
            col: 4,
            hit: true,
            ship_sunk: false,
            next_player: "b".to_string(),
            next_player_name: "Bob".to_string(),
        };
        let value = to_value(&msg);
        assert_eq!(value["type"], "shot_result");
        assert_eq!(value["shipSunk"], false);
        assert_eq!(value["nextPlayerName"], "Bob");
    }

    #[test]
    fn test_ship_placed_uses_wire_ship_name() {
        let msg = ServerMessage::ShipPlaced {
            player_id: "a".to_string(),
            ship_type: ShipKind::Destroyer,
            row: 0,
            col: 0,
            orientation: true,
        };
        let value = to_value(&msg);
        assert_eq!(value["type"], "ship_placed");
        assert_eq!(value["shipType"], "destroyer");
        assert_eq!(value["orientation"], true);
    }

    #[test]
    fn test_chat_and_pong_type_names() {
        let chat = ServerMessage::Chat {
            player_id: "a".to_string(),
            player_name: "Alice".to_string(),
            message: "hi".to_string(),
        };
        assert_eq!(to_value(&chat)["type"], "chat_message");
        assert_eq!(to_value(&chat)["playerName"], "Alice");
        assert_eq!(to_value(&ServerMessage::Pong), json!({"type": "pong"}));
    }

    #[test]
    fn test_error_from_rule_violation() {
        let msg: ServerMessage = AppError::Rule(RuleViolation::NotYourTurn).into();
        assert_eq!(
            msg,
            ServerMessage::Error {
                code: ErrorCode::NotYourTurn,
                message: "Not your turn!".to_string(),
            }
        );
        assert_eq!(to_value(&msg)["code"], "not_your_turn");
    }

    #[test]
    fn test_error_from_validation_names_field() {
        let msg: ServerMessage =
            AppError::validation("place_ship", "missing or invalid gameId").into();
        match msg {
            ServerMessage::Error { code, message } => {
                assert_eq!(code, ErrorCode::InvalidField);
                assert_eq!(message, "Invalid place_ship: missing or invalid gameId");
            }
            other => panic!("Wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_fatal_error_is_internal() {
        let msg: ServerMessage = AppError::ChannelSend.into();
        assert_eq!(
            msg,
            ServerMessage::Error {
                code: ErrorCode::Internal,
                message: "Internal error".to_string(),
            }
        );
    }
}
