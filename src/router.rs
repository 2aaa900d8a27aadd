//! Inbound message decoding
//!
//! Turns raw text frames into validated `ClientMessage`s. Undecodable
//! payloads become `AppError::Protocol`; a known message type with a
//! missing or mistyped field becomes `AppError::Validation` naming the
//! field. Unknown (or absent) types decode to `None` and are ignored.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::AppError;
use crate::geometry::BOARD_SIZE;
use crate::message::ClientMessage;
use crate::ship::{ShipKind, UnknownShipKind};

/// Longest accepted chat message, in characters
pub const MAX_CHAT_LEN: usize = 100;

/// Decode one text frame
pub fn decode(text: &str) -> Result<Option<ClientMessage>, AppError> {
    let value: Value = serde_json::from_str(text).map_err(|_| AppError::Protocol)?;
    let Value::Object(map) = value else {
        return Err(AppError::Protocol);
    };

    let Some(kind) = map.get("type").and_then(Value::as_str) else {
        debug!("Ignoring message without a type");
        return Ok(None);
    };

    let message = match kind {
        "join_game" => {
            let fields = Fields::new("join_game", &map);
            ClientMessage::JoinGame {
                name: fields.string("name")?,
            }
        }
        "place_ship" => {
            let fields = Fields::new("place_ship", &map);
            ClientMessage::PlaceShip {
                game_id: fields.string("gameId")?,
                ship: fields.ship_kind("shipType")?,
                row: fields.coordinate("row")?,
                col: fields.coordinate("col")?,
                horizontal: fields.flag("orientation")?,
            }
        }
        "fire_shot" => {
            let fields = Fields::new("fire_shot", &map);
            ClientMessage::FireShot {
                game_id: fields.string("gameId")?,
                row: fields.coordinate("row")?,
                col: fields.coordinate("col")?,
            }
        }
        "chat_message" => {
            let fields = Fields::new("chat_message", &map);
            let message = fields.string("message")?;
            if message.chars().count() > MAX_CHAT_LEN {
                return Err(fields.invalid(format!(
                    "message longer than {} characters",
                    MAX_CHAT_LEN
                )));
            }
            ClientMessage::Chat {
                game_id: fields.string("gameId")?,
                message,
            }
        }
        "ping" => ClientMessage::Ping,
        other => {
            debug!("Ignoring unknown message type '{}'", other);
            return Ok(None);
        }
    };

    Ok(Some(message))
}

/// Typed field access for one message, producing field-specific errors
struct Fields<'a> {
    message_type: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn new(message_type: &'static str, map: &'a Map<String, Value>) -> Self {
        Self { message_type, map }
    }

    fn invalid(&self, problem: impl Into<String>) -> AppError {
        AppError::validation(self.message_type, problem)
    }

    fn missing(&self, name: &str) -> AppError {
        self.invalid(format!("missing or invalid {}", name))
    }

    fn string(&self, name: &str) -> Result<String, AppError> {
        self.map
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| self.missing(name))
    }

    fn flag(&self, name: &str) -> Result<bool, AppError> {
        self.map
            .get(name)
            .and_then(Value::as_bool)
            .ok_or_else(|| self.missing(name))
    }

    fn coordinate(&self, name: &str) -> Result<usize, AppError> {
        let raw = self
            .map
            .get(name)
            .and_then(Value::as_u64)
            .ok_or_else(|| self.missing(name))?;
        match usize::try_from(raw) {
            Ok(value) if value < BOARD_SIZE => Ok(value),
            _ => Err(self.invalid(format!("{} out of range", name))),
        }
    }

    fn ship_kind(&self, name: &str) -> Result<ShipKind, AppError> {
        self.string(name)?
            .parse()
            .map_err(|e: UnknownShipKind| self.invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation_problem(text: &str) -> String {
        match decode(text) {
            Err(AppError::Validation { problem, .. }) => problem,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_join_game() {
        let msg = decode(r#"{"type": "join_game", "name": "Alice"}"#).unwrap();
        assert_eq!(
            msg,
            Some(ClientMessage::JoinGame {
                name: "Alice".to_string()
            })
        );
    }

    #[test]
    fn test_decode_place_ship() {
        let text = r#"{"type":"place_ship","gameId":"ABC123","shipType":"cruiser","row":2,"col":7,"orientation":false}"#;
        assert_eq!(
            decode(text).unwrap(),
            Some(ClientMessage::PlaceShip {
                game_id: "ABC123".to_string(),
                ship: ShipKind::Cruiser,
                row: 2,
                col: 7,
                horizontal: false,
            })
        );
    }

    #[test]
    fn test_decode_fire_shot_and_ping() {
        assert_eq!(
            decode(r#"{"type":"fire_shot","gameId":"G","row":0,"col":9}"#).unwrap(),
            Some(ClientMessage::FireShot {
                game_id: "G".to_string(),
                row: 0,
                col: 9,
            })
        );
        assert_eq!(
            decode(r#"{"type":"ping"}"#).unwrap(),
            Some(ClientMessage::Ping)
        );
    }

    #[test]
    fn test_undecodable_payload_is_protocol_error() {
        assert!(matches!(decode("not json"), Err(AppError::Protocol)));
        assert!(matches!(decode("[1, 2]"), Err(AppError::Protocol)));
        assert!(matches!(decode("42"), Err(AppError::Protocol)));
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        assert_eq!(decode(r#"{"type":"player_ready","gameId":"X"}"#).unwrap(), None);
        assert_eq!(decode(r#"{"hello":"world"}"#).unwrap(), None);
    }

    #[test]
    fn test_missing_field_is_named() {
        assert_eq!(
            validation_problem(r#"{"type":"place_ship","shipType":"carrier","row":0,"col":0,"orientation":true}"#),
            "missing or invalid gameId"
        );
        assert_eq!(
            validation_problem(r#"{"type":"fire_shot","gameId":"G","row":1}"#),
            "missing or invalid col"
        );
        assert_eq!(
            validation_problem(r#"{"type":"join_game"}"#),
            "missing or invalid name"
        );
    }

    #[test]
    fn test_mistyped_field_is_named() {
        assert_eq!(
            validation_problem(r#"{"type":"place_ship","gameId":"G","shipType":"carrier","row":"0","col":0,"orientation":true}"#),
            "missing or invalid row"
        );
        assert_eq!(
            validation_problem(r#"{"type":"place_ship","gameId":"G","shipType":"carrier","row":0,"col":0,"orientation":"h"}"#),
            "missing or invalid orientation"
        );
        assert_eq!(
            validation_problem(r#"{"type":"fire_shot","gameId":7,"row":0,"col":0}"#),
            "missing or invalid gameId"
        );
    }

    #[test]
    fn test_coordinates_must_be_on_board() {
        assert_eq!(
            validation_problem(r#"{"type":"fire_shot","gameId":"G","row":10,"col":0}"#),
            "row out of range"
        );
        assert_eq!(
            validation_problem(r#"{"type":"fire_shot","gameId":"G","row":-1,"col":0}"#),
            "missing or invalid row"
        );
    }

    #[test]
    fn test_unknown_ship_kind() {
        assert_eq!(
            validation_problem(r#"{"type":"place_ship","gameId":"G","shipType":"yacht","row":0,"col":0,"orientation":true}"#),
            "unknown ship type 'yacht'"
        );
    }

    #[test]
    fn test_chat_length_limit() {
        let long = "x".repeat(MAX_CHAT_LEN + 1);
        let text = format!(r#"{{"type":"chat_message","gameId":"G","message":"{}"}}"#, long);
        assert_eq!(
            validation_problem(&text),
            format!("message longer than {} characters", MAX_CHAT_LEN)
        );

        let ok = decode(r#"{"type":"chat_message","gameId":"G","message":"hi"}"#).unwrap();
        assert_eq!(
            ok,
            Some(ClientMessage::Chat {
                game_id: "G".to_string(),
                message: "hi".to_string(),
            })
        );
    }
}
