//! Ship kinds and per-participant fleet inventory
//!
//! Ships carry no coordinates: occupancy lives on the `Board`, and the
//! fleet only records which kinds have been placed.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of ships in every fleet
pub const FLEET_SIZE: usize = 5;

/// Total cells occupied by a complete fleet (5 + 4 + 3 + 3 + 2)
pub const FLEET_CELLS: usize = 17;

/// The five ship kinds, each with a fixed length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipKind {
    Carrier,
    Battleship,
    Cruiser,
    Submarine,
    Destroyer,
}

impl ShipKind {
    /// All kinds in inventory order
    pub const ALL: [ShipKind; FLEET_SIZE] = [
        ShipKind::Carrier,
        ShipKind::Battleship,
        ShipKind::Cruiser,
        ShipKind::Submarine,
        ShipKind::Destroyer,
    ];

    /// Number of cells this ship occupies
    pub fn size(self) -> usize {
        match self {
            ShipKind::Carrier => 5,
            ShipKind::Battleship => 4,
            ShipKind::Cruiser => 3,
            ShipKind::Submarine => 3,
            ShipKind::Destroyer => 2,
        }
    }

    /// Wire name
    pub fn name(self) -> &'static str {
        match self {
            ShipKind::Carrier => "carrier",
            ShipKind::Battleship => "battleship",
            ShipKind::Cruiser => "cruiser",
            ShipKind::Submarine => "submarine",
            ShipKind::Destroyer => "destroyer",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for ShipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a ship name is not one of the five kinds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown ship type '{0}'")]
pub struct UnknownShipKind(pub String);

impl FromStr for ShipKind {
    type Err = UnknownShipKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShipKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownShipKind(s.to_string()))
    }
}

/// Placement flags for one participant's five ships
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fleet {
    placed: [bool; FLEET_SIZE],
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_placed(&self, kind: ShipKind) -> bool {
        self.placed[kind.index()]
    }

    pub fn mark_placed(&mut self, kind: ShipKind) {
        self.placed[kind.index()] = true;
    }

    pub fn placed_count(&self) -> usize {
        self.placed.iter().filter(|p| **p).count()
    }

    /// True once every ship kind has been placed
    pub fn is_complete(&self) -> bool {
        self.placed.iter().all(|p| *p)
    }
}
