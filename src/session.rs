//! Session struct definition
//!
//! One match between two participants. The session owns both boards,
//! shot grids and fleets, and enforces the Setup → Combat → Finished
//! state machine. It performs no I/O: operations return outcomes that the
//! server turns into broadcasts.

use std::time::{Duration, Instant};

use crate::error::RuleViolation;
use crate::geometry::{self, Board, Shot, ShotGrid};
use crate::ship::{Fleet, ShipKind, FLEET_SIZE};
use crate::types::{ClientId, GameId};

/// Seat index within a session (0 moves first)
pub type Seat = usize;

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Combat,
    Finished,
}

/// Everything one participant owns inside a session
#[derive(Debug)]
pub struct Player {
    pub id: ClientId,
    pub name: String,
    pub board: Board,
    pub shots: ShotGrid,
    pub fleet: Fleet,
    /// Opponent ships this player has sunk
    pub ships_sunk: usize,
    pub shots_fired: usize,
}

impl Player {
    fn new(id: ClientId, name: String) -> Self {
        Self {
            id,
            name,
            board: Board::new(),
            shots: ShotGrid::new(),
            fleet: Fleet::new(),
            ships_sunk: 0,
            shots_fired: 0,
        }
    }
}

/// Result of an accepted placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// This placement completed the placer's fleet
    pub fleet_complete: bool,
    /// This placement moved the session into Combat
    pub combat_started: bool,
}

/// Result of an accepted shot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotOutcome {
    pub hit: bool,
    pub sunk: bool,
    /// Set when this shot ended the game; the turn did not advance
    pub winner: Option<Seat>,
    /// Turn owner after the shot
    pub next_turn: Seat,
}

/// A two-player match
#[derive(Debug)]
pub struct Session {
    /// Session id
    pub id: GameId,
    players: [Player; 2],
    phase: Phase,
    turn: Seat,
    created_at: Instant,
    last_activity: Instant,
}

impl Session {
    /// Create a session; `first` was waiting in the lobby and moves first
    pub fn new(id: GameId, first: (ClientId, String), second: (ClientId, String)) -> Self {
        let now = Instant::now();
        Self {
            id,
            players: [Player::new(first.0, first.1), Player::new(second.0, second.1)],
            phase: Phase::Setup,
            turn: 0,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seat currently allowed to fire
    pub fn turn(&self) -> Seat {
        self.turn
    }

    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat]
    }

    /// Both participant ids in seat order
    pub fn participants(&self) -> [ClientId; 2] {
        [self.players[0].id, self.players[1].id]
    }

    /// Seat of a participant, `None` if not in this session
    pub fn seat_of(&self, client_id: ClientId) -> Option<Seat> {
        self.players.iter().position(|p| p.id == client_id)
    }

    /// Check if a client is in this session
    pub fn contains(&self, client_id: ClientId) -> bool {
        self.seat_of(client_id).is_some()
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Refresh the inactivity clock
    pub fn touch(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// True when nothing was accepted for longer than `timeout`
    pub fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_activity) > timeout
    }

    /// Place one ship for `seat`
    ///
    /// Rejected without mutation outside Setup, for an already placed kind,
    /// or when the geometry is illegal. Completing both fleets starts Combat
    /// with seat 0 to move.
    pub fn place_ship(
        &mut self,
        seat: Seat,
        kind: ShipKind,
        row: usize,
        col: usize,
        horizontal: bool,
    ) -> Result<Placement, RuleViolation> {
        if self.phase != Phase::Setup {
            return Err(RuleViolation::WrongPhase);
        }

        let player = &mut self.players[seat];
        if player.fleet.is_placed(kind) {
            return Err(RuleViolation::AlreadyPlaced);
        }
        if !geometry::can_place(&player.board, row, col, kind.size(), horizontal) {
            return Err(RuleViolation::IllegalPlacement);
        }

        geometry::place(&mut player.board, row, col, kind.size(), horizontal);
        player.fleet.mark_placed(kind);
        let fleet_complete = player.fleet.is_complete();

        let combat_started = fleet_complete && self.players.iter().all(|p| p.fleet.is_complete());
        if combat_started {
            self.phase = Phase::Combat;
            self.turn = 0;
        }

        Ok(Placement {
            fleet_complete,
            combat_started,
        })
    }

    /// Fire at (row, col) of the opponent's board
    pub fn fire_shot(&mut self, seat: Seat, row: usize, col: usize) -> Result<ShotOutcome, RuleViolation> {
        if self.phase != Phase::Combat {
            return Err(RuleViolation::WrongPhase);
        }
        if seat != self.turn {
            return Err(RuleViolation::NotYourTurn);
        }
        if self.players[seat].shots.get(row, col) != Some(Shot::Untried) {
            return Err(RuleViolation::AlreadyShot);
        }

        let [first, second] = &mut self.players;
        let (shooter, target) = if seat == 0 {
            (first, &*second)
        } else {
            (second, &*first)
        };

        let hit = target.board.is_occupied(row, col);
        shooter
            .shots
            .set(row, col, if hit { Shot::Hit } else { Shot::Miss });
        shooter.shots_fired += 1;

        let mut sunk = false;
        if hit && geometry::sunk(&target.board, &shooter.shots, row, col) {
            geometry::mark_sunk(&target.board, &mut shooter.shots, row, col);
            shooter.ships_sunk += 1;
            sunk = true;
        }

        if shooter.ships_sunk >= FLEET_SIZE {
            self.phase = Phase::Finished;
            return Ok(ShotOutcome {
                hit,
                sunk,
                winner: Some(seat),
                next_turn: self.turn,
            });
        }

        self.turn = 1 - seat;
        Ok(ShotOutcome {
            hit,
            sunk,
            winner: None,
            next_turn: self.turn,
        })
    }

    /// The participant to notify when `client_id` drops out
    ///
    /// `None` if the game already finished or the client is not seated here.
    /// The caller removes the session either way.
    pub fn handle_disconnect(&self, client_id: ClientId) -> Option<ClientId> {
        if self.phase == Phase::Finished {
            return None;
        }
        let seat = self.seat_of(client_id)?;
        Some(self.players[1 - seat].id)
    }
}
