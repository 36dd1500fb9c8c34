use std::sync::{Arc, Mutex};

use crate::board::{self, BoardView};
use crate::position::Position;
use crate::ship::{Fleet, Ship, Shot, ShotLog};

/// Game state shared between the board server and the operator loop.
pub type SharedGame = Arc<Mutex<GameState>>;

/// Result of firing at a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShotOutcome {
    Miss,
    Hit,
    /// The shot sank a ship, carrying its name.
    Destroyed(String),
}

/// One board: its fleet and every shot fired at it.
#[derive(Debug, Clone)]
pub struct GameState {
    fleet: Fleet,
    shots: ShotLog,
}

impl GameState {
    /// Start a game on `fleet` with no shots recorded.
    pub fn new(fleet: Fleet) -> Self {
        Self {
            fleet,
            shots: ShotLog::new(),
        }
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn shots(&self) -> &ShotLog {
        &self.shots
    }

    /// Ship occupying `position`, if any.
    pub fn ship_at(&self, position: Position) -> Option<&Ship> {
        self.fleet.ships().iter().find(|ship| ship.occupies(position))
    }

    /// Record a shot at `position` and sink the ship it completes.
    pub fn fire(&mut self, position: Position) -> ShotOutcome {
        let index = self
            .fleet
            .ships()
            .iter()
            .position(|ship| ship.occupies(position));
        self.shots.push(Shot::new(position, index.is_some()));

        let Some(index) = index else {
            return ShotOutcome::Miss;
        };
        let ship = &mut self.fleet.ships_mut()[index];
        if ship.is_destroyed() {
            return ShotOutcome::Hit;
        }
        let shots = &self.shots;
        if ship.positions().iter().all(|&p| shots.has_hit_at(p)) {
            ship.mark_destroyed();
            log::info!("{} destroyed", ship.name());
            return ShotOutcome::Destroyed(ship.name().to_string());
        }
        ShotOutcome::Hit
    }

    /// Whether every ship on the board is sunk.
    pub fn is_over(&self) -> bool {
        self.fleet.all_destroyed()
    }

    pub fn render(&self, view: BoardView) -> String {
        board::render_board(&self.fleet, &self.shots, view)
    }

    pub fn into_shared(self) -> SharedGame {
        Arc::new(Mutex::new(self))
    }
}
