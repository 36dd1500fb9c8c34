//! Ships, shots and the fleet handed over by whoever places the ships.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::ValidationError;
use crate::config::{ship_type, NUM_SHIPS};
use crate::position::Position;

/// Type of ship: name and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipType {
    name: &'static str,
    length: usize,
}

impl ShipType {
    /// Create a new ship type.
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }

    /// Ship's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ship's length.
    pub fn length(&self) -> usize {
        self.length
    }
}

/// A ship on the board: the cells it occupies and whether it has been sunk.
///
/// Cells are expected to form one straight run; the placer guarantees that
/// and it is not checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    name: String,
    positions: Vec<Position>,
    #[serde(default)]
    destroyed: bool,
}

impl Ship {
    pub fn new(name: impl Into<String>, positions: Vec<Position>) -> Self {
        Self {
            name: name.into(),
            positions,
            destroyed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cells occupied by the ship.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn occupies(&self, position: Position) -> bool {
        self.positions.contains(&position)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Flag the ship as sunk. There is no way back.
    pub fn mark_destroyed(&mut self) {
        self.destroyed = true;
    }
}

/// A single attack against a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shot {
    pub position: Position,
    pub hit: bool,
}

impl Shot {
    pub fn new(position: Position, hit: bool) -> Self {
        Self { position, hit }
    }
}

/// Append-only history of every shot fired at a board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShotLog {
    shots: Vec<Shot>,
}

impl ShotLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a shot. Earlier shots at the same cell are kept.
    pub fn push(&mut self, shot: Shot) {
        self.shots.push(shot);
    }

    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shot> {
        self.shots.iter()
    }

    /// Most recent shot at `position`; that one decides what the cell shows.
    pub fn latest_at(&self, position: Position) -> Option<&Shot> {
        self.shots.iter().rev().find(|shot| shot.position == position)
    }

    /// Whether any hit has been recorded at `position`.
    pub fn has_hit_at(&self, position: Position) -> bool {
        self.shots
            .iter()
            .any(|shot| shot.hit && shot.position == position)
    }
}

impl FromIterator<Shot> for ShotLog {
    fn from_iter<I: IntoIterator<Item = Shot>>(iter: I) -> Self {
        Self {
            shots: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ShotLog {
    type Item = &'a Shot;
    type IntoIter = std::slice::Iter<'a, Shot>;

    fn into_iter(self) -> Self::IntoIter {
        self.shots.iter()
    }
}

/// The full roster of ships for one board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fleet {
    ships: [Ship; NUM_SHIPS],
}

impl Fleet {
    /// Accept a roster from the ship placer, checking the count and that no
    /// two ships share a cell.
    pub fn new(ships: Vec<Ship>) -> Result<Self, ValidationError> {
        let actual = ships.len();
        let ships: [Ship; NUM_SHIPS] = ships.try_into().map_err(|_| ValidationError::FleetSize {
            expected: NUM_SHIPS,
            actual,
        })?;

        let mut seen = HashSet::new();
        for ship in &ships {
            if ship.is_empty() {
                return Err(ValidationError::EmptyShip(ship.name().to_string()));
            }
            for &pos in ship.positions() {
                if !seen.insert(pos) {
                    return Err(ValidationError::Overlap(pos.to_string()));
                }
            }
        }
        Ok(Self { ships })
    }

    /// Read a fleet from a JSON file of `{"name", "positions"}` records.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read fleet file {}: {}", path.display(), e))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let ships: Vec<Ship> = serde_json::from_str(contents)
            .map_err(|e| anyhow::anyhow!("invalid fleet description: {}", e))?;
        for ship in &ships {
            if let Some(def) = ship_type(ship.name()) {
                if def.length() != ship.len() {
                    log::warn!(
                        "{} has {} cells, standard length is {}",
                        ship.name(),
                        ship.len(),
                        def.length()
                    );
                }
            }
        }
        Ok(Self::new(ships)?)
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ships_mut(&mut self) -> &mut [Ship] {
        &mut self.ships
    }

    pub fn all_destroyed(&self) -> bool {
        self.ships.iter().all(Ship::is_destroyed)
    }
}
