use std::time::Duration;

use crate::ship::ShipType;

pub const BOARD_SIZE: u8 = 10;
pub const NUM_SHIPS: usize = 5;
pub const SHIPS: [ShipType; NUM_SHIPS] = [
    ShipType::new("Carrier", 5),
    ShipType::new("Battleship", 4),
    ShipType::new("Cruiser", 3),
    ShipType::new("Submarine", 3),
    ShipType::new("Destroyer", 2),
];

/// Column letters in board order; index 0 is column 1.
pub const COLUMN_LETTERS: [char; BOARD_SIZE as usize] =
    ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];

/// Alias file used when no other path is given.
pub const DEFAULT_ALIAS_FILE: &str = "alias.json";

/// Upper bound for a whole remote board request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(2);

/// Path a peer serves its board on.
pub const BOARD_PATH: &str = "/board";

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Look up the configured ship type by name.
pub fn ship_type(name: &str) -> Option<ShipType> {
    SHIPS.iter().copied().find(|def| def.name() == name)
}
