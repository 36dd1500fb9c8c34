//! Error types shared by the board, fleet and alias code.

use thiserror::Error;

/// Malformed input coming from an operator, a fleet file or an alias file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Position notation that is not a letter A-J followed by a row 1-10.
    #[error("invalid position `{0}` (expected A1..J10)")]
    Position(String),
    /// Numeric coordinates outside the board.
    #[error("coordinates ({column}, {row}) are outside the board")]
    Coordinates { column: u8, row: u8 },
    /// Address without a `host:port` shape.
    #[error("invalid address `{0}` (expected host:port)")]
    Address(String),
    /// Port that is not a decimal number in 1..=65535.
    #[error("invalid port `{0}`")]
    Port(String),
    #[error("invalid alias `{0}`")]
    Alias(String),
    /// Fleet with the wrong number of ships.
    #[error("a fleet needs exactly {expected} ships, got {actual}")]
    FleetSize { expected: usize, actual: usize },
    /// Two ships claiming the same cell.
    #[error("ships overlap at {0}")]
    Overlap(String),
    /// Ship without any cells.
    #[error("ship `{0}` has no positions")]
    EmptyShip(String),
}

/// Failure reading or writing persisted state.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode aliases: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("could not decode aliases: {0}")]
    Deserialize(#[source] serde_json::Error),
}
