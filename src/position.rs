//! Grid coordinates and the `A1`..`J10` notation used by operators.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::ValidationError;
use crate::config::{BOARD_SIZE, COLUMN_LETTERS};

/// A cell on the board. Both components are 1-based and lie in `1..=BOARD_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Position {
    column: u8,
    row: u8,
}

impl Position {
    /// Build a position from a column (1 = `A`) and a row.
    pub fn new(column: u8, row: u8) -> Result<Self, ValidationError> {
        if !(1..=BOARD_SIZE).contains(&column) || !(1..=BOARD_SIZE).contains(&row) {
            return Err(ValidationError::Coordinates { column, row });
        }
        Ok(Self { column, row })
    }

    /// Parse human notation such as `"J6"` or `"A10"`.
    ///
    /// The column letter is case-sensitive. Everything after the letter is the
    /// row, so two-digit rows are read in full.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let token = text.trim();
        let invalid = || ValidationError::Position(token.to_string());

        let mut chars = token.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        let column = column_index(letter).ok_or_else(invalid)?;

        let row_text = chars.as_str();
        if row_text.is_empty() || !row_text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let row: u8 = row_text.parse().map_err(|_| invalid())?;

        Self::new(column, row).map_err(|_| invalid())
    }

    /// Column number, 1 for `A` through 10 for `J`.
    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    /// Letter naming this position's column.
    pub fn column_letter(&self) -> char {
        COLUMN_LETTERS[(self.column - 1) as usize]
    }

    /// Every position on the board, row by row.
    pub fn all() -> impl Iterator<Item = Position> {
        (1..=BOARD_SIZE).flat_map(|row| (1..=BOARD_SIZE).map(move |column| Position { column, row }))
    }
}

fn column_index(letter: char) -> Option<u8> {
    COLUMN_LETTERS
        .iter()
        .position(|&c| c == letter)
        .map(|i| i as u8 + 1)
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letter(), self.row)
    }
}

impl FromStr for Position {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Position {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Position> for String {
    fn from(pos: Position) -> Self {
        pos.to_string()
    }
}
