//! Text rendering of a board from its fleet and shot history.
//!
//! Each cell is decided by stacking layers, later layers winning:
//!
//! 1. open water;
//! 2. an afloat ship, only when the board is viewed by its owner;
//! 3. the latest shot at the cell, hit or miss;
//! 4. a destroyed ship, which is final and covers any shot.
//!
//! ```text
//!      A   B   C   D   E   F   G   H   I   J
//!    -----------------------------------------
//! 01 |   |   |   |   |   |   |   |   |   |   |
//!    -----------------------------------------
//! ```

use core::fmt;
use std::fmt::Write as _;

use crate::config::{BOARD_SIZE, COLUMN_LETTERS};
use crate::position::Position;
use crate::ship::{Fleet, ShotLog};

const SEPARATOR: &str = "   -----------------------------------------";

/// Who is looking at the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardView {
    /// The owner sees their afloat ships.
    Own,
    /// An opponent only sees what shots and sinkings have exposed.
    Enemy,
}

/// What a single cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Blank,
    Ship,
    Miss,
    Hit,
    Destroyed,
}

impl Cell {
    pub fn symbol(self) -> char {
        match self {
            Cell::Blank => ' ',
            Cell::Ship => '■',
            Cell::Miss => 'O',
            Cell::Hit => 'X',
            Cell::Destroyed => '#',
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Decide what `position` shows for the given fleet, shots and viewer.
pub fn cell_at(fleet: &Fleet, shots: &ShotLog, view: BoardView, position: Position) -> Cell {
    let ship = fleet.ships().iter().find(|ship| ship.occupies(position));

    if ship.is_some_and(|s| s.is_destroyed()) {
        return Cell::Destroyed;
    }
    if let Some(shot) = shots.latest_at(position) {
        return if shot.hit { Cell::Hit } else { Cell::Miss };
    }
    match (ship, view) {
        (Some(_), BoardView::Own) => Cell::Ship,
        _ => Cell::Blank,
    }
}

/// Render the full grid. Only reads `fleet` and `shots`.
pub fn render_board(fleet: &Fleet, shots: &ShotLog, view: BoardView) -> String {
    render_with(|pos| cell_at(fleet, shots, view, pos))
}

/// Render a grid with nothing on it, as shown in the rules.
pub fn render_empty_board() -> String {
    render_with(|_| Cell::Blank)
}

/// Print the rendered board to stdout.
pub fn print_board(fleet: &Fleet, shots: &ShotLog, view: BoardView) {
    println!("\n{}", render_board(fleet, shots, view));
}

fn render_with(mut cell: impl FnMut(Position) -> Cell) -> String {
    let mut out = String::new();
    out.push_str("    ");
    for letter in COLUMN_LETTERS {
        let _ = write!(out, " {}  ", letter);
    }
    out.truncate(out.trim_end().len());
    out.push('\n');

    for pos in Position::all() {
        if pos.column() == 1 {
            out.push_str(SEPARATOR);
            out.push('\n');
            let _ = write!(out, "{:02} |", pos.row());
        }
        let _ = write!(out, " {} |", cell(pos));
        if pos.column() == BOARD_SIZE {
            out.push('\n');
        }
    }
    out.push_str(SEPARATOR);
    out.push('\n');
    out
}
