use seabattle::{
    cell_at, render_board, render_empty_board, BoardView, Cell, Fleet, Position, Ship, Shot,
    ShotLog, ValidationError,
};

fn pos(text: &str) -> Position {
    Position::parse(text).unwrap()
}

fn ship(name: &str, cells: &[&str]) -> Ship {
    Ship::new(name, cells.iter().map(|c| pos(c)).collect())
}

/// Cruiser on C4-E4, everything else kept away from row 4.
fn fleet() -> Fleet {
    Fleet::new(vec![
        ship("Carrier", &["A10", "B10", "C10", "D10", "E10"]),
        ship("Battleship", &["J1", "J2", "J3", "J4"]),
        ship("Cruiser", &["C4", "D4", "E4"]),
        ship("Submarine", &["A1", "B1", "C1"]),
        ship("Destroyer", &["G7", "H7"]),
    ])
    .unwrap()
}

fn row_line(rendered: &str, row: u8) -> &str {
    let prefix = format!("{:02} |", row);
    rendered
        .lines()
        .find(|line| line.starts_with(&prefix))
        .unwrap()
}

#[test]
fn empty_board_layout() {
    let board = render_empty_board();
    let lines: Vec<&str> = board.lines().collect();
    assert_eq!(lines.len(), 22);
    assert_eq!(lines[0], "     A   B   C   D   E   F   G   H   I   J");
    assert_eq!(lines[1], "   -----------------------------------------");
    assert_eq!(lines[2], "01 |   |   |   |   |   |   |   |   |   |   |");
    assert_eq!(lines[20], "10 |   |   |   |   |   |   |   |   |   |   |");
    assert_eq!(lines[21], lines[1]);
}

#[test]
fn own_view_shows_ship_and_hit() {
    let shots: ShotLog = [Shot::new(pos("D4"), true)].into_iter().collect();
    let fleet = fleet();

    assert_eq!(cell_at(&fleet, &shots, BoardView::Own, pos("C4")), Cell::Ship);
    assert_eq!(cell_at(&fleet, &shots, BoardView::Own, pos("D4")), Cell::Hit);
    assert_eq!(cell_at(&fleet, &shots, BoardView::Own, pos("E4")), Cell::Ship);
    assert_eq!(cell_at(&fleet, &shots, BoardView::Own, pos("F4")), Cell::Blank);

    let board = render_board(&fleet, &shots, BoardView::Own);
    assert_eq!(
        row_line(&board, 4),
        "04 |   |   | ■ | X | ■ |   |   |   |   | ■ |"
    );
    assert_eq!(
        row_line(&board, 5),
        "05 |   |   |   |   |   |   |   |   |   |   |"
    );
}

#[test]
fn enemy_view_hides_afloat_ships() {
    let fleet = fleet();
    let board = render_board(&fleet, &ShotLog::new(), BoardView::Enemy);
    assert_eq!(board, render_empty_board());

    let shots: ShotLog = [Shot::new(pos("D4"), true), Shot::new(pos("F5"), false)]
        .into_iter()
        .collect();
    let board = render_board(&fleet, &shots, BoardView::Enemy);
    assert_eq!(
        row_line(&board, 4),
        "04 |   |   |   | X |   |   |   |   |   |   |"
    );
    assert_eq!(
        row_line(&board, 5),
        "05 |   |   |   |   |   | O |   |   |   |   |"
    );
}

#[test]
fn destroyed_ship_covers_shots_in_both_views() {
    let mut fleet = fleet();
    fleet.ships_mut()[4].mark_destroyed();
    let shots: ShotLog = [Shot::new(pos("G7"), true), Shot::new(pos("H7"), true)]
        .into_iter()
        .collect();

    for view in [BoardView::Own, BoardView::Enemy] {
        assert_eq!(cell_at(&fleet, &shots, view, pos("G7")), Cell::Destroyed);
        assert_eq!(cell_at(&fleet, &shots, view, pos("H7")), Cell::Destroyed);
        let board = render_board(&fleet, &shots, view);
        assert!(row_line(&board, 7).contains(" # | # |"));
    }
}

#[test]
fn shot_on_open_water_is_shown() {
    let fleet = fleet();
    let shots: ShotLog = [Shot::new(pos("F9"), false)].into_iter().collect();
    assert_eq!(cell_at(&fleet, &shots, BoardView::Own, pos("F9")), Cell::Miss);

    // A hit flag on empty water is rendered as given.
    let shots: ShotLog = [Shot::new(pos("F9"), true)].into_iter().collect();
    assert_eq!(cell_at(&fleet, &shots, BoardView::Enemy, pos("F9")), Cell::Hit);
}

#[test]
fn latest_shot_wins() {
    let fleet = fleet();
    let shots: ShotLog = [
        Shot::new(pos("B2"), true),
        Shot::new(pos("B2"), false),
    ]
    .into_iter()
    .collect();
    assert_eq!(shots.len(), 2);
    assert_eq!(cell_at(&fleet, &shots, BoardView::Own, pos("B2")), Cell::Miss);
}

#[test]
fn fleet_must_have_five_ships() {
    let err = Fleet::new(vec![ship("Cruiser", &["C4", "D4", "E4"])]).unwrap_err();
    assert_eq!(
        err,
        ValidationError::FleetSize {
            expected: 5,
            actual: 1
        }
    );
}

#[test]
fn fleet_rejects_overlap_and_empty_ships() {
    let err = Fleet::new(vec![
        ship("Carrier", &["A10", "B10", "C10", "D10", "E10"]),
        ship("Battleship", &["J1", "J2", "J3", "J4"]),
        ship("Cruiser", &["C4", "D4", "E4"]),
        ship("Submarine", &["E2", "E3", "E4"]),
        ship("Destroyer", &["G7", "H7"]),
    ])
    .unwrap_err();
    assert_eq!(err, ValidationError::Overlap("E4".to_string()));

    let err = Fleet::new(vec![
        ship("Carrier", &["A10", "B10", "C10", "D10", "E10"]),
        ship("Battleship", &["J1", "J2", "J3", "J4"]),
        ship("Cruiser", &["C4", "D4", "E4"]),
        ship("Submarine", &[]),
        ship("Destroyer", &["G7", "H7"]),
    ])
    .unwrap_err();
    assert_eq!(err, ValidationError::EmptyShip("Submarine".to_string()));
}

#[test]
fn fleet_from_json() {
    let json = r#"[
        {"name": "Carrier", "positions": ["A10", "B10", "C10", "D10", "E10"]},
        {"name": "Battleship", "positions": ["J1", "J2", "J3", "J4"]},
        {"name": "Cruiser", "positions": ["C4", "D4", "E4"]},
        {"name": "Submarine", "positions": ["A1", "B1", "C1"]},
        {"name": "Destroyer", "positions": ["G7", "H7"], "destroyed": true}
    ]"#;
    let parsed = Fleet::from_json(json).unwrap();
    assert_eq!(parsed.ships()[2], fleet().ships()[2]);
    assert!(parsed.ships()[4].is_destroyed());

    assert!(Fleet::from_json(r#"[{"name": "Cruiser", "positions": ["K4"]}]"#).is_err());
}
