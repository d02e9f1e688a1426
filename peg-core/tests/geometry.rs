//! Board shape and move laws across a range of cross configurations.
//!
//! Checks that hold for every valid `(side, short_edge)`:
//! - Slot count equals the grid minus the four cut corners
//! - Each leg is exactly `short_edge` slots long
//! - Every catalogued move exists and stays on one row or column
//! - Playing then taking back a move restores the board exactly

use peg_core::{Axis, Board, BoardConfig, Leg, MoveCatalog};
use rand::prelude::*;

/// Valid shapes, symmetric and asymmetric cuts.
const SHAPES: [(usize, usize); 8] = [
    (3, 1),
    (5, 1),
    (5, 2),
    (5, 3),
    (7, 2),
    (7, 3),
    (9, 3),
    (11, 5),
];

fn boards() -> impl Iterator<Item = Board> {
    SHAPES
        .iter()
        .map(|&(side, short_edge)| Board::new(BoardConfig::new(side, short_edge).unwrap()).unwrap())
}

/// Render occupancy the way a fixture would spell it out.
fn picture(board: &Board) -> String {
    let side = board.side();
    let mut rows = Vec::new();
    for row in 0..side {
        let line: String = (0..side)
            .map(|col| {
                let index = row * side + col;
                match board.slot(index) {
                    None => ' ',
                    Some(slot) if slot.occupied => 'O',
                    Some(_) => '-',
                }
            })
            .collect();
        rows.push(line.trim_end().to_string());
    }
    rows.join("\n")
}

#[test]
fn test_english_picture() {
    let board = Board::new(BoardConfig::english()).unwrap();
    let expected = [
        "  OOO", //
        "  OOO",
        "OOOOOOO",
        "OOO-OOO",
        "OOOOOOO",
        "  OOO",
        "  OOO",
    ]
    .join("\n");
    assert_eq!(picture(&board), expected);
}

#[test]
fn test_asymmetric_picture() {
    // Cut of 5: two columns on the left, three on the right
    let board = Board::new(BoardConfig::new(7, 2).unwrap()).unwrap();
    let expected = [
        "  OO", //
        "  OO",
        "OOOOOOO",
        "OOO-OOO",
        "  OO",
        "  OO",
        "  OO",
    ]
    .join("\n");
    assert_eq!(picture(&board), expected);
}

#[test]
fn test_slot_count_formula() {
    for board in boards() {
        let config = board.config();
        let cut = config.side - config.short_edge;
        assert_eq!(
            board.num_slots(),
            config.side * config.side - cut * cut,
            "slot count for {:?}",
            config
        );
        assert_eq!(board.num_pins(), board.num_slots() - 1);
    }
}

#[test]
fn test_slot_count_stable_across_builds() {
    for &(side, short_edge) in &SHAPES {
        let config = BoardConfig::new(side, short_edge).unwrap();
        let first = Board::new(config).unwrap();
        let second = Board::new(config).unwrap();
        assert_eq!(first.num_slots(), second.num_slots());
        assert_eq!(first, second);
    }
}

#[test]
fn test_center_starts_empty() {
    for board in boards() {
        let center = board.config().center();
        assert!(board.slot_exists(center));
        assert!(!board.is_occupied(center));
    }
}

#[test]
fn test_legs_have_short_edge_length() {
    for board in boards() {
        let short_edge = board.config().short_edge;
        for leg in Leg::ALL {
            assert_eq!(board.leg(leg).len(), short_edge, "{:?} on {:?}", leg, board.config());
            assert!(board.leg(leg).iter().all(|&i| board.slot_exists(i)));
        }
    }
}

#[test]
fn test_catalog_moves_are_straight_lines() {
    for board in boards() {
        let side = board.side();
        let catalog = MoveCatalog::new(&board);
        assert!(catalog.len() <= 2 * board.num_slots());
        for mov in catalog.iter() {
            assert!(mov.exists());
            let [a, b, c] = mov.slots();
            assert!(board.slot_exists(a) && board.slot_exists(b) && board.slot_exists(c));
            match mov.axis() {
                Axis::Horizontal => {
                    assert_eq!(a / side, c / side);
                    assert_eq!((b, c), (a + 1, a + 2));
                }
                Axis::Vertical => {
                    assert_eq!((b, c), (a + side, a + 2 * side));
                }
            }
        }
    }
}

#[test]
fn test_catalog_is_order_stable() {
    for board in boards() {
        let first: Vec<_> = MoveCatalog::new(&board).iter().map(|m| m.slots()).collect();
        let second: Vec<_> = MoveCatalog::new(&board).iter().map(|m| m.slots()).collect();
        assert_eq!(first, second);
    }
}

#[test]
fn test_possible_and_undo_exclusive() {
    let mut rng = rand::rng();

    for board in boards() {
        let catalog = MoveCatalog::new(&board);
        let mut board = board;
        for _ in 0..50 {
            // Scramble occupancy without regard to legality
            let index = rng.random_range(0..board.num_cells());
            board.change_state(index);
            for mov in catalog.iter() {
                assert!(!(mov.is_possible(&board) && mov.is_possible_undo(&board)));
            }
        }
    }
}

#[test]
fn test_do_undo_fuzz() {
    let mut rng = rand::rng();

    for board in boards() {
        let catalog = MoveCatalog::new(&board);
        for _ in 0..20 {
            let mut board = board.clone();

            // Play random legal moves
            for _ in 0..rng.random_range(0..board.num_slots()) {
                let legal = catalog.legal_moves(&board);
                if legal.is_empty() {
                    break;
                }
                let id = legal[rng.random_range(0..legal.len())];
                assert!(catalog[id].do_move(&mut board));
            }

            // Every legal move from here must round-trip
            for id in catalog.legal_moves(&board) {
                let before = board.clone();
                let pins = board.num_pins();
                assert!(catalog[id].do_move(&mut board));
                assert_eq!(board.num_pins(), pins - 1);

                let changed: Vec<usize> = (0..board.num_cells())
                    .filter(|&i| board.is_occupied(i) != before.is_occupied(i))
                    .collect();
                let mut involved = catalog[id].slots().to_vec();
                involved.sort_unstable();
                assert_eq!(changed, involved);

                assert!(catalog[id].undo_move(&mut board));
                assert_eq!(board, before);
            }
        }
    }
}

#[test]
fn test_config_serde() {
    let config: BoardConfig = serde_json::from_str(r#"{"side": 9, "short_edge": 3}"#).unwrap();
    assert_eq!(config, BoardConfig::new(9, 3).unwrap());

    // Missing fields fall back to the English board
    let config: BoardConfig = serde_json::from_str(r#"{"side": 9}"#).unwrap();
    assert_eq!(config.short_edge, 3);
}
