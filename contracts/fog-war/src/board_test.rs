#![cfg(test)]

//! Board geometry tests
//!
//! Pure checks of the grid rules; no contract is registered.

use crate::board::{
    home_rows, in_range, is_adjacent, is_home, is_home_for, on_board, opponent, BOARD_MAX,
    BOARD_MIN,
};
use crate::{Coord, Error, ErrorKind, PlayerType, Role};

fn at(x: u32, y: u32) -> Coord {
    Coord { x, y }
}

#[test]
fn home_rows_split_the_board() {
    assert_eq!(home_rows(Role::Defender), (1, 3));
    assert_eq!(home_rows(Role::Attacker), (7, 9));

    for y in BOARD_MIN..=BOARD_MAX {
        let both = is_home(Role::Defender, y) && is_home(Role::Attacker, y);
        assert!(!both, "row {} belongs to both sides", y);
    }
    // Middle rows are no man's land.
    for y in 4..=6 {
        assert!(!is_home(Role::Defender, y));
        assert!(!is_home(Role::Attacker, y));
    }
}

#[test]
fn player_type_home_lookup() {
    assert!(is_home_for(PlayerType::Defender, 3));
    assert!(!is_home_for(PlayerType::Defender, 4));
    assert!(is_home_for(PlayerType::Attacker, 7));
    assert!(!is_home_for(PlayerType::Attacker, 6));
    for y in 0..=10 {
        assert!(!is_home_for(PlayerType::None, y));
    }
}

#[test]
fn bounds_are_one_based() {
    assert!(!in_range(0));
    assert!(in_range(1));
    assert!(in_range(9));
    assert!(!in_range(10));
    assert!(!in_range(u32::MAX));

    assert!(on_board(&at(1, 9)));
    assert!(!on_board(&at(0, 5)));
    assert!(!on_board(&at(5, 10)));
}

#[test]
fn adjacency_is_a_king_step() {
    let center = at(5, 5);
    let mut neighbours = 0;
    for x in 3..=7 {
        for y in 3..=7 {
            if is_adjacent(&center, &at(x, y)) {
                neighbours += 1;
                assert!(x.abs_diff(5) <= 1 && y.abs_diff(5) <= 1);
            }
        }
    }
    assert_eq!(neighbours, 8);

    assert!(!is_adjacent(&center, &center));
    assert!(!is_adjacent(&at(2, 4), &at(4, 4)));
    // Symmetric, and no underflow at the edge.
    assert!(is_adjacent(&at(1, 1), &at(2, 2)));
    assert!(is_adjacent(&at(2, 2), &at(1, 1)));
}

#[test]
fn opponents_swap() {
    assert_eq!(opponent(Role::Defender), Role::Attacker);
    assert_eq!(opponent(Role::Attacker), Role::Defender);
    assert_eq!(PlayerType::from(Role::Defender), PlayerType::Defender);
    assert_eq!(PlayerType::from(Role::Attacker), PlayerType::Attacker);
}

#[test]
fn error_codes_are_stable() {
    assert_eq!(Error::GameNotFound as u32, 1);
    assert_eq!(Error::InvalidX as u32, 8);
    assert_eq!(Error::InvalidSoldierIndex as u32, 10);
    assert_eq!(Error::PositionOccupied as u32, 14);
    assert_eq!(Error::BackendNotSet as u32, 17);
}

#[test]
fn error_kinds() {
    let cases = [
        (Error::GameNotFound, ErrorKind::NotFound),
        (Error::NotAPlayer, ErrorKind::Unauthorized),
        (Error::NotCurrentPlayer, ErrorKind::Unauthorized),
        (Error::SelfJoin, ErrorKind::Unauthorized),
        (Error::InvalidX, ErrorKind::InvalidInput),
        (Error::InvalidSoldierCount, ErrorKind::InvalidInput),
        (Error::InvalidPosition, ErrorKind::InvalidInput),
        (Error::GameNotActive, ErrorKind::IllegalState),
        (Error::RoleTaken, ErrorKind::IllegalState),
        (Error::AlreadyInitialized, ErrorKind::IllegalState),
        (Error::BackendNotSet, ErrorKind::BackendFailure),
    ];
    for (err, kind) in cases {
        assert_eq!(err.kind(), kind, "{:?}", err);
    }
}
