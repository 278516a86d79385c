//! Board geometry: a 9x9 grid with 1-based coordinates.
//!
//! Defender home is rows 1..=3, attacker home is rows 7..=9. Everything here is
//! pure and does not touch storage.

use crate::{Coord, PlayerType, Role};

pub const BOARD_MIN: u32 = 1;
pub const BOARD_MAX: u32 = 9;
pub const SOLDIERS_PER_PLAYER: u32 = 3;

const DEFENDER_HOME: (u32, u32) = (1, 3);
const ATTACKER_HOME: (u32, u32) = (7, 9);

pub fn in_range(v: u32) -> bool {
    (BOARD_MIN..=BOARD_MAX).contains(&v)
}

pub fn on_board(c: &Coord) -> bool {
    in_range(c.x) && in_range(c.y)
}

/// Inclusive row band `(lo, hi)` of a role's home territory.
pub fn home_rows(role: Role) -> (u32, u32) {
    match role {
        Role::Defender => DEFENDER_HOME,
        Role::Attacker => ATTACKER_HOME,
    }
}

pub fn is_home(role: Role, y: u32) -> bool {
    let (lo, hi) = home_rows(role);
    (lo..=hi).contains(&y)
}

pub fn is_home_for(player_type: PlayerType, y: u32) -> bool {
    match player_type {
        PlayerType::Defender => is_home(Role::Defender, y),
        PlayerType::Attacker => is_home(Role::Attacker, y),
        PlayerType::None => false,
    }
}

/// King-move adjacency. Standing still is not a move.
pub fn is_adjacent(from: &Coord, to: &Coord) -> bool {
    let dx = from.x.abs_diff(to.x);
    let dy = from.y.abs_diff(to.y);
    dx <= 1 && dy <= 1 && (dx + dy) > 0
}

pub fn opponent(role: Role) -> Role {
    match role {
        Role::Defender => Role::Attacker,
        Role::Attacker => Role::Defender,
    }
}

impl From<Role> for PlayerType {
    fn from(role: Role) -> Self {
        match role {
            Role::Defender => PlayerType::Defender,
            Role::Attacker => PlayerType::Attacker,
        }
    }
}
