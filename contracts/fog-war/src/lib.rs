#![no_std]

//! FogWar: two-player fog-of-war skirmish on a 9x9 board.
//!
//! Each side fields three soldiers. While a soldier stands in its owner's home
//! rows its coordinates exist only as ciphertext handles held by an external
//! coprocessor contract; the first move that takes it out of home territory
//! publishes the coordinates and from then on the soldier is stored in the clear.
//!
//! ## Flow
//! 1. Admin deploys the coprocessor and this contract with (`admin`, `coprocessor`).
//! 2. A player calls `create_game`, choosing defender or attacker.
//! 3. A second player calls `join_game` (or a role-specific join). Defender moves first.
//! 4. Each player calls `initialize_soldiers` once with three coordinates.
//! 5. Players alternate `move_soldier_plaintext` / `move_my_soldier`.
//!
//! ## Trust Boundaries
//! - The contract never returns plaintext for a hidden soldier. Owners read their
//!   own hidden coordinates through the coprocessor's `user_decrypt`.
//! - Hidden soldiers are not in the occupied-cell index. A collision with a hidden
//!   unit goes unnoticed until that unit is revealed.
//! - A destination passed in the clear (placement, `move_soldier_plaintext`) is
//!   always checked against the visible index, whether the soldier ends up hidden
//!   or not. Only `move_my_soldier` can take a hidden soldier onto a visible one.

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, log, Address, Bytes,
    BytesN, Env, Vec,
};

mod board;
mod coprocessor;


#[cfg(test)]
mod board_test;

pub use coprocessor::{Coprocessor, CoprocessorClient};

use coprocessor::Confidential;

// ============================================================================
// Errors
// ============================================================================

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    GameNotFound = 1,
    GameFull = 2,
    SelfJoin = 3,
    RoleTaken = 4,
    NotAPlayer = 5,
    NotCurrentPlayer = 6,
    GameNotActive = 7,
    InvalidX = 8,
    InvalidY = 9,
    /// Also returned for dead soldiers so liveness does not leak.
    InvalidSoldierIndex = 10,
    InvalidSoldierCount = 11,
    InvalidPosition = 12,
    InvalidMove = 13,
    PositionOccupied = 14,
    AlreadyInitialized = 15,
    BackendFailure = 16,
    BackendNotSet = 17,
}

/// Coarse failure classes for clients that only care about the category.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    InvalidInput,
    IllegalState,
    BackendFailure,
}

impl Error {
    pub fn kind(self) -> ErrorKind {
        match self {
            Error::GameNotFound => ErrorKind::NotFound,
            Error::NotAPlayer | Error::NotCurrentPlayer | Error::SelfJoin => {
                ErrorKind::Unauthorized
            }
            Error::InvalidX
            | Error::InvalidY
            | Error::InvalidSoldierIndex
            | Error::InvalidSoldierCount
            | Error::InvalidPosition => ErrorKind::InvalidInput,
            Error::GameNotActive
            | Error::GameFull
            | Error::RoleTaken
            | Error::InvalidMove
            | Error::PositionOccupied
            | Error::AlreadyInitialized => ErrorKind::IllegalState,
            Error::BackendFailure | Error::BackendNotSet => ErrorKind::BackendFailure,
        }
    }
}

// ============================================================================
// Data Types
// ============================================================================

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GameState {
    WaitingForPlayers = 0,
    InProgress = 1,
    Finished = 2,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    Defender = 0,
    Attacker = 1,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PlayerType {
    None = 0,
    Defender = 1,
    Attacker = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Game {
    pub game_id: u32,
    pub defender: Option<Address>,
    pub attacker: Option<Address>,
    pub current_player: Option<Address>,
    pub state: GameState,
    pub turn: u32,
    pub winner: Option<Address>,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Coord {
    pub x: u32,
    pub y: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedCoord {
    pub x: BytesN<32>,
    pub y: BytesN<32>,
}

/// Exactly one representation is authoritative for a soldier at a time.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Position {
    Hidden(EncryptedCoord),
    Visible(Coord),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Soldier {
    pub index: u32,
    pub is_alive: bool,
    pub position: Position,
}

impl Soldier {
    pub fn is_encrypted(&self) -> bool {
        matches!(self.position, Position::Hidden(_))
    }
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SoldierStatus {
    pub is_encrypted: bool,
    pub is_alive: bool,
}

/// Occupant of a board cell.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SoldierRef {
    pub role: Role,
    pub index: u32,
}

/// Result of a homomorphic step; all three fields are handles.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedStep {
    pub x: BytesN<32>,
    pub y: BytesN<32>,
    pub valid: BytesN<32>,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Coprocessor,
    GameCounter,
    Game(u32),
    Soldier(u32, Role, u32),
    Occupied(u32, u32, u32),
}

// ============================================================================
// Events
// ============================================================================

#[contractevent]
pub struct GameCreated {
    pub game_id: u32,
    pub creator: Address,
    pub role: Role,
}

#[contractevent]
pub struct PlayerJoined {
    pub game_id: u32,
    pub player: Address,
    pub role: Role,
}

#[contractevent]
pub struct SoldiersPlaced {
    pub game_id: u32,
    pub player: Address,
    pub hidden_count: u32,
}

/// Coordinates are only present when the soldier is visible after the move.
#[contractevent]
pub struct SoldierMoved {
    pub game_id: u32,
    pub mover: Address,
    pub soldier_index: u32,
    pub new_x: Option<u32>,
    pub new_y: Option<u32>,
}

#[contractevent]
pub struct SoldierRevealed {
    pub game_id: u32,
    pub owner: Address,
    pub soldier_index: u32,
    pub x: u32,
    pub y: u32,
}

#[contractevent]
pub struct GameFinished {
    pub game_id: u32,
    pub winner: Address,
}

#[contractevent]
pub struct BackendUpdated {
    pub coprocessor: Address,
}

/// 30 days = 30 × 24 × 3600 / 5 ≈ 518 400 ledgers (5-second ledger close).
const GAME_TTL_LEDGERS: u32 = 518_400;

const MAX_PAGE: u32 = 100;

// ============================================================================
// Contract
// ============================================================================

#[contract]
pub struct FogWar;

#[contractimpl]
impl FogWar {
    pub fn __constructor(env: Env, admin: Address, coprocessor: Address) {
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&DataKey::Coprocessor, &coprocessor);
        env.storage().instance().set(&DataKey::GameCounter, &0u32);
    }

    // ========================================================================
    // Game Registry
    // ========================================================================

    /// Open a new game with `creator` in the chosen role. Returns the game id.
    pub fn create_game(env: Env, creator: Address, as_defender: bool) -> u32 {
        creator.require_auth();
        let role = if as_defender {
            Role::Defender
        } else {
            Role::Attacker
        };
        Self::open_game(&env, creator, role)
    }

    /// Same as `create_game` with the creator's role drawn from the ledger PRNG.
    pub fn create_game_random(env: Env, creator: Address) -> u32 {
        creator.require_auth();
        let role = if env.prng().gen_range::<u64>(0..=1) == 0 {
            Role::Defender
        } else {
            Role::Attacker
        };
        Self::open_game(&env, creator, role)
    }

    /// Take whichever seat is free. Returns the role assigned.
    pub fn join_game(env: Env, game_id: u32, player: Address) -> Result<Role, Error> {
        Self::seat(&env, game_id, player, None)
    }

    pub fn join_as_defender(env: Env, game_id: u32, player: Address) -> Result<(), Error> {
        Self::seat(&env, game_id, player, Some(Role::Defender)).map(|_| ())
    }

    pub fn join_as_attacker(env: Env, game_id: u32, player: Address) -> Result<(), Error> {
        Self::seat(&env, game_id, player, Some(Role::Attacker)).map(|_| ())
    }

    /// Every game id ever created, oldest first.
    ///
    /// Grows without bound; long-lived deployments should page with
    /// `list_games_page`.
    pub fn list_games(env: Env) -> Vec<u32> {
        Self::game_ids(&env, 1, Self::counter(&env))
    }

    /// Up to `limit` game ids starting at `start`, oldest first. `limit` is capped
    /// at `MAX_PAGE`.
    pub fn list_games_page(env: Env, start: u32, limit: u32) -> Vec<u32> {
        let count = Self::counter(&env);
        let first = start.max(1);
        let take = limit.min(MAX_PAGE);
        if take == 0 || first > count {
            return Vec::new(&env);
        }
        let last = first.saturating_add(take - 1).min(count);
        Self::game_ids(&env, first, last)
    }

    pub fn get_game(env: Env, game_id: u32) -> Result<Game, Error> {
        Self::load_game(&env, game_id)
    }

    pub fn game_counter(env: Env) -> u32 {
        Self::counter(&env)
    }

    /// Concede an in-progress game; the opponent is recorded as winner.
    pub fn resign(env: Env, game_id: u32, player: Address) -> Result<(), Error> {
        player.require_auth();
        let mut game = Self::load_game(&env, game_id)?;
        let role = Self::role_of(&game, &player).ok_or(Error::NotAPlayer)?;
        if game.state != GameState::InProgress {
            return Err(Error::GameNotActive);
        }
        let winner = Self::seat_holder(&game, board::opponent(role))?;

        game.state = GameState::Finished;
        game.current_player = None;
        game.winner = Some(winner.clone());
        Self::store_game(&env, &game);

        GameFinished { game_id, winner }.publish(&env);
        Ok(())
    }

    // ========================================================================
    // Access Control
    // ========================================================================

    pub fn get_player_type(env: Env, game_id: u32, player: Address) -> Result<PlayerType, Error> {
        let game = Self::load_game(&env, game_id)?;
        Ok(Self::role_of(&game, &player).map_or(PlayerType::None, PlayerType::from))
    }

    pub fn is_in_home_territory(_env: Env, player_type: PlayerType, y: u32) -> bool {
        board::is_home_for(player_type, y)
    }

    // ========================================================================
    // Soldiers
    // ========================================================================

    /// Place the caller's three soldiers. Soldiers inside the caller's home rows are
    /// encrypted through the coprocessor; the rest are stored in the clear.
    pub fn initialize_soldiers(
        env: Env,
        game_id: u32,
        player: Address,
        xs: Vec<u32>,
        ys: Vec<u32>,
    ) -> Result<(), Error> {
        player.require_auth();
        let game = Self::load_game(&env, game_id)?;
        let role = Self::role_of(&game, &player).ok_or(Error::NotAPlayer)?;
        if game.state == GameState::Finished {
            return Err(Error::GameNotActive);
        }
        if xs.len() != board::SOLDIERS_PER_PLAYER || ys.len() != board::SOLDIERS_PER_PLAYER {
            return Err(Error::InvalidSoldierCount);
        }
        if Self::load_soldier(&env, game_id, role, 0).is_some() {
            return Err(Error::AlreadyInitialized);
        }

        // Validate everything before the first write or backend call.
        let mut placed: [Option<Coord>; 3] = [None; 3];
        for i in 0..board::SOLDIERS_PER_PLAYER {
            let c = Coord {
                x: xs.get_unchecked(i),
                y: ys.get_unchecked(i),
            };
            if !board::in_range(c.x) {
                return Err(Error::InvalidX);
            }
            if !board::in_range(c.y) {
                return Err(Error::InvalidY);
            }
            if Self::occupant(&env, game_id, &c).is_some() || placed.contains(&Some(c)) {
                return Err(Error::PositionOccupied);
            }
            placed[i as usize] = Some(c);
        }

        let fhe = Confidential::connect(&env)?;
        let mut hidden_count = 0u32;
        for i in 0..board::SOLDIERS_PER_PLAYER {
            let c = Coord {
                x: xs.get_unchecked(i),
                y: ys.get_unchecked(i),
            };
            let position = if board::is_home(role, c.y) {
                hidden_count += 1;
                Position::Hidden(fhe.conceal(&player, &c)?)
            } else {
                Self::occupy(&env, game_id, &c, role, i);
                Position::Visible(c)
            };
            Self::store_soldier(
                &env,
                game_id,
                role,
                &Soldier {
                    index: i,
                    is_alive: true,
                    position,
                },
            );
        }

        SoldiersPlaced {
            game_id,
            player,
            hidden_count,
        }
        .publish(&env);
        Ok(())
    }

    /// Move to an explicit destination (one king step).
    ///
    /// For a hidden soldier the origin stays encrypted: adjacency is decided by the
    /// coprocessor and only the yes/no answer is published. The destination itself
    /// is part of the call arguments, so this variant is the one to use when the
    /// caller does not mind disclosing where the soldier is going.
    pub fn move_soldier_plaintext(
        env: Env,
        game_id: u32,
        player: Address,
        soldier_index: u32,
        new_x: u32,
        new_y: u32,
    ) -> Result<(), Error> {
        player.require_auth();
        let (mut game, role) = Self::load_turn(&env, game_id, &player)?;
        let mut soldier = Self::load_live_soldier(&env, game_id, role, soldier_index)?;

        let to = Coord { x: new_x, y: new_y };
        if !board::on_board(&to) {
            return Err(Error::InvalidPosition);
        }

        let mut revealed = false;
        soldier.position = match &soldier.position {
            Position::Visible(from) => {
                if !board::is_adjacent(from, &to) {
                    return Err(Error::InvalidMove);
                }
                Self::relocate(&env, game_id, role, soldier_index, Some(from), &to)?;
                Position::Visible(to)
            }
            Position::Hidden(from) => {
                let fhe = Confidential::connect(&env)?;
                if !fhe.decrypt_bool(&fhe.within_one(from, &to)?)? {
                    return Err(Error::InvalidMove);
                }
                if Self::occupant(&env, game_id, &to).is_some() {
                    return Err(Error::PositionOccupied);
                }
                if board::is_home(role, to.y) {
                    Position::Hidden(fhe.conceal(&player, &to)?)
                } else {
                    Self::relocate(&env, game_id, role, soldier_index, None, &to)?;
                    revealed = true;
                    Position::Visible(to)
                }
            }
        };

        Self::store_soldier(&env, game_id, role, &soldier);
        Self::end_turn(&env, &mut game, &player, role, &soldier, revealed)
    }

    /// Move one orthogonal step in an encrypted direction.
    ///
    /// The coprocessor applies `direction` to the soldier's encrypted coordinate.
    /// Only the validity of the step and whether the soldier is still at home are
    /// published; coordinates are decrypted only when the soldier leaves home or
    /// was already visible.
    pub fn move_my_soldier(
        env: Env,
        game_id: u32,
        player: Address,
        soldier_index: u32,
        direction: BytesN<32>,
        proof: Bytes,
    ) -> Result<(), Error> {
        player.require_auth();
        let (mut game, role) = Self::load_turn(&env, game_id, &player)?;
        let mut soldier = Self::load_live_soldier(&env, game_id, role, soldier_index)?;

        let fhe = Confidential::connect(&env)?;
        let origin = match &soldier.position {
            Position::Hidden(enc) => enc.clone(),
            Position::Visible(c) => fhe.encrypt_coord(c)?,
        };
        let step = fhe.step(&player, &origin, &direction, &proof)?;
        if !fhe.decrypt_bool(&step.valid)? {
            return Err(Error::InvalidPosition);
        }
        let dest = EncryptedCoord {
            x: step.x,
            y: step.y,
        };

        let mut revealed = false;
        soldier.position = match &soldier.position {
            Position::Visible(from) => {
                let to = fhe.reveal(&dest)?;
                Self::relocate(&env, game_id, role, soldier_index, Some(from), &to)?;
                Position::Visible(to)
            }
            Position::Hidden(_) => {
                if fhe.decrypt_bool(&fhe.in_home(role, &dest.y)?)? {
                    fhe.grant(&player, &dest)?;
                    Position::Hidden(dest)
                } else {
                    let to = fhe.reveal(&dest)?;
                    Self::relocate(&env, game_id, role, soldier_index, None, &to)?;
                    revealed = true;
                    Position::Visible(to)
                }
            }
        };

        Self::store_soldier(&env, game_id, role, &soldier);
        Self::end_turn(&env, &mut game, &player, role, &soldier, revealed)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// True when an alive visible soldier stands on `(x, y)`.
    pub fn is_position_occupied(env: Env, game_id: u32, x: u32, y: u32) -> bool {
        let c = Coord { x, y };
        board::on_board(&c) && Self::occupant(&env, game_id, &c).is_some()
    }

    pub fn get_defender_positions(env: Env, game_id: u32) -> Result<Vec<Soldier>, Error> {
        Self::load_game(&env, game_id)?;
        Ok(Self::army(&env, game_id, Role::Defender))
    }

    pub fn get_attacker_positions(env: Env, game_id: u32) -> Result<Vec<Soldier>, Error> {
        Self::load_game(&env, game_id)?;
        Ok(Self::army(&env, game_id, Role::Attacker))
    }

    pub fn get_soldier(
        env: Env,
        game_id: u32,
        player: Address,
        index: u32,
    ) -> Result<Soldier, Error> {
        let game = Self::load_game(&env, game_id)?;
        let role = Self::role_of(&game, &player).ok_or(Error::NotAPlayer)?;
        Self::load_soldier(&env, game_id, role, index).ok_or(Error::InvalidSoldierIndex)
    }

    pub fn get_encrypted_soldier(
        env: Env,
        game_id: u32,
        player: Address,
        index: u32,
    ) -> Result<SoldierStatus, Error> {
        let soldier = Self::get_soldier(env, game_id, player, index)?;
        Ok(SoldierStatus {
            is_encrypted: soldier.is_encrypted(),
            is_alive: soldier.is_alive,
        })
    }

    // ========================================================================
    // Admin Functions
    // ========================================================================

    pub fn get_admin(env: Env) -> Address {
        Self::admin(&env)
    }

    pub fn set_admin(env: Env, new_admin: Address) {
        Self::admin(&env).require_auth();
        env.storage().instance().set(&DataKey::Admin, &new_admin);
    }

    pub fn get_backend(env: Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Coprocessor)
            .ok_or(Error::BackendNotSet)
    }

    /// Point the contract at a different coprocessor.
    ///
    /// Handles issued by the previous coprocessor are meaningless to the new one;
    /// only switch between games.
    pub fn set_backend(env: Env, coprocessor: Address) {
        Self::admin(&env).require_auth();
        env.storage()
            .instance()
            .set(&DataKey::Coprocessor, &coprocessor);
        BackendUpdated { coprocessor }.publish(&env);
    }

    pub fn upgrade(env: Env, new_wasm_hash: BytesN<32>) {
        Self::admin(&env).require_auth();
        env.deployer().update_current_contract_wasm(new_wasm_hash);
    }

    // ========================================================================
    // Private Helpers
    // ========================================================================

    fn admin(env: &Env) -> Address {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .expect("Admin not set")
    }

    fn counter(env: &Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::GameCounter)
            .unwrap_or(0)
    }

    fn game_ids(env: &Env, first: u32, last: u32) -> Vec<u32> {
        let mut ids = Vec::new(env);
        for id in first..=last {
            ids.push_back(id);
        }
        ids
    }

    fn open_game(env: &Env, creator: Address, role: Role) -> u32 {
        let game_id = Self::counter(env) + 1;
        let (defender, attacker) = match role {
            Role::Defender => (Some(creator.clone()), None),
            Role::Attacker => (None, Some(creator.clone())),
        };
        let game = Game {
            game_id,
            defender,
            attacker,
            current_player: None,
            state: GameState::WaitingForPlayers,
            turn: 0,
            winner: None,
        };
        Self::store_game(env, &game);
        env.storage().instance().set(&DataKey::GameCounter, &game_id);
        env.storage()
            .instance()
            .extend_ttl(GAME_TTL_LEDGERS, GAME_TTL_LEDGERS);

        GameCreated {
            game_id,
            creator,
            role,
        }
        .publish(env);
        game_id
    }

    fn seat(env: &Env, game_id: u32, player: Address, wanted: Option<Role>) -> Result<Role, Error> {
        player.require_auth();
        let mut game = Self::load_game(env, game_id)?;
        if game.state != GameState::WaitingForPlayers {
            return Err(Error::GameFull);
        }

        let (vacant, holder) = match (&game.defender, &game.attacker) {
            (Some(d), None) => (Role::Attacker, d),
            (None, Some(a)) => (Role::Defender, a),
            _ => return Err(Error::GameFull),
        };
        if *holder == player {
            return Err(Error::SelfJoin);
        }
        if wanted.is_some_and(|r| r != vacant) {
            return Err(Error::RoleTaken);
        }

        match vacant {
            Role::Defender => game.defender = Some(player.clone()),
            Role::Attacker => game.attacker = Some(player.clone()),
        }
        game.state = GameState::InProgress;
        game.current_player = game.defender.clone();
        Self::store_game(env, &game);

        PlayerJoined {
            game_id,
            player,
            role: vacant,
        }
        .publish(env);
        Ok(vacant)
    }

    fn role_of(game: &Game, player: &Address) -> Option<Role> {
        if game.defender.as_ref() == Some(player) {
            Some(Role::Defender)
        } else if game.attacker.as_ref() == Some(player) {
            Some(Role::Attacker)
        } else {
            None
        }
    }

    fn seat_holder(game: &Game, role: Role) -> Result<Address, Error> {
        let seat = match role {
            Role::Defender => &game.defender,
            Role::Attacker => &game.attacker,
        };
        seat.clone().ok_or(Error::GameNotActive)
    }

    /// Game, caller role, and the turn checks shared by both move variants.
    fn load_turn(env: &Env, game_id: u32, player: &Address) -> Result<(Game, Role), Error> {
        let game = Self::load_game(env, game_id)?;
        let role = Self::role_of(&game, player).ok_or(Error::NotAPlayer)?;
        if game.state != GameState::InProgress {
            return Err(Error::GameNotActive);
        }
        if game.current_player.as_ref() != Some(player) {
            return Err(Error::NotCurrentPlayer);
        }
        Ok((game, role))
    }

    fn load_live_soldier(env: &Env, game_id: u32, role: Role, index: u32) -> Result<Soldier, Error> {
        if index >= board::SOLDIERS_PER_PLAYER {
            return Err(Error::InvalidSoldierIndex);
        }
        match Self::load_soldier(env, game_id, role, index) {
            Some(s) if s.is_alive => Ok(s),
            _ => Err(Error::InvalidSoldierIndex),
        }
    }

    fn end_turn(
        env: &Env,
        game: &mut Game,
        mover: &Address,
        role: Role,
        soldier: &Soldier,
        revealed: bool,
    ) -> Result<(), Error> {
        game.turn = game.turn.saturating_add(1);
        game.current_player = Some(Self::seat_holder(game, board::opponent(role))?);
        Self::store_game(env, game);

        let visible = match &soldier.position {
            Position::Visible(c) => Some(*c),
            Position::Hidden(_) => None,
        };
        if let (true, Some(c)) = (revealed, visible) {
            log!(env, "soldier revealed", game.game_id, soldier.index, c.x, c.y);
            SoldierRevealed {
                game_id: game.game_id,
                owner: mover.clone(),
                soldier_index: soldier.index,
                x: c.x,
                y: c.y,
            }
            .publish(env);
        }
        SoldierMoved {
            game_id: game.game_id,
            mover: mover.clone(),
            soldier_index: soldier.index,
            new_x: visible.map(|c| c.x),
            new_y: visible.map(|c| c.y),
        }
        .publish(env);
        Ok(())
    }

    /// Move a visible soldier's index entry, rejecting occupied targets.
    fn relocate(
        env: &Env,
        game_id: u32,
        role: Role,
        index: u32,
        from: Option<&Coord>,
        to: &Coord,
    ) -> Result<(), Error> {
        if Self::occupant(env, game_id, to).is_some() {
            return Err(Error::PositionOccupied);
        }
        if let Some(f) = from {
            env.storage()
                .persistent()
                .remove(&DataKey::Occupied(game_id, f.x, f.y));
        }
        Self::occupy(env, game_id, to, role, index);
        Ok(())
    }

    fn army(env: &Env, game_id: u32, role: Role) -> Vec<Soldier> {
        let mut out = Vec::new(env);
        for i in 0..board::SOLDIERS_PER_PLAYER {
            if let Some(s) = Self::load_soldier(env, game_id, role, i) {
                out.push_back(s);
            }
        }
        out
    }

    fn load_game(env: &Env, game_id: u32) -> Result<Game, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Game(game_id))
            .ok_or(Error::GameNotFound)
    }

    fn store_game(env: &Env, game: &Game) {
        let key = DataKey::Game(game.game_id);
        env.storage().persistent().set(&key, game);
        env.storage()
            .persistent()
            .extend_ttl(&key, GAME_TTL_LEDGERS, GAME_TTL_LEDGERS);
    }

    fn load_soldier(env: &Env, game_id: u32, role: Role, index: u32) -> Option<Soldier> {
        env.storage()
            .persistent()
            .get(&DataKey::Soldier(game_id, role, index))
    }

    fn store_soldier(env: &Env, game_id: u32, role: Role, soldier: &Soldier) {
        let key = DataKey::Soldier(game_id, role, soldier.index);
        env.storage().persistent().set(&key, soldier);
        env.storage()
            .persistent()
            .extend_ttl(&key, GAME_TTL_LEDGERS, GAME_TTL_LEDGERS);
    }

    fn occupant(env: &Env, game_id: u32, c: &Coord) -> Option<SoldierRef> {
        env.storage()
            .persistent()
            .get(&DataKey::Occupied(game_id, c.x, c.y))
    }

    fn occupy(env: &Env, game_id: u32, c: &Coord, role: Role, index: u32) {
        let key = DataKey::Occupied(game_id, c.x, c.y);
        env.storage().persistent().set(&key, &SoldierRef { role, index });
        env.storage()
            .persistent()
            .extend_ttl(&key, GAME_TTL_LEDGERS, GAME_TTL_LEDGERS);
    }
}
