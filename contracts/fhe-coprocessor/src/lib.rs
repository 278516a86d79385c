#![no_std]

//! Plaintext-backed coprocessor for local networks and tests.
//!
//! Implements the handle interface FogWar expects from a confidential-compute
//! backend, but keeps every value in the clear in its own storage. Handles are
//! opaque 32-byte digests; each one carries an access list and a public flag.
//! Nothing here is confidential. Deploy it only where that is acceptable.
//!
//! ## Access rules
//!
//! - Every call made on behalf of `owner` requires `owner`'s authorization. For a
//!   contract owner that means the contract itself must be the direct caller.
//! - The account that asks for a value to be encrypted (`owner`) can read it.
//! - A reader can extend the access list with `allow` or open the handle to
//!   everyone with `allow_public`.
//! - `decrypt_public` only answers for public handles.
//! - `user_decrypt` only answers for handles the requester can read.
//!
//! ## Storage
//!
//! Coordinates live in persistent storage. Single-use results (`step` validity,
//! `within_one`, `in_rows`) live in temporary storage and expire on their own.

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, Address, Bytes, BytesN, Env, Vec,
};


// ============================================================================
// Errors
// ============================================================================

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum CoprocessorError {
    UnknownHandle = 1,
    AccessDenied = 2,
    NotPublic = 3,
    InvalidProof = 4,
}

// ============================================================================
// Data Types
// ============================================================================

#[contracttype]
#[derive(Clone, Debug)]
pub struct Ciphertext {
    pub value: u32,
    pub readers: Vec<Address>,
    pub public: bool,
}

/// Output of `step`; every field is a handle.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedStep {
    pub x: BytesN<32>,
    pub y: BytesN<32>,
    /// 1 when the direction is known and the target is on the board.
    pub valid: BytesN<32>,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Nonce,
    Handle(BytesN<32>),
}

const HANDLE_TTL_LEDGERS: u32 = 518_400; // ~30 days
const SCRATCH_TTL_LEDGERS: u32 = 17_280; // ~1 day

const GRID_MIN: i64 = 1;
const GRID_MAX: i64 = 9;

// ============================================================================
// Contract
// ============================================================================

/// Storage class a handle lives in.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Lifetime {
    Durable,
    Scratch,
}

#[contract]
pub struct MockCoprocessor;

#[contractimpl]
impl MockCoprocessor {
    // ----- Encryption -------------------------------------------------------

    /// Encrypt a value on behalf of `owner` (usually the calling contract).
    pub fn encrypt(env: Env, owner: Address, value: u32) -> BytesN<32> {
        owner.require_auth();
        Self::mint(&env, value, &owner, Lifetime::Durable)
    }

    /// Register a client-side input. A real deployment receives ciphertext and a
    /// proof of knowledge here; this one takes the plaintext directly.
    pub fn encrypt_input(env: Env, player: Address, value: u32) -> BytesN<32> {
        player.require_auth();
        Self::mint(&env, value, &player, Lifetime::Durable)
    }

    // ----- Access control ---------------------------------------------------

    pub fn allow(
        env: Env,
        owner: Address,
        handle: BytesN<32>,
        account: Address,
    ) -> Result<(), CoprocessorError> {
        owner.require_auth();
        let (mut ct, lifetime) = Self::readable(&env, &handle, &owner)?;
        if !ct.readers.contains(&account) {
            ct.readers.push_back(account);
        }
        Self::save(&env, &handle, &ct, lifetime);
        Ok(())
    }

    pub fn allow_public(
        env: Env,
        owner: Address,
        handle: BytesN<32>,
    ) -> Result<(), CoprocessorError> {
        owner.require_auth();
        let (mut ct, lifetime) = Self::readable(&env, &handle, &owner)?;
        ct.public = true;
        Self::save(&env, &handle, &ct, lifetime);
        Ok(())
    }

    // ----- Decryption -------------------------------------------------------

    pub fn decrypt_public(
        env: Env,
        handles: Vec<BytesN<32>>,
    ) -> Result<Vec<u32>, CoprocessorError> {
        let mut out = Vec::new(&env);
        for h in handles.iter() {
            let (ct, _) = Self::load(&env, &h)?;
            if !ct.public {
                return Err(CoprocessorError::NotPublic);
            }
            out.push_back(ct.value);
        }
        Ok(out)
    }

    /// Values are returned in the clear; `public_key` would be the re-encryption
    /// target on a real backend.
    pub fn user_decrypt(
        env: Env,
        requester: Address,
        _public_key: BytesN<32>,
        handles: Vec<BytesN<32>>,
    ) -> Result<Vec<u32>, CoprocessorError> {
        requester.require_auth();
        let mut out = Vec::new(&env);
        for h in handles.iter() {
            out.push_back(Self::readable(&env, &h, &requester)?.0.value);
        }
        Ok(out)
    }

    // ----- Homomorphic operations -------------------------------------------

    /// Apply an encrypted direction (0=N, 1=E, 2=S, 3=W) to `(x, y)`.
    ///
    /// The direction handle must be readable by `player`. An unknown direction or
    /// a step off the grid yields `valid = 0` and the unchanged coordinates.
    pub fn step(
        env: Env,
        owner: Address,
        player: Address,
        x: BytesN<32>,
        y: BytesN<32>,
        direction: BytesN<32>,
        proof: Bytes,
    ) -> Result<EncryptedStep, CoprocessorError> {
        owner.require_auth();
        if proof.is_empty() {
            return Err(CoprocessorError::InvalidProof);
        }
        let cx = Self::readable(&env, &x, &owner)?.0.value as i64;
        let cy = Self::readable(&env, &y, &owner)?.0.value as i64;
        let dir = Self::readable(&env, &direction, &player)?.0.value;

        let target = match dir {
            0 => Some((cx, cy - 1)),
            1 => Some((cx + 1, cy)),
            2 => Some((cx, cy + 1)),
            3 => Some((cx - 1, cy)),
            _ => None,
        };
        let (nx, ny, valid) = match target {
            Some((nx, ny)) if on_grid(nx) && on_grid(ny) => (nx, ny, 1),
            _ => (cx, cy, 0),
        };

        Ok(EncryptedStep {
            x: Self::mint(&env, nx as u32, &owner, Lifetime::Durable),
            y: Self::mint(&env, ny as u32, &owner, Lifetime::Durable),
            valid: Self::mint(&env, valid, &owner, Lifetime::Scratch),
        })
    }

    /// Encrypted bool: `(to_x, to_y)` is one king step from `(x, y)`.
    pub fn within_one(
        env: Env,
        owner: Address,
        x: BytesN<32>,
        y: BytesN<32>,
        to_x: u32,
        to_y: u32,
    ) -> Result<BytesN<32>, CoprocessorError> {
        owner.require_auth();
        let dx = Self::readable(&env, &x, &owner)?.0.value.abs_diff(to_x);
        let dy = Self::readable(&env, &y, &owner)?.0.value.abs_diff(to_y);
        let adjacent = dx <= 1 && dy <= 1 && dx + dy > 0;
        Ok(Self::mint(&env, adjacent as u32, &owner, Lifetime::Scratch))
    }

    /// Encrypted bool: `lo <= y <= hi`.
    pub fn in_rows(
        env: Env,
        owner: Address,
        y: BytesN<32>,
        lo: u32,
        hi: u32,
    ) -> Result<BytesN<32>, CoprocessorError> {
        owner.require_auth();
        let v = Self::readable(&env, &y, &owner)?.0.value;
        Ok(Self::mint(
            &env,
            (lo..=hi).contains(&v) as u32,
            &owner,
            Lifetime::Scratch,
        ))
    }

    // ----- Internal ---------------------------------------------------------

    fn mint(env: &Env, value: u32, reader: &Address, lifetime: Lifetime) -> BytesN<32> {
        let nonce: u64 = env.storage().instance().get(&DataKey::Nonce).unwrap_or(0) + 1;
        env.storage().instance().set(&DataKey::Nonce, &nonce);

        let mut seed = Bytes::from_array(env, &nonce.to_be_bytes());
        seed.extend_from_array(&env.ledger().sequence().to_be_bytes());
        let handle = env.crypto().sha256(&seed).to_bytes();

        let mut readers = Vec::new(env);
        readers.push_back(reader.clone());
        Self::save(
            env,
            &handle,
            &Ciphertext {
                value,
                readers,
                public: false,
            },
            lifetime,
        );
        handle
    }

    fn load(env: &Env, handle: &BytesN<32>) -> Result<(Ciphertext, Lifetime), CoprocessorError> {
        let key = DataKey::Handle(handle.clone());
        if let Some(ct) = env.storage().persistent().get(&key) {
            return Ok((ct, Lifetime::Durable));
        }
        env.storage()
            .temporary()
            .get(&key)
            .map(|ct| (ct, Lifetime::Scratch))
            .ok_or(CoprocessorError::UnknownHandle)
    }

    fn readable(
        env: &Env,
        handle: &BytesN<32>,
        reader: &Address,
    ) -> Result<(Ciphertext, Lifetime), CoprocessorError> {
        let (ct, lifetime) = Self::load(env, handle)?;
        if !ct.readers.contains(reader) {
            return Err(CoprocessorError::AccessDenied);
        }
        Ok((ct, lifetime))
    }

    fn save(env: &Env, handle: &BytesN<32>, ct: &Ciphertext, lifetime: Lifetime) {
        let key = DataKey::Handle(handle.clone());
        match lifetime {
            Lifetime::Durable => {
                env.storage().persistent().set(&key, ct);
                env.storage()
                    .persistent()
                    .extend_ttl(&key, HANDLE_TTL_LEDGERS, HANDLE_TTL_LEDGERS);
            }
            Lifetime::Scratch => {
                env.storage().temporary().set(&key, ct);
                env.storage()
                    .temporary()
                    .extend_ttl(&key, SCRATCH_TTL_LEDGERS, SCRATCH_TTL_LEDGERS);
            }
        }
    }
}

fn on_grid(v: i64) -> bool {
    (GRID_MIN..=GRID_MAX).contains(&v)
}
