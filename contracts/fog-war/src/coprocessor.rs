//! Confidential-compute backend seam.
//!
//! The engine never sees ciphertext internals. It holds opaque 32-byte handles and
//! asks the coprocessor contract to encrypt, combine, and (when the game rules say a
//! value is public) decrypt them. Every call goes through the generated `try_*`
//! client methods so a backend trap becomes `Error::BackendFailure` and the
//! surrounding transaction is rolled back.

use soroban_sdk::{contractclient, vec, Address, Bytes, BytesN, Env, Vec};

use crate::{board, Coord, DataKey, EncryptedCoord, EncryptedStep, Error, Role};

/// Interface of the coprocessor contract.
///
/// `owner` is the contract holding the handles (the engine itself); the coprocessor
/// checks it against each handle's access-control list.
#[contractclient(name = "CoprocessorClient")]
pub trait Coprocessor {
    fn encrypt(env: Env, owner: Address, value: u32) -> BytesN<32>;
    fn allow(env: Env, owner: Address, handle: BytesN<32>, account: Address);
    fn allow_public(env: Env, owner: Address, handle: BytesN<32>);
    fn decrypt_public(env: Env, handles: Vec<BytesN<32>>) -> Vec<u32>;
    fn user_decrypt(
        env: Env,
        requester: Address,
        public_key: BytesN<32>,
        handles: Vec<BytesN<32>>,
    ) -> Vec<u32>;
    /// Applies an encrypted direction (0=N, 1=E, 2=S, 3=W) to an encrypted
    /// coordinate. `valid` is an encrypted bool: direction known and target on board.
    fn step(
        env: Env,
        owner: Address,
        player: Address,
        x: BytesN<32>,
        y: BytesN<32>,
        direction: BytesN<32>,
        proof: Bytes,
    ) -> EncryptedStep;
    /// Encrypted bool: `(to_x, to_y)` is a king move away from `(x, y)`.
    fn within_one(
        env: Env,
        owner: Address,
        x: BytesN<32>,
        y: BytesN<32>,
        to_x: u32,
        to_y: u32,
    ) -> BytesN<32>;
    /// Encrypted bool: `lo <= y <= hi`.
    fn in_rows(env: Env, owner: Address, y: BytesN<32>, lo: u32, hi: u32) -> BytesN<32>;
}

fn settle<T, C, E>(res: Result<Result<T, C>, E>) -> Result<T, Error> {
    match res {
        Ok(Ok(v)) => Ok(v),
        _ => Err(Error::BackendFailure),
    }
}

/// Engine-side handle on the configured coprocessor.
pub struct Confidential<'a> {
    env: &'a Env,
    client: CoprocessorClient<'a>,
    owner: Address,
}

impl<'a> Confidential<'a> {
    pub fn connect(env: &'a Env) -> Result<Self, Error> {
        let addr: Address = env
            .storage()
            .instance()
            .get(&DataKey::Coprocessor)
            .ok_or(Error::BackendNotSet)?;
        Ok(Self {
            env,
            client: CoprocessorClient::new(env, &addr),
            owner: env.current_contract_address(),
        })
    }

    pub fn encrypt(&self, value: u32) -> Result<BytesN<32>, Error> {
        settle(self.client.try_encrypt(&self.owner, &value))
    }

    pub fn encrypt_coord(&self, c: &Coord) -> Result<EncryptedCoord, Error> {
        Ok(EncryptedCoord {
            x: self.encrypt(c.x)?,
            y: self.encrypt(c.y)?,
        })
    }

    /// Lets `player` user-decrypt both halves of a coordinate.
    pub fn grant(&self, player: &Address, c: &EncryptedCoord) -> Result<(), Error> {
        settle(self.client.try_allow(&self.owner, &c.x, player))?;
        settle(self.client.try_allow(&self.owner, &c.y, player))
    }

    /// Encrypts a plaintext coordinate readable only by this contract and `player`.
    pub fn conceal(&self, player: &Address, c: &Coord) -> Result<EncryptedCoord, Error> {
        let enc = self.encrypt_coord(c)?;
        self.grant(player, &enc)?;
        Ok(enc)
    }

    /// Publishes a coordinate and returns its plaintext.
    pub fn reveal(&self, c: &EncryptedCoord) -> Result<Coord, Error> {
        settle(self.client.try_allow_public(&self.owner, &c.x))?;
        settle(self.client.try_allow_public(&self.owner, &c.y))?;
        let out = settle(
            self.client
                .try_decrypt_public(&vec![self.env, c.x.clone(), c.y.clone()]),
        )?;
        match (out.get(0), out.get(1)) {
            (Some(x), Some(y)) => Ok(Coord { x, y }),
            _ => Err(Error::BackendFailure),
        }
    }

    /// Publishes an encrypted bool and returns it.
    pub fn decrypt_bool(&self, handle: &BytesN<32>) -> Result<bool, Error> {
        settle(self.client.try_allow_public(&self.owner, handle))?;
        let out = settle(self.client.try_decrypt_public(&vec![self.env, handle.clone()]))?;
        out.get(0).map(|v| v != 0).ok_or(Error::BackendFailure)
    }

    pub fn step(
        &self,
        player: &Address,
        from: &EncryptedCoord,
        direction: &BytesN<32>,
        proof: &Bytes,
    ) -> Result<EncryptedStep, Error> {
        settle(
            self.client
                .try_step(&self.owner, player, &from.x, &from.y, direction, proof),
        )
    }

    pub fn within_one(&self, from: &EncryptedCoord, to: &Coord) -> Result<BytesN<32>, Error> {
        settle(
            self.client
                .try_within_one(&self.owner, &from.x, &from.y, &to.x, &to.y),
        )
    }

    /// Encrypted bool: `y` lies in `role`'s home rows.
    pub fn in_home(&self, role: Role, y: &BytesN<32>) -> Result<BytesN<32>, Error> {
        let (lo, hi) = board::home_rows(role);
        settle(self.client.try_in_rows(&self.owner, y, &lo, &hi))
    }
}
