// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! A corruption-guarded key-value wrapper (spec.md §6.2): a single column
//! family where every stored value is framed as `user_value ∥ H224(user_value)`.
//! A digest mismatch on read is surfaced as [`Error::CorruptEntry`] rather
//! than terminating the process — see the source's `exit(0)` pattern flagged
//! for re-architecture in spec.md §9.
//!
//! Not on the Merkle core's datapath; kept as a separate crate because the
//! source repository carries it as a sibling utility.

mod error;

pub use error::{Error, Result};

use htree_crypto::hash224;
use htree_schemadb::{Db, NamedColumnFamily};
use std::path::Path;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GuardedCf {
    Default,
}

impl NamedColumnFamily for GuardedCf {
    const ALL: &'static [Self] = &[Self::Default];

    fn name(&self) -> &'static str {
        "default"
    }
}

pub struct GuardedKv {
    db: Db<GuardedCf>,
}

impl GuardedKv {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Db::open(path, &Default::default())?;
        Ok(Self { db })
    }

    pub fn put(&self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<()> {
        Ok(self.db.put_cf(GuardedCf::Default, key, frame(value.as_ref()))?)
    }

    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<Option<Vec<u8>>> {
        let key = key.as_ref();
        match self.db.get_cf(GuardedCf::Default, key)? {
            Some(framed) => Ok(Some(unframe(key, &framed)?)),
            None => Ok(None),
        }
    }

    pub fn delete(&self, key: impl AsRef<[u8]>) -> Result<()> {
        Ok(self.db.delete_cf(GuardedCf::Default, key)?)
    }

    /// Iterates every `(key, value)` pair, verifying each value's digest as
    /// it is read.
    pub fn new_iterator(&self) -> Result<impl Iterator<Item = Result<(Vec<u8>, Vec<u8>)>> + '_> {
        Ok(self.db.iter_cf(GuardedCf::Default)?.map(|item| {
            let (key, framed) = item?;
            let value = unframe(&key, &framed)?;
            Ok((Vec::from(key), value))
        }))
    }

    pub fn get_all_keys(&self) -> Result<Vec<Vec<u8>>> {
        self.db
            .iter_cf(GuardedCf::Default)?
            .map(|item| item.map(|(key, _)| Vec::from(key)).map_err(Error::from))
            .collect()
    }

    /// Filesystem-checkpoint clone, mirroring the Merkle core's `clone_to`.
    pub fn clone_to(&self, dst_path: impl AsRef<Path>) -> Result<Self> {
        let dst_path = dst_path.as_ref();
        if dst_path.exists() {
            std::fs::remove_dir_all(dst_path)?;
        }
        self.db.create_checkpoint(dst_path)?;
        Self::open(dst_path)
    }

    /// Copies `keys` from `src` into `dst` in one atomic batch: keys present
    /// in `src` are put, keys absent from `src` are deleted from `dst`.
    pub fn update(dst: &Self, src: &Self, keys: &[Vec<u8>]) -> Result<()> {
        let mut batch = dst.db.new_batch();
        for key in keys {
            match src.db.get_cf(GuardedCf::Default, key)? {
                Some(framed) => batch.put_cf(GuardedCf::Default, key, framed)?,
                None => batch.delete_cf(GuardedCf::Default, key)?,
            }
        }
        Ok(dst.db.write(batch)?)
    }
}

fn frame(value: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(value.len() + htree_crypto::HASH224_LEN);
    framed.extend_from_slice(value);
    framed.extend_from_slice(hash224(value).as_bytes());
    framed
}

fn unframe(key: &[u8], framed: &[u8]) -> Result<Vec<u8>> {
    if framed.len() < htree_crypto::HASH224_LEN {
        return Err(Error::Truncated);
    }
    let split_at = framed.len() - htree_crypto::HASH224_LEN;
    let (value, digest) = framed.split_at(split_at);
    let expected = hash224(value);
    if digest != expected.as_bytes() {
        tracing::error!(key = ?key, "guarded kv digest mismatch");
        return Err(Error::CorruptEntry { key: key.to_vec() });
    }
    Ok(value.to_vec())
}
