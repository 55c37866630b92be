// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! 256-bit and 224-bit digest primitives.
//!
//! The Merkle tree in `htree-core` is hash-function agnostic at the algorithm
//! level, but the on-disk format pins a 32-byte node hash and a 28-byte digest
//! for the corruption-guard adjunct (`htree-guarded-kv`). Both are produced
//! here so every other crate in the workspace depends on a single digest
//! implementation.

use sha3::{Digest, Sha3_224, Sha3_256};
use std::fmt;

/// Length in bytes of a [`Hash256`].
pub const HASH256_LEN: usize = 32;
/// Length in bytes of a [`Hash224`].
pub const HASH224_LEN: usize = 28;

/// A 256-bit digest, used as the identity of every Merkle tree node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256(pub [u8; HASH256_LEN]);

impl Hash256 {
    pub const ZERO: Hash256 = Hash256([0u8; HASH256_LEN]);

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != HASH256_LEN {
            return None;
        }
        let mut out = [0u8; HASH256_LEN];
        out.copy_from_slice(bytes);
        Some(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; HASH256_LEN] {
        &self.0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn to_vec(self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 224-bit digest, used only by the corruption-guard KV adjunct (spec.md §6.2).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash224(pub [u8; HASH224_LEN]);

impl Hash224 {
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != HASH224_LEN {
            return None;
        }
        let mut out = [0u8; HASH224_LEN];
        out.copy_from_slice(bytes);
        Some(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; HASH224_LEN] {
        &self.0
    }
}

impl fmt::Debug for Hash224 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash224({})", hex::encode(self.0))
    }
}

/// `H256(bytes)`.
pub fn hash256(bytes: &[u8]) -> Hash256 {
    let mut hasher = Sha3_256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; HASH256_LEN];
    out.copy_from_slice(&digest);
    Hash256(out)
}

/// `H256(a, b)`, equal to `H256(a ∥ b)`.
pub fn hash256_concat(a: &[u8], b: &[u8]) -> Hash256 {
    let mut hasher = Sha3_256::new();
    hasher.update(a);
    hasher.update(b);
    let digest = hasher.finalize();
    let mut out = [0u8; HASH256_LEN];
    out.copy_from_slice(&digest);
    Hash256(out)
}

/// `H224(bytes)`.
pub fn hash224(bytes: &[u8]) -> Hash224 {
    let mut hasher = Sha3_224::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; HASH224_LEN];
    out.copy_from_slice(&digest);
    Hash224(out)
}

/// The leaf hash for a user `(key, value)` pair: `H256(key, value)`.
pub fn leaf_hash(key: &[u8], value: &[u8]) -> Hash256 {
    hash256_concat(key, value)
}

/// The odd-arity node hash: if only one child exists it is duplicated as the other.
pub fn node_hash(left: Option<&Hash256>, right: Option<&Hash256>) -> Hash256 {
    let l = left.or(right).expect("node_hash requires at least one child");
    let r = right.or(left).expect("node_hash requires at least one child");
    hash256_concat(l.as_slice(), r.as_slice())
}

#[cfg(test)]
mod tests;
