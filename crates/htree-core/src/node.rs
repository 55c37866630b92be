// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! The fixed-layout node encoding (spec.md §4.1) and the in-memory node
//! record. The source represented a node as an inner class whose methods
//! mutated enclosing-tree state; here it is a plain data record, and the
//! mutation/recursion logic that used to live on the node lives on the
//! mutator instead (`mutator.rs`). Parent/child links are always 32-byte
//! hashes, never object references, which is what makes the snapshot-based
//! clone in `clone_update.rs` sound.

use crate::error::{Error, Result};
use htree_crypto::{node_hash, Hash256};

const FLAG_BYTES: usize = 3;
const HEADER_LEN: usize = htree_crypto::HASH256_LEN + FLAG_BYTES;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Node {
    pub hash: Hash256,
    pub left: Option<Hash256>,
    pub right: Option<Hash256>,
    pub parent: Option<Hash256>,
    /// The hash this node had on disk before its most recent in-memory
    /// rehash, scheduled for deletion at the next flush.
    pub pending_old_hash: Option<Hash256>,
}

impl Node {
    pub fn new_leaf(hash: Hash256) -> Self {
        Self { hash, left: None, right: None, parent: None, pending_old_hash: None }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// The odd-arity hash this node *would* have given its current children.
    pub fn recompute_hash(&self) -> Hash256 {
        node_hash(self.left.as_ref(), self.right.as_ref())
    }

    /// Sets whichever of `left`/`right` is empty to `child_hash`. Does not
    /// touch `self.hash` — callers recompute via [`Node::recompute_hash`]
    /// once they decide when the new hash should take effect.
    pub fn set_missing_child(&mut self, child_hash: Hash256) -> Result<()> {
        if self.left.is_none() {
            self.left = Some(child_hash);
        } else if self.right.is_none() {
            self.right = Some(child_hash);
        } else {
            return Err(Error::CorruptState(format!(
                "node {} already has two children",
                self.hash
            )));
        }
        Ok(())
    }

    /// Rewrites whichever of `left`/`right` equals `old_hash` to `new_hash`.
    pub fn replace_child(&mut self, old_hash: Hash256, new_hash: Hash256) -> Result<()> {
        if self.left == Some(old_hash) {
            self.left = Some(new_hash);
        } else if self.right == Some(old_hash) {
            self.right = Some(new_hash);
        } else {
            return Err(Error::NotFound(format!(
                "child {old_hash} not found on node {}",
                self.hash
            )));
        }
        Ok(())
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + htree_crypto::HASH256_LEN * 3);
        buf.extend_from_slice(self.hash.as_slice());
        buf.push(self.left.is_some() as u8);
        buf.push(self.right.is_some() as u8);
        buf.push(self.parent.is_some() as u8);
        for field in [self.left, self.right, self.parent].into_iter().flatten() {
            buf.extend_from_slice(field.as_slice());
        }
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::CorruptState(format!(
                "node blob too short: {} bytes",
                bytes.len()
            )));
        }
        let hash = Hash256::from_slice(&bytes[0..32])
            .ok_or_else(|| Error::CorruptState("bad node hash length".into()))?;
        let has_left = bytes[32] != 0;
        let has_right = bytes[33] != 0;
        let has_parent = bytes[34] != 0;

        let mut offset = HEADER_LEN;
        let mut read_optional_hash = |present: bool| -> Result<Option<Hash256>> {
            if !present {
                return Ok(None);
            }
            let end = offset + htree_crypto::HASH256_LEN;
            if bytes.len() < end {
                return Err(Error::CorruptState("node blob truncated".into()));
            }
            let h = Hash256::from_slice(&bytes[offset..end])
                .expect("slice length checked above");
            offset = end;
            Ok(Some(h))
        };

        let left = read_optional_hash(has_left)?;
        let right = read_optional_hash(has_right)?;
        let parent = read_optional_hash(has_parent)?;

        if offset != bytes.len() {
            return Err(Error::CorruptState(format!(
                "node blob has {} trailing bytes",
                bytes.len() - offset
            )));
        }

        Ok(Self { hash, left, right, parent, pending_old_hash: None })
    }
}
