// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! The metadata record (spec.md §3): root hash, leaf count, depth, and the
//! hanging-node table. Rewritten in full on every flush.

use crate::error::{Error, Result};
use crate::TreeCf;
use htree_crypto::Hash256;
use htree_schemadb::{Db, SchemaBatch};
use std::collections::BTreeMap;

const KEY_ROOT_HASH: &str = "rootHash";
const KEY_NUM_LEAVES: &str = "numLeaves";
const KEY_DEPTH: &str = "depth";
const HANGING_NODE_PREFIX: &str = "hangingNode";

#[derive(Clone, Debug, Default)]
pub struct MetadataRecord {
    pub root_hash: Option<Hash256>,
    pub num_leaves: u32,
    pub depth: u32,
    pub hanging_nodes: BTreeMap<u32, Hash256>,
}

impl MetadataRecord {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(db: &Db<TreeCf>) -> Result<Self> {
        let mut record = Self::empty();
        for item in db.iter_cf(TreeCf::MetaData)? {
            let (key, value) = item?;
            let key = std::str::from_utf8(&key)
                .map_err(|_| Error::CorruptState("non-utf8 metadata key".into()))?;
            match key {
                KEY_ROOT_HASH => {
                    record.root_hash = Some(
                        Hash256::from_slice(&value)
                            .ok_or_else(|| Error::CorruptState("bad rootHash length".into()))?,
                    );
                }
                KEY_NUM_LEAVES => record.num_leaves = decode_u32(&value)?,
                KEY_DEPTH => record.depth = decode_u32(&value)?,
                key if key.starts_with(HANGING_NODE_PREFIX) => {
                    let level: u32 = key[HANGING_NODE_PREFIX.len()..]
                        .parse()
                        .map_err(|_| Error::CorruptState(format!("bad hanging node key {key}")))?;
                    let hash = Hash256::from_slice(&value)
                        .ok_or_else(|| Error::CorruptState("bad hanging node hash length".into()))?;
                    record.hanging_nodes.insert(level, hash);
                }
                other => {
                    tracing::warn!(key = other, "ignoring unrecognized metadata key");
                }
            }
        }
        Ok(record)
    }

    /// Appends deletes for every currently-persisted metadata key, then puts
    /// the new values — spec.md §4.4 step 1-2, in one atomic batch.
    pub fn write_batch(&self, db: &Db<TreeCf>, batch: &mut SchemaBatch<'_, TreeCf>) -> Result<()> {
        for item in db.iter_cf(TreeCf::MetaData)? {
            let (key, _) = item?;
            batch.delete_cf(TreeCf::MetaData, &key)?;
        }

        if let Some(root) = self.root_hash {
            batch.put_cf(TreeCf::MetaData, KEY_ROOT_HASH, root.as_slice())?;
        }
        batch.put_cf(TreeCf::MetaData, KEY_NUM_LEAVES, self.num_leaves.to_be_bytes())?;
        batch.put_cf(TreeCf::MetaData, KEY_DEPTH, self.depth.to_be_bytes())?;
        for (level, hash) in &self.hanging_nodes {
            batch.put_cf(TreeCf::MetaData, format!("{HANGING_NODE_PREFIX}{level}"), hash.as_slice())?;
        }
        Ok(())
    }
}

fn decode_u32(bytes: &[u8]) -> Result<u32> {
    let arr: [u8; 4] = bytes
        .try_into()
        .map_err(|_| Error::CorruptState("bad u32 metadata value length".into()))?;
    Ok(u32::from_be_bytes(arr))
}

/// Reads the root hash straight from the metadata column family, without
/// touching the in-memory metadata lock or blocking on pending writes
/// (spec.md §6.3 `root_hash_on_disk`).
pub fn root_hash_on_disk(db: &Db<TreeCf>) -> Result<Option<Hash256>> {
    match db.get_cf(TreeCf::MetaData, KEY_ROOT_HASH)? {
        Some(bytes) => Ok(Some(
            Hash256::from_slice(&bytes).ok_or_else(|| Error::CorruptState("bad rootHash length".into()))?,
        )),
        None => Ok(None),
    }
}
