// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! The node cache: a write-through, in-memory map from hash to [`Node`],
//! backed by the `nodes` column family for entries already flushed.

use crate::error::{Error, Result};
use crate::node::Node;
use crate::shared::DbHandle;
use crate::TreeCf;
use dashmap::DashMap;
use htree_crypto::Hash256;

pub struct NodeStore {
    db: DbHandle,
    cache: DashMap<Hash256, Node>,
}

impl NodeStore {
    pub fn new(db: DbHandle) -> Self {
        Self { db, cache: DashMap::new() }
    }

    pub fn get(&self, hash: &Hash256) -> Result<Option<Node>> {
        if let Some(node) = self.cache.get(hash) {
            return Ok(Some(node.clone()));
        }
        let db = self.db.read().clone();
        match db.get_cf(TreeCf::Nodes, hash.as_slice())? {
            Some(bytes) => Ok(Some(Node::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get_required(&self, hash: &Hash256) -> Result<Node> {
        self.get(hash)?.ok_or_else(|| Error::NotFound(format!("node {hash} not found")))
    }

    pub fn insert(&self, node: Node) {
        self.cache.insert(node.hash, node);
    }

    /// Removes the entry under `old_hash` and inserts `node` under its
    /// current (new) hash, matching step 4 of `updateNodeHash` (spec.md §4.3).
    pub fn rekey(&self, old_hash: &Hash256, node: Node) {
        self.cache.remove(old_hash);
        self.cache.insert(node.hash, node);
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn is_cache_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Every node created or rehashed since the last flush.
    pub fn dirty_nodes(&self) -> Vec<Node> {
        self.cache.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Full scan of the durable `nodes` column family. Callers are expected
    /// to have flushed first (spec.md §6.3 `all_nodes`), since nodes that
    /// only exist in the in-memory cache are not visible here.
    pub fn all_nodes_from_disk(&self) -> Result<Vec<Node>> {
        let db = self.db.read().clone();
        db.iter_cf(TreeCf::Nodes)?
            .map(|item| {
                let (_, value) = item?;
                Node::decode(&value)
            })
            .collect()
    }
}
