// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! The two in-memory tiers of the key-value cache (spec.md §4.4): `pending`
//! holds writes not yet picked up by the commit worker, `committed` holds
//! writes the worker has applied to the tree but not yet flushed to disk.
//! A read checks pending, then committed, then falls through to the
//! `keyData` column family.

use dashmap::DashMap;

#[derive(Default)]
pub struct KvCache {
    pub pending: DashMap<Vec<u8>, Vec<u8>>,
    pub committed: DashMap<Vec<u8>, Vec<u8>>,
}

impl KvCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything the worker has already folded into durable storage,
    /// leaving `pending` untouched — flush only clears what it persisted.
    pub fn clear_committed(&self) {
        self.committed.clear();
    }

    pub fn clear_all(&self) {
        self.pending.clear();
        self.committed.clear();
    }
}
