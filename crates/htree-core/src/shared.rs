// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! State shared between a [`crate::tree::Tree`] handle and its background
//! commit worker. Everything here is reachable from both without the write
//! lock — per spec.md §5, holding the write lock must not block the commit
//! worker, so the containers it touches (node cache, caches, metadata) are
//! each independently thread-safe.

use crate::config::Config;
use crate::kv_cache::KvCache;
use crate::latch::PendingLatch;
use crate::metadata::MetadataRecord;
use crate::node_store::NodeStore;
use crate::TreeCf;
use htree_schemadb::Db;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// The embedded KV engine handle, indirected through a lock so
/// `update`'s snapshot-replace path (spec.md §4.5 case 3) can swap it for a
/// freshly reopened handle without invalidating every outstanding `Arc`
/// clone taken by the node store or metadata loader.
pub(crate) type DbHandle = Arc<RwLock<Arc<Db<TreeCf>>>>;

pub(crate) struct Shared {
    pub name: String,
    /// The resolved on-disk path, used as the open-tree registry key (see
    /// `registry.rs`) so two different logical names can't collide with each
    /// other but the same directory can never be open twice.
    pub registry_key: String,
    pub config: Config,
    pub db: DbHandle,
    pub nodes: NodeStore,
    pub metadata: Mutex<MetadataRecord>,
    pub kv: KvCache,
    pub pending_latch: PendingLatch,
    pub has_unsaved_changes: AtomicBool,
    pub closed: AtomicBool,
    /// Set by the commit worker when it drops a failed pending item (spec.md
    /// §9's open question on worker-failure policy; see DESIGN.md for the
    /// resolution). Once set, `flush`/`root_hash` refuse to vouch for the
    /// tree's state until the caller `revert()`s.
    pub poisoned: Mutex<Option<String>>,
    /// Exclusive, reentrant: guards `put`/`flush`/`clear`/`clone`/`update`/
    /// `revert`/`close` against interleaving with each other. Does not guard
    /// against the commit worker, which operates on the containers above
    /// independently.
    pub write_lock: ReentrantMutex<()>,
}
