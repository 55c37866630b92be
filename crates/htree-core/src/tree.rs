// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! The public facade (spec.md §6.3): opens a tree, stages writes through
//! the commit pipeline, and exposes the clone/update/flush/revert/clear
//! lifecycle operations. Every public method starts with [`Tree::ensure_open`]
//! and, for structural operations, acquires the tree's write lock — holding
//! it does not block the commit worker, which operates on the shared
//! containers independently (spec.md §5).

use crate::clone_update;
use crate::commit::{self, CommitPipeline, PendingOp};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::kv_cache::KvCache;
use crate::latch::PendingLatch;
use crate::metadata::{self, MetadataRecord};
use crate::node::Node;
use crate::node_store::NodeStore;
use crate::registry;
use crate::shared::{DbHandle, Shared};
use crate::TreeCf;
use htree_crypto::Hash256;
use htree_schemadb::Db;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct Tree {
    pub(crate) shared: Arc<Shared>,
    pipeline: Mutex<CommitPipeline>,
}

impl Tree {
    /// Opens (or creates) the named tree under `config.path_prefix`.
    /// Fails with `Conflict` if this process already has this same
    /// directory open (under any name).
    pub fn open(config: Config, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let path = config.tree_path(&name);
        let registry_key = path.to_string_lossy().into_owned();
        registry::register(&registry_key)?;
        match Self::open_at(config, &name, &path, registry_key.clone()) {
            Ok(tree) => Ok(tree),
            Err(err) => {
                registry::deregister(&registry_key);
                Err(err)
            }
        }
    }

    /// Opens at an explicit path (used by `clone_to`, which opens the
    /// destination at a checkpoint directory rather than `config.tree_path`).
    /// The caller is responsible for having already registered `registry_key`.
    fn open_at(config: Config, name: &str, path: &std::path::Path, registry_key: String) -> Result<Self> {
        let db = Db::open(path, &config.rocksdb_options())?;
        let metadata = MetadataRecord::load(&db)?;

        let db_handle: DbHandle = Arc::new(RwLock::new(Arc::new(db)));
        let shared = Arc::new(Shared {
            name: name.to_string(),
            registry_key,
            config,
            db: db_handle.clone(),
            nodes: NodeStore::new(db_handle),
            metadata: Mutex::new(metadata),
            kv: KvCache::new(),
            pending_latch: PendingLatch::new(),
            has_unsaved_changes: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            poisoned: Mutex::new(None),
            write_lock: ReentrantMutex::new(()),
        });

        let pipeline = CommitPipeline::start(shared.clone());
        tracing::info!(tree = %shared.name, "opened tree");
        Ok(Self { shared, pipeline: Mutex::new(pipeline) })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(Error::TreeClosed);
        }
        Ok(())
    }

    fn ensure_not_poisoned(&self) -> Result<()> {
        if let Some(reason) = self.shared.poisoned.lock().clone() {
            return Err(Error::CorruptState(format!(
                "tree '{}' is poisoned by a failed commit worker item: {reason}",
                self.shared.name
            )));
        }
        Ok(())
    }

    pub fn put(&self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Result<()> {
        self.ensure_open()?;
        let key = key.into();
        let value = value.into();
        let _guard = self.shared.write_lock.lock();

        self.shared.kv.pending.insert(key.clone(), value.clone());
        self.shared.pending_latch.mark_dirty();
        self.shared.has_unsaved_changes.store(true, Ordering::Relaxed);
        self.pipeline.lock().enqueue(PendingOp { key, value });
        Ok(())
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.ensure_open()?;
        if let Some(value) = self.shared.kv.pending.get(key) {
            return Ok(Some(value.clone()));
        }
        commit::lookup_committed_or_durable(&self.shared, key)
    }

    pub fn get_committed(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.ensure_open()?;
        commit::lookup_committed_or_durable(&self.shared, key)
    }

    pub fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Blocks until the pending queue has drained, then returns the current
    /// root hash.
    pub fn root_hash(&self) -> Result<Option<Hash256>> {
        self.ensure_open()?;
        self.shared.pending_latch.wait_drained()?;
        self.ensure_not_poisoned()?;
        Ok(self.shared.metadata.lock().root_hash)
    }

    /// Reads the root hash straight off the metadata column family. Never
    /// blocks; may lag behind in-flight pending writes.
    pub fn root_hash_on_disk(&self) -> Result<Option<Hash256>> {
        self.ensure_open()?;
        let db = self.shared.db.read().clone();
        metadata::root_hash_on_disk(&db)
    }

    pub fn num_leaves(&self) -> Result<u32> {
        self.ensure_open()?;
        Ok(self.shared.metadata.lock().num_leaves)
    }

    pub fn depth(&self) -> Result<u32> {
        self.ensure_open()?;
        Ok(self.shared.metadata.lock().depth)
    }

    pub fn all_keys(&self) -> Result<Vec<Vec<u8>>> {
        self.ensure_open()?;
        let db = self.shared.db.read().clone();
        db.iter_cf(TreeCf::KeyData)?
            .map(|item| item.map(|(k, _)| Vec::from(k)).map_err(Error::from))
            .collect()
    }

    pub fn all_values(&self) -> Result<Vec<Vec<u8>>> {
        self.ensure_open()?;
        let db = self.shared.db.read().clone();
        db.iter_cf(TreeCf::KeyData)?
            .map(|item| item.map(|(_, v)| Vec::from(v)).map_err(Error::from))
            .collect()
    }

    pub fn keys_and_values(&self) -> Result<(Vec<Vec<u8>>, Vec<Vec<u8>>)> {
        self.ensure_open()?;
        let db = self.shared.db.read().clone();
        let mut keys = Vec::new();
        let mut values = Vec::new();
        for item in db.iter_cf(TreeCf::KeyData)? {
            let (k, v) = item?;
            keys.push(Vec::from(k));
            values.push(Vec::from(v));
        }
        Ok((keys, values))
    }

    /// Requires a prior flush — nodes still only in the in-memory cache are
    /// not visible here.
    pub fn all_nodes(&self) -> Result<Vec<Node>> {
        self.ensure_open()?;
        self.shared.nodes.all_nodes_from_disk()
    }

    pub fn flush(&self) -> Result<()> {
        self.ensure_open()?;
        let _guard = self.shared.write_lock.lock();
        self.shared.pending_latch.wait_drained()?;
        self.ensure_not_poisoned()?;

        let db = self.shared.db.read().clone();
        let mut batch = db.new_batch();
        {
            let metadata = self.shared.metadata.lock();
            metadata.write_batch(&db, &mut batch)?;
        }
        for node in self.shared.nodes.dirty_nodes() {
            batch.put_cf(TreeCf::Nodes, node.hash.as_slice(), node.encode())?;
            if let Some(old_hash) = node.pending_old_hash {
                batch.delete_cf(TreeCf::Nodes, old_hash.as_slice())?;
            }
        }
        for entry in self.shared.kv.committed.iter() {
            batch.put_cf(TreeCf::KeyData, entry.key(), entry.value())?;
        }
        db.write(batch)?;

        self.shared.nodes.clear_cache();
        self.shared.kv.clear_committed();
        self.shared.has_unsaved_changes.store(false, Ordering::Relaxed);
        tracing::debug!(tree = %self.shared.name, "flushed");
        Ok(())
    }

    pub fn revert(&self) -> Result<()> {
        self.ensure_open()?;
        let _guard = self.shared.write_lock.lock();
        self.shared.pending_latch.wait_drained()?;

        self.shared.nodes.clear_cache();
        self.shared.kv.clear_all();
        commit::reload_metadata(&self.shared)?;
        self.shared.has_unsaved_changes.store(false, Ordering::Relaxed);
        *self.shared.poisoned.lock() = None;
        tracing::debug!(tree = %self.shared.name, "reverted");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.ensure_open()?;
        let _guard = self.shared.write_lock.lock();
        self.shared.pending_latch.wait_drained()?;

        let db = self.shared.db.read().clone();
        for cf in [TreeCf::Default, TreeCf::MetaData, TreeCf::Nodes, TreeCf::KeyData] {
            db.clear_cf(cf)?;
            db.compact_cf(cf)?;
        }
        self.shared.nodes.clear_cache();
        self.shared.kv.clear_all();
        *self.shared.metadata.lock() = MetadataRecord::empty();
        self.shared.has_unsaved_changes.store(false, Ordering::Relaxed);
        *self.shared.poisoned.lock() = None;
        tracing::debug!(tree = %self.shared.name, "cleared");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    pub fn close(&self) -> Result<()> {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.pipeline.lock().stop();
        self.shared.pending_latch.close();
        if let Err(err) = self.flush_best_effort() {
            tracing::warn!(tree = %self.shared.name, error = %err, "flush during close failed");
        }
        registry::deregister(&self.shared.registry_key);
        tracing::info!(tree = %self.shared.name, "closed tree");
        Ok(())
    }

    fn flush_best_effort(&self) -> Result<()> {
        let db = self.shared.db.read().clone();
        let mut batch = db.new_batch();
        {
            let metadata = self.shared.metadata.lock();
            metadata.write_batch(&db, &mut batch)?;
        }
        for node in self.shared.nodes.dirty_nodes() {
            batch.put_cf(TreeCf::Nodes, node.hash.as_slice(), node.encode())?;
            if let Some(old_hash) = node.pending_old_hash {
                batch.delete_cf(TreeCf::Nodes, old_hash.as_slice())?;
            }
        }
        for entry in self.shared.kv.committed.iter() {
            batch.put_cf(TreeCf::KeyData, entry.key(), entry.value())?;
        }
        db.write(batch)?;
        self.shared.nodes.clear_cache();
        self.shared.kv.clear_committed();
        Ok(())
    }

    /// Flushes self, takes a filesystem checkpoint at `new_name`'s path, and
    /// opens a fresh tree instance on it.
    ///
    /// The source's re-architecture note that clone first force-closes any
    /// previously open instance at the target name cannot be done soundly in
    /// Rust without a live-handle registry (see DESIGN.md); here a name
    /// already open is simply a `Conflict`, same as a direct second `open`.
    pub fn clone_to(&self, new_name: impl Into<String>) -> Result<Self> {
        self.ensure_open()?;
        let new_name = new_name.into();
        self.flush()?;

        let dst_path = self.shared.config.tree_path(&new_name);
        let registry_key = dst_path.to_string_lossy().into_owned();
        registry::register(&registry_key)?;

        if dst_path.exists() {
            std::fs::remove_dir_all(&dst_path)?;
        }

        let db = self.shared.db.read().clone();
        db.create_checkpoint(&dst_path)?;

        let opened = match Self::open_at(self.shared.config.clone(), &new_name, &dst_path, registry_key.clone()) {
            Ok(tree) => tree,
            Err(err) => {
                registry::deregister(&registry_key);
                return Err(err);
            }
        };
        clone_update::record_clone();
        Ok(opened)
    }

    /// Fast-forwards `self` to match `src`, per spec.md §4.5.
    pub fn update(&self, src: &Tree) -> Result<()> {
        self.ensure_open()?;
        src.ensure_open()?;
        let _guard = self.shared.write_lock.lock();
        self.shared.pending_latch.wait_drained()?;

        let src_root = src.root_hash()?;
        if src_root.is_none() {
            return if self.root_hash()?.is_none() { Ok(()) } else { self.clear() };
        }

        let self_disk = self.root_hash_on_disk()?;
        let src_disk = src.root_hash_on_disk()?;

        if self_disk == src_disk {
            self.fast_forward_cache_copy(src)
        } else {
            self.fast_forward_snapshot_replace(src)
        }
    }

    /// Case 2: durable state already matches; copy only the in-RAM caches.
    /// Lock order is by tree name to avoid inversion against a concurrent
    /// update running in the opposite direction.
    fn fast_forward_cache_copy(&self, src: &Tree) -> Result<()> {
        self.shared.nodes.clear_cache();
        self.shared.kv.committed.clear();

        for node in src.shared.nodes.dirty_nodes() {
            self.shared.nodes.insert(node);
        }
        for entry in src.shared.kv.committed.iter() {
            self.shared.kv.committed.insert(entry.key().clone(), entry.value().clone());
        }

        // Lock both metadata records in a fixed order (by tree name) so a
        // concurrent update running in the opposite direction cannot deadlock
        // against this one.
        let src_snapshot = if self.shared.name <= src.shared.name {
            let _self_guard = self.shared.metadata.lock();
            src.shared.metadata.lock().clone()
        } else {
            let src_guard = src.shared.metadata.lock();
            let snapshot = src_guard.clone();
            drop(src_guard);
            snapshot
        };

        let mut self_meta = self.shared.metadata.lock();
        self_meta.hanging_nodes = src_snapshot.hanging_nodes;
        self_meta.root_hash = src_snapshot.root_hash;
        self_meta.num_leaves = src_snapshot.num_leaves;
        self_meta.depth = src_snapshot.depth;
        drop(self_meta);

        self.shared
            .has_unsaved_changes
            .store(src.shared.has_unsaved_changes.load(Ordering::Relaxed), Ordering::Relaxed);
        clone_update::record_update_without_clone();
        tracing::debug!(dst = %self.shared.name, src = %src.shared.name, "fast-forwarded via cache copy");
        Ok(())
    }

    /// Case 3: durable state differs; replace self's directory with a fresh
    /// checkpoint of `src` and reopen.
    ///
    /// A checkpoint-then-rename-into-place would leave the freshly opened
    /// handle's internally recorded path pointing at the now-renamed-away
    /// staging directory — future SST/WAL writes would target a path that no
    /// longer exists. Instead, an empty placeholder database is opened and
    /// swapped into `self.shared.db` first; that swap is what drops our only
    /// reference to the old handle at `self_path`, releasing its RocksDB
    /// lock file. Only once `self_path` is provably unheld is it removed and
    /// the checkpoint written directly into it, then reopened at that same,
    /// final path.
    fn fast_forward_snapshot_replace(&self, src: &Tree) -> Result<()> {
        src.flush()?;
        self.shared.pending_latch.wait_drained()?;

        let self_path = self.shared.config.tree_path(&self.shared.name);
        let placeholder_path = self
            .shared
            .config
            .tree_path(&format!("{}.update-placeholder", self.shared.name));
        if placeholder_path.exists() {
            std::fs::remove_dir_all(&placeholder_path)?;
        }

        let placeholder = Db::open(&placeholder_path, &self.shared.config.rocksdb_options())?;
        {
            let mut guard = self.shared.db.write();
            *guard = Arc::new(placeholder);
        }

        std::fs::remove_dir_all(&self_path)?;

        let src_db = src.shared.db.read().clone();
        src_db.create_checkpoint(&self_path)?;
        let reopened = Db::open(&self_path, &self.shared.config.rocksdb_options())?;
        {
            let mut guard = self.shared.db.write();
            *guard = Arc::new(reopened);
        }

        std::fs::remove_dir_all(&placeholder_path)?;

        self.shared.nodes.clear_cache();
        self.shared.kv.clear_all();
        commit::reload_metadata(&self.shared)?;
        self.shared.has_unsaved_changes.store(false, Ordering::Relaxed);
        clone_update::record_clone();
        tracing::debug!(dst = %self.shared.name, src = %src.shared.name, "fast-forwarded via snapshot replace");
        Ok(())
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
