// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! The background commit worker (spec.md §4.4): drains the pending queue in
//! FIFO order, folding each `(key, value)` into the Merkle tree and moving
//! it from the pending cache to the committed cache.

use crate::metadata::MetadataRecord;
use crate::mutator::Mutator;
use crate::shared::Shared;
use crossbeam_channel::{Receiver, Sender};
use htree_crypto::hash256_concat;
use std::sync::Arc;
use std::thread::JoinHandle;

pub(crate) struct PendingOp {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

pub(crate) struct CommitPipeline {
    sender: Option<Sender<PendingOp>>,
    worker: Option<JoinHandle<()>>,
}

impl CommitPipeline {
    pub fn start(shared: Arc<Shared>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let name = shared.name.clone();
        let worker = std::thread::Builder::new()
            .name(format!("htree-commit-{name}"))
            .spawn(move || run_commit_worker(shared, rx))
            .expect("spawning commit worker thread");
        Self { sender: Some(tx), worker: Some(worker) }
    }

    pub fn enqueue(&self, op: PendingOp) {
        if let Some(sender) = &self.sender {
            // The receiver only disappears once the worker thread exits,
            // which only happens after `stop()` has dropped the sender
            // itself — so a send error here means we are racing our own
            // shutdown and the op can be safely discarded.
            let _ = sender.send(op);
        }
    }

    /// Drops the sender (closing the channel) and joins the worker thread.
    pub fn stop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for CommitPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_commit_worker(shared: Arc<Shared>, rx: Receiver<PendingOp>) {
    for op in rx.iter() {
        if let Err(err) = process_pending_op(&shared, &op) {
            // Open question §9: the source logs-and-drops. We additionally
            // mark the tree poisoned so `flush`/`root_hash` refuse to vouch
            // for a tree whose durable state no longer matches its caches
            // until the caller calls `revert()`.
            tracing::error!(
                tree = %shared.name,
                key = %hex::encode(&op.key),
                error = %err,
                "commit worker failed to apply pending write; dropping item"
            );
            *shared.poisoned.lock() = Some(err.to_string());
        }

        if shared.kv.pending.is_empty() {
            shared.pending_latch.mark_drained();
        }
    }
}

fn process_pending_op(shared: &Shared, op: &PendingOp) -> crate::error::Result<()> {
    let old_leaf_hash = lookup_committed_or_durable(shared, &op.key)?
        .map(|old_value| hash256_concat(&op.key, &old_value));
    let new_leaf_hash = hash256_concat(&op.key, &op.value);

    if old_leaf_hash != Some(new_leaf_hash) {
        let mut metadata = shared.metadata.lock();
        let mut mutator = Mutator::new(&shared.nodes, &mut metadata);
        match old_leaf_hash {
            None => {
                mutator.add_leaf(new_leaf_hash)?;
            }
            Some(old) => {
                mutator.update_leaf(old, new_leaf_hash)?;
            }
        }
    }

    shared.kv.committed.insert(op.key.clone(), op.value.clone());
    if let Some(pending_value) = shared.kv.pending.get(&op.key) {
        if *pending_value == op.value {
            drop(pending_value);
            shared.kv.pending.remove(&op.key);
        }
    }
    Ok(())
}

pub(crate) fn lookup_committed_or_durable(
    shared: &Shared,
    key: &[u8],
) -> crate::error::Result<Option<Vec<u8>>> {
    if let Some(value) = shared.kv.committed.get(key) {
        return Ok(Some(value.clone()));
    }
    let db = shared.db.read().clone();
    Ok(db.get_cf(crate::TreeCf::KeyData, key)?)
}

/// Reloads metadata from disk, used by `revert()` and `update()` case 3.
pub(crate) fn reload_metadata(shared: &Shared) -> crate::error::Result<()> {
    let db = shared.db.read().clone();
    let fresh = MetadataRecord::load(&db)?;
    *shared.metadata.lock() = fresh;
    Ok(())
}
