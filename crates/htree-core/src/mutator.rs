// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! The structural algorithm (spec.md §4.3): `add_leaf`/`add_node` grow the
//! tree one leaf at a time, carrying a new node upward through at most one
//! hanging node per level, binary-counter style; `update_leaf`/
//! `update_node_hash` recompute hashes in place from a changed leaf up to
//! the root. Borrows the node store and metadata record for the duration
//! of one structural operation; does not itself take any lock — callers
//! hold the tree's write lock for the whole operation.

use crate::error::{Error, Result};
use crate::metadata::MetadataRecord;
use crate::node::Node;
use crate::node_store::NodeStore;
use htree_crypto::{node_hash, Hash256};

pub struct Mutator<'a> {
    nodes: &'a NodeStore,
    metadata: &'a mut MetadataRecord,
}

impl<'a> Mutator<'a> {
    pub fn new(nodes: &'a NodeStore, metadata: &'a mut MetadataRecord) -> Self {
        Self { nodes, metadata }
    }

    /// Entry point at level 0. Returns the new root hash.
    pub fn add_leaf(&mut self, leaf_hash: Hash256) -> Result<Hash256> {
        let leaf = Node::new_leaf(leaf_hash);
        self.add_node(0, leaf)?;
        self.metadata.num_leaves += 1;
        self.metadata
            .root_hash
            .ok_or_else(|| Error::CorruptState("add_node did not set a root hash".into()))
    }

    fn add_node(&mut self, level: u32, mut node: Node) -> Result<()> {
        if level > self.metadata.depth {
            self.metadata.depth = level;
        }

        match self.metadata.hanging_nodes.get(&level).copied() {
            None => {
                self.metadata.hanging_nodes.insert(level, node.hash);
                if level == self.metadata.depth {
                    self.metadata.root_hash = Some(node.hash);
                    self.nodes.insert(node);
                } else {
                    let parent_hash = node_hash(Some(&node.hash), None);
                    let child_hash = node.hash;
                    node.parent = Some(parent_hash);
                    self.nodes.insert(node);

                    let parent = Node {
                        hash: parent_hash,
                        left: Some(child_hash),
                        right: None,
                        parent: None,
                        pending_old_hash: None,
                    };
                    self.nodes.insert(parent.clone());
                    self.add_node(level + 1, parent)?;
                }
            }
            Some(hanging_hash) => {
                let mut hanging = self.nodes.get_required(&hanging_hash)?;
                if hanging.parent.is_none() {
                    // `hanging` is also the current root: the new node becomes
                    // its sibling and a fresh root is formed one level up.
                    let parent_hash = node_hash(Some(&hanging.hash), Some(&node.hash));
                    hanging.parent = Some(parent_hash);
                    node.parent = Some(parent_hash);

                    let parent = Node {
                        hash: parent_hash,
                        left: Some(hanging.hash),
                        right: Some(node.hash),
                        parent: None,
                        pending_old_hash: None,
                    };
                    self.nodes.insert(hanging);
                    self.nodes.insert(node);
                    self.nodes.insert(parent.clone());
                    self.metadata.hanging_nodes.remove(&level);
                    self.add_node(level + 1, parent)?;
                } else {
                    // `hanging` is already integrated under some ancestor;
                    // attach the new node as that ancestor's missing child
                    // and let the hash ripple upward without further carry.
                    let grandparent_hash = hanging.parent.expect("checked above");
                    let mut grandparent = self.nodes.get_required(&grandparent_hash)?;
                    grandparent.set_missing_child(node.hash)?;
                    node.parent = Some(grandparent.hash);
                    self.nodes.insert(node);
                    self.metadata.hanging_nodes.remove(&level);

                    let new_hash = grandparent.recompute_hash();
                    self.update_node_hash(&mut grandparent, new_hash)?;
                }
            }
        }
        Ok(())
    }

    /// Locates the node currently hashed `old_hash` and rehashes it to
    /// `new_hash`, propagating up to the root.
    pub fn update_leaf(&mut self, old_hash: Hash256, new_hash: Hash256) -> Result<()> {
        if old_hash == new_hash {
            return Err(Error::InvalidArgument(
                "update_leaf requires old and new hash to differ".into(),
            ));
        }
        let mut node = self.nodes.get_required(&old_hash)?;
        self.update_node_hash(&mut node, new_hash)
    }

    /// Rehashes `node` to `new_hash` in place and propagates the change to
    /// its parent (and so on to the root), per spec.md §4.3 steps 1-7.
    fn update_node_hash(&mut self, node: &mut Node, new_hash: Hash256) -> Result<()> {
        if node.pending_old_hash.is_none() {
            node.pending_old_hash = Some(node.hash);
        }
        let old_hash = node.hash;
        node.hash = new_hash;

        if let Some((&level, _)) = self
            .metadata
            .hanging_nodes
            .iter()
            .find(|(_, &hash)| hash == old_hash)
        {
            self.metadata.hanging_nodes.insert(level, new_hash);
        }

        self.nodes.rekey(&old_hash, node.clone());

        match node.parent {
            None => {
                // `node` is the root: repoint its children downward and
                // publish the new root hash.
                self.metadata.root_hash = Some(new_hash);
                for child_hash in [node.left, node.right].into_iter().flatten() {
                    let mut child = self.nodes.get_required(&child_hash)?;
                    child.parent = Some(new_hash);
                    self.nodes.insert(child);
                }
            }
            Some(parent_hash) => {
                if !node.is_leaf() {
                    for child_hash in [node.left, node.right].into_iter().flatten() {
                        let mut child = self.nodes.get_required(&child_hash)?;
                        child.parent = Some(new_hash);
                        self.nodes.insert(child);
                    }
                }
                let mut parent = self.nodes.get_required(&parent_hash)?;
                parent.replace_child(old_hash, new_hash)?;
                let new_parent_hash = parent.recompute_hash();
                self.update_node_hash(&mut parent, new_parent_hash)?;
            }
        }
        Ok(())
    }
}
