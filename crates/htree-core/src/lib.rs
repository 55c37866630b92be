// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! A persistent authenticated key→value store: a Merkle tree whose leaves
//! are hashes of `(key, value)` pairs, backed by an embedded ordered
//! key-value engine with column families, atomic batches, and filesystem
//! checkpoints.
//!
//! See [`Tree`] for the programmatic surface.

mod clone_update;
mod commit;
mod config;
mod error;
mod kv_cache;
mod latch;
mod metadata;
mod mutator;
mod node;
mod node_store;
mod registry;
mod shared;
mod tree;

pub use clone_update::{trees_cloned, trees_updated_without_clone};
pub use config::Config;
pub use error::{Error, Result};
pub use node::Node;
pub use tree::Tree;

use htree_schemadb::NamedColumnFamily;

/// The four column families a tree opens, per spec.md §6.1. `Default` is
/// unused by the core but always present, matching the underlying engine's
/// requirement that a default column family exists.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TreeCf {
    Default,
    MetaData,
    Nodes,
    KeyData,
}

impl NamedColumnFamily for TreeCf {
    const ALL: &'static [Self] = &[Self::Default, Self::MetaData, Self::Nodes, Self::KeyData];

    fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::MetaData => "metaData",
            Self::Nodes => "nodes",
            Self::KeyData => "keyData",
        }
    }
}

#[cfg(test)]
mod tests;
