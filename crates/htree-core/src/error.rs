// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Error kinds conceptually scoped by spec.md §7. Propagated with `?`
/// everywhere except the commit worker's per-item catch (see `commit.rs`),
/// which is the one sanctioned catch-and-log site.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("tree is closed")]
    TreeClosed,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("io failure: {0}")]
    IoFailure(#[from] htree_schemadb::Error),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("interrupted while waiting for pending writes to drain")]
    Interrupted,

    #[error("corrupt state: {0}")]
    CorruptState(String),
}

pub type Result<T> = std::result::Result<T, Error>;
