// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[from] htree_schemadb::Error),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value for key {key:02x?} failed its digest check")]
    CorruptEntry { key: Vec<u8> },

    #[error("stored value is shorter than the digest suffix")]
    Truncated,
}

pub type Result<T> = std::result::Result<T, Error>;
