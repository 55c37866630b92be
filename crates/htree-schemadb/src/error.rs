// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("rocksdb error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown column family: {0}")]
    UnknownColumnFamily(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
