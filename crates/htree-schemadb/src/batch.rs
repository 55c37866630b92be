// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{Db, NamedColumnFamily, Result};
use rocksdb::WriteBatch;

/// An atomic batch of writes across column families, committed with a single
/// call to [`Db::write`].
pub struct SchemaBatch<'a, CF> {
    db: &'a Db<CF>,
    inner: WriteBatch,
}

impl<'a, CF: NamedColumnFamily> SchemaBatch<'a, CF> {
    pub(crate) fn new(db: &'a Db<CF>) -> Self {
        Self { db, inner: WriteBatch::default() }
    }

    pub fn put_cf(&mut self, cf: CF, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<()> {
        let handle = self.db.cf_handle(cf)?;
        self.inner.put_cf(handle, key, value);
        Ok(())
    }

    pub fn delete_cf(&mut self, cf: CF, key: impl AsRef<[u8]>) -> Result<()> {
        let handle = self.db.cf_handle(cf)?;
        self.inner.delete_cf(handle, key);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub(crate) fn into_inner(self) -> WriteBatch {
        self.inner
    }
}
