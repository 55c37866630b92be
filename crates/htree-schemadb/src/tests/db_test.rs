// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{Db, NamedColumnFamily};
use rocksdb::Options;
use tempfile::tempdir;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum TestCf {
    Alpha,
    Beta,
}

impl NamedColumnFamily for TestCf {
    const ALL: &'static [Self] = &[Self::Alpha, Self::Beta];

    fn name(&self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
        }
    }
}

fn open_db() -> (tempfile::TempDir, Db<TestCf>) {
    let dir = tempdir().unwrap();
    let db = Db::<TestCf>::open(dir.path(), &Options::default()).unwrap();
    (dir, db)
}

#[test]
fn put_get_delete_round_trip() {
    let (_dir, db) = open_db();
    db.put_cf(TestCf::Alpha, b"k", b"v").unwrap();
    assert_eq!(db.get_cf(TestCf::Alpha, b"k").unwrap().as_deref(), Some(&b"v"[..]));

    db.delete_cf(TestCf::Alpha, b"k").unwrap();
    assert_eq!(db.get_cf(TestCf::Alpha, b"k").unwrap(), None);
}

#[test]
fn column_families_are_independent() {
    let (_dir, db) = open_db();
    db.put_cf(TestCf::Alpha, b"k", b"alpha-value").unwrap();
    db.put_cf(TestCf::Beta, b"k", b"beta-value").unwrap();

    assert_eq!(db.get_cf(TestCf::Alpha, b"k").unwrap().as_deref(), Some(&b"alpha-value"[..]));
    assert_eq!(db.get_cf(TestCf::Beta, b"k").unwrap().as_deref(), Some(&b"beta-value"[..]));
}

#[test]
fn batch_write_is_atomic_across_column_families() {
    let (_dir, db) = open_db();
    let mut batch = db.new_batch();
    batch.put_cf(TestCf::Alpha, b"k1", b"v1").unwrap();
    batch.put_cf(TestCf::Beta, b"k2", b"v2").unwrap();
    db.write(batch).unwrap();

    assert_eq!(db.get_cf(TestCf::Alpha, b"k1").unwrap().as_deref(), Some(&b"v1"[..]));
    assert_eq!(db.get_cf(TestCf::Beta, b"k2").unwrap().as_deref(), Some(&b"v2"[..]));
}

#[test]
fn clear_cf_removes_all_entries_but_leaves_other_cf_alone() {
    let (_dir, db) = open_db();
    db.put_cf(TestCf::Alpha, b"a", b"1").unwrap();
    db.put_cf(TestCf::Alpha, b"b", b"2").unwrap();
    db.put_cf(TestCf::Beta, b"c", b"3").unwrap();

    db.clear_cf(TestCf::Alpha).unwrap();

    assert_eq!(db.iter_cf(TestCf::Alpha).unwrap().count(), 0);
    assert_eq!(db.iter_cf(TestCf::Beta).unwrap().count(), 1);
}

#[test]
fn checkpoint_produces_an_independently_readable_copy() {
    let (_dir, db) = open_db();
    db.put_cf(TestCf::Alpha, b"k", b"v").unwrap();

    let checkpoint_dir = tempdir().unwrap();
    let checkpoint_path = checkpoint_dir.path().join("snap");
    db.create_checkpoint(&checkpoint_path).unwrap();
    drop(db);

    let reopened = Db::<TestCf>::open(&checkpoint_path, &Options::default()).unwrap();
    assert_eq!(reopened.get_cf(TestCf::Alpha, b"k").unwrap().as_deref(), Some(&b"v"[..]));
}
