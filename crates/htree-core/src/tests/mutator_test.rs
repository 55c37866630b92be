use crate::metadata::MetadataRecord;
use crate::mutator::Mutator;
use crate::node_store::NodeStore;
use crate::shared::DbHandle;
use crate::TreeCf;
use htree_crypto::{hash256_concat, node_hash};
use htree_schemadb::Db;
use parking_lot::RwLock;
use std::sync::Arc;

fn node_store() -> (tempfile::TempDir, NodeStore) {
    let dir = tempfile::tempdir().unwrap();
    let db = Db::<TreeCf>::open(dir.path(), &crate::Config::default().rocksdb_options()).unwrap();
    let handle: DbHandle = Arc::new(RwLock::new(Arc::new(db)));
    (dir, NodeStore::new(handle))
}

fn leaf_hash(key: &str, value: &str) -> htree_crypto::Hash256 {
    hash256_concat(key.as_bytes(), value.as_bytes())
}

#[test]
fn single_leaf_becomes_root_with_zero_depth() {
    let (_dir, nodes) = node_store();
    let mut metadata = MetadataRecord::empty();
    let mut mutator = Mutator::new(&nodes, &mut metadata);

    let l1 = leaf_hash("k1", "v1");
    let root = mutator.add_leaf(l1).unwrap();

    assert_eq!(root, l1);
    assert_eq!(metadata.num_leaves, 1);
    assert_eq!(metadata.depth, 0);
    assert_eq!(metadata.root_hash, Some(l1));
}

#[test]
fn two_leaves_form_one_parent_at_depth_one() {
    let (_dir, nodes) = node_store();
    let mut metadata = MetadataRecord::empty();
    let mut mutator = Mutator::new(&nodes, &mut metadata);

    let l1 = leaf_hash("k1", "v1");
    let l2 = leaf_hash("k2", "v2");
    mutator.add_leaf(l1).unwrap();
    let root = mutator.add_leaf(l2).unwrap();

    assert_eq!(root, node_hash(Some(&l1), Some(&l2)));
    assert_eq!(metadata.num_leaves, 2);
    assert_eq!(metadata.depth, 1);
}

#[test]
fn three_leaves_duplicate_the_odd_one_out() {
    let (_dir, nodes) = node_store();
    let mut metadata = MetadataRecord::empty();
    let mut mutator = Mutator::new(&nodes, &mut metadata);

    let l1 = leaf_hash("k1", "v1");
    let l2 = leaf_hash("k2", "v2");
    let l3 = leaf_hash("k3", "v3");
    mutator.add_leaf(l1).unwrap();
    mutator.add_leaf(l2).unwrap();
    let root = mutator.add_leaf(l3).unwrap();

    let p12 = node_hash(Some(&l1), Some(&l2));
    let p3 = node_hash(Some(&l3), None);
    let expected_root = node_hash(Some(&p12), Some(&p3));

    assert_eq!(root, expected_root);
    assert_eq!(metadata.num_leaves, 3);
    assert_eq!(metadata.depth, 2);
}

#[test]
fn updating_a_leaf_recomputes_every_ancestor() {
    let (_dir, nodes) = node_store();
    let mut metadata = MetadataRecord::empty();
    let mut mutator = Mutator::new(&nodes, &mut metadata);

    let l1 = leaf_hash("k1", "v1");
    let l2 = leaf_hash("k2", "v2");
    let l3 = leaf_hash("k3", "v3");
    mutator.add_leaf(l1).unwrap();
    mutator.add_leaf(l2).unwrap();
    mutator.add_leaf(l3).unwrap();
    let original_root = metadata.root_hash.unwrap();

    let l1_new = leaf_hash("k1", "v1*");
    mutator.update_leaf(l1, l1_new).unwrap();

    let p12_new = node_hash(Some(&l1_new), Some(&l2));
    let p3 = node_hash(Some(&l3), None);
    let expected_root = node_hash(Some(&p12_new), Some(&p3));

    assert_ne!(metadata.root_hash.unwrap(), original_root);
    assert_eq!(metadata.root_hash, Some(expected_root));
    assert_eq!(metadata.num_leaves, 3, "updating a leaf does not change the leaf count");
}

#[test]
fn update_leaf_rejects_identical_old_and_new_hash() {
    let (_dir, nodes) = node_store();
    let mut metadata = MetadataRecord::empty();
    let mut mutator = Mutator::new(&nodes, &mut metadata);
    let l1 = leaf_hash("k1", "v1");
    mutator.add_leaf(l1).unwrap();

    assert!(mutator.update_leaf(l1, l1).is_err());
}

#[test]
fn update_leaf_on_unknown_hash_is_not_found() {
    let (_dir, nodes) = node_store();
    let mut metadata = MetadataRecord::empty();
    let mut mutator = Mutator::new(&nodes, &mut metadata);
    let l1 = leaf_hash("k1", "v1");
    mutator.add_leaf(l1).unwrap();

    let bogus = leaf_hash("nope", "nope");
    assert!(mutator.update_leaf(bogus, leaf_hash("new", "new")).is_err());
}

#[test]
fn root_determinism_under_identical_insertion_order() {
    let (_dir_a, nodes_a) = node_store();
    let (_dir_b, nodes_b) = node_store();
    let mut meta_a = MetadataRecord::empty();
    let mut meta_b = MetadataRecord::empty();

    let pairs = [("k1", "v1"), ("k2", "v2"), ("k3", "v3"), ("k4", "v4"), ("k5", "v5")];
    let mut mutator_a = Mutator::new(&nodes_a, &mut meta_a);
    let mut mutator_b = Mutator::new(&nodes_b, &mut meta_b);
    for (k, v) in pairs {
        mutator_a.add_leaf(leaf_hash(k, v)).unwrap();
        mutator_b.add_leaf(leaf_hash(k, v)).unwrap();
    }

    assert_eq!(meta_a.root_hash, meta_b.root_hash);
    assert_eq!(meta_a.depth, meta_b.depth);
}
