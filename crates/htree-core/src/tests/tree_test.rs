use crate::tests::test_config;
use crate::{Error, Tree};

#[test]
fn empty_tree_has_no_root_and_zero_depth() {
    let dir = tempfile::tempdir().unwrap();
    let tree = Tree::open(test_config(&dir), "empty").unwrap();
    assert_eq!(tree.root_hash().unwrap(), None);
    assert_eq!(tree.num_leaves().unwrap(), 0);
    assert_eq!(tree.depth().unwrap(), 0);
}

#[test]
fn opening_the_same_name_twice_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let _t1 = Tree::open(test_config(&dir), "dup").unwrap();
    let err = Tree::open(test_config(&dir), "dup").unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[test]
fn closing_a_tree_frees_its_name_for_reuse() {
    let dir = tempfile::tempdir().unwrap();
    let t1 = Tree::open(test_config(&dir), "reuse").unwrap();
    t1.close().unwrap();
    let t2 = Tree::open(test_config(&dir), "reuse");
    assert!(t2.is_ok());
}

#[test]
fn all_keys_and_values_reflect_flushed_state() {
    let dir = tempfile::tempdir().unwrap();
    let tree = Tree::open(test_config(&dir), "scan").unwrap();
    tree.put(b"a".to_vec(), b"1".to_vec()).unwrap();
    tree.put(b"b".to_vec(), b"2".to_vec()).unwrap();
    tree.flush().unwrap();

    let mut keys = tree.all_keys().unwrap();
    keys.sort();
    assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);

    let (keys2, values2) = tree.keys_and_values().unwrap();
    assert_eq!(keys2.len(), values2.len());
    assert_eq!(keys2.len(), 2);
}

#[test]
fn get_committed_skips_pending_writes() {
    let dir = tempfile::tempdir().unwrap();
    let tree = Tree::open(test_config(&dir), "committed-only").unwrap();
    tree.put(b"k".to_vec(), b"v1".to_vec()).unwrap();
    tree.flush().unwrap();
    tree.put(b"k".to_vec(), b"v2".to_vec()).unwrap();

    assert_eq!(tree.get(b"k").unwrap(), Some(b"v2".to_vec()));
    assert_eq!(tree.get_committed(b"k").unwrap(), Some(b"v1".to_vec()));
}

#[test]
fn reopening_after_flush_recovers_metadata_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let root;
    {
        let tree = Tree::open(test_config(&dir), "persisted").unwrap();
        tree.put(b"k1".to_vec(), b"v1".to_vec()).unwrap();
        tree.put(b"k2".to_vec(), b"v2".to_vec()).unwrap();
        tree.flush().unwrap();
        root = tree.root_hash().unwrap();
        tree.close().unwrap();
    }
    let reopened = Tree::open(test_config(&dir), "persisted").unwrap();
    assert_eq!(reopened.root_hash_on_disk().unwrap(), root);
    assert_eq!(reopened.get(b"k1").unwrap(), Some(b"v1".to_vec()));
    assert_eq!(reopened.num_leaves().unwrap(), 2);
}

#[test]
fn all_nodes_requires_a_prior_flush_to_be_visible() {
    let dir = tempfile::tempdir().unwrap();
    let tree = Tree::open(test_config(&dir), "nodes-scan").unwrap();
    tree.put(b"k1".to_vec(), b"v1".to_vec()).unwrap();
    tree.put(b"k2".to_vec(), b"v2".to_vec()).unwrap();
    tree.root_hash().unwrap();
    assert!(tree.all_nodes().unwrap().is_empty());

    tree.flush().unwrap();
    assert_eq!(tree.all_nodes().unwrap().len(), 3);
}
