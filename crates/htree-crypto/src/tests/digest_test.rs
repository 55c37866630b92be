// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{hash224, hash256, hash256_concat, leaf_hash, node_hash, Hash256, HASH224_LEN, HASH256_LEN};
use proptest::prelude::*;

#[test]
fn hash256_is_deterministic() {
    let a = hash256(b"hello world");
    let b = hash256(b"hello world");
    assert_eq!(a, b);
    assert_eq!(a.as_bytes().len(), HASH256_LEN);
}

#[test]
fn hash256_concat_equals_hash_of_concatenation() {
    let a = b"key".to_vec();
    let b = b"value".to_vec();
    let mut joined = a.clone();
    joined.extend_from_slice(&b);

    assert_eq!(hash256_concat(&a, &b), hash256(&joined));
}

#[test]
fn leaf_hash_matches_two_argument_h256() {
    assert_eq!(leaf_hash(b"k1", b"v1"), hash256_concat(b"k1", b"v1"));
}

#[test]
fn hash224_has_expected_length() {
    let h = hash224(b"adjunct");
    assert_eq!(h.as_bytes().len(), HASH224_LEN);
}

#[test]
fn odd_arity_duplicates_the_present_child() {
    let only = hash256(b"solo");
    assert_eq!(node_hash(Some(&only), None), hash256_concat(only.as_slice(), only.as_slice()));
    assert_eq!(node_hash(None, Some(&only)), hash256_concat(only.as_slice(), only.as_slice()));
}

#[test]
fn from_slice_rejects_wrong_length() {
    assert!(Hash256::from_slice(&[0u8; 31]).is_none());
    assert!(Hash256::from_slice(&[0u8; 32]).is_some());
}

proptest! {
    #[test]
    fn hash256_never_collides_trivially(a in proptest::collection::vec(any::<u8>(), 0..64),
                                         b in proptest::collection::vec(any::<u8>(), 0..64)) {
        if a != b {
            prop_assert_ne!(hash256(&a), hash256(&b));
        }
    }
}
