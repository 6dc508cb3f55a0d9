// Copyright 2024. The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

use mutable_merkle::{Hash, HashKind, MutableMerkleTree};

pub const KIND: HashKind = HashKind::Sha256;

/// Single-letter leaves `a`, `b`, `c`, ... used throughout the known-root tests.
pub fn letters(n: usize) -> Vec<Vec<u8>> {
    (0..n).map(|i| vec![b'a' + i as u8]).collect()
}

pub fn create_tree(n: usize) -> MutableMerkleTree {
    MutableMerkleTree::build(letters(n), KIND, false).unwrap()
}

pub fn int_to_hash(n: usize) -> Hash {
    KIND.hash(&n.to_le_bytes())
}

/// Asserts that `tree` is laid out exactly as a batch-built tree over `leaves` (pre-hashed).
pub fn assert_matches_batch(tree: &MutableMerkleTree, leaves: &[Hash]) {
    let expected = MutableMerkleTree::build(leaves, tree.hash_kind(), true).unwrap();
    assert_eq!(tree.root(), expected.root());
    assert_eq!(tree.len(), expected.len());
    assert_eq!(tree.branch_count(), expected.branch_count());
    assert_eq!(tree.branches(), expected.branches());
}
