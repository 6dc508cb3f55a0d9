// Copyright 2024. The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

#[allow(dead_code)]
mod support;

use mutable_merkle::{HashKind, MutableMerkleTree};
use rand::{rngs::StdRng, Rng, SeedableRng};
use support::assert_matches_batch;

fn random_leaf(rng: &mut StdRng, kind: HashKind) -> Vec<u8> {
    let mut value = [0u8; 16];
    rng.fill(&mut value);
    kind.hash(&value)
}

/// Applies a random mix of appends, updates and removals and checks the tree against a batch build after every step.
fn run_random_mutations(kind: HashKind, seed: u64, steps: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = MutableMerkleTree::new(kind);
    let mut leaves: Vec<Vec<u8>> = Vec::new();

    for _ in 0..steps {
        match rng.gen_range(0..10) {
            0..=4 => {
                let leaf = random_leaf(&mut rng, kind);
                assert_eq!(tree.add_leaf(&leaf, true).unwrap(), leaves.len());
                leaves.push(leaf);
            },
            5..=6 if !leaves.is_empty() => {
                let index = rng.gen_range(0..leaves.len());
                let leaf = random_leaf(&mut rng, kind);
                tree.update_leaf(&leaf, index, true).unwrap();
                leaves[index] = leaf;
            },
            _ if !leaves.is_empty() => {
                let index = rng.gen_range(0..leaves.len());
                assert_eq!(tree.remove_leaf(index).unwrap(), leaves.remove(index));
            },
            _ => {},
        }
        assert_matches_batch(&tree, &leaves);
    }
}

#[test]
fn random_mutations_match_batch_construction() {
    for seed in 0..8 {
        run_random_mutations(HashKind::Sha256, seed, 300);
    }
}

#[test]
fn random_mutations_with_wide_digests() {
    run_random_mutations(HashKind::Sha512, 42, 300);
    run_random_mutations(HashKind::Blake2b512, 7, 300);
}

#[test]
fn drain_from_the_front_then_refill() {
    let kind = HashKind::Blake2b256;
    let mut rng = StdRng::seed_from_u64(1);
    let mut leaves = (0..37).map(|_| random_leaf(&mut rng, kind)).collect::<Vec<_>>();
    let mut tree = MutableMerkleTree::build(&leaves, kind, true).unwrap();

    while !leaves.is_empty() {
        tree.remove_leaf(0).unwrap();
        leaves.remove(0);
        assert_matches_batch(&tree, &leaves);
    }
    assert!(tree.is_empty());

    for _ in 0..20 {
        let leaf = random_leaf(&mut rng, kind);
        tree.add_leaf(&leaf, true).unwrap();
        leaves.push(leaf);
        assert_matches_batch(&tree, &leaves);
    }
}
