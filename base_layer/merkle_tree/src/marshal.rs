// Copyright 2024. The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

//! The persisted form of a [`MutableMerkleTree`].
//!
//! Digests are hex encoded, and each level is stored as the hex of its digests concatenated in order, keyed by the
//! level index. Unmarshalling restores the exact level layout, not just the root, so a restored tree continues to
//! accept mutations as if it had never been persisted.

use std::collections::BTreeMap;

use log::*;
use mutable_merkle_hashing::{Hash, HashKind};
use serde::{Deserialize, Serialize};
use tari_utilities::hex::{from_hex, to_hex, Hex};

use crate::{branch::Branch, error::MerkleTreeError, mutable_merkle_tree::MutableMerkleTree};

const LOG_TARGET: &str = "mutable_merkle::marshal";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreePayload {
    pub hash_kind: String,
    pub root: String,
    pub branches: BTreeMap<usize, String>,
    pub leaf_count: usize,
    pub branch_count: usize,
}

impl MutableMerkleTree {
    pub fn marshal(&self) -> TreePayload {
        let branches = self
            .branches()
            .iter()
            .enumerate()
            .map(|(level, branch)| (level, branch.nodes().concat().to_hex()))
            .collect();
        TreePayload {
            hash_kind: self.hash_kind().to_string(),
            root: to_hex(self.root()),
            branches,
            leaf_count: self.len(),
            branch_count: self.branch_count(),
        }
    }

    /// Restores a tree from its payload. The payload is checked for internal consistency but the branch contents
    /// are not rehashed.
    pub fn unmarshal(payload: &TreePayload) -> Result<Self, MerkleTreeError> {
        decode(payload).map_err(|err| {
            warn!(target: LOG_TARGET, "Rejected tree payload: {}", err);
            err
        })
    }
}

fn decode(payload: &TreePayload) -> Result<MutableMerkleTree, MerkleTreeError> {
    let hash_kind = payload.hash_kind.parse::<HashKind>()?;
    let digest_len = hash_kind.digest_len();

    let root = decode_hex("root", &payload.root)?;
    if root.len() != digest_len {
        return Err(MerkleTreeError::MalformedPayload(format!(
            "root is {} bytes, expected {}",
            root.len(),
            digest_len
        )));
    }

    if payload.branches.len() != payload.branch_count {
        return Err(MerkleTreeError::MalformedPayload(format!(
            "branch_count is {} but {} branches are present",
            payload.branch_count,
            payload.branches.len()
        )));
    }

    let mut branches = Vec::with_capacity(payload.branch_count);
    for (expected_level, (level, encoded)) in payload.branches.iter().enumerate() {
        if *level != expected_level {
            return Err(MerkleTreeError::MalformedPayload(format!(
                "branch levels must be contiguous from 0, found level {} at position {}",
                level, expected_level
            )));
        }
        let bytes = decode_hex(&format!("branch {}", level), encoded)?;
        if bytes.len() % digest_len != 0 {
            return Err(MerkleTreeError::MalformedPayload(format!(
                "branch {} is {} bytes, not a whole number of {} byte digests",
                level,
                bytes.len(),
                digest_len
            )));
        }
        let nodes = bytes.chunks(digest_len).map(<[u8]>::to_vec).collect::<Vec<Hash>>();
        branches.push(Branch::new(nodes));
    }

    check_leaf_count(payload.leaf_count, branches.first())?;
    check_depth(payload.leaf_count, branches.len())?;
    check_level_lengths(&branches)?;
    Ok(MutableMerkleTree::from_parts(
        hash_kind,
        root,
        branches,
        payload.leaf_count,
    ))
}

fn decode_hex(field: &str, encoded: &str) -> Result<Vec<u8>, MerkleTreeError> {
    from_hex(encoded).map_err(|err| MerkleTreeError::MalformedPayload(format!("{} is not valid hex: {}", field, err)))
}

/// Level 0 holds exactly the live leaves, except that a lone leaf is paired with Empty.
fn check_leaf_count(leaf_count: usize, leaves: Option<&Branch>) -> Result<(), MerkleTreeError> {
    let consistent = match leaves {
        None => leaf_count == 0,
        Some(leaves) => leaf_count > 0 && (leaves.len() == leaf_count || (leaf_count == 1 && leaves.len() == 2)),
    };
    if consistent {
        Ok(())
    } else {
        Err(MerkleTreeError::MalformedPayload(format!(
            "leaf_count {} does not match {} nodes at level 0",
            leaf_count,
            leaves.map(Branch::len).unwrap_or(0)
        )))
    }
}

/// A tree with leaves has exactly the levels needed to span the next power of two, and never fewer than one.
fn check_depth(leaf_count: usize, branch_count: usize) -> Result<(), MerkleTreeError> {
    let expected = match leaf_count {
        0 => 0,
        n => (n.next_power_of_two().trailing_zeros() as usize).max(1),
    };
    if branch_count == expected {
        Ok(())
    } else {
        Err(MerkleTreeError::MalformedPayload(format!(
            "{} leaves need {} branches, found {}",
            leaf_count, expected, branch_count
        )))
    }
}

fn check_level_lengths(branches: &[Branch]) -> Result<(), MerkleTreeError> {
    for (level, pair) in branches.windows(2).enumerate() {
        let max_len = (pair[0].len() + 1) / 2;
        if pair[1].is_empty() || pair[1].len() > max_len {
            return Err(MerkleTreeError::MalformedPayload(format!(
                "branch {} has {} nodes, expected between 1 and {}",
                level + 1,
                pair[1].len(),
                max_len
            )));
        }
    }
    Ok(())
}

impl From<MutableMerkleTree> for TreePayload {
    fn from(tree: MutableMerkleTree) -> Self {
        tree.marshal()
    }
}

impl TryFrom<TreePayload> for MutableMerkleTree {
    type Error = MerkleTreeError;

    fn try_from(payload: TreePayload) -> Result<Self, Self::Error> {
        MutableMerkleTree::unmarshal(&payload)
    }
}
