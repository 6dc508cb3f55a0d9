// Copyright 2024. The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

use log::*;
use mutable_merkle_hashing::{Hash, HashKind, HashSlice, MerkleProof, ProofStep, Side};
use serde::{Deserialize, Serialize};
use tari_utilities::hex::Hex;

use crate::{branch::Branch, config::MerkleTreeConfig, error::MerkleTreeError, marshal::TreePayload};

const LOG_TARGET: &str = "mutable_merkle::tree";

/// A binary Merkle tree whose leaves can be appended, updated in place and removed.
///
/// The tree keeps one [`Branch`] of intermediate hashes per level, so every mutation only recomputes the path (or,
/// for removals, the range) it touches. Absent siblings are represented by the all-zero Empty hash of the tree's
/// [`HashKind`] and are never stored past the populated end of a level.
///
/// ```text
///                  root = h(h01 || h2E)
///                 /                    \
///    level 1   h01 = h(l0 || l1)     h2E = h(l2 || Empty)
///              /         \            /          \
///    level 0  l0         l1          l2        (Empty)
/// ```
///
/// The tree deepens by one level when an append would overflow the leaf level's power-of-two capacity, and shrinks
/// by one level when a removal leaves it at most half full. A tree that reached a given set of leaves through any
/// sequence of appends, updates and removals has the same root and level layout as one built from those leaves in a
/// single batch.
///
/// Two trees are equal when their roots are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "TreePayload", try_from = "TreePayload")]
pub struct MutableMerkleTree {
    hash_kind: HashKind,
    root: Hash,
    branches: Vec<Branch>,
    leaf_count: usize,
}

impl MutableMerkleTree {
    /// Creates an empty tree. Its root is the Empty hash and it has no levels.
    pub fn new(hash_kind: HashKind) -> Self {
        Self {
            hash_kind,
            root: hash_kind.empty_hash(),
            branches: Vec::new(),
            leaf_count: 0,
        }
    }

    pub fn from_config(config: &MerkleTreeConfig) -> Self {
        Self::new(config.hash_kind)
    }

    /// Builds a tree from `leaves` using the hash kind and leaf encoding of `config`.
    pub fn build_with_config<I, T>(leaves: I, config: &MerkleTreeConfig) -> Result<Self, MerkleTreeError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        Self::build(leaves, config.hash_kind, config.pre_hashed_leaves)
    }

    /// Builds a tree from a batch of leaf values.
    ///
    /// When `pre_hashed` is set the values are used as leaf hashes directly and must be exactly one digest long,
    /// otherwise every value is hashed first.
    pub fn build<I, T>(leaves: I, hash_kind: HashKind, pre_hashed: bool) -> Result<Self, MerkleTreeError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut tree = Self::new(hash_kind);
        let leaves = leaves
            .into_iter()
            .map(|leaf| tree.leaf_hash(leaf.as_ref(), pre_hashed))
            .collect::<Result<Vec<_>, _>>()?;
        if leaves.is_empty() {
            return Ok(tree);
        }

        let leaf_count = leaves.len();
        let base_count = leaf_count.next_power_of_two();
        if base_count == 1 {
            // A lone leaf still needs a level to be paired against Empty
            tree.add_branch();
        } else {
            let empty = hash_kind.empty_hash();
            tree.branches = (0..base_count.trailing_zeros())
                .map(|_| Branch::new(vec![empty.clone(), empty.clone()]))
                .collect();
        }

        tree.leaf_count = leaf_count;
        tree.branches[0] = Branch::new(leaves);
        if leaf_count == 1 {
            tree.branches[0].push(hash_kind.empty_hash());
        }
        tree.rebuild_branch(0, 0, leaf_count - 1);
        debug!(
            target: LOG_TARGET,
            "Built {} tree with {} leaves over {} levels, root {}",
            hash_kind,
            leaf_count,
            tree.branches.len(),
            tree.root.to_hex()
        );
        Ok(tree)
    }

    pub fn hash_kind(&self) -> HashKind {
        self.hash_kind
    }

    /// The digest summarising every leaf. Empty when the tree has no leaves.
    pub fn root(&self) -> &HashSlice {
        &self.root
    }

    /// The number of live leaves.
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// The number of levels below the root.
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn branch(&self, level: usize) -> Option<&Branch> {
        self.branches.get(level)
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Returns the hash stored for the leaf at `index`, or `None` if there is no such leaf.
    pub fn get_leaf_hash(&self, index: usize) -> Option<&Hash> {
        if index >= self.leaf_count {
            return None;
        }
        self.branches.first().and_then(|leaves| leaves.get(index))
    }

    /// Appends a leaf and returns its index.
    pub fn add_leaf(&mut self, value: &[u8], pre_hashed: bool) -> Result<usize, MerkleTreeError> {
        let hash = self.leaf_hash(value, pre_hashed)?;

        if self.branches.is_empty() || self.leaf_count + 1 > self.branches[0].logical_size() {
            self.add_branch();
            debug!(
                target: LOG_TARGET,
                "Tree deepened to {} levels to fit leaf {}",
                self.branches.len(),
                self.leaf_count
            );
        }

        let index = self.leaf_count;
        self.branches[0].set(index, hash.clone());
        self.leaf_count += 1;
        self.update_parent(hash, index, 0, true);
        trace!(target: LOG_TARGET, "Added leaf {}, root is now {}", index, self.root.to_hex());
        Ok(index)
    }

    /// Replaces the leaf at `index`.
    pub fn update_leaf(&mut self, value: &[u8], index: usize, pre_hashed: bool) -> Result<(), MerkleTreeError> {
        self.check_index(index)?;
        let hash = self.leaf_hash(value, pre_hashed)?;

        self.branches[0].set(index, hash.clone());
        self.update_parent(hash, index, 0, true);
        trace!(target: LOG_TARGET, "Updated leaf {}, root is now {}", index, self.root.to_hex());
        Ok(())
    }

    /// Removes the leaf at `index`, shifting every later leaf down by one position, and returns its hash.
    pub fn remove_leaf(&mut self, index: usize) -> Result<Hash, MerkleTreeError> {
        self.check_index(index)?;
        let empty = self.hash_kind.empty_hash();

        let removed = self.branches[0].remove(index);
        self.branches[0].push(empty.clone());
        self.leaf_count -= 1;

        if self.leaf_count == 0 {
            self.branches.clear();
            self.root = empty;
        } else if self.leaf_count > 1 && self.leaf_count <= self.branches[0].logical_size() >> 1 {
            self.branches.iter_mut().for_each(Branch::prune);
            self.remove_branch();
            debug!(
                target: LOG_TARGET,
                "Tree shrank to {} levels after removing leaf {}",
                self.branches.len(),
                index
            );
        }

        if !self.branches.is_empty() {
            // After shrinking, the removed position can sit exactly on the new capacity boundary
            let start = if index == self.branches[0].logical_size() {
                index - 1
            } else {
                index
            };
            self.rebuild_branch(0, start, self.leaf_count - 1);
        }
        trace!(
            target: LOG_TARGET,
            "Removed leaf {}, {} leaves remain, root is now {}",
            index,
            self.leaf_count,
            self.root.to_hex()
        );
        Ok(removed)
    }

    /// Generates an inclusion proof for the leaf at `index`.
    pub fn get_proof(&self, index: usize) -> Result<MerkleProof, MerkleTreeError> {
        self.check_index(index)?;
        let mut index = index;
        let path = (0..self.branches.len())
            .map(|level| {
                let sibling = sibling_index(index);
                let step = ProofStep::new(Side::of_index(sibling), self.node_or_empty(level, sibling));
                index >>= 1;
                step
            })
            .collect();
        Ok(MerkleProof::new(self.hash_kind, path, self.root.clone()))
    }

    pub(crate) fn from_parts(hash_kind: HashKind, root: Hash, branches: Vec<Branch>, leaf_count: usize) -> Self {
        Self {
            hash_kind,
            root,
            branches,
            leaf_count,
        }
    }

    fn leaf_hash(&self, value: &[u8], pre_hashed: bool) -> Result<Hash, MerkleTreeError> {
        if !pre_hashed {
            return Ok(self.hash_kind.hash(value));
        }
        let expected = self.hash_kind.digest_len();
        if value.len() != expected {
            return Err(MerkleTreeError::InvalidHashLength {
                expected,
                actual: value.len(),
            });
        }
        Ok(value.to_vec())
    }

    fn check_index(&self, index: usize) -> Result<(), MerkleTreeError> {
        if index >= self.leaf_count {
            return Err(MerkleTreeError::IndexOutOfRange {
                index,
                len: self.leaf_count,
            });
        }
        Ok(())
    }

    fn node_or_empty(&self, level: usize, index: usize) -> Hash {
        self.branches[level]
            .get(index)
            .cloned()
            .unwrap_or_else(|| self.hash_kind.empty_hash())
    }

    /// Adds a new top level holding the current root and an Empty sibling.
    fn add_branch(&mut self) {
        let branch = Branch::new(vec![self.root.clone(), self.hash_kind.empty_hash()]);
        self.branches.push(branch);
    }

    /// Drops the top level. Its first node becomes the root.
    fn remove_branch(&mut self) {
        let empty = self.hash_kind.empty_hash();
        if let Some(top) = self.branches.pop() {
            self.root = top.take_first().unwrap_or(empty);
        }
    }

    /// Recombines the node at `index` of `level` with its sibling and writes the parent one level up, or into the
    /// root from the top level. With `recurse`, continues until the root has been rewritten.
    fn update_parent(&mut self, mut value: Hash, mut index: usize, mut level: usize, recurse: bool) {
        loop {
            let sibling = self.node_or_empty(level, sibling_index(index));
            let parent = match Side::of_index(index) {
                Side::Left => self.hash_kind.hash_together(&value, &sibling),
                Side::Right => self.hash_kind.hash_together(&sibling, &value),
            };
            let parent_index = index >> 1;

            if level + 1 == self.branches.len() {
                self.root = parent;
                return;
            }
            if !recurse {
                self.branches[level + 1].set(parent_index, parent);
                return;
            }
            self.branches[level + 1].set(parent_index, parent.clone());
            value = parent;
            index = parent_index;
            level += 1;
        }
    }

    /// Recomputes every parent of the nodes `start..=end` of `level`, and so on up to the root.
    ///
    /// Nodes past `end` are stale leftovers of a larger population and are dropped first. A level that collapses to a
    /// single node keeps an Empty partner so it is laid out exactly as a freshly built one.
    fn rebuild_branch(&mut self, mut level: usize, mut start: usize, mut end: usize) {
        let empty = self.hash_kind.empty_hash();
        loop {
            let branch = &mut self.branches[level];
            if branch.logical_size() > end + 1 {
                branch.truncate(end + 1);
                if end == 0 {
                    branch.push(empty.clone());
                }
            }

            // Widen the range to whole sibling pairs
            if Side::of_index(start) == Side::Right {
                start -= 1;
            }
            if Side::of_index(end) == Side::Left {
                end += 1;
            }
            for index in (start..end).step_by(2) {
                let value = self.node_or_empty(level, index);
                self.update_parent(value, index, level, false);
            }

            start >>= 1;
            end >>= 1;
            if level + 1 >= self.branches.len() {
                break;
            }
            level += 1;
        }
    }
}

fn sibling_index(index: usize) -> usize {
    index ^ 1
}

impl PartialEq for MutableMerkleTree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl Eq for MutableMerkleTree {}
