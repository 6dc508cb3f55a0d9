// Copyright 2024. The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

use mutable_merkle_hashing::Hash;

/// One level of a mutable Merkle tree. Level 0 holds the leaves, level `k` the parents of level `k - 1`.
///
/// Only the populated prefix of a level is stored. Positions between the populated length and the
/// [logical size](Branch::logical_size) are implicitly Empty and are never materialised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branch {
    nodes: Vec<Hash>,
}

impl Branch {
    pub fn new(nodes: Vec<Hash>) -> Self {
        Self { nodes }
    }

    /// The number of stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The populated length rounded up to the next power of two. An unpopulated level still spans one pair.
    pub fn logical_size(&self) -> usize {
        match self.nodes.len() {
            0 => 2,
            n => n.next_power_of_two(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Hash> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[Hash] {
        &self.nodes
    }

    /// Overwrites the node at `index`, or appends it when `index` is past the populated end.
    pub(crate) fn set(&mut self, index: usize, hash: Hash) {
        match self.nodes.get_mut(index) {
            Some(node) => *node = hash,
            None => self.nodes.push(hash),
        }
    }

    pub(crate) fn push(&mut self, hash: Hash) {
        self.nodes.push(hash);
    }

    /// Removes the node at `index`, shifting every later node down by one.
    pub(crate) fn remove(&mut self, index: usize) -> Hash {
        self.nodes.remove(index)
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    /// Cuts the level down to half its logical size.
    pub(crate) fn prune(&mut self) {
        let len = self.logical_size() >> 1;
        self.nodes.truncate(len);
    }

    pub(crate) fn take_first(mut self) -> Option<Hash> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(self.nodes.swap_remove(0))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn nodes(n: usize) -> Vec<Hash> {
        (0..n).map(|i| vec![i as u8; 4]).collect()
    }

    #[test]
    fn logical_size_rounds_up_to_a_power_of_two() {
        let sizes = [(0, 2), (1, 1), (2, 2), (3, 4), (4, 4), (5, 8), (15, 16), (21, 32), (54, 64)];
        for (len, size) in sizes {
            assert_eq!(Branch::new(nodes(len)).logical_size(), size, "len {}", len);
        }
    }

    #[test]
    fn set_overwrites_or_appends() {
        let mut branch = Branch::new(nodes(2));
        branch.set(1, vec![9; 4]);
        assert_eq!(branch.len(), 2);
        assert_eq!(branch.get(1), Some(&vec![9; 4]));
        branch.set(2, vec![7; 4]);
        assert_eq!(branch.len(), 3);
        assert_eq!(branch.get(2), Some(&vec![7; 4]));
        assert_eq!(branch.get(3), None);
    }

    #[test]
    fn prune_halves_the_logical_size() {
        let mut branch = Branch::new(nodes(5));
        branch.prune();
        assert_eq!(branch.len(), 4);
        branch.prune();
        assert_eq!(branch.len(), 2);
        branch.prune();
        assert_eq!(branch.len(), 1);
        assert_eq!(branch.take_first(), Some(vec![0; 4]));
    }

    #[test]
    fn remove_shifts_later_nodes_down() {
        let mut branch = Branch::new(nodes(4));
        assert_eq!(branch.remove(1), vec![1; 4]);
        assert_eq!(branch.nodes(), &[vec![0; 4], vec![2; 4], vec![3; 4]]);
    }
}
