// Copyright 2024. The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

//! # Mutable Merkle tree
//!
//! A binary Merkle tree that supports appending, updating and removing leaves after construction, while keeping
//! every intermediate level so each mutation touches only the affected path.
//!
//! ```
//! use mutable_merkle::{HashKind, MutableMerkleTree};
//!
//! let mut tree = MutableMerkleTree::build(vec![b"a", b"b", b"c"], HashKind::Sha256, false).unwrap();
//! tree.add_leaf(b"d", false).unwrap();
//! tree.remove_leaf(0).unwrap();
//!
//! let proof = tree.get_proof(1).unwrap();
//! assert!(proof.verify(&HashKind::Sha256.hash(b"c")).unwrap());
//!
//! let rebuilt = MutableMerkleTree::build(vec![b"b", b"c", b"d"], HashKind::Sha256, false).unwrap();
//! assert_eq!(tree, rebuilt);
//! ```
//!
//! Inclusion proofs are [`MerkleProof`]s from the `mutable_merkle_hashing` crate, and are checked with
//! [`verify_proof`]. A proof from a tree whose root is itself a leaf of a parent tree can be chained to the parent's
//! proof with [`combine_proofs`].
//!
//! A tree is persisted with [`MutableMerkleTree::marshal`] and restored with [`MutableMerkleTree::unmarshal`]; it
//! also implements serde through the same [`TreePayload`].

mod branch;
mod config;
mod error;
mod marshal;
mod mutable_merkle_tree;

pub use branch::Branch;
pub use config::MerkleTreeConfig;
pub use error::MerkleTreeError;
pub use marshal::TreePayload;
pub use mutable_merkle_hashing::{
    combine_proofs,
    verify_proof,
    Hash,
    HashKind,
    HashSlice,
    MerkleProof,
    MerkleProofError,
    ProofStep,
    Side,
};
pub use mutable_merkle_tree::MutableMerkleTree;
