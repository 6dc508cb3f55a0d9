// Copyright 2024. The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

//! Hashing primitives and proof algebra for mutable Merkle trees.
//!
//! Nothing in this crate knows about tree structure. It provides:
//! * [`HashKind`], the fixed registry of supported hash functions and their digest lengths,
//! * [`hash`] and [`combine`], the two operations every tree node is built from,
//! * [`MerkleProof`] together with [`verify_proof`] and [`combine_proofs`].
//!
//! ```
//! use mutable_merkle_hashing::{combine, hash, HashKind};
//!
//! let kind = HashKind::Sha256;
//! let left = hash(kind, b"a");
//! let right = kind.empty_hash();
//! assert_eq!(combine(kind, &left, &right), kind.hash(&[left.as_slice(), right.as_slice()].concat()));
//! ```

mod error;
mod hash_kind;
mod proof;

pub use error::{HashKindError, MerkleProofError};
pub use hash_kind::{combine, hash, HashKind, MAX_DIGEST_LEN};
pub use proof::{combine_proofs, verify_proof, MerkleProof, ProofEntry, ProofStep, Side, ROOT_MARKER};

/// An owned digest.
pub type Hash = Vec<u8>;
/// A borrowed digest.
pub type HashSlice = [u8];
