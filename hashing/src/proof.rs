// Copyright 2024. The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

use std::convert::TryFrom;

use log::*;
use serde::{Deserialize, Serialize};
use tari_utilities::hex::{from_hex, Hex};

use crate::{error::MerkleProofError, Hash, HashKind, HashSlice};

const LOG_TARGET: &str = "mutable_merkle_hashing::proof";

/// Tag of the terminal entry of a serialized proof.
pub const ROOT_MARKER: &str = "ROOT";

/// Which operand of `combine` a node occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Even indices are left children, odd indices are right children.
    pub fn of_index(index: usize) -> Self {
        if index & 1 == 0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// One level of an inclusion proof: the sibling digest and the side it is combined on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofStep {
    pub side: Side,
    pub sibling: Hash,
}

impl ProofStep {
    pub fn new(side: Side, sibling: Hash) -> Self {
        Self { side, sibling }
    }
}

/// A single element of the flat proof encoding: either the leading hash kind header or a `(tag, hex digest)` pair,
/// where the tag is a [`Side`] or [`ROOT_MARKER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProofEntry {
    Header(String),
    Node(String, String),
}

/// An inclusion proof for one leaf of a mutable Merkle tree.
///
/// Serialized, a proof is a flat sequence `[header, step_1, ..., step_k, ["ROOT", root]]`, where the header is the
/// hash kind identifier and every step is `["left" | "right", hex(sibling)]`. This makes a proof self-describing:
/// the verifier learns which hash function to replay from the proof itself.
///
/// A proof whose leaf is the root of another tree can be spliced onto that tree's proofs with [`combine_proofs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<ProofEntry>", try_from = "Vec<ProofEntry>")]
pub struct MerkleProof {
    hash_kind: HashKind,
    path: Vec<ProofStep>,
    root: Hash,
}

impl MerkleProof {
    pub fn new(hash_kind: HashKind, path: Vec<ProofStep>, root: Hash) -> Self {
        Self { hash_kind, path, root }
    }

    pub fn hash_kind(&self) -> HashKind {
        self.hash_kind
    }

    /// The sibling steps, ordered from the leaf level upwards.
    pub fn path(&self) -> &[ProofStep] {
        &self.path
    }

    pub fn root(&self) -> &HashSlice {
        &self.root
    }

    /// Folds `leaf_hash` through every step of the proof and returns the resulting root.
    pub fn compute_root(&self, leaf_hash: &HashSlice) -> Result<Hash, MerkleProofError> {
        self.check_hash_len(leaf_hash)?;
        self.check_lengths()?;
        let kind = self.hash_kind;
        let computed = self.path.iter().fold(leaf_hash.to_vec(), |acc, step| match step.side {
            Side::Right => kind.hash_together(&acc, &step.sibling),
            Side::Left => kind.hash_together(&step.sibling, &acc),
        });
        Ok(computed)
    }

    /// Checks that `leaf_hash` is included under this proof's root. A well-formed proof that does not match returns
    /// `Ok(false)`; digests of the wrong length are an error.
    #[must_use = "Must use the result of the proof verification"]
    pub fn verify(&self, leaf_hash: &HashSlice) -> Result<bool, MerkleProofError> {
        let computed = self.compute_root(leaf_hash)?;
        let is_valid = computed == self.root;
        if !is_valid {
            debug!(
                target: LOG_TARGET,
                "Proof with {} step(s) computed root {} but expected {}",
                self.path.len(),
                computed.to_hex(),
                self.root.to_hex()
            );
        }
        Ok(is_valid)
    }

    /// The flat, self-describing form of this proof.
    pub fn to_entries(&self) -> Vec<ProofEntry> {
        let mut entries = Vec::with_capacity(self.path.len() + 2);
        entries.push(ProofEntry::Header(self.hash_kind.to_string()));
        entries.extend(
            self.path
                .iter()
                .map(|step| ProofEntry::Node(step.side.as_str().to_string(), step.sibling.to_hex())),
        );
        entries.push(ProofEntry::Node(ROOT_MARKER.to_string(), self.root.to_hex()));
        entries
    }

    fn check_lengths(&self) -> Result<(), MerkleProofError> {
        self.path
            .iter()
            .try_for_each(|step| self.check_hash_len(&step.sibling))?;
        self.check_hash_len(&self.root)
    }

    fn check_hash_len(&self, hash: &HashSlice) -> Result<(), MerkleProofError> {
        let expected = self.hash_kind.digest_len();
        if hash.len() == expected {
            Ok(())
        } else {
            Err(MerkleProofError::InvalidHashLength {
                expected,
                actual: hash.len(),
            })
        }
    }
}

impl From<MerkleProof> for Vec<ProofEntry> {
    fn from(proof: MerkleProof) -> Self {
        proof.to_entries()
    }
}

impl TryFrom<Vec<ProofEntry>> for MerkleProof {
    type Error = MerkleProofError;

    fn try_from(entries: Vec<ProofEntry>) -> Result<Self, Self::Error> {
        let mut entries = entries.into_iter();
        let hash_kind = match entries.next() {
            Some(ProofEntry::Header(header)) => header.parse::<HashKind>()?,
            Some(ProofEntry::Node(tag, _)) => {
                return Err(MerkleProofError::MalformedProof(format!(
                    "expected a hash kind header but found a `{}` entry",
                    tag
                )))
            },
            None => return Err(MerkleProofError::MalformedProof("proof is empty".to_string())),
        };

        let mut path = Vec::new();
        let mut root = None;
        for entry in entries {
            if root.is_some() {
                return Err(MerkleProofError::MalformedProof(
                    "entries found after the root marker".to_string(),
                ));
            }
            let (tag, digest) = match entry {
                ProofEntry::Header(header) => {
                    return Err(MerkleProofError::MalformedProof(format!(
                        "unexpected header `{}` inside the proof",
                        header
                    )))
                },
                ProofEntry::Node(tag, digest) => (tag, digest),
            };
            let digest = from_hex(&digest)
                .map_err(|e| MerkleProofError::MalformedProof(format!("invalid hex digest: {}", e)))?;
            match tag.as_str() {
                ROOT_MARKER => root = Some(digest),
                "left" => path.push(ProofStep::new(Side::Left, digest)),
                "right" => path.push(ProofStep::new(Side::Right, digest)),
                other => {
                    return Err(MerkleProofError::MalformedProof(format!(
                        "unknown proof entry tag `{}`",
                        other
                    )))
                },
            }
        }

        let root = root.ok_or_else(|| MerkleProofError::MalformedProof("missing root marker".to_string()))?;
        let proof = MerkleProof::new(hash_kind, path, root);
        proof.check_lengths()?;
        Ok(proof)
    }
}

/// Returns whether `proof` proves the inclusion of `leaf_hash`.
pub fn verify_proof(proof: &MerkleProof, leaf_hash: &HashSlice) -> Result<bool, MerkleProofError> {
    proof.verify(leaf_hash)
}

/// Splices a proof from a child tree onto a proof from its parent tree.
///
/// Only meaningful when the child tree's root was inserted, pre-hashed, as the parent leaf that `parent_proof` was
/// generated for. The result proves the child leaf all the way up to the parent root.
pub fn combine_proofs(child_proof: &MerkleProof, parent_proof: &MerkleProof) -> Result<MerkleProof, MerkleProofError> {
    if child_proof.hash_kind != parent_proof.hash_kind {
        return Err(MerkleProofError::HashKindMismatch {
            child: child_proof.hash_kind,
            parent: parent_proof.hash_kind,
        });
    }
    let path = child_proof
        .path
        .iter()
        .chain(parent_proof.path.iter())
        .cloned()
        .collect();
    Ok(MerkleProof::new(child_proof.hash_kind, path, parent_proof.root.clone()))
}
