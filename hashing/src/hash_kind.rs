// Copyright 2024. The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

use std::{fmt, str::FromStr};

use blake2::{Blake2b, Blake2b512};
use digest::{consts::U32, Digest};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};

use crate::{error::HashKindError, Hash, HashSlice};

/// The longest digest produced by any supported [`HashKind`].
pub const MAX_DIGEST_LEN: usize = 64;

// Source of every Empty sentinel. Never hashed into existence, only sliced.
static EMPTY_DIGEST: [u8; MAX_DIGEST_LEN] = [0u8; MAX_DIGEST_LEN];

/// The hash functions a tree can be built with. A tree's kind is fixed at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashKind {
    #[default]
    Sha256,
    Sha512,
    Blake2b256,
    Blake2b512,
}

impl HashKind {
    pub const ALL: [HashKind; 4] = [
        HashKind::Sha256,
        HashKind::Sha512,
        HashKind::Blake2b256,
        HashKind::Blake2b512,
    ];

    /// The identifier used in proof headers and marshalled trees.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashKind::Sha256 => "sha256",
            HashKind::Sha512 => "sha512",
            HashKind::Blake2b256 => "blake2b256",
            HashKind::Blake2b512 => "blake2b512",
        }
    }

    /// Length in bytes of every digest of this kind.
    pub fn digest_len(&self) -> usize {
        match self {
            HashKind::Sha256 | HashKind::Blake2b256 => 32,
            HashKind::Sha512 | HashKind::Blake2b512 => 64,
        }
    }

    /// The all-zero placeholder standing in for an absent sibling.
    pub fn empty_hash(&self) -> Hash {
        EMPTY_DIGEST[..self.digest_len()].to_vec()
    }

    pub fn hash(&self, value: &HashSlice) -> Hash {
        self.digest_parts(&[value])
    }

    /// `hash(left || right)`. Operand order is significant.
    pub fn hash_together(&self, left: &HashSlice, right: &HashSlice) -> Hash {
        self.digest_parts(&[left, right])
    }

    fn digest_parts(&self, parts: &[&HashSlice]) -> Hash {
        match self {
            HashKind::Sha256 => digest_parts::<Sha256>(parts),
            HashKind::Sha512 => digest_parts::<Sha512>(parts),
            HashKind::Blake2b256 => digest_parts::<Blake2b<U32>>(parts),
            HashKind::Blake2b512 => digest_parts::<Blake2b512>(parts),
        }
    }
}

fn digest_parts<D: Digest>(parts: &[&HashSlice]) -> Hash {
    parts
        .iter()
        .fold(D::new(), |hasher, part| hasher.chain_update(*part))
        .finalize()
        .to_vec()
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashKind {
    type Err = HashKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HashKind::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| HashKindError::UnsupportedHashKind(s.to_string()))
    }
}

/// Applies the hash function of `kind` to a raw value.
pub fn hash(kind: HashKind, value: &HashSlice) -> Hash {
    kind.hash(value)
}

/// Produces the parent of two nodes: `hash(left || right)`.
pub fn combine(kind: HashKind, left: &HashSlice, right: &HashSlice) -> Hash {
    kind.hash_together(left, right)
}
