// Copyright 2024. The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

use thiserror::Error;

use crate::HashKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashKindError {
    #[error("Unsupported hash kind `{0}`")]
    UnsupportedHashKind(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleProofError {
    #[error("Malformed proof: {0}")]
    MalformedProof(String),
    #[error("Invalid hash length: expected {expected} bytes, got {actual}")]
    InvalidHashLength { expected: usize, actual: usize },
    #[error("Cannot combine a {child} proof with a {parent} proof")]
    HashKindMismatch { child: HashKind, parent: HashKind },
    #[error("Unsupported hash kind: {0}")]
    UnsupportedHashKind(#[from] HashKindError),
}
