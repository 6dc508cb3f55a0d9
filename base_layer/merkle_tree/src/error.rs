// Copyright 2024. The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

use mutable_merkle_hashing::HashKindError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleTreeError {
    #[error("Index {index} is out of range. The len is {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Invalid hash length: expected {expected} bytes, got {actual}")]
    InvalidHashLength { expected: usize, actual: usize },
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Unsupported hash kind: {0}")]
    UnsupportedHashKind(#[from] HashKindError),
}
