// Copyright 2024. The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

use mutable_merkle_hashing::HashKind;
use serde::{Deserialize, Serialize};

/// Configuration for trees created by an embedding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MerkleTreeConfig {
    /// The hash function used for leaves, interior nodes and the root
    pub hash_kind: HashKind,
    /// Whether leaf values are supplied as digests rather than raw data
    pub pre_hashed_leaves: bool,
}

impl Default for MerkleTreeConfig {
    fn default() -> Self {
        Self {
            hash_kind: HashKind::Sha256,
            pre_hashed_leaves: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MutableMerkleTree;

    #[test]
    fn it_deserializes_from_toml() {
        let config = toml::from_str::<MerkleTreeConfig>(
            r#"
                hash_kind = "blake2b512"
                pre_hashed_leaves = true
            "#,
        )
        .unwrap();
        assert_eq!(config.hash_kind, HashKind::Blake2b512);
        assert!(config.pre_hashed_leaves);
    }

    #[test]
    fn it_rejects_unknown_fields_and_kinds() {
        let unknown_field = toml::from_str::<MerkleTreeConfig>(
            r#"
                hash_kind = "sha256"
                pre_hashed_leaves = false
                depth = 4
            "#,
        );
        assert!(unknown_field.is_err());

        let unknown_kind = toml::from_str::<MerkleTreeConfig>(
            r#"
                hash_kind = "md5"
                pre_hashed_leaves = false
            "#,
        );
        assert!(unknown_kind.is_err());
    }

    #[test]
    fn default_round_trips_through_toml() {
        let config = MerkleTreeConfig::default();
        let encoded = toml::to_string(&config).unwrap();
        assert!(encoded.contains("hash_kind = \"sha256\""));
        assert_eq!(toml::from_str::<MerkleTreeConfig>(&encoded).unwrap(), config);
    }

    #[test]
    fn trees_follow_the_config() {
        let config = MerkleTreeConfig {
            hash_kind: HashKind::Sha512,
            pre_hashed_leaves: true,
        };
        let empty = MutableMerkleTree::from_config(&config);
        assert_eq!(empty.hash_kind(), HashKind::Sha512);
        assert!(empty.is_empty());

        let leaf = HashKind::Sha512.hash(b"a");
        let tree = MutableMerkleTree::build_with_config(vec![leaf.clone()], &config).unwrap();
        assert_eq!(tree.get_leaf_hash(0), Some(&leaf));
        assert!(MutableMerkleTree::build_with_config(vec![vec![0u8; 32]], &config).is_err());
    }
}
