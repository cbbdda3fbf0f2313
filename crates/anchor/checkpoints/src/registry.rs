//! Checkpoint registry
//!
//! A checkpoint is a trusted `(height, hash)` pair. The registry is built once
//! from data embedded at build time and is read-only afterwards; consumers
//! share it through an [`Arc`].
//!
//! What makes a good checkpoint block:
//! - surrounded by blocks with reasonable timestamps (no blocks before it with
//!   a later timestamp, none after it with an earlier one)
//! - contains no strange transactions

use alloy_primitives::B256;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use crate::CheckpointError;

/// Anchor mainnet checkpoints
pub static MAINNET_CHECKPOINTS: Lazy<Arc<CheckpointRegistry>> = Lazy::new(|| {
    CheckpointRegistry::from_json(include_str!("../res/mainnet.json"))
        .expect("Can't load Anchor mainnet checkpoints")
        .into()
});

/// Devnet checkpoints (empty, for local chains)
pub static DEV_CHECKPOINTS: Lazy<Arc<CheckpointRegistry>> = Lazy::new(|| {
    CheckpointRegistry::from_json(include_str!("../res/dev.json"))
        .expect("Can't load Anchor dev checkpoints")
        .into()
});

/// A trusted block at a given height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckpointEntry {
    /// Block height
    pub height: u64,
    /// Block hash
    pub hash: B256,
}

impl CheckpointEntry {
    /// Create a new entry
    pub const fn new(height: u64, hash: B256) -> Self {
        Self { height, hash }
    }
}

/// Chain growth statistics recorded alongside the newest checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChainSummary {
    /// UNIX timestamp of the last checkpoint block
    pub last_checkpoint_timestamp: u64,
    /// Total number of transactions between genesis and the last checkpoint
    pub transactions_at_last_checkpoint: u64,
    /// Estimated number of transactions per day after the last checkpoint
    pub transactions_per_day: f64,
}

/// On-disk layout of the embedded checkpoint files
#[derive(Debug, Deserialize)]
struct CheckpointData {
    summary: ChainSummary,
    checkpoints: Vec<CheckpointEntry>,
}

/// Immutable, height-ordered checkpoint table
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointRegistry {
    checkpoints: BTreeMap<u64, B256>,
    summary: ChainSummary,
}

impl CheckpointRegistry {
    /// Build a registry, validating that heights are strictly increasing and
    /// hashes are unique.
    pub fn new(
        entries: impl IntoIterator<Item = CheckpointEntry>,
        summary: ChainSummary,
    ) -> Result<Self, CheckpointError> {
        let mut checkpoints = BTreeMap::new();
        let mut heights_by_hash: HashMap<B256, u64> = HashMap::new();
        let mut previous: Option<u64> = None;

        for entry in entries {
            if let Some(previous) = previous {
                if entry.height == previous {
                    return Err(CheckpointError::DuplicateHeight(entry.height));
                }
                if entry.height < previous {
                    return Err(CheckpointError::OutOfOrder { previous, height: entry.height });
                }
            }

            if let Some(&first) = heights_by_hash.get(&entry.hash) {
                return Err(CheckpointError::DuplicateHash {
                    hash: entry.hash,
                    first,
                    height: entry.height,
                });
            }

            heights_by_hash.insert(entry.hash, entry.height);
            checkpoints.insert(entry.height, entry.hash);
            previous = Some(entry.height);
        }

        Ok(Self { checkpoints, summary })
    }

    /// Parse and validate a registry from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let data: CheckpointData = serde_json::from_str(json)?;
        Self::new(data.checkpoints, data.summary)
    }

    /// Get a built-in registry by chain name
    pub fn from_name(name: &str) -> Result<Arc<Self>, CheckpointError> {
        match name.to_lowercase().as_str() {
            "anchor" | "anchor-mainnet" | "mainnet" => Ok(MAINNET_CHECKPOINTS.clone()),
            "anchor-dev" | "dev" => Ok(DEV_CHECKPOINTS.clone()),
            _ => Err(CheckpointError::UnknownChain(name.to_string())),
        }
    }

    /// Stored hash at `height`, if a checkpoint exists there
    pub fn lookup(&self, height: u64) -> Option<B256> {
        self.checkpoints.get(&height).copied()
    }

    /// Whether the registry holds no checkpoints
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Number of checkpoints
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    /// Chain growth statistics
    pub const fn summary(&self) -> &ChainSummary {
        &self.summary
    }

    /// Checkpoint with the greatest height
    pub fn newest(&self) -> Option<CheckpointEntry> {
        self.checkpoints
            .last_key_value()
            .map(|(&height, &hash)| CheckpointEntry::new(height, hash))
    }

    /// Iterate checkpoints in ascending height order
    pub fn iter(
        &self,
    ) -> impl DoubleEndedIterator<Item = CheckpointEntry> + ExactSizeIterator + '_ {
        self.checkpoints.iter().map(|(&height, &hash)| CheckpointEntry::new(height, hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    fn entry(height: u64, byte: u8) -> CheckpointEntry {
        CheckpointEntry::new(height, B256::repeat_byte(byte))
    }

    #[test]
    fn test_mainnet_table_integrity() {
        let registry = &*MAINNET_CHECKPOINTS;
        assert_eq!(registry.len(), 39);

        let heights: Vec<_> = registry.iter().map(|e| e.height).collect();
        assert!(heights.windows(2).all(|w| w[0] < w[1]));

        let mut hashes: Vec<_> = registry.iter().map(|e| e.hash).collect();
        hashes.sort();
        hashes.dedup();
        assert_eq!(hashes.len(), registry.len());
    }

    #[test]
    fn test_mainnet_lookup() {
        let registry = &*MAINNET_CHECKPOINTS;
        assert_eq!(
            registry.lookup(1337),
            Some(b256!("30fb4e683aeea122f563f246b544343f0ac72034b2689b6106a0a22db71a36a5"))
        );
        assert_eq!(registry.lookup(1338), None);
        assert_eq!(registry.newest().map(|e| e.height), Some(1_900_000));
    }

    #[test]
    fn test_mainnet_summary() {
        let summary = MAINNET_CHECKPOINTS.summary();
        assert_eq!(summary.last_checkpoint_timestamp, 1_421_787_289);
        assert_eq!(summary.transactions_at_last_checkpoint, 239_377);
        assert_eq!(summary.transactions_per_day, 150.0);
    }

    #[test]
    fn test_dev_registry_is_empty() {
        let registry = CheckpointRegistry::from_name("dev").unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.newest(), None);
    }

    #[test]
    fn test_from_name() {
        assert!(Arc::ptr_eq(
            &CheckpointRegistry::from_name("Mainnet").unwrap(),
            &*MAINNET_CHECKPOINTS
        ));
        assert!(matches!(
            CheckpointRegistry::from_name("regtest"),
            Err(CheckpointError::UnknownChain(name)) if name == "regtest"
        ));
    }

    #[test]
    fn test_duplicate_height_rejected() {
        let result =
            CheckpointRegistry::new([entry(10, 1), entry(10, 2)], ChainSummary::default());
        assert!(matches!(result, Err(CheckpointError::DuplicateHeight(10))));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let result =
            CheckpointRegistry::new([entry(20, 1), entry(10, 2)], ChainSummary::default());
        assert!(matches!(
            result,
            Err(CheckpointError::OutOfOrder { previous: 20, height: 10 })
        ));
    }

    #[test]
    fn test_duplicate_hash_rejected() {
        let result = CheckpointRegistry::new(
            [entry(10, 1), entry(20, 2), entry(30, 1)],
            ChainSummary::default(),
        );
        assert!(matches!(
            result,
            Err(CheckpointError::DuplicateHash { first: 10, height: 30, .. })
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let json = r#"{"summary": {"last_checkpoint_timestamp": 0,
            "transactions_at_last_checkpoint": 0, "transactions_per_day": 0.0},
            "checkpoints": [{"height": 1, "hash": "0x1234"}]}"#;
        assert!(matches!(CheckpointRegistry::from_json(json), Err(CheckpointError::Json(_))));
    }

    #[test]
    fn test_iter_reverse_is_newest_first() {
        let registry = CheckpointRegistry::new(
            [entry(1, 1), entry(2, 2), entry(3, 3)],
            ChainSummary::default(),
        )
        .unwrap();
        let heights: Vec<_> = registry.iter().rev().map(|e| e.height).collect();
        assert_eq!(heights, vec![3, 2, 1]);
    }
}
