//! Read-only view of the node's chain index
//!
//! The chain index itself belongs to the surrounding node. This module only
//! describes what the guard reads from it.

use alloy_primitives::B256;
use std::sync::Arc;

/// One block in the node's local chain index
pub trait BlockIndexEntry {
    /// Block height
    fn height(&self) -> u64;

    /// Block hash
    fn hash(&self) -> B256;

    /// Cumulative number of transactions from genesis up to and including
    /// this block
    fn chain_tx(&self) -> u64;

    /// Block timestamp (UNIX seconds)
    fn timestamp(&self) -> u64;

    /// Hash of the parent block, `None` for genesis
    fn parent_hash(&self) -> Option<B256>;
}

impl<T: BlockIndexEntry + ?Sized> BlockIndexEntry for &T {
    fn height(&self) -> u64 {
        (**self).height()
    }

    fn hash(&self) -> B256 {
        (**self).hash()
    }

    fn chain_tx(&self) -> u64 {
        (**self).chain_tx()
    }

    fn timestamp(&self) -> u64 {
        (**self).timestamp()
    }

    fn parent_hash(&self) -> Option<B256> {
        (**self).parent_hash()
    }
}

impl<T: BlockIndexEntry + ?Sized> BlockIndexEntry for Arc<T> {
    fn height(&self) -> u64 {
        (**self).height()
    }

    fn hash(&self) -> B256 {
        (**self).hash()
    }

    fn chain_tx(&self) -> u64 {
        (**self).chain_tx()
    }

    fn timestamp(&self) -> u64 {
        (**self).timestamp()
    }

    fn parent_hash(&self) -> Option<B256> {
        (**self).parent_hash()
    }
}

/// Plain chain index record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainIndexNode {
    /// Block height
    pub height: u64,
    /// Block hash
    pub hash: B256,
    /// Parent block hash
    pub parent_hash: Option<B256>,
    /// Cumulative transaction count
    pub chain_tx: u64,
    /// Block timestamp
    pub timestamp: u64,
}

impl ChainIndexNode {
    /// Create a genesis-style node with no parent and no history
    pub const fn new(height: u64, hash: B256) -> Self {
        Self { height, hash, parent_hash: None, chain_tx: 0, timestamp: 0 }
    }

    /// Set the cumulative transaction count
    pub const fn with_chain_tx(mut self, chain_tx: u64) -> Self {
        self.chain_tx = chain_tx;
        self
    }

    /// Set the block timestamp
    pub const fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Build the next block on top of this one
    pub const fn child(&self, hash: B256, tx_count: u64, timestamp: u64) -> Self {
        Self {
            height: self.height + 1,
            hash,
            parent_hash: Some(self.hash),
            chain_tx: self.chain_tx + tx_count,
            timestamp,
        }
    }
}

impl BlockIndexEntry for ChainIndexNode {
    fn height(&self) -> u64 {
        self.height
    }

    fn hash(&self) -> B256 {
        self.hash
    }

    fn chain_tx(&self) -> u64 {
        self.chain_tx
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn parent_hash(&self) -> Option<B256> {
        self.parent_hash
    }
}
