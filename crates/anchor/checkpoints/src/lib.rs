//! Anchor Checkpoints
//!
//! This crate guards the chain against alternate histories using a fixed
//! table of trusted `(height, hash)` anchors:
//! - Checkpoint registry: immutable table embedded at build time
//! - Chain guard: accept/reject decisions and sync estimators
//! - Chain index view: what the guard reads from the node's block index
//!
//! # Acceptance policy
//!
//! ```text
//! checkpoints disabled          -> accept
//! no checkpoint at height       -> accept
//! checkpoint hash == block hash -> accept
//! checkpoint hash != block hash -> reject
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod config;
pub mod guard;
pub mod index;
pub mod registry;

pub use config::CheckpointConfig;
pub use guard::{ChainGuard, HeuristicMode, SIGCHECK_VERIFICATION_FACTOR};
pub use index::{BlockIndexEntry, ChainIndexNode};
pub use registry::{
    ChainSummary, CheckpointEntry, CheckpointRegistry, DEV_CHECKPOINTS, MAINNET_CHECKPOINTS,
};

use alloy_primitives::B256;
use thiserror::Error;

/// Checkpoint table errors.
///
/// These only occur while building a table; a bad embedded table is a fatal
/// startup error.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Heights must be strictly increasing
    #[error("checkpoint at height {height} follows height {previous}")]
    OutOfOrder {
        /// Height of the preceding entry
        previous: u64,
        /// Offending height
        height: u64,
    },

    /// Two entries share a height
    #[error("duplicate checkpoint at height {0}")]
    DuplicateHeight(u64),

    /// Two entries share a hash
    #[error("checkpoint hash {hash} at height {height} already used at height {first}")]
    DuplicateHash {
        /// Repeated hash
        hash: B256,
        /// Height that first used the hash
        first: u64,
        /// Offending height
        height: u64,
    },

    /// Malformed checkpoint data
    #[error("invalid checkpoint data: {0}")]
    Json(#[from] serde_json::Error),

    /// No built-in table with this name
    #[error("unknown chain: {0}")]
    UnknownChain(String),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CheckpointError::OutOfOrder { previous: 20, height: 10 };
        assert_eq!(err.to_string(), "checkpoint at height 10 follows height 20");

        let err = CheckpointError::DuplicateHeight(1337);
        assert!(err.to_string().contains("1337"));
    }
}
