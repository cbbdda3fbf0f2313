//! Checkpoint configuration
//!
//! Read from the `[checkpoints]` table of the node's TOML config. The library
//! itself never reads configuration; callers load it and pass the flag into
//! the guard.
//!
//! ```toml
//! [checkpoints]
//! enabled = true
//! heuristics = "neutral"
//! chain = "mainnet"
//! ```

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::{CheckpointError, CheckpointRegistry, ChainGuard, ConfigError, HeuristicMode};

/// Checkpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Enforce checkpoints when accepting blocks
    pub enabled: bool,
    /// Sync estimator behaviour
    pub heuristics: HeuristicMode,
    /// Name of the built-in checkpoint table
    pub chain: String,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self { enabled: true, heuristics: HeuristicMode::Neutral, chain: "mainnet".to_string() }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    checkpoints: CheckpointConfig,
}

impl CheckpointConfig {
    /// Parse the `[checkpoints]` table out of a TOML document.
    ///
    /// A document without the table yields the defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(s)?;
        Ok(file.checkpoints)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Build the guard these settings describe
    pub fn guard(&self) -> Result<ChainGuard, CheckpointError> {
        let registry = CheckpointRegistry::from_name(&self.chain)?;
        Ok(ChainGuard::new(registry).with_heuristics(self.heuristics))
    }
}
