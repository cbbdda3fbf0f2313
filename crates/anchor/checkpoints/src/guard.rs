//! Chain-acceptance guard
//!
//! Checkpoints constrain history only at the heights they cover: a block at a
//! height without a checkpoint is accepted, a block at a checkpointed height
//! is accepted only if its hash matches. A mismatch means someone is trying
//! to feed us an alternate history and is rejected unconditionally.
//!
//! The guard also carries the sync estimators. On this chain they ship
//! switched off and return neutral values; [`HeuristicMode::Estimate`] turns
//! the real algorithms on.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, hash::BuildHasher, sync::Arc};
use tracing::{debug, warn};

use crate::{
    index::BlockIndexEntry, registry::ChainSummary, CheckpointRegistry, MAINNET_CHECKPOINTS,
};

/// How many times slower a transaction after the last checkpoint is expected
/// to verify than one before it.
///
/// This is a compromise. Reindexing from a fast disk with a slow CPU can be up
/// to 20x, downloading over a slow network with a fast multicore CPU is close
/// to 1x.
pub const SIGCHECK_VERIFICATION_FACTOR: f64 = 5.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Behaviour of the sync estimators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeuristicMode {
    /// Estimators return neutral values (0, `None`). This is what the network
    /// runs today.
    #[default]
    Neutral,
    /// Estimators run their full algorithms against the checkpoint table.
    Estimate,
}

/// Checkpoint-based chain acceptance and sync estimation
#[derive(Debug, Clone)]
pub struct ChainGuard {
    /// Checkpoint table
    registry: Arc<CheckpointRegistry>,
    /// Estimator behaviour
    heuristics: HeuristicMode,
}

impl ChainGuard {
    /// Create a guard over `registry` with neutral estimators
    pub const fn new(registry: Arc<CheckpointRegistry>) -> Self {
        Self { registry, heuristics: HeuristicMode::Neutral }
    }

    /// Guard over the mainnet checkpoints
    pub fn mainnet() -> Self {
        Self::new(MAINNET_CHECKPOINTS.clone())
    }

    /// Select estimator behaviour
    pub const fn with_heuristics(mut self, heuristics: HeuristicMode) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Get the checkpoint table
    pub const fn registry(&self) -> &Arc<CheckpointRegistry> {
        &self.registry
    }

    /// Get the estimator behaviour
    pub const fn heuristics(&self) -> HeuristicMode {
        self.heuristics
    }

    /// Decide whether a block with `hash` at `height` may be accepted.
    ///
    /// With checkpoints disabled every block is accepted.
    pub fn check_block(&self, height: u64, hash: B256, checkpoints_enabled: bool) -> bool {
        if !checkpoints_enabled {
            return true;
        }

        let Some(expected) = self.registry.lookup(height) else {
            return true;
        };

        if hash != expected {
            warn!(
                target: "anchor::checkpoints",
                height,
                %hash,
                %expected,
                "Block conflicts with checkpoint"
            );
            return false;
        }

        debug!(target: "anchor::checkpoints", height, %hash, "Block matches checkpoint");
        true
    }

    /// Guess how far verification has progressed at `tip`, in `[0, 1]`.
    ///
    /// Work is 1.0 per transaction before the last checkpoint and
    /// [`SIGCHECK_VERIFICATION_FACTOR`] per transaction after it. Remaining
    /// work is extrapolated from the wall-clock time since the checkpoint (or
    /// since `tip`, once past it) at the expected transaction rate.
    ///
    /// `now` is UNIX seconds. Returns 0.0 without a tip, and always 0.0 in
    /// [`HeuristicMode::Neutral`].
    pub fn guess_verification_progress<N>(&self, tip: Option<&N>, now: u64) -> f64
    where
        N: BlockIndexEntry + ?Sized,
    {
        let Some(tip) = tip else {
            return 0.0;
        };

        match self.heuristics {
            HeuristicMode::Neutral => 0.0,
            HeuristicMode::Estimate => estimate_progress(self.registry.summary(), tip, now),
        }
    }

    /// Coarse estimate of total chain length: the newest checkpoint height.
    ///
    /// 0 when checkpoints are disabled, and always 0 in
    /// [`HeuristicMode::Neutral`].
    pub fn total_blocks_estimate(&self, checkpoints_enabled: bool) -> u64 {
        if !checkpoints_enabled {
            return 0;
        }

        match self.heuristics {
            HeuristicMode::Neutral => 0,
            HeuristicMode::Estimate => self.newest_height(),
        }
    }

    /// Height of the newest checkpoint, 0 for an empty table and always 0 in
    /// [`HeuristicMode::Neutral`].
    pub fn last_checkpoint_height(&self) -> u64 {
        if self.registry.is_empty() {
            return 0;
        }

        match self.heuristics {
            HeuristicMode::Neutral => 0,
            HeuristicMode::Estimate => self.newest_height(),
        }
    }

    /// Find the newest checkpoint present in the local chain index.
    ///
    /// Scans the table from newest to oldest and returns the index entry of
    /// the first checkpoint hash found. The caller must not mutate `index`
    /// while this runs, which the shared borrow already guarantees.
    ///
    /// `None` when checkpoints are disabled, when nothing matches, and always
    /// in [`HeuristicMode::Neutral`].
    pub fn last_checkpoint<'a, N, S>(
        &self,
        index: &'a HashMap<B256, N, S>,
        checkpoints_enabled: bool,
    ) -> Option<&'a N>
    where
        S: BuildHasher,
    {
        if !checkpoints_enabled {
            return None;
        }

        match self.heuristics {
            HeuristicMode::Neutral => None,
            HeuristicMode::Estimate => {
                self.registry.iter().rev().find_map(|checkpoint| index.get(&checkpoint.hash))
            }
        }
    }

    fn newest_height(&self) -> u64 {
        self.registry.newest().map_or(0, |checkpoint| checkpoint.height)
    }
}

fn elapsed_days(since: u64, now: u64) -> f64 {
    now.saturating_sub(since) as f64 / SECONDS_PER_DAY
}

fn estimate_progress<N>(summary: &ChainSummary, tip: &N, now: u64) -> f64
where
    N: BlockIndexEntry + ?Sized,
{
    let checkpoint_tx = summary.transactions_at_last_checkpoint as f64;
    let chain_tx = tip.chain_tx() as f64;

    let (work_before, work_after) = if tip.chain_tx() <= summary.transactions_at_last_checkpoint {
        let cheap_before = chain_tx;
        let cheap_after = checkpoint_tx - chain_tx;
        let expensive_after = elapsed_days(summary.last_checkpoint_timestamp, now) *
            summary.transactions_per_day;
        (cheap_before, expensive_after.mul_add(SIGCHECK_VERIFICATION_FACTOR, cheap_after))
    } else {
        let cheap_before = checkpoint_tx;
        let expensive_before = chain_tx - checkpoint_tx;
        let expensive_after = elapsed_days(tip.timestamp(), now) * summary.transactions_per_day;
        (
            expensive_before.mul_add(SIGCHECK_VERIFICATION_FACTOR, cheap_before),
            expensive_after * SIGCHECK_VERIFICATION_FACTOR,
        )
    };

    let total = work_before + work_after;
    if total <= 0.0 {
        return 0.0;
    }

    (work_before / total).clamp(0.0, 1.0)
}
