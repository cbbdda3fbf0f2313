//! Anchor subcommands

use alloy_primitives::{hex, B256, U256};
use anchor_checkpoints::{
    BlockIndexEntry, ChainGuard, ChainIndexNode, CheckpointConfig, HeuristicMode,
};
use anchor_pow::{
    check_proof_of_work, difficulty_to_target, pow_hash, pow_value, target_to_difficulty,
};
use clap::{ArgAction, Args, Parser, Subcommand};
use eyre::WrapErr;
use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{info, warn};

/// Anchor checkpoint and proof-of-work tool
#[derive(Debug, Parser)]
#[command(name = "anchor")]
#[command(about = "Checkpoint guard and proof-of-work digest for Anchor nodes")]
pub(crate) struct Cli {
    /// TOML config file with a `[checkpoints]` table
    #[arg(long, global = true, env = "ANCHOR_CONFIG")]
    config: Option<PathBuf>,

    /// Built-in checkpoint table (mainnet, dev)
    #[arg(long, global = true)]
    chain: Option<String>,

    /// Disable checkpoint enforcement
    #[arg(long, global = true)]
    no_checkpoints: bool,

    /// Run the sync estimators instead of returning neutral values
    #[arg(long, global = true)]
    estimate: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long = "verbose", action = ArgAction::Count, global = true)]
    pub(crate) verbosity: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the PoW digest of some bytes
    Digest(DigestArgs),
    /// Check a block against the checkpoint table
    Check(CheckArgs),
    /// List the checkpoint table
    List,
    /// Estimate sync progress for a chain tip
    Progress(ProgressArgs),
}

#[derive(Debug, Args)]
struct DigestArgs {
    /// Input as hex
    #[arg(long, conflicts_with_all = ["file", "text"])]
    hex: Option<String>,

    /// Input read from a file
    #[arg(long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Input as UTF-8 text (empty when nothing is given)
    text: Option<String>,

    /// Also check the digest against this target
    #[arg(long)]
    target: Option<U256>,

    /// Also check the digest against the target for this difficulty
    #[arg(long, conflicts_with = "target")]
    difficulty: Option<U256>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Block height
    #[arg(long)]
    height: u64,

    /// Block hash
    #[arg(long)]
    hash: B256,
}

#[derive(Debug, Args)]
struct ProgressArgs {
    /// Cumulative transaction count at the tip
    #[arg(long)]
    chain_tx: u64,

    /// Tip timestamp (UNIX seconds)
    #[arg(long)]
    time: u64,

    /// Tip height
    #[arg(long, default_value = "0")]
    height: u64,

    /// Current time (UNIX seconds), defaults to the system clock
    #[arg(long)]
    now: Option<u64>,

    /// Locally known block as HEIGHT:HASH, may be repeated
    #[arg(long = "known", value_parser = parse_known_block)]
    known: Vec<ChainIndexNode>,
}

fn parse_known_block(s: &str) -> Result<ChainIndexNode, String> {
    let (height, hash) =
        s.split_once(':').ok_or_else(|| format!("expected HEIGHT:HASH, got {s}"))?;
    let height = height.parse::<u64>().map_err(|e| format!("invalid height {height}: {e}"))?;
    let hash = hash.parse::<B256>().map_err(|e| format!("invalid hash {hash}: {e}"))?;
    Ok(ChainIndexNode::new(height, hash))
}

impl Cli {
    /// Run the selected command. Returns `false` when the command's verdict
    /// is negative (rejected block, insufficient work).
    pub(crate) fn run(&self) -> eyre::Result<bool> {
        let config = self.checkpoint_config()?;
        let guard = config.guard()?;

        info!(
            target: "anchor::cli",
            chain = %config.chain,
            enabled = config.enabled,
            heuristics = ?config.heuristics,
            checkpoints = guard.registry().len(),
            "Loaded checkpoint table"
        );

        match &self.command {
            Command::Digest(args) => args.run(),
            Command::Check(args) => Ok(args.run(&guard, config.enabled)),
            Command::List => {
                list(&guard);
                Ok(true)
            }
            Command::Progress(args) => args.run(&guard, config.enabled),
        }
    }

    fn checkpoint_config(&self) -> eyre::Result<CheckpointConfig> {
        let mut config = match &self.config {
            Some(path) => CheckpointConfig::load(path)
                .wrap_err_with(|| format!("failed to load config {}", path.display()))?,
            None => CheckpointConfig::default(),
        };

        if let Some(chain) = &self.chain {
            config.chain = chain.clone();
        }
        if self.no_checkpoints {
            config.enabled = false;
        }
        if self.estimate {
            config.heuristics = HeuristicMode::Estimate;
        }

        Ok(config)
    }
}

impl DigestArgs {
    fn input(&self) -> eyre::Result<Vec<u8>> {
        if let Some(hex_input) = &self.hex {
            let stripped = hex_input.strip_prefix("0x").unwrap_or(hex_input);
            return hex::decode(stripped).wrap_err("invalid hex input");
        }
        if let Some(path) = &self.file {
            return fs::read(path).wrap_err_with(|| format!("failed to read {}", path.display()));
        }
        Ok(self.text.clone().unwrap_or_default().into_bytes())
    }

    fn run(&self) -> eyre::Result<bool> {
        let input = self.input()?;

        println!("hash:  {}", pow_hash(&input));
        let value = pow_value(&input);
        println!("value: {value:#x}");
        println!("difficulty: {}", target_to_difficulty(value));

        let Some(target) = self.target.or(self.difficulty.map(difficulty_to_target)) else {
            return Ok(true);
        };

        match check_proof_of_work(&input, target) {
            Ok(_) => {
                println!("target met");
                Ok(true)
            }
            Err(err) => {
                warn!(target: "anchor::cli", %err, "Proof of work check failed");
                println!("target not met");
                Ok(false)
            }
        }
    }
}

impl CheckArgs {
    fn run(&self, guard: &ChainGuard, checkpoints_enabled: bool) -> bool {
        let accepted = guard.check_block(self.height, self.hash, checkpoints_enabled);
        println!("{}", if accepted { "accept" } else { "reject" });
        accepted
    }
}

fn list(guard: &ChainGuard) {
    let registry = guard.registry();
    for checkpoint in registry.iter() {
        println!("{:>9} {}", checkpoint.height, checkpoint.hash);
    }

    let summary = registry.summary();
    println!("last checkpoint time: {}", summary.last_checkpoint_timestamp);
    println!("transactions at last checkpoint: {}", summary.transactions_at_last_checkpoint);
    println!("estimated transactions per day: {}", summary.transactions_per_day);
}

impl ProgressArgs {
    fn tip(&self) -> ChainIndexNode {
        ChainIndexNode::new(self.height, B256::ZERO)
            .with_chain_tx(self.chain_tx)
            .with_timestamp(self.time)
    }

    fn run(&self, guard: &ChainGuard, checkpoints_enabled: bool) -> eyre::Result<bool> {
        let now = match self.now {
            Some(now) => now,
            None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs(),
        };

        let tip = self.tip();
        let progress = guard.guess_verification_progress(Some(&tip), now);
        println!("progress: {:.4}", progress);
        println!("total blocks estimate: {}", guard.total_blocks_estimate(checkpoints_enabled));
        println!("last checkpoint height: {}", guard.last_checkpoint_height());

        let index: HashMap<B256, ChainIndexNode> =
            self.known.iter().map(|node| (node.hash, *node)).collect();
        match guard.last_checkpoint(&index, checkpoints_enabled) {
            Some(node) => println!("newest local checkpoint: {} {}", node.height(), node.hash()),
            None => println!("newest local checkpoint: none"),
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const H1337: &str = "0x30fb4e683aeea122f563f246b544343f0ac72034b2689b6106a0a22db71a36a5";

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("anchor").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_check_accepts_matching_hash() {
        assert!(cli(&["check", "--height", "1337", "--hash", H1337]).run().unwrap());
    }

    #[test]
    fn test_check_rejects_conflicting_hash() {
        let other = format!("0x{}", "11".repeat(32));
        assert!(!cli(&["check", "--height", "1337", "--hash", other.as_str()]).run().unwrap());
        assert!(cli(&["--no-checkpoints", "check", "--height", "1337", "--hash", other.as_str()])
            .run()
            .unwrap());
    }

    #[test]
    fn test_config_file_disables_checkpoints() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[checkpoints]\nenabled = false").unwrap();
        let path = file.path().to_str().unwrap();

        let other = format!("0x{}", "22".repeat(32));
        let cli = cli(&["--config", path, "check", "--height", "1337", "--hash", other.as_str()]);
        assert!(!cli.checkpoint_config().unwrap().enabled);
        assert!(cli.run().unwrap());
    }

    #[test]
    fn test_flags_override_config() {
        let config = cli(&["--chain", "dev", "--estimate", "list"]).checkpoint_config().unwrap();
        assert_eq!(config.chain, "dev");
        assert_eq!(config.heuristics, HeuristicMode::Estimate);
        assert!(config.enabled);
    }

    #[test]
    fn test_unknown_chain_fails() {
        assert!(cli(&["--chain", "nowhere", "list"]).run().is_err());
    }

    #[test]
    fn test_digest_inputs() {
        let args = DigestArgs {
            hex: Some("0xdead".into()),
            file: None,
            text: None,
            target: None,
            difficulty: None,
        };
        assert_eq!(args.input().unwrap(), vec![0xde, 0xad]);

        let args = DigestArgs { hex: None, file: None, text: None, target: None, difficulty: None };
        assert!(args.input().unwrap().is_empty());

        let args = DigestArgs {
            hex: Some("zz".into()),
            file: None,
            text: None,
            target: None,
            difficulty: None,
        };
        assert!(args.input().is_err());
    }

    #[test]
    fn test_digest_target() {
        assert!(cli(&["digest", "header", "--target", "0"]).run().map(|ok| !ok).unwrap());
        let max = format!("{}", U256::MAX);
        assert!(cli(&["digest", "header", "--target", max.as_str()]).run().unwrap());
    }

    #[test]
    fn test_digest_difficulty() {
        assert!(cli(&["digest", "header", "--difficulty", "1"]).run().unwrap());
        let max = format!("{}", U256::MAX);
        let hardest = cli(&["digest", "header", "--difficulty", max.as_str()]);
        assert!(!hardest.run().unwrap());

        let conflict = ["anchor", "digest", "header", "--target", "0", "--difficulty", "1"];
        assert!(Cli::try_parse_from(conflict).is_err());
    }

    #[test]
    fn test_parse_known_block() {
        let node = parse_known_block(&format!("1337:{H1337}")).unwrap();
        assert_eq!(node.height, 1337);
        assert!(parse_known_block("1337").is_err());
        assert!(parse_known_block("x:0x00").is_err());
    }

    #[test]
    fn test_progress_runs() {
        let known = format!("1337:{H1337}");
        let cli = cli(&[
            "--estimate",
            "progress",
            "--chain-tx",
            "1000",
            "--time",
            "1400000000",
            "--now",
            "1421787289",
            "--known",
            known.as_str(),
        ]);
        assert!(cli.run().unwrap());
    }
}
