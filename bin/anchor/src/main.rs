//! Anchor Checkpoint Tool
//!
//! Operator utility for the checkpoint guard and the PoW digest.
//!
//! Usage:
//!   anchor check --height 1337 --hash 0x30fb...36a5
//!   anchor digest --hex 0x0100...
//!   anchor list
//!   anchor progress --chain-tx 250000 --time 1421800000 --estimate

#![allow(missing_docs)]

mod commands;

use clap::Parser;
use commands::Cli;
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity)?;

    debug!(target: "anchor::cli", ?cli, "Parsed arguments");

    let accepted = cli.run()?;
    if !accepted {
        std::process::exit(1);
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbosity: u8) -> eyre::Result<()> {
    if std::env::var_os("RUST_LOG").is_some() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        return Ok(());
    }

    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).with_target(true).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
