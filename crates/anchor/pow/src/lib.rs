//! Anchor Proof-of-Work
//!
//! This crate provides the proof-of-work digest for Anchor block headers:
//! - Double Keccak-512 digest truncated to 256 bits
//! - Target comparison helpers used when a header is mined or re-verified
//!
//! Difficulty retargeting lives elsewhere; this crate only answers "what is
//! the PoW value of these bytes" and "does it meet this target".

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod digest;
pub mod target;

pub use digest::{keccak512, pow_hash, pow_value, PowDigest};
pub use target::{
    check_proof_of_work, difficulty_to_target, meets_target, target_to_difficulty,
};

use alloy_primitives::U256;
use thiserror::Error;

/// Proof-of-work errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowError {
    /// The digest is numerically above the target
    #[error("insufficient proof of work: value {value:#x} exceeds target {target:#x}")]
    InsufficientWork {
        /// PoW value of the header
        value: U256,
        /// Target the value had to stay below
        target: U256,
    },
}
