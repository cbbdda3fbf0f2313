//! Double Keccak-512 digest
//!
//! Algorithm:
//!
//! ```text
//!   d1   = Keccak512(input)
//!   d2   = Keccak512(d1)        // over the raw 64 bytes of d1
//!   hash = d2[0..32]
//! ```
//!
//! `d2[0..32]` is the low 256-bit half of `d2` read as a little-endian
//! 512-bit integer. The PoW value compared against a target is that half
//! read as a little-endian 256-bit integer.
//!
//! Keccak here is the original submission padding (as used by Ethereum's
//! Keccak-256), not FIPS-202 SHA3-512.

use alloy_primitives::{B256, B512, U256};
use sha3::{Digest, Keccak512};
use tracing::trace;

/// Number of output bytes kept from the second pass
const TRIMMED_LEN: usize = 32;

/// Anchor proof-of-work digest.
///
/// Stateless: the whole input is hashed in one shot, so there is no partial
/// hashing context to carry around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowDigest;

impl PowDigest {
    /// Compute the 256-bit PoW hash of `input`.
    pub fn compute(input: &[u8]) -> B256 {
        pow_hash(input)
    }

    /// Compute the PoW hash of `input` as an integer.
    pub fn value(input: &[u8]) -> U256 {
        pow_value(input)
    }
}

/// Single Keccak-512 pass.
pub fn keccak512(input: &[u8]) -> B512 {
    B512::from_slice(&Keccak512::digest(input))
}

/// Compute the PoW hash of `input`.
///
/// An empty input hashes the zero-length message, so the result is a fixed
/// constant rather than anything depending on the slice's address.
pub fn pow_hash(input: &[u8]) -> B256 {
    let first = keccak512(input);
    let second = keccak512(first.as_slice());
    let hash = B256::from_slice(&second[..TRIMMED_LEN]);

    trace!(target: "anchor::pow", len = input.len(), %hash, "computed pow hash");
    hash
}

/// Compute the PoW hash of `input` read as a little-endian integer.
pub fn pow_value(input: &[u8]) -> U256 {
    U256::from_le_bytes(pow_hash(input).0)
}
