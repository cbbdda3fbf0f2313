//! Target comparison for PoW values

use alloy_primitives::U256;
use tracing::debug;

use crate::{digest::pow_value, PowError};

/// Check whether a PoW value satisfies `target` (value must not exceed it).
pub fn meets_target(value: U256, target: U256) -> bool {
    value <= target
}

/// Verify the proof of work of serialized header bytes against `target`.
///
/// Returns the PoW value on success so callers can log or accumulate it.
pub fn check_proof_of_work(header: &[u8], target: U256) -> Result<U256, PowError> {
    let value = pow_value(header);

    if !meets_target(value, target) {
        debug!(target: "anchor::pow", %value, %target, "header fails pow target");
        return Err(PowError::InsufficientWork { value, target });
    }

    Ok(value)
}

/// Largest PoW value a header may have at `difficulty`.
///
/// Difficulty 0 and 1 both allow any value.
pub fn difficulty_to_target(difficulty: U256) -> U256 {
    U256::MAX.checked_div(difficulty).unwrap_or(U256::MAX)
}

/// Difficulty a PoW value (or target) corresponds to.
///
/// A zero value saturates to [`U256::MAX`].
pub fn target_to_difficulty(target: U256) -> U256 {
    U256::MAX.checked_div(target).unwrap_or(U256::MAX)
}
