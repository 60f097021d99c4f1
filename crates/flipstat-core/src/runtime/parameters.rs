// crates/flipstat-core/src/runtime/parameters.rs
// ============================================================================
// Module: Flipstat Structural Parameters
// Description: Validation of ring, slot, and bit-width parameters.
// Purpose: Reject structurally impossible parameters before any computation.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Structural parameters come from the catalog or the caller. Violations
//! indicate misconfiguration, not data quality problems, and abort the
//! operation immediately.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest supported log2 ring dimension.
pub const MAX_LOG_RING_SIZE: u32 = 62;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural parameter errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// A structural precondition was violated.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns `2^log_ring_size`.
///
/// # Errors
///
/// Returns [`ParameterError::InvalidParameter`] when `log_ring_size` is zero
/// or exceeds [`MAX_LOG_RING_SIZE`].
pub fn ring_size(log_ring_size: u32) -> Result<u64, ParameterError> {
    if log_ring_size == 0 || log_ring_size > MAX_LOG_RING_SIZE {
        return Err(ParameterError::InvalidParameter(format!(
            "logN must be in 1..={MAX_LOG_RING_SIZE}, got {log_ring_size}"
        )));
    }
    Ok(1_u64 << log_ring_size)
}
