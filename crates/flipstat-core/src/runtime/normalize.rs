// crates/flipstat-core/src/runtime/normalize.rs
// ============================================================================
// Module: Flipstat Bit Index Normalizer
// Description: Display coordinates for bit positions across parameter sets.
// Purpose: Align bit axes of campaigns with different scale and modulus widths.
// Dependencies: crate::{core, runtime::parameters}
// ============================================================================

//! ## Overview
//! Bits below the scale factor map onto `[0, 1)`; bits at or above it map
//! onto `[1, 2]` relative to the modulus width, and beyond `2` for overflow
//! bits above the modulus. The coordinate is for display only and never
//! changes the bucket a statistic belongs to.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::BitStat;
use crate::core::NormalizedBitStat;
use crate::runtime::parameters::ParameterError;

// ============================================================================
// SECTION: Normalizer
// ============================================================================

/// Normalizer bound to a validated scale/modulus pair.
///
/// # Invariants
/// - `scale_bits < modulus_bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitNormalizer {
    /// Scale factor bit width (`logDelta`).
    scale_bits: u32,
    /// Modulus bit width (`logQ`).
    modulus_bits: u32,
}

impl BitNormalizer {
    /// Creates a normalizer.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::InvalidParameter`] when
    /// `scale_bits >= modulus_bits`.
    pub fn new(scale_bits: u32, modulus_bits: u32) -> Result<Self, ParameterError> {
        if scale_bits >= modulus_bits {
            return Err(ParameterError::InvalidParameter(format!(
                "scale factor bits ({scale_bits}) must be below modulus bits ({modulus_bits})"
            )));
        }
        Ok(Self {
            scale_bits,
            modulus_bits,
        })
    }

    /// Maps a bit index to its display coordinate.
    #[must_use]
    pub fn normalize(&self, bit: u32) -> f64 {
        if bit < self.scale_bits {
            return f64::from(bit) / f64::from(self.scale_bits);
        }
        1.0 + f64::from(bit - self.scale_bits) / f64::from(self.modulus_bits - self.scale_bits)
    }

    /// Attaches display coordinates to per-bit statistics.
    #[must_use]
    pub fn normalize_stats(&self, stats: Vec<BitStat>) -> Vec<NormalizedBitStat> {
        stats
            .into_iter()
            .map(|stat| {
                let position = self.normalize(stat.bit);
                NormalizedBitStat {
                    stat,
                    position,
                }
            })
            .collect()
    }
}

/// Maps a bit index to its display coordinate.
///
/// # Errors
///
/// Returns [`ParameterError::InvalidParameter`] when
/// `scale_bits >= modulus_bits`.
pub fn normalize(bit: u32, scale_bits: u32, modulus_bits: u32) -> Result<f64, ParameterError> {
    Ok(BitNormalizer::new(scale_bits, modulus_bits)?.normalize(bit))
}
