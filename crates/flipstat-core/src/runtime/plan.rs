// crates/flipstat-core/src/runtime/plan.rs
// ============================================================================
// Module: Flipstat Bit-Flip Plan Generator
// Description: Representative bit positions for fault-injection campaigns.
// Purpose: Pick one or two anchor bits per semantic region of a coefficient.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A coefficient word splits into noise, transition, message, modulus-edge,
//! and overflow regions bounded by the scale factor `D` and the modulus `Q`
//! bit widths. The plan pushes fixed anchors in region order, clamps each to
//! the top bit `M`, and keeps the first occurrence of every value. Small or
//! degenerate parameters yield a shorter list, never an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

// ============================================================================
// SECTION: Regions
// ============================================================================

/// Semantic region of a coefficient bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BitRegion {
    /// Low bits dominated by encoding noise.
    Noise,
    /// Bits approaching the scale factor.
    Transition,
    /// Bits carrying the scaled message.
    Message,
    /// Bits near the top of the modulus.
    ModulusEdge,
    /// Bits above the modulus.
    Overflow,
}

impl BitRegion {
    /// Returns a stable label for the region.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Noise => "noise",
            Self::Transition => "transition",
            Self::Message => "message",
            Self::ModulusEdge => "modulus_edge",
            Self::Overflow => "overflow",
        }
    }
}

impl fmt::Display for BitRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a bit against scale factor and modulus widths.
#[must_use]
pub fn classify_bit(bit: u32, scale_bits: u32, modulus_bits: u32) -> BitRegion {
    let bit = u64::from(bit);
    let scale = u64::from(scale_bits);
    let modulus = u64::from(modulus_bits);
    if bit <= scale / 4 {
        BitRegion::Noise
    } else if bit <= scale {
        BitRegion::Transition
    } else if bit <= (scale + modulus) / 2 {
        BitRegion::Message
    } else if bit <= modulus {
        BitRegion::ModulusEdge
    } else {
        BitRegion::Overflow
    }
}

// ============================================================================
// SECTION: Plan
// ============================================================================

/// Planned bit with its anchor label and region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedBit {
    /// Bit index after clamping to the top bit.
    pub bit: u32,
    /// Anchor that first produced this bit.
    pub label: &'static str,
    /// Region of the bit.
    pub region: BitRegion,
}

/// Returns the labelled plan in insertion order.
///
/// # Invariants
/// - At most ten entries, all distinct, all in `0..=bits_per_coeff - 1`.
#[must_use]
pub fn plan(modulus_bits: u32, scale_bits: u32, bits_per_coeff: u32) -> Vec<PlannedBit> {
    let top = bits_per_coeff.saturating_sub(1);
    let scale = u64::from(scale_bits);
    let modulus = u64::from(modulus_bits);
    let top_wide = u64::from(top);

    let mut candidates: Vec<(u64, &'static str)> = vec![(0, "0"), (scale / 4, "D/4")];
    candidates.push((scale / 2, "D/2"));
    if scale > 0 {
        candidates.push((scale - 1, "D-1"));
    }
    candidates.push((scale, "D"));
    candidates.push(((scale + modulus) / 2, "(D+Q)/2"));
    if modulus > 0 {
        candidates.push((modulus - 1, "Q-1"));
    }
    candidates.push((modulus, "Q"));
    candidates.push(((modulus + top_wide) / 2, "(Q+M)/2"));
    candidates.push((top_wide, "M"));

    let mut planned: Vec<PlannedBit> = Vec::with_capacity(candidates.len());
    for (candidate, label) in candidates {
        let bit = u32::try_from(candidate.min(top_wide)).unwrap_or(top);
        if planned.iter().any(|entry| entry.bit == bit) {
            continue;
        }
        planned.push(PlannedBit {
            bit,
            label,
            region: classify_bit(bit, scale_bits, modulus_bits),
        });
    }
    planned
}

/// Returns the ordered, de-duplicated bit indices to flip.
#[must_use]
pub fn generate(modulus_bits: u32, scale_bits: u32, bits_per_coeff: u32) -> Vec<u32> {
    plan(modulus_bits, scale_bits, bits_per_coeff).into_iter().map(|entry| entry.bit).collect()
}
