// crates/flipstat-core/src/core/stats.rs
// ============================================================================
// Module: Flipstat Statistics Types
// Description: Per-bit aggregate records produced by the statistics engine.
// Purpose: Define the output surface consumed by plotting and reporting.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`BitStat`] is the only programmatic output of an aggregation: one record
//! per distinct bit. [`StatsPayload`] selects what is averaged: a
//! continuous metric or the corruption indicator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::measurement::MetricColumn;

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Value reduced by the two-stage engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "payload", content = "metric", rename_all = "snake_case")]
pub enum StatsPayload {
    /// Mean of a continuous error metric.
    Metric(MetricColumn),
    /// Rate of silent data corruption (indicator mean in `[0, 1]`).
    CorruptionRate,
}

// ============================================================================
// SECTION: Bit Statistics
// ============================================================================

/// Cross-coefficient statistics for one bit.
///
/// # Invariants
/// - `count >= 1`; bits with no contributing coefficient are not emitted.
/// - `min <= mean <= max` and `std >= 0` (population, divisor `count`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitStat {
    /// Bit index.
    pub bit: u32,
    /// Mean of per-coefficient means.
    pub mean: f64,
    /// Population standard deviation of per-coefficient means.
    pub std: f64,
    /// Smallest per-coefficient mean.
    pub min: f64,
    /// Largest per-coefficient mean.
    pub max: f64,
    /// Number of distinct coefficients contributing.
    pub count: usize,
}

/// Bit statistic with a display coordinate attached.
///
/// # Invariants
/// - `stat.bit` is the bucket; `position` never changes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBitStat {
    /// Underlying statistic.
    #[serde(flatten)]
    pub stat: BitStat,
    /// Normalized position in `[0, 1)` below the scale factor, `>= 1` above.
    pub position: f64,
}
