// crates/flipstat-core/src/core/measurement.rs
// ============================================================================
// Module: Flipstat Measurement Rows
// Description: Per-bit observations recorded by fault-injection campaigns.
// Purpose: Provide fixed, explicitly typed measurement records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`MeasurementRow`] is one observation: a single flipped bit of one
//! coefficient of one limb, with the resulting error metric and/or silent
//! data corruption flag. Rows are stamped with their source campaign when
//! loaded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::CampaignId;

// ============================================================================
// SECTION: Rows
// ============================================================================

/// One recorded bit-flip observation.
///
/// # Invariants
/// - `bit < bitsPerCoefficient` and `coeff < ringSize` for the source campaign.
/// - `l2_norm` and `rel_error`, when present, are non-negative or NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    /// Source campaign.
    pub campaign_id: CampaignId,
    /// Flipped bit index within the coefficient word.
    pub bit: u32,
    /// Coefficient index.
    pub coeff: u64,
    /// RNS limb index.
    pub limb: u32,
    /// L2 distance between faulted and reference results.
    pub l2_norm: Option<f64>,
    /// Relative error between faulted and reference results.
    pub rel_error: Option<f64>,
    /// Silent data corruption flag.
    pub is_sdc: Option<bool>,
}

impl MeasurementRow {
    /// Returns the requested metric value.
    #[must_use]
    pub const fn metric(&self, metric: MetricColumn) -> Option<f64> {
        match metric {
            MetricColumn::L2Norm => self.l2_norm,
            MetricColumn::RelError => self.rel_error,
        }
    }
}

// ============================================================================
// SECTION: Metrics
// ============================================================================

/// Continuous error metric carried by measurement rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricColumn {
    /// L2-norm distance.
    L2Norm,
    /// Relative error.
    RelError,
}

impl MetricColumn {
    /// Returns the column name used in measurement files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::L2Norm => "l2_norm",
            Self::RelError => "rel_error",
        }
    }
}

impl fmt::Display for MetricColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Gap Classes
// ============================================================================

/// Alignment of a coefficient to the slot-embedding gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapClass {
    /// `coeff mod gap == 0`.
    Aligned,
    /// `coeff mod gap != 0`.
    NonAligned,
}

impl GapClass {
    /// Returns a stable label for the class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aligned => "aligned",
            Self::NonAligned => "non_aligned",
        }
    }
}

impl fmt::Display for GapClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurement row labelled with its gap class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRow {
    /// Underlying observation.
    #[serde(flatten)]
    pub row: MeasurementRow,
    /// Gap class of the row's coefficient.
    pub gap_class: GapClass,
}
