// crates/flipstat-core/src/runtime/stats.rs
// ============================================================================
// Module: Flipstat Two-Stage Statistics Engine
// Description: Per-bit aggregation through per-(bit, coefficient) means.
// Purpose: Remove trial-count bias before computing cross-coefficient spread.
// Dependencies: crate::{core, runtime::gap}, serde, thiserror
// ============================================================================

//! ## Overview
//! Stage 1 groups rows by `(bit, coeff)` and averages the payload within
//! each group, so a coefficient sampled by many campaigns weighs the same as
//! one sampled once. Stage 2 groups the Stage-1 means by bit and reports
//! mean, population standard deviation, min, max, and contributing
//! coefficient count. Stage 2 never reads raw rows.
//!
//! NaN metric values are skipped in Stage 1. A group with only NaN values
//! yields no Stage-1 mean; a bit with no Stage-1 means is not emitted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::core::BitStat;
use crate::core::CampaignId;
use crate::core::GapClass;
use crate::core::MeasurementRow;
use crate::core::MetricColumn;
use crate::core::StatsPayload;
use crate::runtime::gap::GapClassification;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Aggregation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// A row lacks the requested metric.
    #[error("campaign {campaign_id} bit {bit} coeff {coeff}: missing {metric}")]
    MissingMetric {
        /// Requested metric.
        metric: MetricColumn,
        /// Source campaign.
        campaign_id: CampaignId,
        /// Bit index.
        bit: u32,
        /// Coefficient index.
        coeff: u64,
    },
    /// A row lacks the corruption flag.
    #[error("campaign {campaign_id} bit {bit} coeff {coeff}: missing is_sdc")]
    MissingCorruptionFlag {
        /// Source campaign.
        campaign_id: CampaignId,
        /// Bit index.
        bit: u32,
        /// Coefficient index.
        coeff: u64,
    },
}

// ============================================================================
// SECTION: Accumulators
// ============================================================================

/// Running sum for one Stage-1 group.
#[derive(Debug, Default, Clone, Copy)]
struct GroupSum {
    /// Sum of non-NaN values.
    sum: f64,
    /// Number of non-NaN values.
    count: usize,
}

/// Converts a count to `f64` for averaging.
fn count_as_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss, reason = "Group sizes stay far below 2^52.")]
    let value = count as f64;
    value
}

/// Extracts the payload value of a row.
fn payload_value(row: &MeasurementRow, payload: StatsPayload) -> Result<f64, StatsError> {
    match payload {
        StatsPayload::Metric(metric) => row.metric(metric).ok_or(StatsError::MissingMetric {
            metric,
            campaign_id: row.campaign_id,
            bit: row.bit,
            coeff: row.coeff,
        }),
        StatsPayload::CorruptionRate => row
            .is_sdc
            .map(|flag| if flag { 1.0 } else { 0.0 })
            .ok_or(StatsError::MissingCorruptionFlag {
                campaign_id: row.campaign_id,
                bit: row.bit,
                coeff: row.coeff,
            }),
    }
}

/// Reduces Stage-1 means of one bit to a [`BitStat`].
fn reduce_bit(bit: u32, means: &[f64]) -> Option<BitStat> {
    if means.is_empty() {
        return None;
    }
    let count = count_as_f64(means.len());
    let mean = means.iter().sum::<f64>() / count;
    let variance = means.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count;
    let min = means.iter().copied().fold(f64::INFINITY, f64::min);
    let max = means.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(BitStat {
        bit,
        mean,
        std: variance.sqrt(),
        min,
        max,
        count: means.len(),
    })
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Aggregates rows per bit with the two-stage reduction.
///
/// Output is ordered by ascending bit.
///
/// # Errors
///
/// Returns [`StatsError`] when a row lacks the requested payload.
pub fn aggregate_with<'a, I>(rows: I, payload: StatsPayload) -> Result<Vec<BitStat>, StatsError>
where
    I: IntoIterator<Item = &'a MeasurementRow>,
{
    let mut groups: BTreeMap<(u32, u64), GroupSum> = BTreeMap::new();
    for row in rows {
        let value = payload_value(row, payload)?;
        if value.is_nan() {
            continue;
        }
        let group = groups.entry((row.bit, row.coeff)).or_default();
        group.sum += value;
        group.count += 1;
    }

    let mut per_bit: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for ((bit, _coeff), group) in groups {
        per_bit.entry(bit).or_default().push(group.sum / count_as_f64(group.count));
    }

    Ok(per_bit.into_iter().filter_map(|(bit, means)| reduce_bit(bit, &means)).collect())
}

/// Aggregates a continuous metric per bit.
///
/// # Errors
///
/// Returns [`StatsError::MissingMetric`] when a row lacks the metric.
pub fn aggregate<'a, I>(rows: I, metric: MetricColumn) -> Result<Vec<BitStat>, StatsError>
where
    I: IntoIterator<Item = &'a MeasurementRow>,
{
    aggregate_with(rows, StatsPayload::Metric(metric))
}

/// Aggregates the silent data corruption rate per bit.
///
/// # Errors
///
/// Returns [`StatsError::MissingCorruptionFlag`] when a row lacks the flag.
pub fn aggregate_corruption_rate<'a, I>(rows: I) -> Result<Vec<BitStat>, StatsError>
where
    I: IntoIterator<Item = &'a MeasurementRow>,
{
    aggregate_with(rows, StatsPayload::CorruptionRate)
}

// ============================================================================
// SECTION: Per-Class Aggregation
// ============================================================================

/// Per-bit statistics split by gap class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassStats {
    /// Slot gap used for the split.
    pub gap: u64,
    /// Statistics over aligned coefficients.
    pub aligned: Vec<BitStat>,
    /// Statistics over non-aligned coefficients.
    pub non_aligned: Vec<BitStat>,
}

/// Aggregates aligned and non-aligned rows separately.
///
/// # Errors
///
/// Returns [`StatsError`] when a row lacks the requested payload.
pub fn aggregate_by_class(
    classification: &GapClassification,
    payload: StatsPayload,
) -> Result<ClassStats, StatsError> {
    Ok(ClassStats {
        gap: classification.gap,
        aligned: aggregate_with(classification.rows_in(GapClass::Aligned), payload)?,
        non_aligned: aggregate_with(classification.rows_in(GapClass::NonAligned), payload)?,
    })
}
