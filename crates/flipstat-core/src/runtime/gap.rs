// crates/flipstat-core/src/runtime/gap.rs
// ============================================================================
// Module: Flipstat Gap Classifier
// Description: Slot-embedding gap alignment of coefficients.
// Purpose: Split rows into aligned and non-aligned coefficient classes.
// Dependencies: crate::{core, runtime::parameters}
// ============================================================================

//! ## Overview
//! With ring size `N = 2^logN` and `2^logSlots` slots, the coefficients that
//! carry slot values sit every `gap = 2^(logN-1) / 2^logSlots` positions.
//! The central (Nyquist) coefficient `N/2` has no alignment meaning and is
//! removed before classification. Libraries also leave one degenerate
//! coefficient each: `openfhe` coefficient 0 and `heaan` coefficient `N/2`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ClassifiedRow;
use crate::core::GapClass;
use crate::core::MeasurementRow;
use crate::core::normalize_text;
use crate::runtime::parameters::ParameterError;
use crate::runtime::parameters::ring_size;

// ============================================================================
// SECTION: Gap
// ============================================================================

/// Computes the slot gap `2^(logN-1) / 2^logSlots`.
///
/// # Errors
///
/// Returns [`ParameterError::InvalidParameter`] when `logN` is out of range or
/// `logSlots > logN - 1` (the gap would be below one).
pub fn slot_gap(log_ring_size: u32, log_slot_count: u32) -> Result<u64, ParameterError> {
    ring_size(log_ring_size)?;
    let half_log = log_ring_size - 1;
    if log_slot_count > half_log {
        return Err(ParameterError::InvalidParameter(format!(
            "logSlots ({log_slot_count}) must not exceed logN - 1 ({half_log})"
        )));
    }
    Ok(1_u64 << (half_log - log_slot_count))
}

/// Returns the gap class of a coefficient.
#[must_use]
pub const fn gap_class(coeff: u64, gap: u64) -> GapClass {
    if gap != 0 && coeff % gap == 0 { GapClass::Aligned } else { GapClass::NonAligned }
}

/// Rows labelled by gap class.
///
/// # Invariants
/// - No row has `coeff == central_coefficient`.
/// - Every row's class equals `gap_class(row.coeff, gap)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GapClassification {
    /// Slot gap.
    pub gap: u64,
    /// Excluded central coefficient `N/2`.
    pub central_coefficient: u64,
    /// Rows removed because they hit the central coefficient.
    pub excluded: usize,
    /// Surviving rows with their class, in input order.
    pub rows: Vec<ClassifiedRow>,
}

impl GapClassification {
    /// Iterates rows of one class.
    pub fn rows_in(&self, class: GapClass) -> impl Iterator<Item = &MeasurementRow> {
        self.rows.iter().filter(move |row| row.gap_class == class).map(|row| &row.row)
    }

    /// Counts rows of one class.
    #[must_use]
    pub fn count(&self, class: GapClass) -> usize {
        self.rows_in(class).count()
    }
}

/// Removes the central coefficient and labels rows by gap alignment.
///
/// # Errors
///
/// Returns [`ParameterError::InvalidParameter`] when the ring or slot
/// parameters are invalid (see [`slot_gap`]).
pub fn classify(
    rows: Vec<MeasurementRow>,
    log_ring_size: u32,
    log_slot_count: u32,
) -> Result<GapClassification, ParameterError> {
    let gap = slot_gap(log_ring_size, log_slot_count)?;
    let central_coefficient = ring_size(log_ring_size)? / 2;
    let total = rows.len();
    let rows: Vec<ClassifiedRow> = rows
        .into_iter()
        .filter(|row| row.coeff != central_coefficient)
        .map(|row| {
            let gap_class = gap_class(row.coeff, gap);
            ClassifiedRow {
                row,
                gap_class,
            }
        })
        .collect();
    Ok(GapClassification {
        gap,
        central_coefficient,
        excluded: total - rows.len(),
        rows,
    })
}

// ============================================================================
// SECTION: Library Exclusions
// ============================================================================

/// Returns the degenerate coefficient a library leaves untouched, if any.
///
/// # Errors
///
/// Returns [`ParameterError::InvalidParameter`] when `logN` is out of range.
pub fn excluded_coefficient(library: &str, log_ring_size: u32) -> Result<Option<u64>, ParameterError> {
    let ring = ring_size(log_ring_size)?;
    Ok(match normalize_text(library).as_str() {
        "openfhe" => Some(0),
        "heaan" => Some(ring / 2),
        _ => None,
    })
}

/// Drops rows on the library's degenerate coefficient.
///
/// # Errors
///
/// Returns [`ParameterError::InvalidParameter`] when `logN` is out of range.
pub fn drop_excluded_coefficient(
    rows: Vec<MeasurementRow>,
    library: &str,
    log_ring_size: u32,
) -> Result<Vec<MeasurementRow>, ParameterError> {
    let Some(excluded) = excluded_coefficient(library, log_ring_size)? else {
        return Ok(rows);
    };
    Ok(rows.into_iter().filter(|row| row.coeff != excluded).collect())
}
