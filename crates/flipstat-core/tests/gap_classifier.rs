// crates/flipstat-core/tests/gap_classifier.rs
// ============================================================================
// Module: Gap Classifier Tests
// Description: Central-coefficient exclusion and alignment labelling.
// Purpose: Ensure every surviving coefficient gets exactly one class.
// Dependencies: flipstat-core
// ============================================================================

//! Gap classification and library exclusion tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use flipstat_core::GapClass;
use flipstat_core::ParameterError;
use flipstat_core::runtime::classify;
use flipstat_core::runtime::drop_excluded_coefficient;
use flipstat_core::runtime::excluded_coefficient;
use flipstat_core::runtime::slot_gap;

use crate::common::metric_row;

#[test]
fn small_ring_partitions_coefficients() {
    let rows = (0 .. 8).map(|coeff| metric_row(1, 0, coeff, 1.0)).collect();
    let classification = classify(rows, 3, 1).unwrap();
    assert_eq!(classification.gap, 2);
    assert_eq!(classification.central_coefficient, 4);
    assert_eq!(classification.excluded, 1);

    let aligned: Vec<u64> =
        classification.rows_in(GapClass::Aligned).map(|row| row.coeff).collect();
    let non_aligned: Vec<u64> =
        classification.rows_in(GapClass::NonAligned).map(|row| row.coeff).collect();
    assert_eq!(aligned, vec![0, 2, 6]);
    assert_eq!(non_aligned, vec![1, 3, 5, 7]);
    assert_eq!(classification.count(GapClass::Aligned), 3);
}

#[test]
fn every_central_row_is_removed() {
    let rows = vec![metric_row(1, 0, 4, 1.0), metric_row(2, 3, 4, 1.0), metric_row(1, 0, 1, 1.0)];
    let classification = classify(rows, 3, 1).unwrap();
    assert_eq!(classification.excluded, 2);
    assert_eq!(classification.rows.len(), 1);
}

#[test]
fn full_slot_count_gives_unit_gap() {
    assert_eq!(slot_gap(4, 3).unwrap(), 1);
    let rows = (0 .. 16).map(|coeff| metric_row(1, 0, coeff, 1.0)).collect();
    let classification = classify(rows, 4, 3).unwrap();
    assert_eq!(classification.count(GapClass::NonAligned), 0);
    assert_eq!(classification.count(GapClass::Aligned), 15);
}

#[test]
fn too_many_slots_is_invalid() {
    assert!(matches!(slot_gap(3, 3), Err(ParameterError::InvalidParameter(_))));
    assert!(matches!(classify(Vec::new(), 3, 5), Err(ParameterError::InvalidParameter(_))));
}

#[test]
fn ring_size_bounds_are_enforced() {
    assert!(slot_gap(0, 0).is_err());
    assert!(slot_gap(63, 0).is_err());
    assert_eq!(slot_gap(62, 0).unwrap(), 1_u64 << 61);
}

#[test]
fn library_exclusions_follow_library() {
    assert_eq!(excluded_coefficient("openfhe", 4).unwrap(), Some(0));
    assert_eq!(excluded_coefficient(" HEAAN ", 4).unwrap(), Some(8));
    assert_eq!(excluded_coefficient("seal", 4).unwrap(), None);
    assert!(excluded_coefficient("openfhe", 0).is_err());

    let rows = vec![metric_row(1, 0, 0, 1.0), metric_row(1, 0, 8, 1.0), metric_row(1, 0, 3, 1.0)];
    let openfhe: Vec<u64> = drop_excluded_coefficient(rows.clone(), "openfhe", 4)
        .unwrap()
        .iter()
        .map(|row| row.coeff)
        .collect();
    assert_eq!(openfhe, vec![8, 3]);
    let seal = drop_excluded_coefficient(rows.clone(), "seal", 4).unwrap();
    assert_eq!(seal, rows);
}
