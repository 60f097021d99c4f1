// crates/flipstat-core/tests/normalizer_plan.rs
// ============================================================================
// Module: Normalizer and Plan Tests
// Description: Bit display coordinates and bit-flip plan generation.
// Purpose: Pin the region formulas for both bit-width helpers.
// Dependencies: flipstat-core
// ============================================================================

//! Bit index normalizer and bit-flip plan generator tests.

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
    clippy::float_cmp,
    reason = "Test-only assertions and helpers are permitted."
)]

use flipstat_core::BitNormalizer;
use flipstat_core::BitStat;
use flipstat_core::ParameterError;
use flipstat_core::runtime::BitRegion;
use flipstat_core::runtime::classify_bit;
use flipstat_core::runtime::generate;
use flipstat_core::runtime::normalize;
use flipstat_core::runtime::plan;

// ============================================================================
// SECTION: Normalizer
// ============================================================================

#[test]
fn overflow_bits_extend_past_two() {
    assert_eq!(normalize(75, 50, 60).unwrap(), 3.5);
}

#[test]
fn scale_boundary_is_exactly_one() {
    assert_eq!(normalize(50, 50, 60).unwrap(), 1.0);
    assert_eq!(normalize(60, 50, 60).unwrap(), 2.0);
    assert_eq!(normalize(0, 50, 60).unwrap(), 0.0);
    assert_eq!(normalize(25, 50, 60).unwrap(), 0.5);
    assert!(normalize(49, 50, 60).unwrap() < 1.0);
}

#[test]
fn unordered_boundaries_are_invalid() {
    assert!(matches!(normalize(1, 60, 60), Err(ParameterError::InvalidParameter(_))));
    assert!(matches!(BitNormalizer::new(61, 60), Err(ParameterError::InvalidParameter(_))));
}

#[test]
fn normalized_stats_keep_their_bucket() {
    let normalizer = BitNormalizer::new(40, 60).unwrap();
    let stats = vec![BitStat {
        bit: 50,
        mean: 1.0,
        std: 0.0,
        min: 1.0,
        max: 1.0,
        count: 1,
    }];
    let normalized = normalizer.normalize_stats(stats.clone());
    assert_eq!(normalized[0].stat, stats[0]);
    assert_eq!(normalized[0].position, 1.5);
}

// ============================================================================
// SECTION: Plan
// ============================================================================

#[test]
fn plan_matches_region_formulas() {
    let (q, d, bits) = (60_u32, 50_u32, 64_u32);
    let m = bits - 1;
    let expected = vec![0, d / 4, d / 2, d - 1, d, (d + q) / 2, q - 1, q, (q + m) / 2, m];
    assert_eq!(generate(q, d, bits), expected);
    assert_eq!(expected, vec![0, 12, 25, 49, 50, 55, 59, 60, 61, 63]);
}

#[test]
fn plan_clamps_and_deduplicates() {
    assert_eq!(generate(60, 50, 32), vec![0, 12, 25, 31]);
}

#[test]
fn degenerate_parameters_shrink_the_plan() {
    assert_eq!(generate(0, 0, 64), vec![0, 31, 63]);
    assert_eq!(generate(10, 0, 1), vec![0]);
    assert_eq!(generate(10, 0, 0), vec![0]);
}

#[test]
fn plan_labels_first_anchor() {
    let planned = plan(60, 50, 32);
    let labels: Vec<&str> = planned.iter().map(|entry| entry.label).collect();
    assert_eq!(labels, vec!["0", "D/4", "D/2", "D-1"]);
    assert_eq!(planned[0].region, BitRegion::Noise);
    assert_eq!(planned[3].region, BitRegion::Transition);
}

#[test]
fn regions_follow_boundaries() {
    assert_eq!(classify_bit(12, 50, 60), BitRegion::Noise);
    assert_eq!(classify_bit(13, 50, 60), BitRegion::Transition);
    assert_eq!(classify_bit(50, 50, 60), BitRegion::Transition);
    assert_eq!(classify_bit(55, 50, 60), BitRegion::Message);
    assert_eq!(classify_bit(56, 50, 60), BitRegion::ModulusEdge);
    assert_eq!(classify_bit(60, 50, 60), BitRegion::ModulusEdge);
    assert_eq!(classify_bit(61, 50, 60), BitRegion::Overflow);
}
