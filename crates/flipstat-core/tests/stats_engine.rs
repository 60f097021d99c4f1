// crates/flipstat-core/tests/stats_engine.rs
// ============================================================================
// Module: Two-Stage Statistics Tests
// Description: Per-(bit, coefficient) bias removal and per-bit reduction.
// Purpose: Ensure trial duplication never skews per-bit statistics.
// Dependencies: flipstat-core
// ============================================================================

//! Two-stage aggregation tests.

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

mod common;

use flipstat_core::CampaignId;
use flipstat_core::MetricColumn;
use flipstat_core::StatsError;
use flipstat_core::StatsPayload;
use flipstat_core::runtime::aggregate;
use flipstat_core::runtime::aggregate_by_class;
use flipstat_core::runtime::aggregate_corruption_rate;
use flipstat_core::runtime::classify;

use crate::common::metric_row;
use crate::common::sdc_row;

const EPS: f64 = 1e-12;

fn close(left: f64, right: f64) -> bool {
    (left - right).abs() < EPS
}

#[test]
fn duplicated_trials_average_before_reduction() {
    let rows = vec![metric_row(1, 5, 2, 0.1), metric_row(2, 5, 2, 0.3), metric_row(1, 5, 4, 0.2)];
    let stats = aggregate(&rows, MetricColumn::L2Norm).unwrap();
    assert_eq!(stats.len(), 1);
    let stat = &stats[0];
    assert_eq!(stat.bit, 5);
    assert!(close(stat.mean, 0.2));
    assert!(close(stat.std, 0.0));
    assert!(close(stat.min, 0.2));
    assert!(close(stat.max, 0.2));
    assert_eq!(stat.count, 2);
}

#[test]
fn two_stage_differs_from_naive_mean_under_duplication() {
    let rows = vec![
        metric_row(1, 3, 0, 1.0),
        metric_row(2, 3, 0, 1.0),
        metric_row(3, 3, 0, 1.0),
        metric_row(1, 3, 1, 4.0),
    ];
    let stats = aggregate(&rows, MetricColumn::L2Norm).unwrap();
    assert!(close(stats[0].mean, 2.5));
    let naive = rows.iter().map(|row| row.l2_norm.unwrap()).sum::<f64>() / 4.0;
    assert!(close(naive, 1.75));
    assert!(!close(stats[0].mean, naive));
}

#[test]
fn single_trial_matches_naive_mean() {
    let rows = vec![metric_row(1, 0, 0, 1.0), metric_row(1, 0, 1, 2.0), metric_row(1, 0, 2, 6.0)];
    let stats = aggregate(&rows, MetricColumn::L2Norm).unwrap();
    assert!(close(stats[0].mean, 3.0));
    let expected_std = ((4.0 + 1.0 + 9.0) / 3.0_f64).sqrt();
    assert!(close(stats[0].std, expected_std));
    assert_eq!(stats[0].min, 1.0);
    assert_eq!(stats[0].max, 6.0);
}

#[test]
fn output_is_sorted_by_bit_and_only_present_bits() {
    let rows = vec![metric_row(1, 9, 0, 1.0), metric_row(1, 2, 0, 1.0), metric_row(1, 40, 3, 1.0)];
    let bits: Vec<u32> =
        aggregate(&rows, MetricColumn::L2Norm).unwrap().iter().map(|stat| stat.bit).collect();
    assert_eq!(bits, vec![2, 9, 40]);
}

#[test]
fn nan_values_are_skipped() {
    let rows = vec![
        metric_row(1, 1, 0, f64::NAN),
        metric_row(2, 1, 0, 2.0),
        metric_row(1, 1, 1, 4.0),
        metric_row(1, 7, 0, f64::NAN),
    ];
    let stats = aggregate(&rows, MetricColumn::L2Norm).unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].bit, 1);
    assert_eq!(stats[0].count, 2);
    assert!(close(stats[0].mean, 3.0));
}

#[test]
fn missing_metric_is_an_error() {
    let rows = vec![sdc_row(4, 1, 2, true)];
    assert_eq!(
        aggregate(&rows, MetricColumn::RelError).unwrap_err(),
        StatsError::MissingMetric {
            metric: MetricColumn::RelError,
            campaign_id: CampaignId::new(4),
            bit: 1,
            coeff: 2,
        }
    );
}

#[test]
fn corruption_rate_uses_the_same_two_stages() {
    let rows = vec![
        sdc_row(1, 10, 0, true),
        sdc_row(2, 10, 0, false),
        sdc_row(1, 10, 1, true),
        sdc_row(1, 11, 0, false),
    ];
    let stats = aggregate_corruption_rate(&rows).unwrap();
    assert_eq!(stats.len(), 2);
    assert!(close(stats[0].mean, 0.75));
    assert!(close(stats[0].min, 0.5));
    assert!(close(stats[0].max, 1.0));
    assert!(close(stats[0].std, 0.25));
    assert!(close(stats[1].mean, 0.0));
    assert!(stats.iter().all(|stat| (0.0 ..= 1.0).contains(&stat.mean)));

    let missing = vec![metric_row(1, 0, 0, 1.0)];
    assert!(matches!(
        aggregate_corruption_rate(&missing),
        Err(StatsError::MissingCorruptionFlag { .. })
    ));
}

#[test]
fn per_class_aggregation_splits_by_alignment() {
    let rows = vec![
        metric_row(1, 0, 0, 1.0),
        metric_row(1, 0, 2, 3.0),
        metric_row(1, 0, 1, 10.0),
        metric_row(1, 0, 4, 100.0),
    ];
    let classification = classify(rows, 3, 1).unwrap();
    let stats =
        aggregate_by_class(&classification, StatsPayload::Metric(MetricColumn::L2Norm)).unwrap();
    assert_eq!(stats.gap, 2);
    assert_eq!(stats.aligned.len(), 1);
    assert!(close(stats.aligned[0].mean, 2.0));
    assert_eq!(stats.aligned[0].count, 2);
    assert_eq!(stats.non_aligned.len(), 1);
    assert!(close(stats.non_aligned[0].mean, 10.0));
}
