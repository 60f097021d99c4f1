// crates/flipstat-core/tests/outcomes.rs
// ============================================================================
// Module: Outcome Analysis Tests
// Description: Outcome selection and block-mean error stability.
// Purpose: Ensure outcome summaries follow catalog order and block bounds.
// Dependencies: flipstat-core
// ============================================================================

//! Campaign outcome tests.

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

use flipstat_core::CampaignId;
use flipstat_core::CampaignOutcome;
use flipstat_core::OutcomeCatalog;
use flipstat_core::OutcomeError;
use flipstat_core::OutcomeSource;
use flipstat_core::SourceError;
use flipstat_core::runtime::block_means;
use flipstat_core::runtime::select_outcomes;

fn outcome(id: u64, p95: f64, p99: f64) -> CampaignOutcome {
    CampaignOutcome {
        campaign_id: CampaignId::new(id),
        total_bitflips: 64,
        sdc_count: 3,
        duration_seconds: 10,
        l2_p95: p95,
        l2_p99: p99,
    }
}

struct FixedOutcomes(Vec<CampaignOutcome>);

impl OutcomeSource for FixedOutcomes {
    fn load_outcomes(&self) -> Result<Vec<CampaignOutcome>, SourceError> {
        Ok(self.0.clone())
    }
}

#[test]
fn selection_keeps_source_order() {
    let outcomes = vec![outcome(5, 1.0, 2.0), outcome(1, 3.0, 4.0), outcome(9, 5.0, 6.0)];
    let ids = [CampaignId::new(9), CampaignId::new(5)];
    let selected = select_outcomes(outcomes, &ids).unwrap();
    let order: Vec<u64> = selected.iter().map(|entry| entry.campaign_id.get()).collect();
    assert_eq!(order, vec![5, 9]);
}

#[test]
fn empty_restriction_is_an_error() {
    let catalog = OutcomeCatalog::new(FixedOutcomes(vec![outcome(1, 1.0, 1.0)]));
    assert!(matches!(
        catalog.for_campaigns(&[CampaignId::new(2)]),
        Err(OutcomeError::NoOutcomes {
            requested: 1
        })
    ));
    assert_eq!(catalog.for_campaigns(&[CampaignId::new(1)]).unwrap().len(), 1);
}

#[test]
fn block_means_average_prefixes() {
    let outcomes = vec![outcome(1, 1.0, 10.0), outcome(2, 3.0, 20.0), outcome(3, 5.0, 60.0)];
    let means = block_means(&outcomes, &[1, 2, 3, 4, 0]);
    assert_eq!(means.len(), 3);
    assert_eq!(means[0].block, 1);
    assert_eq!(means[0].l2_p95, 1.0);
    assert_eq!(means[1].l2_p95, 2.0);
    assert_eq!(means[1].l2_p99, 15.0);
    assert_eq!(means[2].l2_p95, 3.0);
    assert_eq!(means[2].l2_p99, 30.0);
}
