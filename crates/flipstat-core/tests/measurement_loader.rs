// crates/flipstat-core/tests/measurement_loader.rs
// ============================================================================
// Module: Measurement Loader Tests
// Description: Ordering, missing-file tolerance, and empty-load failures.
// Purpose: Ensure loads are deterministic and never yield empty data.
// Dependencies: flipstat-core
// ============================================================================

//! Measurement loader tests.

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

use std::sync::Arc;

use flipstat_core::CampaignCatalog;
use flipstat_core::CampaignId;
use flipstat_core::CatalogColumn;
use flipstat_core::FilterPolicy;
use flipstat_core::FilterSet;
use flipstat_core::FilterValue;
use flipstat_core::LoadError;
use flipstat_core::MeasurementLoader;
use flipstat_core::NoopAuditSink;

use crate::common::MapMeasurements;
use crate::common::RecordingAuditSink;
use crate::common::StaticCatalog;
use crate::common::catalog;
use crate::common::metric_row;
use crate::common::record;

fn ids(values: &[u64]) -> Vec<CampaignId> {
    values.iter().copied().map(CampaignId::new).collect()
}

#[test]
fn empty_selection_fails_before_any_read() {
    let catalog = CampaignCatalog::new(
        StaticCatalog(catalog(vec![record(1, "heaan", "encode")])),
        FilterPolicy::default(),
        Arc::new(NoopAuditSink),
    );
    let selection = catalog
        .filter(
            &FilterSet::new()
                .with(CatalogColumn::Library, FilterValue::Text("seal".to_string()))
                .with(CatalogColumn::Stage, FilterValue::Text("encode".to_string())),
        )
        .unwrap();
    assert!(selection.is_empty());

    let source = MapMeasurements::default().with(1, vec![metric_row(1, 0, 0, 1.0)]);
    let loader = MeasurementLoader::new(&source, Arc::new(NoopAuditSink));
    let err = loader.load(&selection.campaign_ids()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::NoData {
            requested: 0
        }
    ));
    assert_eq!(source.calls.get(), 0);
}

#[test]
fn campaigns_load_in_request_order_and_are_stamped() {
    let source = MapMeasurements::default()
        .with(7, vec![metric_row(0, 1, 0, 1.0), metric_row(0, 2, 0, 2.0)])
        .with(3, vec![metric_row(99, 3, 0, 3.0)]);
    let loader = MeasurementLoader::new(&source, Arc::new(NoopAuditSink));
    let loaded = loader.load(&ids(&[7, 3])).unwrap();

    let order: Vec<(u64, u32)> =
        loaded.rows.iter().map(|row| (row.campaign_id.get(), row.bit)).collect();
    assert_eq!(order, vec![(7, 1), (7, 2), (3, 3)]);
    assert_eq!(loaded.loaded, ids(&[7, 3]));
    assert!(loaded.skipped.is_empty());
}

#[test]
fn missing_campaigns_are_skipped_and_reported() {
    let source = MapMeasurements::default().with(2, vec![metric_row(2, 0, 0, 1.0)]);
    let audit = Arc::new(RecordingAuditSink::default());
    let loader = MeasurementLoader::new(&source, audit.clone());
    let loaded = loader.load(&ids(&[1, 2, 3])).unwrap();

    assert_eq!(loaded.rows.len(), 1);
    assert_eq!(loaded.skipped, ids(&[1, 3]));
    assert_eq!(source.calls.get(), 3);

    let missing = audit.missing.lock().unwrap();
    assert_eq!(missing.len(), 2);
    assert_eq!(missing[0].campaign_id, CampaignId::new(1));
    assert_eq!(missing[0].location, "memory://1");
    let loads = audit.loads.lock().unwrap();
    assert_eq!(loads.len(), 1);
    assert_eq!(loads[0].requested, 3);
    assert_eq!(loads[0].loaded, 1);
    assert_eq!(loads[0].rows, 1);
}

#[test]
fn all_missing_is_no_data() {
    let source = MapMeasurements::default();
    let loader = MeasurementLoader::new(&source, Arc::new(NoopAuditSink));
    assert!(matches!(
        loader.load(&ids(&[1, 2])),
        Err(LoadError::NoData {
            requested: 2
        })
    ));
}

#[test]
fn unreadable_campaign_aborts_the_load() {
    let mut source = MapMeasurements::default().with(1, vec![metric_row(1, 0, 0, 1.0)]);
    source.broken.insert(2);
    let loader = MeasurementLoader::new(&source, Arc::new(NoopAuditSink));
    let err = loader.load(&ids(&[1, 2, 3])).unwrap_err();
    assert!(matches!(err, LoadError::Source { campaign_id, .. } if campaign_id == CampaignId::new(2)));
    assert_eq!(source.calls.get(), 2);
}
