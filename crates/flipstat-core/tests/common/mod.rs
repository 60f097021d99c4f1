// crates/flipstat-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared catalog, measurement, and audit fixtures.
// Purpose: Provide in-memory sources for deterministic engine tests.
// Dependencies: flipstat-core
// ============================================================================

//! ## Overview
//! In-memory implementations of the source and audit traits, plus builders
//! for catalog records and measurement rows.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::Cell;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Mutex;

use flipstat_core::AnalysisAuditSink;
use flipstat_core::CampaignId;
use flipstat_core::CampaignRecord;
use flipstat_core::Catalog;
use flipstat_core::CatalogColumn;
use flipstat_core::CatalogSource;
use flipstat_core::MeasurementRow;
use flipstat_core::MeasurementSource;
use flipstat_core::SourceError;
use flipstat_core::audit::FilterAuditEvent;
use flipstat_core::audit::LoadAuditEvent;
use flipstat_core::audit::MissingMeasurementEvent;

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Integer columns populated by [`record`] with their declared defaults.
pub const DEFAULTED_COLUMNS: [(CatalogColumn, i128); 14] = [
    (CatalogColumn::WithNtt, 0),
    (CatalogColumn::LogN, 6),
    (CatalogColumn::LogSlots, 5),
    (CatalogColumn::LogQ, 60),
    (CatalogColumn::LogDelta, 50),
    (CatalogColumn::MultDepth, 0),
    (CatalogColumn::LogMin, 0),
    (CatalogColumn::LogMax, 0),
    (CatalogColumn::DoAdd, 0),
    (CatalogColumn::DoMul, 0),
    (CatalogColumn::DoRot, 0),
    (CatalogColumn::BitPerCoeff, 64),
    (CatalogColumn::NumLimbs, 1),
    (CatalogColumn::Dnum, 3),
];

/// Builds a record with every defaulted column at its declared default.
pub fn record(id: u64, library: &str, stage: &str) -> CampaignRecord {
    let mut record = CampaignRecord::new(CampaignId::new(id), library, stage);
    for (column, value) in DEFAULTED_COLUMNS {
        record.set_integer(column, Some(value)).unwrap();
    }
    record.set_integer(CatalogColumn::Seed, Some(i128::from(id))).unwrap();
    record
}

/// Returns the full column set used by [`record`].
pub fn full_columns() -> BTreeSet<CatalogColumn> {
    let mut columns: BTreeSet<CatalogColumn> =
        [CatalogColumn::CampaignId, CatalogColumn::Library, CatalogColumn::Stage, CatalogColumn::Seed]
            .into_iter()
            .collect();
    columns.extend(DEFAULTED_COLUMNS.iter().map(|(column, _)| *column));
    columns
}

/// Builds a catalog over [`full_columns`].
pub fn catalog(records: Vec<CampaignRecord>) -> Catalog {
    Catalog::new(full_columns(), records).unwrap()
}

/// Builds a metric-only measurement row.
pub fn metric_row(campaign: u64, bit: u32, coeff: u64, l2_norm: f64) -> MeasurementRow {
    MeasurementRow {
        campaign_id: CampaignId::new(campaign),
        bit,
        coeff,
        limb: 0,
        l2_norm: Some(l2_norm),
        rel_error: None,
        is_sdc: None,
    }
}

/// Builds a corruption-flag-only measurement row.
pub fn sdc_row(campaign: u64, bit: u32, coeff: u64, is_sdc: bool) -> MeasurementRow {
    MeasurementRow {
        campaign_id: CampaignId::new(campaign),
        bit,
        coeff,
        limb: 0,
        l2_norm: None,
        rel_error: None,
        is_sdc: Some(is_sdc),
    }
}

// ============================================================================
// SECTION: Sources
// ============================================================================

/// Catalog source returning a fixed catalog.
pub struct StaticCatalog(pub Catalog);

impl CatalogSource for StaticCatalog {
    fn load_catalog(&self) -> Result<Catalog, SourceError> {
        Ok(self.0.clone())
    }
}

/// Measurement source backed by a map; counts every access.
#[derive(Default)]
pub struct MapMeasurements {
    /// Rows per campaign; absent keys model missing files.
    pub campaigns: BTreeMap<u64, Vec<MeasurementRow>>,
    /// Campaigns whose backing data is unreadable.
    pub broken: BTreeSet<u64>,
    /// Number of `load_campaign` calls.
    pub calls: Cell<usize>,
}

impl MapMeasurements {
    /// Adds rows for a campaign.
    pub fn with(mut self, campaign: u64, rows: Vec<MeasurementRow>) -> Self {
        self.campaigns.insert(campaign, rows);
        self
    }
}

impl MeasurementSource for MapMeasurements {
    fn location(&self, campaign_id: CampaignId) -> String {
        format!("memory://{campaign_id}")
    }

    fn load_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Vec<MeasurementRow>>, SourceError> {
        self.calls.set(self.calls.get() + 1);
        if self.broken.contains(&campaign_id.get()) {
            return Err(SourceError::Format("corrupt".to_string()));
        }
        Ok(self.campaigns.get(&campaign_id.get()).cloned())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink capturing events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Filter events.
    pub filters: Mutex<Vec<FilterAuditEvent>>,
    /// Missing-file events.
    pub missing: Mutex<Vec<MissingMeasurementEvent>>,
    /// Load summary events.
    pub loads: Mutex<Vec<LoadAuditEvent>>,
}

impl AnalysisAuditSink for RecordingAuditSink {
    fn record_filter(&self, event: &FilterAuditEvent) {
        self.filters.lock().unwrap().push(event.clone());
    }

    fn record_missing(&self, event: &MissingMeasurementEvent) {
        self.missing.lock().unwrap().push(event.clone());
    }

    fn record_load(&self, event: &LoadAuditEvent) {
        self.loads.lock().unwrap().push(event.clone());
    }
}
