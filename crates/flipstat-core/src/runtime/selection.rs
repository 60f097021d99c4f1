// crates/flipstat-core/src/runtime/selection.rs
// ============================================================================
// Module: Flipstat Campaign Selection
// Description: Typed filter matching over the campaign catalog.
// Purpose: Select campaigns with default filling and per-column diagnostics.
// Dependencies: crate::{core, interfaces, audit}, serde, thiserror
// ============================================================================

//! ## Overview
//! Selection expands the caller's filters through the [`FilterPolicy`],
//! validates every effective predicate against the catalog schema before
//! matching anything, then applies predicates column by column (logical AND)
//! so each column's match count can be reported. An empty selection is a
//! valid result; callers decide whether it is fatal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::audit::AnalysisAuditSink;
use crate::audit::FilterAuditEvent;
use crate::core::CampaignId;
use crate::core::CampaignRecord;
use crate::core::Catalog;
use crate::core::CatalogColumn;
use crate::core::CellRef;
use crate::core::ColumnKind;
use crate::core::FilterError;
use crate::core::FilterPolicy;
use crate::core::FilterSet;
use crate::core::FilterValue;
use crate::core::normalize_text;
use crate::interfaces::CatalogSource;
use crate::interfaces::SourceError;

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Match count for one effective predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMatch {
    /// Filtered column.
    pub column: CatalogColumn,
    /// Effective predicate value.
    pub value: FilterValue,
    /// Catalog rows matching this predicate alone.
    pub matched: usize,
}

/// Diagnostics for a selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterReport {
    /// Catalog rows considered.
    pub catalog_rows: usize,
    /// Per-column match counts in evaluation order.
    pub matches: Vec<ColumnMatch>,
    /// Columns whose predicate came from the default table.
    pub defaulted: Vec<CatalogColumn>,
    /// Defaulted columns not applied because the catalog lacks them.
    pub skipped_defaults: Vec<CatalogColumn>,
    /// Rows matching every predicate.
    pub selected: usize,
}

/// Result of a catalog selection.
///
/// # Invariants
/// - `records` preserves catalog order.
/// - `filters` holds exactly the predicates that were applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    /// Matching records.
    pub records: Vec<CampaignRecord>,
    /// Applied predicates (caller filters plus injected defaults).
    pub filters: FilterSet,
    /// Selection diagnostics.
    pub report: FilterReport,
}

impl Selection {
    /// Returns the selected campaign identifiers in catalog order.
    #[must_use]
    pub fn campaign_ids(&self) -> Vec<CampaignId> {
        self.records.iter().map(|record| record.campaign_id).collect()
    }

    /// Returns the number of selected records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// SECTION: Matching
// ============================================================================

/// Selects catalog records matching every effective predicate.
///
/// # Errors
///
/// Returns [`FilterError::MissingFilter`] when a required column is absent,
/// [`FilterError::Schema`] when a caller predicate targets a column the
/// catalog lacks, and [`FilterError::TypeMismatch`] when a predicate kind
/// cannot be compared with its column.
pub fn select_campaigns(
    catalog: &Catalog,
    filters: &FilterSet,
    policy: &FilterPolicy,
) -> Result<Selection, FilterError> {
    let effective = policy.expand(filters)?;

    let mut applied = FilterSet::new();
    let mut skipped_defaults = Vec::new();
    for (column, value) in effective.filters.iter() {
        if !catalog.has_column(column) {
            if effective.defaulted.contains(&column) {
                skipped_defaults.push(column);
                continue;
            }
            return Err(FilterError::Schema(column.as_str().to_string()));
        }
        applied = applied.with(column, prepare_value(column, value)?);
    }

    let records = catalog.records();
    let mut mask = vec![true; records.len()];
    let mut matches = Vec::with_capacity(applied.len());
    for (column, value) in applied.iter() {
        let mut matched = 0;
        for (keep, record) in mask.iter_mut().zip(records) {
            let hit = cell_matches(record.value(column), value);
            if hit {
                matched += 1;
            }
            *keep &= hit;
        }
        matches.push(ColumnMatch {
            column,
            value: value.clone(),
            matched,
        });
    }

    let selected: Vec<CampaignRecord> = records
        .iter()
        .zip(&mask)
        .filter(|(_, keep)| **keep)
        .map(|(record, _)| record.clone())
        .collect();
    let defaulted =
        effective.defaulted.iter().copied().filter(|column| applied.contains(*column)).collect();
    let report = FilterReport {
        catalog_rows: records.len(),
        matches,
        defaulted,
        skipped_defaults,
        selected: selected.len(),
    };
    Ok(Selection {
        records: selected,
        filters: applied,
        report,
    })
}

/// Checks predicate/column kind compatibility and normalizes text values.
fn prepare_value(column: CatalogColumn, value: &FilterValue) -> Result<FilterValue, FilterError> {
    match (column.kind(), value) {
        (ColumnKind::Text, FilterValue::Text(text)) => Ok(FilterValue::Text(normalize_text(text))),
        (ColumnKind::Integer, FilterValue::Integer(_) | FilterValue::Float(_)) => Ok(value.clone()),
        (expected, found) => Err(FilterError::TypeMismatch {
            column,
            expected,
            found: found.kind(),
        }),
    }
}

/// Returns true when a cell equals a prepared predicate value.
fn cell_matches(cell: Option<CellRef<'_>>, expected: &FilterValue) -> bool {
    match (cell, expected) {
        (Some(CellRef::Text(actual)), FilterValue::Text(expected)) => actual == expected,
        (Some(CellRef::Integer(actual)), FilterValue::Integer(expected)) => actual == *expected,
        (Some(CellRef::Integer(actual)), FilterValue::Float(expected)) => {
            integer_equals_float(actual, *expected)
        }
        _ => false,
    }
}

/// Compares an integer cell with a float predicate after coercion.
fn integer_equals_float(actual: i128, expected: f64) -> bool {
    #[allow(
        clippy::cast_precision_loss,
        clippy::float_cmp,
        reason = "Float predicates match by exact equality after coercion."
    )]
    let equal = actual as f64 == expected;
    equal
}

// ============================================================================
// SECTION: Campaign Catalog
// ============================================================================

/// Campaign selection errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The catalog could not be loaded.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The filters are invalid for the catalog.
    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Campaign catalog bound to a source and filter policy.
///
/// Each [`CampaignCatalog::filter`] call reads the source afresh.
pub struct CampaignCatalog<S> {
    /// Catalog source.
    source: S,
    /// Column classification used for default filling.
    policy: FilterPolicy,
    /// Audit sink for selection diagnostics.
    audit: Arc<dyn AnalysisAuditSink>,
}

impl<S: CatalogSource> CampaignCatalog<S> {
    /// Creates a catalog over a source.
    #[must_use]
    pub fn new(source: S, policy: FilterPolicy, audit: Arc<dyn AnalysisAuditSink>) -> Self {
        Self {
            source,
            policy,
            audit,
        }
    }

    /// Returns the filter policy.
    #[must_use]
    pub const fn policy(&self) -> &FilterPolicy {
        &self.policy
    }

    /// Loads the catalog and selects matching campaigns.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] when the catalog cannot be read or the
    /// filters are invalid.
    pub fn filter(&self, filters: &FilterSet) -> Result<Selection, SelectionError> {
        let catalog = self.source.load_catalog()?;
        let selection = select_campaigns(&catalog, filters, &self.policy)?;
        self.audit.record_filter(&FilterAuditEvent::new(&selection.report));
        Ok(selection)
    }
}
