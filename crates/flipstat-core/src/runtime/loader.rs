// crates/flipstat-core/src/runtime/loader.rs
// ============================================================================
// Module: Flipstat Measurement Loader
// Description: Sequential loading and concatenation of campaign measurements.
// Purpose: Gather raw rows for selected campaigns, tolerating missing files.
// Dependencies: crate::{core, interfaces, audit}, thiserror
// ============================================================================

//! ## Overview
//! The loader reads each selected campaign in the order given and
//! concatenates its rows, preserving row order within a campaign. A
//! campaign without backing data is reported and skipped; a backing file
//! that exists but cannot be read aborts the load. An empty result is a
//! hard failure because no statistic can be computed from it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::audit::AnalysisAuditSink;
use crate::audit::LoadAuditEvent;
use crate::audit::MissingMeasurementEvent;
use crate::core::CampaignId;
use crate::core::MeasurementRow;
use crate::interfaces::MeasurementSource;
use crate::interfaces::SourceError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Measurement load errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No rows are available after loading.
    #[error("no measurement data loaded ({requested} campaigns requested)")]
    NoData {
        /// Campaigns requested.
        requested: usize,
    },
    /// Backing data exists for a campaign but could not be read.
    #[error("failed to load campaign {campaign_id}: {source}")]
    Source {
        /// Campaign being loaded.
        campaign_id: CampaignId,
        /// Underlying source error.
        source: SourceError,
    },
}

/// Concatenated measurement rows with load diagnostics.
///
/// # Invariants
/// - `rows` is non-empty.
/// - Rows appear grouped by campaign in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMeasurements {
    /// Concatenated rows.
    pub rows: Vec<MeasurementRow>,
    /// Campaigns that contributed at least one row.
    pub loaded: Vec<CampaignId>,
    /// Campaigns skipped because their data was missing.
    pub skipped: Vec<CampaignId>,
}

// ============================================================================
// SECTION: Loader
// ============================================================================

/// Loader bound to a measurement source.
pub struct MeasurementLoader<S> {
    /// Measurement source.
    source: S,
    /// Audit sink for missing-file and summary events.
    audit: Arc<dyn AnalysisAuditSink>,
}

impl<S: MeasurementSource> MeasurementLoader<S> {
    /// Creates a loader over a source.
    #[must_use]
    pub fn new(source: S, audit: Arc<dyn AnalysisAuditSink>) -> Self {
        Self {
            source,
            audit,
        }
    }

    /// Loads and concatenates rows for the given campaigns.
    ///
    /// An empty identifier list fails before any source access.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NoData`] when no rows are available and
    /// [`LoadError::Source`] when existing data cannot be read.
    pub fn load(&self, campaign_ids: &[CampaignId]) -> Result<LoadedMeasurements, LoadError> {
        if campaign_ids.is_empty() {
            return Err(LoadError::NoData {
                requested: 0,
            });
        }

        let mut rows = Vec::new();
        let mut loaded = Vec::new();
        let mut skipped = Vec::new();
        for &campaign_id in campaign_ids {
            let batch = self.source.load_campaign(campaign_id).map_err(|source| {
                LoadError::Source {
                    campaign_id,
                    source,
                }
            })?;
            let Some(batch) = batch else {
                self.audit.record_missing(&MissingMeasurementEvent::new(
                    campaign_id,
                    self.source.location(campaign_id),
                ));
                skipped.push(campaign_id);
                continue;
            };
            if !batch.is_empty() {
                loaded.push(campaign_id);
            }
            rows.extend(batch.into_iter().map(|mut row| {
                row.campaign_id = campaign_id;
                row
            }));
        }

        self.audit.record_load(&LoadAuditEvent::new(
            campaign_ids.len(),
            loaded.len(),
            skipped.clone(),
            rows.len(),
        ));
        if rows.is_empty() {
            return Err(LoadError::NoData {
                requested: campaign_ids.len(),
            });
        }
        Ok(LoadedMeasurements {
            rows,
            loaded,
            skipped,
        })
    }
}
