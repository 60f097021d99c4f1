// crates/flipstat-core/src/interfaces/mod.rs
// ============================================================================
// Module: Flipstat Interfaces
// Description: Backend-agnostic interfaces for catalog and measurement sources.
// Purpose: Define the contract surfaces used by the Flipstat runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the runtime reads campaign catalogs, measurement
//! rows, and outcomes without embedding file formats. Implementations must
//! be deterministic, read-only, and must validate and coerce values at the
//! load boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CampaignId;
use crate::core::CampaignOutcome;
use crate::core::Catalog;
use crate::core::CatalogError;
use crate::core::MeasurementRow;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum catalog or outcome file size in bytes.
pub const DEFAULT_MAX_CATALOG_BYTES: u64 = 16 * 1024 * 1024;
/// Default maximum decompressed measurement file size in bytes.
pub const DEFAULT_MAX_MEASUREMENT_BYTES: u64 = 256 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Source read errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SourceError {
    /// I/O failure while reading a source.
    #[error("source io error: {0}")]
    Io(String),
    /// Malformed content (bad header, non-coercible cell, bad compression).
    #[error("source format error: {0}")]
    Format(String),
    /// Content exceeds a configured size limit.
    #[error("source limit exceeded: {0}")]
    Limit(String),
    /// Parsed content violates catalog invariants.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

// ============================================================================
// SECTION: Catalog Source
// ============================================================================

/// Source of the campaign catalog.
pub trait CatalogSource {
    /// Loads the full catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the catalog cannot be read or is invalid.
    fn load_catalog(&self) -> Result<Catalog, SourceError>;
}

impl<T: CatalogSource + ?Sized> CatalogSource for &T {
    fn load_catalog(&self) -> Result<Catalog, SourceError> {
        (**self).load_catalog()
    }
}

// ============================================================================
// SECTION: Measurement Source
// ============================================================================

/// Source of per-campaign measurement rows.
pub trait MeasurementSource {
    /// Describes where rows for a campaign are read from (for diagnostics).
    fn location(&self, campaign_id: CampaignId) -> String;

    /// Loads rows for a campaign, stamped with its identifier.
    ///
    /// Returns `Ok(None)` when the campaign has no backing data.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when backing data exists but cannot be read.
    fn load_campaign(&self, campaign_id: CampaignId)
    -> Result<Option<Vec<MeasurementRow>>, SourceError>;
}

impl<T: MeasurementSource + ?Sized> MeasurementSource for &T {
    fn location(&self, campaign_id: CampaignId) -> String {
        (**self).location(campaign_id)
    }

    fn load_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Vec<MeasurementRow>>, SourceError> {
        (**self).load_campaign(campaign_id)
    }
}

// ============================================================================
// SECTION: Outcome Source
// ============================================================================

/// Source of end-of-campaign outcomes.
pub trait OutcomeSource {
    /// Loads every outcome in source order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the outcomes cannot be read or are invalid.
    fn load_outcomes(&self) -> Result<Vec<CampaignOutcome>, SourceError>;
}

impl<T: OutcomeSource + ?Sized> OutcomeSource for &T {
    fn load_outcomes(&self) -> Result<Vec<CampaignOutcome>, SourceError> {
        (**self).load_outcomes()
    }
}
