// crates/flipstat-core/src/core/mod.rs
// ============================================================================
// Module: Flipstat Core Types
// Description: Canonical catalog, filter, measurement, and statistics types.
// Purpose: Provide stable, serializable types shared by every component.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types define campaign records, typed filter predicates, measurement
//! rows, and the per-bit statistics surface. These types are the canonical
//! source of truth for the store, config, and CLI crates.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod filter;
pub mod identifiers;
pub mod measurement;
pub mod outcome;
pub mod stats;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::CampaignParams;
pub use catalog::CampaignRecord;
pub use catalog::Catalog;
pub use catalog::CatalogColumn;
pub use catalog::CatalogError;
pub use catalog::CellRef;
pub use catalog::ColumnKind;
pub use catalog::REQUIRED_CATALOG_COLUMNS;
pub use catalog::normalize_text;
pub use filter::ColumnClass;
pub use filter::DECLARED_DEFAULTS;
pub use filter::EffectiveFilters;
pub use filter::FilterError;
pub use filter::FilterKind;
pub use filter::FilterPolicy;
pub use filter::FilterPredicate;
pub use filter::FilterSet;
pub use filter::FilterValue;
pub use filter::REQUIRED_FILTERS;
pub use identifiers::CampaignId;
pub use measurement::ClassifiedRow;
pub use measurement::GapClass;
pub use measurement::MeasurementRow;
pub use measurement::MetricColumn;
pub use outcome::BlockMean;
pub use outcome::CampaignOutcome;
pub use stats::BitStat;
pub use stats::NormalizedBitStat;
pub use stats::StatsPayload;
