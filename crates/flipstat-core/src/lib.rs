// crates/flipstat-core/src/lib.rs
// ============================================================================
// Module: Flipstat Core
// Description: Analysis engine for CKKS bit-flip fault-injection campaigns.
// Purpose: Select campaigns, load measurements, and compute per-bit statistics.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Flipstat turns raw fault-injection measurements into per-bit error
//! profiles. A caller selects campaigns from a catalog with typed
//! predicates, loads their measurement rows, optionally splits coefficients
//! by slot-gap alignment, and aggregates each bit with a two-stage reduction
//! that is insensitive to how many trials hit each coefficient.
//! Invariants:
//! - Structural parameter errors abort immediately; missing measurement files
//!   are reported through [`AnalysisAuditSink`] and skipped.
//! - An empty load is always an error, never an empty statistic.
//!
//! File formats live in `flipstat-store`; this crate only sees the
//! [`CatalogSource`], [`MeasurementSource`], and [`OutcomeSource`] traits.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AnalysisAuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use crate::core::BitStat;
pub use crate::core::BlockMean;
pub use crate::core::CampaignId;
pub use crate::core::CampaignOutcome;
pub use crate::core::CampaignRecord;
pub use crate::core::Catalog;
pub use crate::core::CatalogColumn;
pub use crate::core::FilterError;
pub use crate::core::FilterKind;
pub use crate::core::FilterPolicy;
pub use crate::core::FilterPredicate;
pub use crate::core::FilterSet;
pub use crate::core::FilterValue;
pub use crate::core::GapClass;
pub use crate::core::MeasurementRow;
pub use crate::core::MetricColumn;
pub use crate::core::NormalizedBitStat;
pub use crate::core::StatsPayload;
pub use interfaces::CatalogSource;
pub use interfaces::DEFAULT_MAX_CATALOG_BYTES;
pub use interfaces::DEFAULT_MAX_MEASUREMENT_BYTES;
pub use interfaces::MeasurementSource;
pub use interfaces::OutcomeSource;
pub use interfaces::SourceError;
pub use runtime::BitNormalizer;
pub use runtime::CampaignCatalog;
pub use runtime::GapClassification;
pub use runtime::LoadError;
pub use runtime::MeasurementLoader;
pub use runtime::OutcomeCatalog;
pub use runtime::OutcomeError;
pub use runtime::ParameterError;
pub use runtime::Selection;
pub use runtime::SelectionError;
pub use runtime::StatsError;
