// crates/flipstat-core/src/runtime/mod.rs
// ============================================================================
// Module: Flipstat Runtime
// Description: Selection, loading, classification, and aggregation engines.
// Purpose: Run the batch analysis pipeline over typed core records.
// Dependencies: crate::{core, interfaces, audit}
// ============================================================================

//! ## Overview
//! The runtime is a synchronous batch pipeline. Each stage consumes its
//! full input before the next begins:
//! selection, loading, gap classification, then two-stage aggregation.
//! The plan generator and normalizer are pure helpers over bit widths.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod gap;
pub mod loader;
pub mod normalize;
pub mod outcomes;
pub mod parameters;
pub mod plan;
pub mod selection;
pub mod stats;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use gap::GapClassification;
pub use gap::classify;
pub use gap::drop_excluded_coefficient;
pub use gap::excluded_coefficient;
pub use gap::gap_class;
pub use gap::slot_gap;
pub use loader::LoadError;
pub use loader::LoadedMeasurements;
pub use loader::MeasurementLoader;
pub use normalize::BitNormalizer;
pub use normalize::normalize;
pub use outcomes::OutcomeCatalog;
pub use outcomes::OutcomeError;
pub use outcomes::block_means;
pub use outcomes::select_outcomes;
pub use parameters::MAX_LOG_RING_SIZE;
pub use parameters::ParameterError;
pub use parameters::ring_size;
pub use plan::BitRegion;
pub use plan::PlannedBit;
pub use plan::classify_bit;
pub use plan::generate;
pub use plan::plan;
pub use selection::CampaignCatalog;
pub use selection::ColumnMatch;
pub use selection::FilterReport;
pub use selection::Selection;
pub use selection::SelectionError;
pub use selection::select_campaigns;
pub use stats::ClassStats;
pub use stats::StatsError;
pub use stats::aggregate;
pub use stats::aggregate_by_class;
pub use stats::aggregate_corruption_rate;
pub use stats::aggregate_with;
