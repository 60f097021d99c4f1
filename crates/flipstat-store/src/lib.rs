// crates/flipstat-store/src/lib.rs
// ============================================================================
// Module: Flipstat Store
// Description: File-backed sources for campaign catalogs and measurements.
// Purpose: Read registry CSV files and gzip measurement files into core types.
// Dependencies: csv, flate2, flipstat-core
// ============================================================================

//! ## Overview
//! This crate implements the `flipstat-core` source traits over the files a
//! fault-injection campaign run leaves behind: the start catalog CSV, the
//! end-of-campaign outcome CSV, and one gzip CSV of measurements per
//! campaign. Invariants:
//! - Every file read is bounded by a byte limit (decompressed for gzip).
//! - Cells are coerced explicitly; a non-coercible cell fails the load.
//! - Only a missing measurement file is tolerated (reported as `None`).

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod measurements;
pub mod outcomes;
mod table;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::CsvCatalogSource;
pub use catalog::parse_catalog;
pub use measurements::GzipMeasurementStore;
pub use measurements::measurement_file_name;
pub use measurements::parse_measurements;
pub use outcomes::CsvOutcomeSource;
pub use outcomes::parse_outcomes;
