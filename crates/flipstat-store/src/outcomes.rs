// crates/flipstat-store/src/outcomes.rs
// ============================================================================
// Module: Flipstat CSV Outcome Source
// Description: End-of-campaign outcome catalog read from the registry CSV.
// Purpose: Type outcome rows, tolerating the registry's repeated duration.
// Dependencies: csv, flipstat-core
// ============================================================================

//! ## Overview
//! Header names are trimmed (the registry writes `l2_P95, l2_P99`). The
//! registry writes `duration_seconds` twice, so rows may carry exactly one
//! field more than the header; the repeated field is dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use csv::StringRecord;
use flipstat_core::CampaignId;
use flipstat_core::CampaignOutcome;
use flipstat_core::DEFAULT_MAX_CATALOG_BYTES;
use flipstat_core::OutcomeSource;
use flipstat_core::SourceError;

use crate::table::CellAt;
use crate::table::Table;
use crate::table::cell;
use crate::table::parse_f64;
use crate::table::parse_u64;
use crate::table::read_plain;

// ============================================================================
// SECTION: Source
// ============================================================================

/// Outcome source backed by a CSV file.
pub struct CsvOutcomeSource {
    /// Outcome file path.
    path: PathBuf,
    /// Maximum accepted file size.
    max_bytes: u64,
}

impl CsvOutcomeSource {
    /// Creates a source with the default catalog size limit.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_limit(path, DEFAULT_MAX_CATALOG_BYTES)
    }

    /// Creates a source with an explicit size limit.
    #[must_use]
    pub fn with_limit(path: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            path: path.into(),
            max_bytes,
        }
    }
}

impl OutcomeSource for CsvOutcomeSource {
    fn load_outcomes(&self) -> Result<Vec<CampaignOutcome>, SourceError> {
        let bytes = read_plain(&self.path, self.max_bytes)?.ok_or_else(|| {
            SourceError::Io(format!("{}: outcome file not found", self.path.display()))
        })?;
        parse_outcomes(&bytes, &self.path)
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Drops the repeated duration field from an over-wide registry row.
fn realign(row: &StringRecord, width: usize, duration: usize) -> StringRecord {
    if row.len() != width + 1 {
        return row.clone();
    }
    row.iter()
        .enumerate()
        .filter(|(index, _)| *index != duration + 1)
        .map(|(_, field)| field)
        .collect()
}

/// Parses outcome CSV bytes.
///
/// # Errors
///
/// Returns [`SourceError::Format`] when a column is missing or a cell cannot
/// be coerced.
pub fn parse_outcomes(bytes: &[u8], path: &Path) -> Result<Vec<CampaignOutcome>, SourceError> {
    let table = Table::parse(bytes, path)?;
    let id = table.require("campaign_id", path)?;
    let flips = table.require("total_bitflips", path)?;
    let sdc = table.require("sdc_count", path)?;
    let duration = table.require("duration_seconds", path)?;
    let p95 = table.require("l2_P95", path)?;
    let p99 = table.require("l2_P99", path)?;
    let width = table.headers.len();

    let mut outcomes = Vec::with_capacity(table.rows.len());
    for (offset, raw_row) in table.rows.iter().enumerate() {
        let row = realign(raw_row, width, duration);
        let at = |column: &'static str| CellAt {
            path,
            row: offset + 1,
            column,
        };
        outcomes.push(CampaignOutcome {
            campaign_id: CampaignId::new(parse_u64(cell(&row, Some(id)), at("campaign_id"))?),
            total_bitflips: parse_u64(cell(&row, Some(flips)), at("total_bitflips"))?,
            sdc_count: parse_u64(cell(&row, Some(sdc)), at("sdc_count"))?,
            duration_seconds: parse_u64(cell(&row, Some(duration)), at("duration_seconds"))?,
            l2_p95: parse_f64(cell(&row, Some(p95)), at("l2_P95"))?,
            l2_p99: parse_f64(cell(&row, Some(p99)), at("l2_P99"))?,
        });
    }
    Ok(outcomes)
}
