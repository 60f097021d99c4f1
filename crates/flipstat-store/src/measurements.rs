// crates/flipstat-store/src/measurements.rs
// ============================================================================
// Module: Flipstat Gzip Measurement Store
// Description: Per-campaign gzip CSV measurement files.
// Purpose: Resolve, decompress, and type campaign measurement rows.
// Dependencies: csv, flate2, flipstat-core
// ============================================================================

//! ## Overview
//! Each campaign writes `campaign_{id:06}.csv.gz` into the data directory
//! with header `limb,coeff,bit,stage,l2_norm,rel_error,is_sdc`. Only `bit`
//! and `coeff` are mandatory. A missing file is reported as `None`; a file
//! that exists but fails to decompress or parse is an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use csv::StringRecord;
use flipstat_core::CampaignId;
use flipstat_core::DEFAULT_MAX_MEASUREMENT_BYTES;
use flipstat_core::MeasurementRow;
use flipstat_core::MeasurementSource;
use flipstat_core::SourceError;

use crate::table::CellAt;
use crate::table::Table;
use crate::table::cell;
use crate::table::parse_optional_f64;
use crate::table::parse_optional_flag;
use crate::table::parse_u32;
use crate::table::parse_u64;
use crate::table::read_gzip;

// ============================================================================
// SECTION: File Names
// ============================================================================

/// Returns the file name for a campaign's measurements.
#[must_use]
pub fn measurement_file_name(campaign_id: CampaignId) -> String {
    format!("campaign_{:06}.csv.gz", campaign_id.get())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Measurement source over a directory of gzip CSV files.
pub struct GzipMeasurementStore {
    /// Directory holding campaign files.
    data_dir: PathBuf,
    /// Maximum decompressed bytes per file.
    max_bytes: u64,
}

impl GzipMeasurementStore {
    /// Creates a store with the default size limit.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_limit(data_dir, DEFAULT_MAX_MEASUREMENT_BYTES)
    }

    /// Creates a store with an explicit decompressed size limit.
    #[must_use]
    pub fn with_limit(data_dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            data_dir: data_dir.into(),
            max_bytes,
        }
    }

    /// Returns the path of a campaign's measurement file.
    #[must_use]
    pub fn path_for(&self, campaign_id: CampaignId) -> PathBuf {
        self.data_dir.join(measurement_file_name(campaign_id))
    }
}

impl MeasurementSource for GzipMeasurementStore {
    fn location(&self, campaign_id: CampaignId) -> String {
        self.path_for(campaign_id).display().to_string()
    }

    fn load_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Vec<MeasurementRow>>, SourceError> {
        let path = self.path_for(campaign_id);
        let Some(bytes) = read_gzip(&path, self.max_bytes)? else {
            return Ok(None);
        };
        parse_measurements(&bytes, campaign_id, &path).map(Some)
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses decompressed measurement CSV bytes.
///
/// # Errors
///
/// Returns [`SourceError::Format`] when `bit` or `coeff` is missing or any
/// cell cannot be coerced.
pub fn parse_measurements(
    bytes: &[u8],
    campaign_id: CampaignId,
    path: &Path,
) -> Result<Vec<MeasurementRow>, SourceError> {
    let table = Table::parse(bytes, path)?;
    let bit = Some(table.require("bit", path)?);
    let coeff = Some(table.require("coeff", path)?);
    let limb = table.column("limb");
    let l2_norm = table.column("l2_norm");
    let rel_error = table.column("rel_error");
    let is_sdc = table.column("is_sdc");

    let mut rows = Vec::with_capacity(table.rows.len());
    for (offset, record) in table.rows.iter().enumerate() {
        let at = |column: &'static str| CellAt {
            path,
            row: offset + 1,
            column,
        };
        let limb_raw = cell(record, limb);
        rows.push(MeasurementRow {
            campaign_id,
            bit: parse_u32(cell(record, bit), at("bit"))?,
            coeff: parse_u64(cell(record, coeff), at("coeff"))?,
            limb: if limb_raw.is_empty() { 0 } else { parse_u32(limb_raw, at("limb"))? },
            l2_norm: parse_metric(record, l2_norm, at("l2_norm"))?,
            rel_error: parse_metric(record, rel_error, at("rel_error"))?,
            is_sdc: parse_optional_flag(cell(record, is_sdc), at("is_sdc"))?,
        });
    }
    Ok(rows)
}

/// Coerces a metric cell.
///
/// A blank cell in a present column reads as `NaN` and is skipped by the
/// statistics engine; an absent column stays `None`.
fn parse_metric(
    record: &StringRecord,
    index: Option<usize>,
    at: CellAt<'_>,
) -> Result<Option<f64>, SourceError> {
    if index.is_none() {
        return Ok(None);
    }
    Ok(Some(parse_optional_f64(cell(record, index), at)?.unwrap_or(f64::NAN)))
}
