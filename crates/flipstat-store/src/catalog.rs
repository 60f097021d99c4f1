// crates/flipstat-store/src/catalog.rs
// ============================================================================
// Module: Flipstat CSV Catalog Source
// Description: Campaign catalog read from the registry's start CSV.
// Purpose: Type and validate catalog rows, caching by file modification state.
// Dependencies: csv, flipstat-core
// ============================================================================

//! ## Overview
//! The campaign registry appends one row per campaign to a CSV file. Known
//! header columns are typed; unknown ones (such as `timestamp_start`) are
//! ignored. Text columns are normalized, empty integer cells are missing,
//! and any other non-integer cell fails the load.
//!
//! The parsed catalog is cached keyed by the file's modification time and
//! length. Filtering always runs against the returned catalog, so the cache
//! never changes selection results.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::SystemTime;

use flipstat_core::CampaignId;
use flipstat_core::Catalog;
use flipstat_core::CatalogColumn;
use flipstat_core::CatalogSource;
use flipstat_core::DEFAULT_MAX_CATALOG_BYTES;
use flipstat_core::SourceError;
use flipstat_core::core::CampaignRecord;
use flipstat_core::core::ColumnKind;

use crate::table::CellAt;
use crate::table::Table;
use crate::table::cell;
use crate::table::parse_optional_integer;
use crate::table::parse_u64;
use crate::table::read_plain;

// ============================================================================
// SECTION: Source
// ============================================================================

/// File modification state used as the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    /// Last modification time, when the platform reports one.
    modified: Option<SystemTime>,
    /// File length in bytes.
    len: u64,
}

/// Catalog source backed by a CSV file.
pub struct CsvCatalogSource {
    /// Catalog file path.
    path: PathBuf,
    /// Maximum accepted file size.
    max_bytes: u64,
    /// Last parsed catalog with its file stamp.
    cache: Mutex<Option<(FileStamp, Catalog)>>,
}

impl CsvCatalogSource {
    /// Creates a source with the default size limit.
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
            cache: Mutex::new(None),
        }
    }

    /// Returns the catalog path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current file stamp.
    fn stamp(&self) -> Result<FileStamp, SourceError> {
        let metadata = fs::metadata(&self.path)
            .map_err(|err| SourceError::Io(format!("{}: {err}", self.path.display())))?;
        Ok(FileStamp {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }

    /// Reads and parses the catalog file.
    fn read(&self) -> Result<Catalog, SourceError> {
        let bytes = read_plain(&self.path, self.max_bytes)?.ok_or_else(|| {
            SourceError::Io(format!("{}: catalog file not found", self.path.display()))
        })?;
        parse_catalog(&bytes, &self.path)
    }
}

impl CatalogSource for CsvCatalogSource {
    fn load_catalog(&self) -> Result<Catalog, SourceError> {
        let stamp = self.stamp()?;
        if let Ok(cache) = self.cache.lock()
            && let Some((cached, catalog)) = cache.as_ref()
            && *cached == stamp
        {
            return Ok(catalog.clone());
        }
        let catalog = self.read()?;
        if let Ok(mut cache) = self.cache.lock() {
            *cache = Some((stamp, catalog.clone()));
        }
        Ok(catalog)
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses catalog CSV bytes.
///
/// # Errors
///
/// Returns [`SourceError`] when a required column is missing, a header
/// repeats, a cell cannot be coerced, or an identifier repeats.
pub fn parse_catalog(bytes: &[u8], path: &Path) -> Result<Catalog, SourceError> {
    let table = Table::parse(bytes, path)?;

    let mut columns = BTreeSet::new();
    let mut indexed: Vec<(CatalogColumn, usize)> = Vec::new();
    for (index, header) in table.headers.iter().enumerate() {
        let Some(column) = CatalogColumn::from_name(header) else {
            continue;
        };
        if !columns.insert(column) {
            return Err(SourceError::Format(format!(
                "{}: duplicate column '{header}'",
                path.display()
            )));
        }
        indexed.push((column, index));
    }

    let id_index = table.require(CatalogColumn::CampaignId.as_str(), path)?;
    let library_index = table.require(CatalogColumn::Library.as_str(), path)?;
    let stage_index = table.require(CatalogColumn::Stage.as_str(), path)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (offset, row) in table.rows.iter().enumerate() {
        let at = |column: CatalogColumn| CellAt {
            path,
            row: offset + 1,
            column: column.as_str(),
        };
        let id = parse_u64(cell(row, Some(id_index)), at(CatalogColumn::CampaignId))?;
        let mut record = CampaignRecord::new(
            CampaignId::new(id),
            cell(row, Some(library_index)),
            cell(row, Some(stage_index)),
        );
        for &(column, index) in &indexed {
            if matches!(
                column,
                CatalogColumn::CampaignId | CatalogColumn::Library | CatalogColumn::Stage
            ) {
                continue;
            }
            let raw = cell(row, Some(index));
            match column.kind() {
                ColumnKind::Text => {
                    let value = (!raw.is_empty()).then_some(raw);
                    record.set_text(column, value)?;
                }
                ColumnKind::Integer => {
                    record.set_integer(column, parse_optional_integer(raw, at(column))?)?;
                }
            }
        }
        records.push(record);
    }

    Ok(Catalog::new(columns, records)?)
}
