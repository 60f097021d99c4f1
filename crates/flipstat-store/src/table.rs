// crates/flipstat-store/src/table.rs
// ============================================================================
// Module: Flipstat Table Helpers
// Description: Bounded file reads and explicit CSV cell coercion.
// Purpose: Validate and coerce every cell at the load boundary.
// Dependencies: csv, flate2, flipstat-core
// ============================================================================

//! ## Overview
//! Files are read with a hard byte limit (decompressed bytes for gzip) and
//! parsed with headers trimmed. Every cell coercion either yields a typed
//! value or fails with the line and column; nothing is passed through
//! un-coerced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use csv::StringRecord;
use csv::Trim;
use flate2::read::GzDecoder;
use flipstat_core::SourceError;

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

/// Opens a file, returning `None` when it does not exist.
fn open_optional(path: &Path) -> Result<Option<File>, SourceError> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(SourceError::Io(format!("{}: {err}", path.display()))),
    }
}

/// Reads at most `max_bytes` from a reader, failing when more remain.
fn read_bounded<R: Read>(reader: R, max_bytes: u64, path: &Path) -> Result<Vec<u8>, SourceError> {
    let mut bytes = Vec::new();
    let mut limited = reader.take(max_bytes.saturating_add(1));
    limited
        .read_to_end(&mut bytes)
        .map_err(|err| SourceError::Format(format!("{}: {err}", path.display())))?;
    let size = u64::try_from(bytes.len())
        .map_err(|_| SourceError::Limit(format!("{}: size exceeds u64", path.display())))?;
    if size > max_bytes {
        return Err(SourceError::Limit(format!(
            "{} exceeds {max_bytes} bytes",
            path.display()
        )));
    }
    Ok(bytes)
}

/// Reads a plain file with a size limit.
///
/// Returns `None` when the file does not exist.
pub fn read_plain(path: &Path, max_bytes: u64) -> Result<Option<Vec<u8>>, SourceError> {
    let Some(file) = open_optional(path)? else {
        return Ok(None);
    };
    let metadata =
        file.metadata().map_err(|err| SourceError::Io(format!("{}: {err}", path.display())))?;
    if metadata.len() > max_bytes {
        return Err(SourceError::Limit(format!(
            "{} exceeds {max_bytes} bytes",
            path.display()
        )));
    }
    read_bounded(file, max_bytes, path).map(Some)
}

/// Reads and decompresses a gzip file with a decompressed size limit.
///
/// Returns `None` when the file does not exist.
pub fn read_gzip(path: &Path, max_bytes: u64) -> Result<Option<Vec<u8>>, SourceError> {
    let Some(file) = open_optional(path)? else {
        return Ok(None);
    };
    read_bounded(GzDecoder::new(file), max_bytes, path).map(Some)
}

// ============================================================================
// SECTION: CSV
// ============================================================================

/// Parsed CSV body with trimmed headers.
pub struct Table {
    /// Trimmed header names.
    pub headers: StringRecord,
    /// Data rows.
    pub rows: Vec<StringRecord>,
}

impl Table {
    /// Parses CSV bytes. Rows may be wider or narrower than the header.
    pub fn parse(bytes: &[u8], path: &Path) -> Result<Self, SourceError> {
        let mut reader =
            ReaderBuilder::new().trim(Trim::All).flexible(true).from_reader(bytes);
        let headers = reader
            .headers()
            .map_err(|err| SourceError::Format(format!("{}: {err}", path.display())))?
            .clone();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| SourceError::Format(format!("{}: {err}", path.display())))?;
        Ok(Self {
            headers,
            rows,
        })
    }

    /// Returns the index of a header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Returns the index of a header, failing when absent.
    pub fn require(&self, name: &str, path: &Path) -> Result<usize, SourceError> {
        self.column(name).ok_or_else(|| {
            SourceError::Format(format!("{}: missing column '{name}'", path.display()))
        })
    }
}

/// Location of a cell for error messages.
#[derive(Clone, Copy)]
pub struct CellAt<'a> {
    /// Source file.
    pub path: &'a Path,
    /// One-based data row number.
    pub row: usize,
    /// Column name.
    pub column: &'a str,
}

impl CellAt<'_> {
    /// Builds a coercion error for this cell.
    fn error(self, raw: &str, expected: &str) -> SourceError {
        SourceError::Format(format!(
            "{} row {} column '{}': cannot coerce '{raw}' to {expected}",
            self.path.display(),
            self.row,
            self.column
        ))
    }
}

/// Returns the trimmed cell text, treating absent cells as empty.
pub fn cell(row: &StringRecord, index: Option<usize>) -> &str {
    index.and_then(|index| row.get(index)).unwrap_or("").trim()
}

/// Coerces a required unsigned integer cell.
pub fn parse_u64(raw: &str, at: CellAt<'_>) -> Result<u64, SourceError> {
    raw.parse::<u64>().map_err(|_| at.error(raw, "unsigned integer"))
}

/// Coerces a required `u32` cell.
pub fn parse_u32(raw: &str, at: CellAt<'_>) -> Result<u32, SourceError> {
    raw.parse::<u32>().map_err(|_| at.error(raw, "unsigned integer"))
}

/// Coerces an optional integer cell; empty is `None`.
///
/// Accepts the full signed and unsigned 64-bit ranges (registry seeds are
/// unsigned).
pub fn parse_optional_integer(raw: &str, at: CellAt<'_>) -> Result<Option<i128>, SourceError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i128>().map(Some).map_err(|_| at.error(raw, "integer"))
}

/// Coerces an optional float cell; accepts `inf` and signed `nan` spellings.
pub fn parse_optional_f64(raw: &str, at: CellAt<'_>) -> Result<Option<f64>, SourceError> {
    if raw.is_empty() {
        return Ok(None);
    }
    if raw.trim_start_matches(['+', '-']).eq_ignore_ascii_case("nan") {
        return Ok(Some(f64::NAN));
    }
    raw.parse::<f64>().map(Some).map_err(|_| at.error(raw, "float"))
}

/// Coerces a required float cell.
pub fn parse_f64(raw: &str, at: CellAt<'_>) -> Result<f64, SourceError> {
    parse_optional_f64(raw, at)?.ok_or_else(|| at.error(raw, "float"))
}

/// Coerces an optional flag cell (`0/1/true/false`); empty is `None`.
pub fn parse_optional_flag(raw: &str, at: CellAt<'_>) -> Result<Option<bool>, SourceError> {
    match raw.to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" => Ok(Some(true)),
        "0" | "false" => Ok(Some(false)),
        _ => Err(at.error(raw, "flag")),
    }
}
