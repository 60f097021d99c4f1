// crates/flipstat-core/src/audit.rs
// ============================================================================
// Module: Flipstat Audit Logging
// Description: Structured events for catalog selection and measurement loading.
// Purpose: Emit JSON-line diagnostics without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events carry the data-completeness diagnostics of a run: how many
//! catalog rows each predicate matched, which defaults were injected, and
//! which campaigns had no measurement file. Sinks route events to stderr,
//! an append-only file, or nowhere.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::CampaignId;
use crate::core::CatalogColumn;
use crate::runtime::selection::ColumnMatch;
use crate::runtime::selection::FilterReport;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Catalog filter audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct FilterAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Catalog rows considered.
    pub catalog_rows: usize,
    /// Per-column match counts in evaluation order.
    pub matches: Vec<ColumnMatch>,
    /// Columns whose predicate was injected from the default table.
    pub defaulted: Vec<CatalogColumn>,
    /// Defaulted columns skipped because the catalog lacks them.
    pub skipped_defaults: Vec<CatalogColumn>,
    /// Rows matching every predicate.
    pub selected: usize,
}

/// Missing measurement file audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct MissingMeasurementEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Campaign without backing data.
    pub campaign_id: CampaignId,
    /// Location that was checked.
    pub location: String,
}

/// Measurement load summary audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoadAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Campaigns requested.
    pub requested: usize,
    /// Campaigns that contributed rows.
    pub loaded: usize,
    /// Campaigns skipped because their data was missing.
    pub skipped: Vec<CampaignId>,
    /// Total rows loaded.
    pub rows: usize,
}

/// Returns the current time in milliseconds since the epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

impl FilterAuditEvent {
    /// Creates a filter event from a selection report.
    #[must_use]
    pub fn new(report: &FilterReport) -> Self {
        Self {
            event: "catalog_filter",
            timestamp_ms: now_ms(),
            catalog_rows: report.catalog_rows,
            matches: report.matches.clone(),
            defaulted: report.defaulted.clone(),
            skipped_defaults: report.skipped_defaults.clone(),
            selected: report.selected,
        }
    }
}

impl MissingMeasurementEvent {
    /// Creates a missing-file event.
    #[must_use]
    pub fn new(campaign_id: CampaignId, location: String) -> Self {
        Self {
            event: "measurement_missing",
            timestamp_ms: now_ms(),
            campaign_id,
            location,
        }
    }
}

impl LoadAuditEvent {
    /// Creates a load summary event.
    #[must_use]
    pub fn new(requested: usize, loaded: usize, skipped: Vec<CampaignId>, rows: usize) -> Self {
        Self {
            event: "measurement_load",
            timestamp_ms: now_ms(),
            requested,
            loaded,
            skipped,
            rows,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for analysis events.
pub trait AnalysisAuditSink: Send + Sync {
    /// Record a catalog filter event.
    fn record_filter(&self, event: &FilterAuditEvent);

    /// Record a missing measurement file.
    fn record_missing(&self, _event: &MissingMeasurementEvent) {}

    /// Record a measurement load summary.
    fn record_load(&self, _event: &LoadAuditEvent) {}
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StderrAuditSink {
    /// Writes one serialized event to stderr.
    fn emit<T: Serialize>(event: &T) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

impl AnalysisAuditSink for StderrAuditSink {
    fn record_filter(&self, event: &FilterAuditEvent) {
        Self::emit(event);
    }

    fn record_missing(&self, event: &MissingMeasurementEvent) {
        Self::emit(event);
    }

    fn record_load(&self, event: &LoadAuditEvent) {
        Self::emit(event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event.
    fn emit<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AnalysisAuditSink for FileAuditSink {
    fn record_filter(&self, event: &FilterAuditEvent) {
        self.emit(event);
    }

    fn record_missing(&self, event: &MissingMeasurementEvent) {
        self.emit(event);
    }

    fn record_load(&self, event: &LoadAuditEvent) {
        self.emit(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AnalysisAuditSink for NoopAuditSink {
    fn record_filter(&self, _event: &FilterAuditEvent) {}
}
