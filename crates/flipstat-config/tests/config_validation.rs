//! Config loading and validation tests for flipstat-config.
// crates/flipstat-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Load rules, defaults, limits, audit, and filter overrides.
// Purpose: Ensure configuration fails closed on every invalid input.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;

use flipstat_config::AuditSinkKind;
use flipstat_config::ConfigError;
use flipstat_config::FlipstatConfig;
use flipstat_config::MAX_BLOCK_SIZES;
use flipstat_config::MAX_CATALOG_BYTES;
use flipstat_config::MAX_MEASUREMENT_BYTES;
use flipstat_config::config_toml_example;
use flipstat_core::CatalogColumn;
use flipstat_core::DEFAULT_MAX_CATALOG_BYTES;
use flipstat_core::DEFAULT_MAX_MEASUREMENT_BYTES;
use flipstat_core::core::ColumnClass;

mod common;

use common::TestResult;
use common::assert_invalid;
use common::minimal_config;
use common::write_config;

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn empty_config_uses_registry_layout() -> TestResult {
    let config = minimal_config().map_err(|err| err.to_string())?;
    assert_eq!(config.paths.catalog, "results/campaigns_start.csv");
    assert_eq!(config.paths.outcomes, "results/campaigns_end.csv");
    assert_eq!(config.paths.data_dir, "results/data");
    assert_eq!(config.limits.max_catalog_bytes, DEFAULT_MAX_CATALOG_BYTES);
    assert_eq!(config.limits.max_measurement_bytes, DEFAULT_MAX_MEASUREMENT_BYTES);
    assert_eq!(config.audit.sink, AuditSinkKind::Stderr);
    assert!(config.filters.defaults.is_empty());
    assert_eq!(config.outcomes.block_sizes, vec![10, 100, 300, 500, 800]);
    config.validate().map_err(|err| err.to_string())
}

#[test]
fn canonical_example_validates() -> TestResult {
    let config =
        FlipstatConfig::from_toml_str(&config_toml_example()).map_err(|err| err.to_string())?;
    assert_eq!(config.audit.sink, AuditSinkKind::File);
    assert_eq!(config.audit.path.as_deref(), Some("flipstat-audit.jsonl"));
    assert_eq!(config.filters.defaults.get("logN"), Some(&6));
    Ok(())
}

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn load_reads_explicit_file_over_defaults() -> TestResult {
    let (_dir, path) = write_config(b"[paths]\ndata_dir = \"campaign-data\"\n")?;
    let config = FlipstatConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    assert_eq!(config.paths.data_dir, "campaign-data");
    assert_eq!(config.paths.catalog, "results/campaigns_start.csv");
    Ok(())
}

#[test]
fn load_missing_explicit_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = FlipstatConfig::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut contents = b"# padding\n".to_vec();
    contents.resize(1024 * 1024 + 1, b'#');
    let (_dir, path) = write_config(&contents)?;
    assert_invalid(FlipstatConfig::load(Some(&path)), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8() -> TestResult {
    let (_dir, path) = write_config(&[0xff, 0xfe, 0x00])?;
    assert_invalid(FlipstatConfig::load(Some(&path)), "config file must be utf-8")
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let (_dir, path) = write_config(b"[paths\ncatalog = ")?;
    match FlipstatConfig::load(Some(&path)) {
        Err(ConfigError::Parse(_)) => Ok(()),
        other => Err(format!("expected parse error, got {other:?}")),
    }
}

#[test]
fn load_rejects_overlong_path_component() -> TestResult {
    let long = "a".repeat(256);
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join(format!("{long}.toml"));
    assert_invalid(FlipstatConfig::load(Some(&path)), "config path component too long")
}

#[test]
fn load_validates_file_contents() -> TestResult {
    let (_dir, path) = write_config(b"[limits]\nmax_catalog_bytes = 0\n")?;
    assert_invalid(FlipstatConfig::load(Some(&path)), "limits.max_catalog_bytes out of range")
}

// ============================================================================
// SECTION: Paths and Limits
// ============================================================================

#[test]
fn empty_paths_are_rejected() -> TestResult {
    assert_invalid(
        FlipstatConfig::from_toml_str("[paths]\ncatalog = \"  \"\n"),
        "paths.catalog must be non-empty",
    )?;
    assert_invalid(
        FlipstatConfig::from_toml_str("[paths]\noutcomes = \"\"\n"),
        "paths.outcomes must be non-empty",
    )?;
    assert_invalid(
        FlipstatConfig::from_toml_str("[paths]\ndata_dir = \"\"\n"),
        "paths.data_dir must be non-empty",
    )
}

#[test]
fn path_accessors_trim_whitespace() -> TestResult {
    let config = FlipstatConfig::from_toml_str("[paths]\ncatalog = \" runs/start.csv \"\n")
        .map_err(|err| err.to_string())?;
    assert_eq!(config.paths.catalog_path(), std::path::PathBuf::from("runs/start.csv"));
    Ok(())
}

#[test]
fn limits_are_bounded() -> TestResult {
    let mut config = minimal_config().map_err(|err| err.to_string())?;
    config.limits.max_catalog_bytes = MAX_CATALOG_BYTES;
    config.limits.max_measurement_bytes = MAX_MEASUREMENT_BYTES;
    config.validate().map_err(|err| err.to_string())?;

    config.limits.max_catalog_bytes = MAX_CATALOG_BYTES + 1;
    assert_invalid(config.validate(), "limits.max_catalog_bytes out of range")?;

    config.limits.max_catalog_bytes = 1;
    config.limits.max_measurement_bytes = MAX_MEASUREMENT_BYTES + 1;
    assert_invalid(config.validate(), "limits.max_measurement_bytes out of range")?;

    config.limits.max_measurement_bytes = 0;
    assert_invalid(config.validate(), "limits.max_measurement_bytes out of range")
}

#[test]
fn block_sizes_are_validated() -> TestResult {
    assert_invalid(
        FlipstatConfig::from_toml_str("[outcomes]\nblock_sizes = []\n"),
        "outcomes.block_sizes must be non-empty",
    )?;
    assert_invalid(
        FlipstatConfig::from_toml_str("[outcomes]\nblock_sizes = [10, 0]\n"),
        "outcomes.block_sizes must be positive",
    )?;
    let mut config = minimal_config().map_err(|err| err.to_string())?;
    config.outcomes.block_sizes = (1 ..= MAX_BLOCK_SIZES + 1).collect();
    assert_invalid(config.validate(), "outcomes.block_sizes too many entries")
}

// ============================================================================
// SECTION: Audit
// ============================================================================

#[test]
fn file_sink_requires_path() -> TestResult {
    assert_invalid(
        FlipstatConfig::from_toml_str("[audit]\nsink = \"file\"\n"),
        "audit.path required for file sink",
    )
}

#[test]
fn path_rejected_without_file_sink() -> TestResult {
    assert_invalid(
        FlipstatConfig::from_toml_str("[audit]\nsink = \"none\"\npath = \"audit.jsonl\"\n"),
        "audit.path only allowed for file sink",
    )
}

#[test]
fn unknown_sink_kind_is_parse_error() {
    let result = FlipstatConfig::from_toml_str("[audit]\nsink = \"syslog\"\n");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn file_sink_opens_audit_log() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let audit_path = dir.path().join("audit.jsonl");
    let mut config = minimal_config().map_err(|err| err.to_string())?;
    config.audit.sink = AuditSinkKind::File;
    config.audit.path = Some(audit_path.display().to_string());
    config.validate().map_err(|err| err.to_string())?;
    let _sink = config.audit_sink().map_err(|err| err.to_string())?;
    assert!(fs::metadata(&audit_path).is_ok());
    Ok(())
}

#[test]
fn file_sink_in_missing_directory_is_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let mut config = minimal_config().map_err(|err| err.to_string())?;
    config.audit.sink = AuditSinkKind::File;
    config.audit.path = Some(dir.path().join("missing/audit.jsonl").display().to_string());
    match config.audit_sink() {
        Err(ConfigError::Io(message)) if message.starts_with("audit.path") => Ok(()),
        Err(other) => Err(format!("unexpected error: {other}")),
        Ok(_) => Err("expected io error".to_string()),
    }
}

// ============================================================================
// SECTION: Filter Defaults
// ============================================================================

#[test]
fn filter_overrides_replace_declared_defaults() -> TestResult {
    let config = FlipstatConfig::from_toml_str("[filters.defaults]\nlogN = 14\ndnum = 2\n")
        .map_err(|err| err.to_string())?;
    let policy = config.filter_policy().map_err(|err| err.to_string())?;
    assert_eq!(policy.class(CatalogColumn::LogN), ColumnClass::Defaulted(14));
    assert_eq!(policy.class(CatalogColumn::Dnum), ColumnClass::Defaulted(2));
    assert_eq!(policy.class(CatalogColumn::LogSlots), ColumnClass::Defaulted(5));
    Ok(())
}

#[test]
fn filter_override_of_unknown_column_is_invalid() -> TestResult {
    assert_invalid(
        FlipstatConfig::from_toml_str("[filters.defaults]\ntimestamp_start = 1\n"),
        "filters.defaults: unknown column 'timestamp_start'",
    )
}

#[test]
fn filter_override_of_required_or_unfiltered_column_is_invalid() -> TestResult {
    assert_invalid(
        FlipstatConfig::from_toml_str("[filters.defaults]\nlibrary = 1\n"),
        "column library has no declared default",
    )?;
    assert_invalid(
        FlipstatConfig::from_toml_str("[filters.defaults]\nseed = 7\n"),
        "column seed has no declared default",
    )
}
