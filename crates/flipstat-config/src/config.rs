// crates/flipstat-config/src/config.rs
// ============================================================================
// Module: Flipstat Configuration
// Description: Configuration loading and validation for Flipstat.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: flipstat-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicitly requested file must exist; when neither `--config` nor the
//! environment names a file and the default file is absent, built-in
//! defaults apply. Every loaded value passes [`FlipstatConfig::validate`]
//! before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use flipstat_core::AnalysisAuditSink;
use flipstat_core::CatalogColumn;
use flipstat_core::DEFAULT_MAX_CATALOG_BYTES;
use flipstat_core::DEFAULT_MAX_MEASUREMENT_BYTES;
use flipstat_core::FileAuditSink;
use flipstat_core::FilterPolicy;
use flipstat_core::NoopAuditSink;
use flipstat_core::StderrAuditSink;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "flipstat.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "FLIPSTAT_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default catalog file path.
pub(crate) const DEFAULT_CATALOG_PATH: &str = "results/campaigns_start.csv";
/// Default outcome file path.
pub(crate) const DEFAULT_OUTCOMES_PATH: &str = "results/campaigns_end.csv";
/// Default measurement directory.
pub(crate) const DEFAULT_DATA_DIR: &str = "results/data";
/// Maximum allowed catalog file size in bytes.
pub const MAX_CATALOG_BYTES: u64 = 1024 * 1024 * 1024;
/// Maximum allowed decompressed measurement file size in bytes.
pub const MAX_MEASUREMENT_BYTES: u64 = 4 * 1024 * 1024 * 1024;
/// Default outcome block sizes for error stability analysis.
pub(crate) const DEFAULT_BLOCK_SIZES: [usize; 5] = [10, 100, 300, 500, 800];
/// Maximum number of configured outcome block sizes.
pub const MAX_BLOCK_SIZES: usize = 64;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Flipstat analysis configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlipstatConfig {
    /// Input file locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Read size limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Audit sink selection.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Filter default overrides.
    #[serde(default)]
    pub filters: FiltersConfig,
    /// Outcome analysis settings.
    #[serde(default)]
    pub outcomes: OutcomesConfig,
}

impl FlipstatConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: `path`, then [`CONFIG_ENV_VAR`], then
    /// [`DEFAULT_CONFIG_NAME`]. Only the default name may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved.path)?;
        if !resolved.explicit && !resolved.path.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved.path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.paths.validate()?;
        self.limits.validate()?;
        self.audit.validate()?;
        self.filters.validate()?;
        self.outcomes.validate()?;
        Ok(())
    }

    /// Builds the filter policy with configured default overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an override names an unknown or
    /// non-defaulted column.
    pub fn filter_policy(&self) -> Result<FilterPolicy, ConfigError> {
        self.filters.policy()
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn audit_sink(&self) -> Result<Arc<dyn AnalysisAuditSink>, ConfigError> {
        self.audit.sink()
    }
}

/// Input file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Campaign catalog CSV.
    #[serde(default = "default_catalog_path")]
    pub catalog: String,
    /// Campaign outcome CSV.
    #[serde(default = "default_outcomes_path")]
    pub outcomes: String,
    /// Directory of per-campaign measurement files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog_path(),
            outcomes: default_outcomes_path(),
            data_dir: default_data_dir(),
        }
    }
}

impl PathsConfig {
    /// Validates path configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("paths.catalog", &self.catalog)?;
        validate_path_string("paths.outcomes", &self.outcomes)?;
        validate_path_string("paths.data_dir", &self.data_dir)?;
        Ok(())
    }

    /// Returns the catalog path.
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        PathBuf::from(self.catalog.trim())
    }

    /// Returns the outcome path.
    #[must_use]
    pub fn outcomes_path(&self) -> PathBuf {
        PathBuf::from(self.outcomes.trim())
    }

    /// Returns the measurement directory.
    #[must_use]
    pub fn data_dir_path(&self) -> PathBuf {
        PathBuf::from(self.data_dir.trim())
    }
}

/// Read size limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum catalog and outcome file size in bytes.
    #[serde(default = "default_max_catalog_bytes")]
    pub max_catalog_bytes: u64,
    /// Maximum decompressed measurement file size in bytes.
    #[serde(default = "default_max_measurement_bytes")]
    pub max_measurement_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_catalog_bytes: default_max_catalog_bytes(),
            max_measurement_bytes: default_max_measurement_bytes(),
        }
    }
}

impl LimitsConfig {
    /// Validates limit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_catalog_bytes == 0 || self.max_catalog_bytes > MAX_CATALOG_BYTES {
            return Err(ConfigError::Invalid("limits.max_catalog_bytes out of range".to_string()));
        }
        if self.max_measurement_bytes == 0 || self.max_measurement_bytes > MAX_MEASUREMENT_BYTES {
            return Err(ConfigError::Invalid(
                "limits.max_measurement_bytes out of range".to_string(),
            ));
        }
        Ok(())
    }
}

/// Audit sink kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
    /// Discard audit events.
    None,
}

/// Audit sink selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (file sink only).
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path required for file sink".to_string()))
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path only allowed for file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }

    /// Builds the audit sink.
    fn sink(&self) -> Result<Arc<dyn AnalysisAuditSink>, ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(format!("audit.path: {err}")))?;
                Ok(Arc::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path required for file sink".to_string()))
            }
        }
    }
}

/// Filter default overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Column header name to integer default.
    #[serde(default)]
    pub defaults: BTreeMap<String, i64>,
}

impl FiltersConfig {
    /// Validates filter overrides.
    fn validate(&self) -> Result<(), ConfigError> {
        self.policy().map(|_| ())
    }

    /// Applies overrides to the declared default table.
    fn policy(&self) -> Result<FilterPolicy, ConfigError> {
        let mut policy = FilterPolicy::default();
        for (name, value) in &self.defaults {
            let column = CatalogColumn::from_name(name).ok_or_else(|| {
                ConfigError::Invalid(format!("filters.defaults: unknown column '{name}'"))
            })?;
            policy
                .override_default(column, i128::from(*value))
                .map_err(|err| ConfigError::Invalid(format!("filters.defaults: {err}")))?;
        }
        Ok(policy)
    }
}

/// Outcome analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomesConfig {
    /// Block sizes used when no `--block` flag is given.
    #[serde(default = "default_block_sizes")]
    pub block_sizes: Vec<usize>,
}

impl Default for OutcomesConfig {
    fn default() -> Self {
        Self {
            block_sizes: default_block_sizes(),
        }
    }
}

impl OutcomesConfig {
    /// Validates outcome settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.block_sizes.is_empty() {
            return Err(ConfigError::Invalid("outcomes.block_sizes must be non-empty".to_string()));
        }
        if self.block_sizes.len() > MAX_BLOCK_SIZES {
            return Err(ConfigError::Invalid("outcomes.block_sizes too many entries".to_string()));
        }
        if self.block_sizes.contains(&0) {
            return Err(ConfigError::Invalid("outcomes.block_sizes must be positive".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolved configuration path.
struct ResolvedPath {
    /// Path to read.
    path: PathBuf,
    /// True when the caller or environment named the path.
    explicit: bool,
}

/// Resolves the config path from the argument, environment, or default.
fn resolve_path(path: Option<&Path>) -> Result<ResolvedPath, ConfigError> {
    if let Some(path) = path {
        return Ok(ResolvedPath {
            path: path.to_path_buf(),
            explicit: true,
        });
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath {
            path: PathBuf::from(env_path),
            explicit: true,
        });
    }
    Ok(ResolvedPath {
        path: PathBuf::from(DEFAULT_CONFIG_NAME),
        explicit: false,
    })
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default catalog path.
fn default_catalog_path() -> String {
    DEFAULT_CATALOG_PATH.to_string()
}

/// Default outcome path.
fn default_outcomes_path() -> String {
    DEFAULT_OUTCOMES_PATH.to_string()
}

/// Default measurement directory.
fn default_data_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}

/// Default catalog size limit.
const fn default_max_catalog_bytes() -> u64 {
    DEFAULT_MAX_CATALOG_BYTES
}

/// Default measurement size limit.
const fn default_max_measurement_bytes() -> u64 {
    DEFAULT_MAX_MEASUREMENT_BYTES
}

/// Default outcome block sizes.
fn default_block_sizes() -> Vec<usize> {
    DEFAULT_BLOCK_SIZES.to_vec()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
