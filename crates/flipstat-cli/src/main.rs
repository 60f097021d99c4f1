// crates/flipstat-cli/src/main.rs
// ============================================================================
// Module: Flipstat CLI Entry Point
// Description: Command dispatcher for campaign selection and bit statistics.
// Purpose: Wire configuration, file sources, and engines; emit JSON results.
// Dependencies: clap, flipstat-config, flipstat-core, flipstat-store, serde_json.
// ============================================================================

//! ## Overview
//! The Flipstat CLI selects fault-injection campaigns from the registry
//! catalog, loads their measurements, and prints per-bit statistics, bit-flip
//! plans, and outcome block means as JSON for external plotting. Diagnostics
//! go to the configured audit sink; errors go to stderr with a failure exit
//! code.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use flipstat_config::FlipstatConfig;
use flipstat_config::config_toml_example;
use flipstat_core::AnalysisAuditSink;
use flipstat_core::BitNormalizer;
use flipstat_core::BitStat;
use flipstat_core::BlockMean;
use flipstat_core::CampaignCatalog;
use flipstat_core::CampaignId;
use flipstat_core::CampaignOutcome;
use flipstat_core::CatalogColumn;
use flipstat_core::FilterPredicate;
use flipstat_core::FilterSet;
use flipstat_core::FilterValue;
use flipstat_core::MeasurementLoader;
use flipstat_core::MetricColumn;
use flipstat_core::NormalizedBitStat;
use flipstat_core::OutcomeCatalog;
use flipstat_core::Selection;
use flipstat_core::StatsPayload;
use flipstat_core::runtime::BitRegion;
use flipstat_core::runtime::PlannedBit;
use flipstat_core::runtime::aggregate_by_class;
use flipstat_core::runtime::aggregate_with;
use flipstat_core::runtime::block_means;
use flipstat_core::runtime::classify;
use flipstat_core::runtime::drop_excluded_coefficient;
use flipstat_core::runtime::excluded_coefficient;
use flipstat_core::runtime::plan;
use flipstat_store::CsvCatalogSource;
use flipstat_store::CsvOutcomeSource;
use flipstat_store::GzipMeasurementStore;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "flipstat", version, disable_help_subcommand = true)]
struct Cli {
    /// Optional config file path (defaults to flipstat.toml or env override).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Select campaigns and print the records with filter diagnostics.
    Select(SelectCommand),
    /// Aggregate per-bit statistics over the selected campaigns.
    Stats(StatsCommand),
    /// Print the bit-flip plan for the given parameters.
    Plan(PlanCommand),
    /// Print outcome block means for the selected campaigns.
    Outcomes(OutcomesCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Catalog filter flags shared by selection commands.
#[derive(Args, Debug)]
struct FilterArgs {
    /// Library filter (required unless given through `--where`).
    #[arg(long, value_name = "NAME")]
    library: Option<String>,
    /// Stage filter (required unless given through `--where`).
    #[arg(long, value_name = "NAME")]
    stage: Option<String>,
    /// Additional predicate `COL=TAG:VALUE` or `COL=VALUE` (repeatable).
    #[arg(long = "where", value_name = "COL=TAG:VALUE")]
    predicates: Vec<String>,
}

/// Arguments for `select`.
#[derive(Args, Debug)]
struct SelectCommand {
    /// Catalog filters.
    #[command(flatten)]
    filters: FilterArgs,
}

/// Arguments for `stats`.
#[derive(Args, Debug)]
struct StatsCommand {
    /// Catalog filters.
    #[command(flatten)]
    filters: FilterArgs,
    /// Value to aggregate per bit.
    #[arg(long, value_enum, default_value = "l2_norm")]
    metric: MetricArg,
    /// Split statistics by slot-gap alignment.
    #[arg(long)]
    gap: bool,
    /// Attach normalized bit positions.
    #[arg(long)]
    normalize: bool,
    /// Drop the coefficient the selected library leaves untouched.
    #[arg(long)]
    library_exclusion: bool,
}

/// Aggregated value selector.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum MetricArg {
    /// L2-norm error.
    #[value(name = "l2_norm")]
    L2Norm,
    /// Relative error.
    #[value(name = "rel_error")]
    RelError,
    /// Silent data corruption rate.
    #[value(name = "sdc")]
    Sdc,
}

impl From<MetricArg> for StatsPayload {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::L2Norm => Self::Metric(MetricColumn::L2Norm),
            MetricArg::RelError => Self::Metric(MetricColumn::RelError),
            MetricArg::Sdc => Self::CorruptionRate,
        }
    }
}

/// Arguments for `plan`.
#[derive(Args, Debug)]
struct PlanCommand {
    /// Modulus bits (`logQ`).
    #[arg(long = "log-q", value_name = "BITS")]
    log_q: u32,
    /// Scale bits (`logDelta`).
    #[arg(long = "log-delta", value_name = "BITS")]
    log_delta: u32,
    /// Bits per coefficient.
    #[arg(long, value_name = "BITS")]
    bits: u32,
}

/// Arguments for `outcomes`.
#[derive(Args, Debug)]
struct OutcomesCommand {
    /// Catalog filters.
    #[command(flatten)]
    filters: FilterArgs,
    /// Block size (repeatable; defaults to `outcomes.block_sizes`).
    #[arg(long = "block", value_name = "N")]
    blocks: Vec<usize>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration.
    Check,
    /// Print the canonical example configuration.
    Example,
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// Per-bit statistics, optionally normalized.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum BitStats {
    /// Raw per-bit statistics.
    Raw(Vec<BitStat>),
    /// Statistics with normalized positions.
    Normalized(Vec<NormalizedBitStat>),
}

/// Gap-split statistics.
#[derive(Debug, Serialize)]
struct ClassSplit {
    /// Slot gap.
    gap: u64,
    /// Central coefficient removed before the split.
    central_coefficient: u64,
    /// Rows dropped on the central coefficient.
    excluded_rows: usize,
    /// Statistics over aligned coefficients.
    aligned: BitStats,
    /// Statistics over non-aligned coefficients.
    non_aligned: BitStats,
}

/// `stats` command output.
#[derive(Debug, Serialize)]
struct StatsReport {
    /// Aggregated value.
    payload: StatsPayload,
    /// Campaigns that contributed rows.
    loaded: Vec<CampaignId>,
    /// Campaigns skipped because their file was missing.
    skipped: Vec<CampaignId>,
    /// Rows aggregated.
    rows: usize,
    /// Coefficient dropped by library exclusion.
    #[serde(skip_serializing_if = "Option::is_none")]
    excluded_coefficient: Option<u64>,
    /// Unsplit statistics.
    #[serde(skip_serializing_if = "Option::is_none")]
    bits: Option<BitStats>,
    /// Gap-split statistics.
    #[serde(skip_serializing_if = "Option::is_none")]
    classes: Option<ClassSplit>,
}

/// `plan` command output.
#[derive(Debug, Serialize)]
struct PlanReport {
    /// Modulus bits.
    modulus_bits: u32,
    /// Scale bits.
    scale_bits: u32,
    /// Bits per coefficient.
    bits_per_coeff: u32,
    /// Planned bits in generation order.
    bits: Vec<PlannedBit>,
    /// Planned bit count per region.
    regions: Vec<(BitRegion, usize)>,
}

/// `outcomes` command output.
#[derive(Debug, Serialize)]
struct OutcomesReport {
    /// Campaigns selected from the catalog.
    selected: usize,
    /// Outcomes found for the selection, in catalog order.
    outcomes: Vec<CampaignOutcome>,
    /// Prefix means per block size.
    blocks: Vec<BlockMean>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Select(command) => command_select(&load_config(config_path)?, &command),
        Commands::Stats(command) => command_stats(&load_config(config_path)?, &command),
        Commands::Plan(command) => command_plan(&command),
        Commands::Outcomes(command) => command_outcomes(&load_config(config_path)?, &command),
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Check => command_config_check(config_path),
            ConfigCommand::Example => command_config_example(),
        },
    }
}

/// Loads configuration using the default resolution rules.
fn load_config(path: Option<&Path>) -> CliResult<FlipstatConfig> {
    FlipstatConfig::load(path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

// ============================================================================
// SECTION: Filters
// ============================================================================

/// Parses one `--where` argument.
///
/// `COL=TAG:VALUE` uses the tag verbatim; a bare `COL=VALUE` is an integer
/// when the value parses as one and text otherwise.
fn parse_where(raw: &str) -> CliResult<FilterPredicate> {
    let Some((column, rest)) = raw.split_once('=') else {
        return Err(CliError::new(format!("invalid --where '{raw}': expected COL=TAG:VALUE")));
    };
    let parsed = match rest.split_once(':') {
        Some((tag, value)) => FilterPredicate::parse(column, tag, value),
        None if rest.trim().parse::<i128>().is_ok() => FilterPredicate::parse(column, "int", rest),
        None => FilterPredicate::parse(column, "str", rest),
    };
    parsed.map_err(|err| CliError::new(format!("invalid --where '{raw}': {err}")))
}

/// Builds the caller filter set; `--library`/`--stage` override `--where`.
fn filter_set(args: &FilterArgs) -> CliResult<FilterSet> {
    let mut filters = FilterSet::new();
    for raw in &args.predicates {
        filters.insert(parse_where(raw)?);
    }
    if let Some(library) = &args.library {
        filters.insert(FilterPredicate::new(
            CatalogColumn::Library,
            FilterValue::Text(library.clone()),
        ));
    }
    if let Some(stage) = &args.stage {
        filters.insert(FilterPredicate::new(
            CatalogColumn::Stage,
            FilterValue::Text(stage.clone()),
        ));
    }
    Ok(filters)
}

/// Returns an applied integer predicate as `u32`.
fn effective_u32(selection: &Selection, column: CatalogColumn) -> CliResult<u32> {
    let value = selection.filters.integer(column).ok_or_else(|| {
        CliError::new(format!("no integer {column} filter was applied to the selection"))
    })?;
    u32::try_from(value)
        .map_err(|_| CliError::new(format!("{column} filter value {value} is out of range")))
}

/// Returns the applied library filter text.
fn effective_library(selection: &Selection) -> CliResult<String> {
    match selection.filters.get(CatalogColumn::Library) {
        Some(FilterValue::Text(library)) => Ok(library.clone()),
        _ => Err(CliError::new(
            "no text library filter was applied to the selection".to_string(),
        )),
    }
}

/// Runs catalog selection.
fn select(
    config: &FlipstatConfig,
    audit: &Arc<dyn AnalysisAuditSink>,
    args: &FilterArgs,
) -> CliResult<Selection> {
    let policy = config.filter_policy().map_err(|err| CliError::new(err.to_string()))?;
    let source =
        CsvCatalogSource::with_limit(config.paths.catalog_path(), config.limits.max_catalog_bytes);
    let catalog = CampaignCatalog::new(source, policy, Arc::clone(audit));
    catalog
        .filter(&filter_set(args)?)
        .map_err(|err| CliError::new(format!("campaign selection failed: {err}")))
}

/// Builds the configured audit sink.
fn audit_sink(config: &FlipstatConfig) -> CliResult<Arc<dyn AnalysisAuditSink>> {
    config.audit_sink().map_err(|err| CliError::new(err.to_string()))
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `select`.
fn command_select(config: &FlipstatConfig, command: &SelectCommand) -> CliResult<ExitCode> {
    let audit = audit_sink(config)?;
    let selection = select(config, &audit, &command.filters)?;
    write_json(&selection)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `stats`.
fn command_stats(config: &FlipstatConfig, command: &StatsCommand) -> CliResult<ExitCode> {
    let audit = audit_sink(config)?;
    let selection = select(config, &audit, &command.filters)?;
    let store = GzipMeasurementStore::with_limit(
        config.paths.data_dir_path(),
        config.limits.max_measurement_bytes,
    );
    let loaded = MeasurementLoader::new(store, audit)
        .load(&selection.campaign_ids())
        .map_err(|err| CliError::new(format!("measurement load failed: {err}")))?;

    let mut rows = loaded.rows;
    let mut excluded = None;
    if command.library_exclusion {
        let library = effective_library(&selection)?;
        let log_ring_size = effective_u32(&selection, CatalogColumn::LogN)?;
        excluded = excluded_coefficient(&library, log_ring_size).map_err(parameter_error)?;
        rows = drop_excluded_coefficient(rows, &library, log_ring_size).map_err(parameter_error)?;
    }

    let normalizer = if command.normalize {
        let scale_bits = effective_u32(&selection, CatalogColumn::LogDelta)?;
        let modulus_bits = effective_u32(&selection, CatalogColumn::LogQ)?;
        Some(BitNormalizer::new(scale_bits, modulus_bits).map_err(parameter_error)?)
    } else {
        None
    };
    let finish = |stats: Vec<BitStat>| match &normalizer {
        Some(normalizer) => BitStats::Normalized(normalizer.normalize_stats(stats)),
        None => BitStats::Raw(stats),
    };

    let payload = StatsPayload::from(command.metric);
    let row_count = rows.len();
    let (bits, classes) = if command.gap {
        let log_ring_size = effective_u32(&selection, CatalogColumn::LogN)?;
        let log_slot_count = effective_u32(&selection, CatalogColumn::LogSlots)?;
        let classification =
            classify(rows, log_ring_size, log_slot_count).map_err(parameter_error)?;
        let split = aggregate_by_class(&classification, payload).map_err(stats_error)?;
        let classes = ClassSplit {
            gap: split.gap,
            central_coefficient: classification.central_coefficient,
            excluded_rows: classification.excluded,
            aligned: finish(split.aligned),
            non_aligned: finish(split.non_aligned),
        };
        (None, Some(classes))
    } else {
        (Some(finish(aggregate_with(&rows, payload).map_err(stats_error)?)), None)
    };

    write_json(&StatsReport {
        payload,
        loaded: loaded.loaded,
        skipped: loaded.skipped,
        rows: row_count,
        excluded_coefficient: excluded,
        bits,
        classes,
    })?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `plan`.
fn command_plan(command: &PlanCommand) -> CliResult<ExitCode> {
    let bits = plan(command.log_q, command.log_delta, command.bits);
    let mut regions: Vec<(BitRegion, usize)> = Vec::new();
    for planned in &bits {
        match regions.iter_mut().find(|(region, _)| *region == planned.region) {
            Some((_, count)) => *count += 1,
            None => regions.push((planned.region, 1)),
        }
    }
    write_json(&PlanReport {
        modulus_bits: command.log_q,
        scale_bits: command.log_delta,
        bits_per_coeff: command.bits,
        bits,
        regions,
    })?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `outcomes`.
fn command_outcomes(config: &FlipstatConfig, command: &OutcomesCommand) -> CliResult<ExitCode> {
    let audit = audit_sink(config)?;
    let selection = select(config, &audit, &command.filters)?;
    let source =
        CsvOutcomeSource::with_limit(config.paths.outcomes_path(), config.limits.max_catalog_bytes);
    let outcomes = OutcomeCatalog::new(source)
        .for_campaigns(&selection.campaign_ids())
        .map_err(|err| CliError::new(format!("outcome load failed: {err}")))?;
    let sizes =
        if command.blocks.is_empty() { &config.outcomes.block_sizes } else { &command.blocks };
    let blocks = block_means(&outcomes, sizes);
    write_json(&OutcomesReport {
        selected: selection.len(),
        outcomes,
        blocks,
    })?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config check`.
fn command_config_check(path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(path)?;
    config.filter_policy().map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config example`.
fn command_config_example() -> CliResult<ExitCode> {
    write_stdout_bytes(config_toml_example().as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Formats a parameter validation error.
fn parameter_error(err: flipstat_core::ParameterError) -> CliError {
    CliError::new(format!("invalid campaign parameters: {err}"))
}

/// Formats an aggregation error.
fn stats_error(err: flipstat_core::StatsError) -> CliError {
    CliError::new(format!("aggregation failed: {err}"))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a value to stdout as pretty JSON.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
