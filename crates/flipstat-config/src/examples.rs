// crates/flipstat-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and `flipstat config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `flipstat.toml`. The example parses and validates with
//! the same rules as any loaded file.

/// Returns a canonical example `flipstat.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[paths]
catalog = "results/campaigns_start.csv"
outcomes = "results/campaigns_end.csv"
data_dir = "results/data"

[limits]
max_catalog_bytes = 16777216
max_measurement_bytes = 268435456

[audit]
sink = "file"
path = "flipstat-audit.jsonl"

[filters.defaults]
logN = 6
logSlots = 5

[outcomes]
block_sizes = [10, 100, 300, 500, 800]
"#,
    )
}
