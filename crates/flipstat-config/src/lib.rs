// crates/flipstat-config/src/lib.rs
// ============================================================================
// Module: Flipstat Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for flipstat.toml semantics.
// Dependencies: flipstat-core, serde, toml
// ============================================================================

//! ## Overview
//! `flipstat-config` defines the configuration object that replaces shared
//! path and default constants. It is constructed once, validated fail-closed,
//! and handed to each component explicitly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
