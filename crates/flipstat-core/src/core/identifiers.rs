// crates/flipstat-core/src/core/identifiers.rs
// ============================================================================
// Module: Flipstat Identifiers
// Description: Canonical identifiers for fault-injection campaigns.
// Purpose: Provide a strongly typed campaign key with a stable wire form.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Campaign identifiers are allocated by the campaign registry as
//! monotonically increasing integers. They serialize as plain numbers and
//! link measurement rows back to catalog records.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Campaign identifier.
///
/// # Invariants
/// - Non-negative; zero is a valid identifier.
/// - Unique within a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(u64);

impl CampaignId {
    /// Creates a campaign identifier from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for CampaignId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
