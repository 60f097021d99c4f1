// crates/flipstat-core/src/core/outcome.rs
// ============================================================================
// Module: Flipstat Campaign Outcomes
// Description: End-of-campaign summary records.
// Purpose: Type the outcome catalog written when a campaign finishes.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The outcome catalog holds one [`CampaignOutcome`] per finished campaign
//! with flip counts and tail percentiles of the L2 error. [`BlockMean`] is
//! the error-stability summary over the first `n` outcomes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::CampaignId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Summary of a finished campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignOutcome {
    /// Campaign identifier.
    pub campaign_id: CampaignId,
    /// Number of bit flips performed.
    pub total_bitflips: u64,
    /// Number of flips classified as silent data corruption.
    pub sdc_count: u64,
    /// Wall-clock duration in seconds.
    pub duration_seconds: u64,
    /// 95th percentile of the L2 error.
    #[serde(rename = "l2_P95")]
    pub l2_p95: f64,
    /// 99th percentile of the L2 error.
    #[serde(rename = "l2_P99")]
    pub l2_p99: f64,
}

/// Mean tail percentiles over a prefix of outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMean {
    /// Number of leading outcomes averaged.
    pub block: usize,
    /// Mean `l2_P95`.
    #[serde(rename = "l2_P95")]
    pub l2_p95: f64,
    /// Mean `l2_P99`.
    #[serde(rename = "l2_P99")]
    pub l2_p99: f64,
}
