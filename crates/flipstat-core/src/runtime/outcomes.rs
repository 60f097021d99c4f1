// crates/flipstat-core/src/runtime/outcomes.rs
// ============================================================================
// Module: Flipstat Outcome Analysis
// Description: Selection and error-stability summaries of campaign outcomes.
// Purpose: Check how tail error percentiles settle as campaigns accumulate.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! Outcomes are restricted to a selected campaign set in outcome-catalog
//! order. [`block_means`] averages `l2_P95` and `l2_P99` over growing
//! prefixes so the caller can judge whether more campaigns would move them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::BlockMean;
use crate::core::CampaignId;
use crate::core::CampaignOutcome;
use crate::interfaces::OutcomeSource;
use crate::interfaces::SourceError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Outcome analysis errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum OutcomeError {
    /// None of the requested campaigns has an outcome.
    #[error("no outcomes for the {requested} selected campaigns")]
    NoOutcomes {
        /// Campaigns requested.
        requested: usize,
    },
    /// The outcome catalog could not be read.
    #[error(transparent)]
    Source(#[from] SourceError),
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Keeps outcomes whose campaign is in `campaign_ids`, in source order.
///
/// # Errors
///
/// Returns [`OutcomeError::NoOutcomes`] when nothing remains.
pub fn select_outcomes(
    outcomes: Vec<CampaignOutcome>,
    campaign_ids: &[CampaignId],
) -> Result<Vec<CampaignOutcome>, OutcomeError> {
    let wanted: BTreeSet<CampaignId> = campaign_ids.iter().copied().collect();
    let selected: Vec<CampaignOutcome> =
        outcomes.into_iter().filter(|outcome| wanted.contains(&outcome.campaign_id)).collect();
    if selected.is_empty() {
        return Err(OutcomeError::NoOutcomes {
            requested: campaign_ids.len(),
        });
    }
    Ok(selected)
}

/// Returns prefix means for every block size in `1..=outcomes.len()`.
///
/// Sizes outside that range are skipped; output follows `sizes` order.
#[must_use]
pub fn block_means(outcomes: &[CampaignOutcome], sizes: &[usize]) -> Vec<BlockMean> {
    sizes
        .iter()
        .copied()
        .filter(|&block| block > 0 && block <= outcomes.len())
        .map(|block| {
            let prefix = &outcomes[.. block];
            #[allow(clippy::cast_precision_loss, reason = "Block sizes stay far below 2^52.")]
            let count = block as f64;
            BlockMean {
                block,
                l2_p95: prefix.iter().map(|outcome| outcome.l2_p95).sum::<f64>() / count,
                l2_p99: prefix.iter().map(|outcome| outcome.l2_p99).sum::<f64>() / count,
            }
        })
        .collect()
}

// ============================================================================
// SECTION: Outcome Catalog
// ============================================================================

/// Outcome catalog bound to a source.
pub struct OutcomeCatalog<S> {
    /// Outcome source.
    source: S,
}

impl<S: OutcomeSource> OutcomeCatalog<S> {
    /// Creates an outcome catalog over a source.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
        }
    }

    /// Loads outcomes for the given campaigns.
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError`] when the source fails or nothing matches.
    pub fn for_campaigns(
        &self,
        campaign_ids: &[CampaignId],
    ) -> Result<Vec<CampaignOutcome>, OutcomeError> {
        select_outcomes(self.source.load_outcomes()?, campaign_ids)
    }
}
