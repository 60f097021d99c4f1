// crates/flipstat-core/src/core/catalog.rs
// ============================================================================
// Module: Flipstat Campaign Catalog Model
// Description: Typed catalog columns, campaign records, and the catalog table.
// Purpose: Replace duck-typed tabular columns with explicit, typed fields.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The campaign catalog holds one [`CampaignRecord`] per fault-injection
//! campaign. Columns form a closed set ([`CatalogColumn`]) so filter
//! predicates can be validated against a schema before any matching runs.
//! Text columns are stored trimmed and lower-cased; integer columns are
//! stored as `i128` (wide enough for unsigned 64-bit seeds) with `None` marking an empty cell.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::CampaignId;

// ============================================================================
// SECTION: Columns
// ============================================================================

/// Value kind stored by a catalog column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Case/whitespace-normalized text.
    Text,
    /// Integer spanning the signed and unsigned 64-bit ranges.
    Integer,
}

impl ColumnKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known catalog column.
///
/// # Invariants
/// - `as_str` returns the exact header name written by the campaign registry.
/// - Declaration order is the order in which filter diagnostics are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CatalogColumn {
    /// Campaign identifier.
    #[serde(rename = "campaign_id")]
    CampaignId,
    /// HE library name.
    #[serde(rename = "library")]
    Library,
    /// Pipeline stage that was faulted.
    #[serde(rename = "stage")]
    Stage,
    /// Bits per coefficient word.
    #[serde(rename = "bitPerCoeff")]
    BitPerCoeff,
    /// Log2 of the ring dimension.
    #[serde(rename = "logN")]
    LogN,
    /// Modulus bit-length.
    #[serde(rename = "logQ")]
    LogQ,
    /// Scale factor bit-length.
    #[serde(rename = "logDelta")]
    LogDelta,
    /// Log2 of the slot count.
    #[serde(rename = "logSlots")]
    LogSlots,
    /// Multiplicative depth.
    #[serde(rename = "mult_depth")]
    MultDepth,
    /// Key-generation seed.
    #[serde(rename = "seed")]
    Seed,
    /// Input-generation seed.
    #[serde(rename = "seed_input")]
    SeedInput,
    /// NTT-domain flag.
    #[serde(rename = "withNTT")]
    WithNtt,
    /// Number of RNS limbs.
    #[serde(rename = "num_limbs")]
    NumLimbs,
    /// Log2 of the input lower bound.
    #[serde(rename = "logMin")]
    LogMin,
    /// Log2 of the input upper bound.
    #[serde(rename = "logMax")]
    LogMax,
    /// Homomorphic addition enabled.
    #[serde(rename = "doAdd")]
    DoAdd,
    /// Homomorphic multiplication enabled.
    #[serde(rename = "doMul")]
    DoMul,
    /// Rotation amount (zero disables rotation).
    #[serde(rename = "doRot")]
    DoRot,
    /// Flip strategy code.
    #[serde(rename = "flipType")]
    FlipType,
    /// Exhaustive-sweep flag.
    #[serde(rename = "isExhaustive")]
    IsExhaustive,
    /// Key-switching decomposition number.
    #[serde(rename = "dnum")]
    Dnum,
    /// Rescaling technique label.
    #[serde(rename = "scaleTech")]
    ScaleTech,
}

impl CatalogColumn {
    /// Every known column in declaration order.
    pub const ALL: [Self; 22] = [
        Self::CampaignId,
        Self::Library,
        Self::Stage,
        Self::BitPerCoeff,
        Self::LogN,
        Self::LogQ,
        Self::LogDelta,
        Self::LogSlots,
        Self::MultDepth,
        Self::Seed,
        Self::SeedInput,
        Self::WithNtt,
        Self::NumLimbs,
        Self::LogMin,
        Self::LogMax,
        Self::DoAdd,
        Self::DoMul,
        Self::DoRot,
        Self::FlipType,
        Self::IsExhaustive,
        Self::Dnum,
        Self::ScaleTech,
    ];

    /// Returns the header name for the column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CampaignId => "campaign_id",
            Self::Library => "library",
            Self::Stage => "stage",
            Self::BitPerCoeff => "bitPerCoeff",
            Self::LogN => "logN",
            Self::LogQ => "logQ",
            Self::LogDelta => "logDelta",
            Self::LogSlots => "logSlots",
            Self::MultDepth => "mult_depth",
            Self::Seed => "seed",
            Self::SeedInput => "seed_input",
            Self::WithNtt => "withNTT",
            Self::NumLimbs => "num_limbs",
            Self::LogMin => "logMin",
            Self::LogMax => "logMax",
            Self::DoAdd => "doAdd",
            Self::DoMul => "doMul",
            Self::DoRot => "doRot",
            Self::FlipType => "flipType",
            Self::IsExhaustive => "isExhaustive",
            Self::Dnum => "dnum",
            Self::ScaleTech => "scaleTech",
        }
    }

    /// Resolves a header or filter name to a known column.
    ///
    /// Surrounding whitespace is ignored; the comparison is case-sensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|column| column.as_str() == name)
    }

    /// Returns the value kind stored by the column.
    #[must_use]
    pub const fn kind(self) -> ColumnKind {
        match self {
            Self::Library | Self::Stage | Self::ScaleTech => ColumnKind::Text,
            _ => ColumnKind::Integer,
        }
    }
}

impl fmt::Display for CatalogColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Cells
// ============================================================================

/// Borrowed view of a single catalog cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRef<'a> {
    /// Normalized text cell.
    Text(&'a str),
    /// Integer cell.
    Integer(i128),
}

/// Normalizes categorical text the way catalog columns are stored.
#[must_use]
pub fn normalize_text(value: &str) -> String {
    value.trim().to_lowercase()
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Numeric and auxiliary campaign parameters.
///
/// # Invariants
/// - `None` marks an empty or absent cell; it never matches a predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignParams {
    /// Bits per coefficient word.
    #[serde(rename = "bitPerCoeff")]
    pub bit_per_coeff: Option<i128>,
    /// Log2 of the ring dimension.
    #[serde(rename = "logN")]
    pub log_n: Option<i128>,
    /// Modulus bit-length.
    #[serde(rename = "logQ")]
    pub log_q: Option<i128>,
    /// Scale factor bit-length.
    #[serde(rename = "logDelta")]
    pub log_delta: Option<i128>,
    /// Log2 of the slot count.
    #[serde(rename = "logSlots")]
    pub log_slots: Option<i128>,
    /// Multiplicative depth.
    pub mult_depth: Option<i128>,
    /// Key-generation seed.
    pub seed: Option<i128>,
    /// Input-generation seed.
    pub seed_input: Option<i128>,
    /// NTT-domain flag.
    #[serde(rename = "withNTT")]
    pub with_ntt: Option<i128>,
    /// Number of RNS limbs.
    pub num_limbs: Option<i128>,
    /// Log2 of the input lower bound.
    #[serde(rename = "logMin")]
    pub log_min: Option<i128>,
    /// Log2 of the input upper bound.
    #[serde(rename = "logMax")]
    pub log_max: Option<i128>,
    /// Homomorphic addition enabled.
    #[serde(rename = "doAdd")]
    pub do_add: Option<i128>,
    /// Homomorphic multiplication enabled.
    #[serde(rename = "doMul")]
    pub do_mul: Option<i128>,
    /// Rotation amount.
    #[serde(rename = "doRot")]
    pub do_rot: Option<i128>,
    /// Flip strategy code.
    #[serde(rename = "flipType")]
    pub flip_type: Option<i128>,
    /// Exhaustive-sweep flag.
    #[serde(rename = "isExhaustive")]
    pub is_exhaustive: Option<i128>,
    /// Key-switching decomposition number.
    pub dnum: Option<i128>,
    /// Rescaling technique label (normalized).
    #[serde(rename = "scaleTech")]
    pub scale_tech: Option<String>,
}

impl CampaignParams {
    /// Returns the integer slot backing a column, if it is an integer parameter.
    const fn integer_slot(&self, column: CatalogColumn) -> Option<&Option<i128>> {
        match column {
            CatalogColumn::BitPerCoeff => Some(&self.bit_per_coeff),
            CatalogColumn::LogN => Some(&self.log_n),
            CatalogColumn::LogQ => Some(&self.log_q),
            CatalogColumn::LogDelta => Some(&self.log_delta),
            CatalogColumn::LogSlots => Some(&self.log_slots),
            CatalogColumn::MultDepth => Some(&self.mult_depth),
            CatalogColumn::Seed => Some(&self.seed),
            CatalogColumn::SeedInput => Some(&self.seed_input),
            CatalogColumn::WithNtt => Some(&self.with_ntt),
            CatalogColumn::NumLimbs => Some(&self.num_limbs),
            CatalogColumn::LogMin => Some(&self.log_min),
            CatalogColumn::LogMax => Some(&self.log_max),
            CatalogColumn::DoAdd => Some(&self.do_add),
            CatalogColumn::DoMul => Some(&self.do_mul),
            CatalogColumn::DoRot => Some(&self.do_rot),
            CatalogColumn::FlipType => Some(&self.flip_type),
            CatalogColumn::IsExhaustive => Some(&self.is_exhaustive),
            CatalogColumn::Dnum => Some(&self.dnum),
            CatalogColumn::CampaignId
            | CatalogColumn::Library
            | CatalogColumn::Stage
            | CatalogColumn::ScaleTech => None,
        }
    }

    /// Mutable counterpart of [`Self::integer_slot`].
    const fn integer_slot_mut(&mut self, column: CatalogColumn) -> Option<&mut Option<i128>> {
        match column {
            CatalogColumn::BitPerCoeff => Some(&mut self.bit_per_coeff),
            CatalogColumn::LogN => Some(&mut self.log_n),
            CatalogColumn::LogQ => Some(&mut self.log_q),
            CatalogColumn::LogDelta => Some(&mut self.log_delta),
            CatalogColumn::LogSlots => Some(&mut self.log_slots),
            CatalogColumn::MultDepth => Some(&mut self.mult_depth),
            CatalogColumn::Seed => Some(&mut self.seed),
            CatalogColumn::SeedInput => Some(&mut self.seed_input),
            CatalogColumn::WithNtt => Some(&mut self.with_ntt),
            CatalogColumn::NumLimbs => Some(&mut self.num_limbs),
            CatalogColumn::LogMin => Some(&mut self.log_min),
            CatalogColumn::LogMax => Some(&mut self.log_max),
            CatalogColumn::DoAdd => Some(&mut self.do_add),
            CatalogColumn::DoMul => Some(&mut self.do_mul),
            CatalogColumn::DoRot => Some(&mut self.do_rot),
            CatalogColumn::FlipType => Some(&mut self.flip_type),
            CatalogColumn::IsExhaustive => Some(&mut self.is_exhaustive),
            CatalogColumn::Dnum => Some(&mut self.dnum),
            CatalogColumn::CampaignId
            | CatalogColumn::Library
            | CatalogColumn::Stage
            | CatalogColumn::ScaleTech => None,
        }
    }
}

/// One catalog row describing a single campaign.
///
/// # Invariants
/// - `library` and `stage` are stored normalized (trimmed, lower-cased).
/// - Immutable once the catalog has been constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRecord {
    /// Campaign identifier.
    pub campaign_id: CampaignId,
    /// HE library name.
    pub library: String,
    /// Faulted pipeline stage.
    pub stage: String,
    /// Numeric and auxiliary parameters.
    #[serde(flatten)]
    pub params: CampaignParams,
}

impl CampaignRecord {
    /// Creates a record with normalized categorical fields and empty parameters.
    #[must_use]
    pub fn new(campaign_id: CampaignId, library: &str, stage: &str) -> Self {
        Self {
            campaign_id,
            library: normalize_text(library),
            stage: normalize_text(stage),
            params: CampaignParams::default(),
        }
    }

    /// Returns the cell stored for a column, or `None` for an empty cell.
    #[must_use]
    pub fn value(&self, column: CatalogColumn) -> Option<CellRef<'_>> {
        match column {
            CatalogColumn::CampaignId => Some(CellRef::Integer(i128::from(self.campaign_id.get()))),
            CatalogColumn::Library => Some(CellRef::Text(&self.library)),
            CatalogColumn::Stage => Some(CellRef::Text(&self.stage)),
            CatalogColumn::ScaleTech => self.params.scale_tech.as_deref().map(CellRef::Text),
            other => self.params.integer_slot(other).copied().flatten().map(CellRef::Integer),
        }
    }

    /// Stores an integer parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::KindMismatch`] when the column is not an
    /// integer parameter (the identifier is fixed at construction).
    pub fn set_integer(
        &mut self,
        column: CatalogColumn,
        value: Option<i128>,
    ) -> Result<(), CatalogError> {
        let slot = self.params.integer_slot_mut(column).ok_or(CatalogError::KindMismatch {
            column,
            expected: column.kind(),
        })?;
        *slot = value;
        Ok(())
    }

    /// Stores an auxiliary text parameter, normalizing it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::KindMismatch`] when the column is not an
    /// auxiliary text parameter.
    pub fn set_text(&mut self, column: CatalogColumn, value: Option<&str>) -> Result<(), CatalogError> {
        match column {
            CatalogColumn::ScaleTech => {
                self.params.scale_tech = value.map(normalize_text);
                Ok(())
            }
            _ => Err(CatalogError::KindMismatch {
                column,
                expected: column.kind(),
            }),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Columns every catalog source must provide.
pub const REQUIRED_CATALOG_COLUMNS: [CatalogColumn; 3] =
    [CatalogColumn::CampaignId, CatalogColumn::Library, CatalogColumn::Stage];

/// In-memory campaign catalog.
///
/// # Invariants
/// - `columns` lists the known columns present in the source header.
/// - Campaign identifiers are unique; record order is source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    /// Known columns present in the source.
    columns: BTreeSet<CatalogColumn>,
    /// Records in source order.
    records: Vec<CampaignRecord>,
}

impl Catalog {
    /// Builds a catalog, validating the schema and identifier uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when a required column is absent or an
    /// identifier repeats.
    pub fn new(
        columns: BTreeSet<CatalogColumn>,
        records: Vec<CampaignRecord>,
    ) -> Result<Self, CatalogError> {
        if let Some(missing) =
            REQUIRED_CATALOG_COLUMNS.into_iter().find(|column| !columns.contains(column))
        {
            return Err(CatalogError::MissingColumn(missing));
        }
        let mut seen = BTreeSet::new();
        for record in &records {
            if !seen.insert(record.campaign_id) {
                return Err(CatalogError::DuplicateCampaign(record.campaign_id));
            }
        }
        Ok(Self {
            columns,
            records,
        })
    }

    /// Returns true when the source provided the column.
    #[must_use]
    pub fn has_column(&self, column: CatalogColumn) -> bool {
        self.columns.contains(&column)
    }

    /// Returns the records in source order.
    #[must_use]
    pub fn records(&self) -> &[CampaignRecord] {
        &self.records
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the catalog has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog construction errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A required column is missing from the source header.
    #[error("catalog is missing required column {0}")]
    MissingColumn(CatalogColumn),
    /// Two records share an identifier.
    #[error("duplicate campaign identifier {0}")]
    DuplicateCampaign(CampaignId),
    /// A value was stored into a column of a different kind.
    #[error("column {column} does not accept this value (expects {expected})")]
    KindMismatch {
        /// Target column.
        column: CatalogColumn,
        /// Kind the column stores.
        expected: ColumnKind,
    },
}
