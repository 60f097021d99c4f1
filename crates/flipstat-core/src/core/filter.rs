// crates/flipstat-core/src/core/filter.rs
// ============================================================================
// Module: Flipstat Filter Predicates
// Description: Typed filter predicates, filter sets, and column classes.
// Purpose: Make filter types a closed sum and apply required/default rules.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`FilterSet`] maps catalog columns to typed [`FilterValue`]s. The
//! [`FilterPolicy`] classifies each column as required, defaulted, or
//! unfiltered and expands a caller's filter set into the effective set that
//! the catalog selection matches against. Text-tagged predicates (from a
//! CLI or config file) are coerced here, at the boundary; a coercion either
//! yields a typed value or a named error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::catalog::CatalogColumn;
use crate::core::catalog::ColumnKind;

// ============================================================================
// SECTION: Filter Values
// ============================================================================

/// Type tag of a filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    /// Text comparison on a normalized column.
    #[serde(rename = "str")]
    Str,
    /// Exact integer equality.
    #[serde(rename = "int")]
    Int,
    /// Exact float equality.
    #[serde(rename = "float")]
    Float,
}

impl FilterKind {
    /// Returns the textual tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim() {
            "str" => Ok(Self::Str),
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            other => Err(FilterError::UnsupportedFilterType(other.to_string())),
        }
    }
}

/// Typed filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FilterValue {
    /// Text value; compared after trimming and lower-casing.
    #[serde(rename = "str")]
    Text(String),
    /// Integer value.
    #[serde(rename = "int")]
    Integer(i128),
    /// Finite float value.
    #[serde(rename = "float")]
    Float(f64),
}

impl FilterValue {
    /// Returns the type tag of the value.
    #[must_use]
    pub const fn kind(&self) -> FilterKind {
        match self {
            Self::Text(_) => FilterKind::Str,
            Self::Integer(_) => FilterKind::Int,
            Self::Float(_) => FilterKind::Float,
        }
    }

    /// Coerces raw text into a value of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Coercion`] when the text is not a valid value
    /// of the kind (floats must also be finite).
    pub fn coerce(kind: FilterKind, raw: &str) -> Result<Self, FilterError> {
        let trimmed = raw.trim();
        let coercion = || FilterError::Coercion {
            kind,
            value: raw.to_string(),
        };
        match kind {
            FilterKind::Str => Ok(Self::Text(trimmed.to_string())),
            FilterKind::Int => trimmed.parse::<i128>().map(Self::Integer).map_err(|_| coercion()),
            FilterKind::Float => match trimmed.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Self::Float(value)),
                _ => Err(coercion()),
            },
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => value.fmt(f),
            Self::Float(value) => value.fmt(f),
        }
    }
}

/// A single column predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    /// Target column.
    pub column: CatalogColumn,
    /// Expected value.
    pub value: FilterValue,
}

impl FilterPredicate {
    /// Creates a predicate from typed parts.
    #[must_use]
    pub const fn new(column: CatalogColumn, value: FilterValue) -> Self {
        Self {
            column,
            value,
        }
    }

    /// Parses a predicate from a column name, type tag, and raw value.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Schema`] for an unknown column,
    /// [`FilterError::UnsupportedFilterType`] for an unknown tag, and
    /// [`FilterError::Coercion`] when the value does not fit the tag.
    pub fn parse(column: &str, tag: &str, raw: &str) -> Result<Self, FilterError> {
        let resolved = CatalogColumn::from_name(column)
            .ok_or_else(|| FilterError::Schema(column.trim().to_string()))?;
        let kind = FilterKind::from_str(tag)?;
        Ok(Self::new(resolved, FilterValue::coerce(kind, raw)?))
    }
}

// ============================================================================
// SECTION: Filter Sets
// ============================================================================

/// Mapping of column to expected value.
///
/// # Invariants
/// - Keys are unique; inserting an existing column replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    /// Predicates keyed by column.
    predicates: BTreeMap<CatalogColumn, FilterValue>,
}

impl FilterSet {
    /// Creates an empty filter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a predicate, replacing any previous value for its column.
    pub fn insert(&mut self, predicate: FilterPredicate) {
        self.predicates.insert(predicate.column, predicate.value);
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, column: CatalogColumn, value: FilterValue) -> Self {
        self.predicates.insert(column, value);
        self
    }

    /// Returns the value for a column.
    #[must_use]
    pub fn get(&self, column: CatalogColumn) -> Option<&FilterValue> {
        self.predicates.get(&column)
    }

    /// Returns the integer value for a column when it holds one.
    #[must_use]
    pub fn integer(&self, column: CatalogColumn) -> Option<i128> {
        match self.predicates.get(&column) {
            Some(FilterValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns true when the column is constrained.
    #[must_use]
    pub fn contains(&self, column: CatalogColumn) -> bool {
        self.predicates.contains_key(&column)
    }

    /// Iterates predicates in column order.
    pub fn iter(&self) -> impl Iterator<Item = (CatalogColumn, &FilterValue)> {
        self.predicates.iter().map(|(column, value)| (*column, value))
    }

    /// Returns the number of predicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns true when no predicate is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl FromIterator<FilterPredicate> for FilterSet {
    fn from_iter<I: IntoIterator<Item = FilterPredicate>>(iter: I) -> Self {
        let mut set = Self::new();
        for predicate in iter {
            set.insert(predicate);
        }
        set
    }
}

// ============================================================================
// SECTION: Column Classes
// ============================================================================

/// How a column participates in default filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", content = "default", rename_all = "snake_case")]
pub enum ColumnClass {
    /// Must be supplied by the caller.
    Required,
    /// Injected as an integer predicate when absent.
    Defaulted(i128),
    /// Never defaulted; unconstrained when absent.
    Unfiltered,
}

/// Declared default values for defaulted columns.
pub const DECLARED_DEFAULTS: [(CatalogColumn, i128); 14] = [
    (CatalogColumn::WithNtt, 0),
    (CatalogColumn::LogN, 6),
    (CatalogColumn::LogSlots, 5),
    (CatalogColumn::LogQ, 60),
    (CatalogColumn::LogDelta, 50),
    (CatalogColumn::MultDepth, 0),
    (CatalogColumn::LogMin, 0),
    (CatalogColumn::LogMax, 0),
    (CatalogColumn::DoAdd, 0),
    (CatalogColumn::DoMul, 0),
    (CatalogColumn::DoRot, 0),
    (CatalogColumn::BitPerCoeff, 64),
    (CatalogColumn::NumLimbs, 1),
    (CatalogColumn::Dnum, 3),
];

/// Columns the caller must always constrain.
pub const REQUIRED_FILTERS: [CatalogColumn; 2] = [CatalogColumn::Library, CatalogColumn::Stage];

/// Column classification used to expand caller filters.
///
/// # Invariants
/// - Every known column has exactly one class.
/// - Required columns are exactly [`REQUIRED_FILTERS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPolicy {
    /// Default values for defaulted columns.
    defaults: BTreeMap<CatalogColumn, i128>,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            defaults: DECLARED_DEFAULTS.into_iter().collect(),
        }
    }
}

impl FilterPolicy {
    /// Returns the class of a column.
    #[must_use]
    pub fn class(&self, column: CatalogColumn) -> ColumnClass {
        if REQUIRED_FILTERS.contains(&column) {
            return ColumnClass::Required;
        }
        self.defaults.get(&column).map_or(ColumnClass::Unfiltered, |value| ColumnClass::Defaulted(*value))
    }

    /// Overrides the default value of a defaulted column.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::NotDefaultable`] when the column is required or
    /// unfiltered.
    pub fn override_default(
        &mut self,
        column: CatalogColumn,
        value: i128,
    ) -> Result<(), FilterError> {
        match self.defaults.get_mut(&column) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(FilterError::NotDefaultable(column)),
        }
    }

    /// Expands caller filters into the effective filter set.
    ///
    /// Required columns must be present; absent defaulted columns receive
    /// their integer default; unfiltered columns pass through untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MissingFilter`] naming every absent required column.
    pub fn expand(&self, filters: &FilterSet) -> Result<EffectiveFilters, FilterError> {
        let missing: Vec<CatalogColumn> =
            REQUIRED_FILTERS.into_iter().filter(|column| !filters.contains(*column)).collect();
        if !missing.is_empty() {
            return Err(FilterError::MissingFilter {
                columns: missing,
            });
        }
        let mut effective = filters.clone();
        let mut defaulted = BTreeSet::new();
        for (column, value) in &self.defaults {
            if !effective.contains(*column) {
                effective.insert(FilterPredicate::new(*column, FilterValue::Integer(*value)));
                defaulted.insert(*column);
            }
        }
        Ok(EffectiveFilters {
            filters: effective,
            defaulted,
        })
    }
}

/// Filters after default injection.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveFilters {
    /// Caller predicates plus injected defaults.
    pub filters: FilterSet,
    /// Columns whose predicate came from the default table.
    pub defaulted: BTreeSet<CatalogColumn>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Filter validation and matching errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The column is unknown or absent from the catalog.
    #[error("column '{0}' does not exist in the catalog")]
    Schema(String),
    /// The type tag is not one of str/int/float.
    #[error("unsupported filter type: {0}")]
    UnsupportedFilterType(String),
    /// Required columns are absent from the filter set.
    #[error("missing mandatory filters: {}", join_columns(.columns))]
    MissingFilter {
        /// Absent required columns, in column order.
        columns: Vec<CatalogColumn>,
    },
    /// The predicate kind cannot be compared with the column kind.
    #[error("filter on {column} is {found} but the column holds {expected} values")]
    TypeMismatch {
        /// Filtered column.
        column: CatalogColumn,
        /// Kind stored by the column.
        expected: ColumnKind,
        /// Kind supplied by the predicate.
        found: FilterKind,
    },
    /// Raw text could not be coerced to the declared type.
    #[error("cannot coerce '{value}' to {kind}")]
    Coercion {
        /// Requested kind.
        kind: FilterKind,
        /// Raw value.
        value: String,
    },
    /// A default override targeted a column without a default.
    #[error("column {0} has no declared default")]
    NotDefaultable(CatalogColumn),
}

/// Joins column names for error messages.
fn join_columns(columns: &[CatalogColumn]) -> String {
    columns.iter().map(|column| column.as_str()).collect::<Vec<_>>().join(", ")
}
