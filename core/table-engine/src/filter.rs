//! FILENAME: core/table-engine/src/filter.rs
//! PURPOSE: Column filter values and the predicates that evaluate them.
//! CONTEXT: Each data column gets one filter function, chosen by its type
//! unless the config overrides it. The engine asks `auto_remove` after every
//! change and drops filters that have become inactive, so "no entry in state"
//! is the single representation of "not filtering".

use engine::CellValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// FILTER VALUE
// ============================================================================

/// Stored value of one column filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterValue {
    /// Numeric range; an empty bound is unbounded
    Range { min: String, max: String },
    /// Boolean subset (`"true"`/`"false"`) or multi-select allow-list
    Values(Vec<String>),
}

impl FilterValue {
    pub fn range(min: impl Into<String>, max: impl Into<String>) -> Self {
        FilterValue::Range { min: min.into(), max: max.into() }
    }

    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::Values(values.into_iter().map(Into::into).collect())
    }
}

/// Parse a range bound. Empty and non-numeric text are both unbounded.
fn parse_bound(bound: &str) -> Option<f64> {
    let trimmed = bound.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

// ============================================================================
// FILTER FUNCTIONS
// ============================================================================

pub type CustomFilterFn = Arc<dyn Fn(&Value, &str, &FilterValue) -> bool + Send + Sync>;

/// The filter function attached to a column.
#[derive(Clone)]
pub enum FilterFnKind {
    Range,
    BooleanSet,
    MultiSelect,
    /// Caller-supplied `(row, column_id, value) -> bool`. Never auto-removed.
    Custom(CustomFilterFn),
}

impl fmt::Debug for FilterFnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterFnKind::Range => f.write_str("Range"),
            FilterFnKind::BooleanSet => f.write_str("BooleanSet"),
            FilterFnKind::MultiSelect => f.write_str("MultiSelect"),
            FilterFnKind::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl FilterFnKind {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value, &str, &FilterValue) -> bool + Send + Sync + 'static,
    {
        FilterFnKind::Custom(Arc::new(f))
    }

    /// Evaluate against one row. `cell` is the column's normalized value in `row`.
    pub fn matches(&self, row: &Value, column_id: &str, cell: &CellValue, value: &FilterValue) -> bool {
        match self {
            FilterFnKind::Range => range_filter(cell, value),
            FilterFnKind::BooleanSet => boolean_set_filter(cell, value),
            FilterFnKind::MultiSelect => multi_select_filter(cell, Some(value)),
            FilterFnKind::Custom(f) => f(row, column_id, value),
        }
    }

    /// Whether `value` is inactive and should be dropped from state.
    pub fn auto_remove(&self, value: &FilterValue) -> bool {
        match self {
            FilterFnKind::Range => match value {
                FilterValue::Range { min, max } => min.trim().is_empty() && max.trim().is_empty(),
                FilterValue::Values(_) => true,
            },
            FilterFnKind::BooleanSet => match value {
                FilterValue::Values(set) => set.is_empty(),
                FilterValue::Range { .. } => true,
            },
            // [] is a durable "select none"
            FilterFnKind::MultiSelect => false,
            FilterFnKind::Custom(_) => false,
        }
    }

    pub fn is_multi_select(&self) -> bool {
        matches!(self, FilterFnKind::MultiSelect)
    }
}

/// Numeric range. Fails only when a supplied bound is violated or, with any
/// bound active, when the cell is not a number.
pub fn range_filter(cell: &CellValue, value: &FilterValue) -> bool {
    let (min, max) = match value {
        FilterValue::Range { min, max } => (parse_bound(min), parse_bound(max)),
        FilterValue::Values(_) => return true,
    };
    if min.is_none() && max.is_none() {
        return true;
    }

    let Some(n) = cell.as_number() else {
        return false;
    };
    min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi)
}

/// Boolean subset. An empty set passes every row; a blank cell never matches.
pub fn boolean_set_filter(cell: &CellValue, value: &FilterValue) -> bool {
    let set = match value {
        FilterValue::Values(set) => set,
        FilterValue::Range { .. } => return true,
    };
    if set.is_empty() {
        return true;
    }

    match cell.as_bool() {
        Some(b) => {
            let key = if b { "true" } else { "false" };
            set.iter().any(|s| s == key)
        }
        None => false,
    }
}

/// Multi-select allow-list. `None` passes all, `[]` passes none. List cells
/// match when any element is selected.
pub fn multi_select_filter(cell: &CellValue, value: Option<&FilterValue>) -> bool {
    let set = match value {
        None => return true,
        Some(FilterValue::Values(set)) => set,
        Some(FilterValue::Range { .. }) => return true,
    };
    if set.is_empty() {
        return false;
    }

    cell.filter_keys().iter().any(|key| set.contains(key))
}
