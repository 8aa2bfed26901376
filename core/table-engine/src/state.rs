//! FILENAME: core/table-engine/src/state.rs
//! PURPOSE: Table state owned by one `DataTable`.

use crate::filter::FilterValue;
use crate::options::PAGE_SIZES;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Load state of the row source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DataStatus {
    #[default]
    Pending,
    Error,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSort {
    pub id: String,
    pub desc: bool,
}

impl ColumnSort {
    pub fn direction(&self) -> SortDirection {
        if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        PaginationState { page_index: 0, page_size: PAGE_SIZES[0] }
    }
}

impl PaginationState {
    /// Number of pages for `total` rows. Never less than one.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.max(1)).max(1)
    }

    /// Row range of the current page within `total` rows.
    pub fn range(&self, total: usize) -> std::ops::Range<usize> {
        let start = (self.page_index * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }
}

/// Expanded rows. `all` expands every expandable row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedState {
    pub all: bool,
    pub ids: BTreeSet<String>,
}

impl ExpandedState {
    pub fn is_expanded(&self, id: &str) -> bool {
        self.all || self.ids.contains(id)
    }
}

/// Header checkbox state over the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PageSelection {
    All,
    Some,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableState {
    pub sorting: Vec<ColumnSort>,
    pub column_filters: BTreeMap<String, FilterValue>,
    pub global_filter: String,
    pub grouping: Vec<String>,
    pub column_visibility: BTreeMap<String, bool>,
    pub row_selection: BTreeSet<String>,
    pub expanded: ExpandedState,
    pub pagination: PaginationState,
    pub is_fullscreen: bool,
    /// Index into the filtered rows (all pages)
    pub current_row: Option<usize>,
}

impl TableState {
    pub fn with_page_size(page_size: usize) -> Self {
        TableState {
            pagination: PaginationState { page_index: 0, page_size },
            ..Default::default()
        }
    }

    pub fn is_column_visible(&self, id: &str) -> bool {
        self.column_visibility.get(id).copied().unwrap_or(true)
    }

    pub fn has_active_filters_or_sort(&self) -> bool {
        !self.column_filters.is_empty() || !self.global_filter.trim().is_empty() || !self.sorting.is_empty()
    }

    pub(crate) fn persisted(&self) -> PersistedState {
        PersistedState {
            sorting: self.sorting.clone(),
            column_filters: self.column_filters.clone(),
            column_visibility: self.column_visibility.clone(),
            grouping: self.grouping.clone(),
            page_size: self.pagination.page_size,
        }
    }
}

/// The part of `TableState` that survives a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedState {
    pub sorting: Vec<ColumnSort>,
    pub column_filters: BTreeMap<String, FilterValue>,
    pub column_visibility: BTreeMap<String, bool>,
    pub grouping: Vec<String>,
    pub page_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_math() {
        let p = PaginationState { page_index: 2, page_size: 10 };
        assert_eq!(p.page_count(0), 1);
        assert_eq!(p.page_count(21), 3);
        assert_eq!(p.range(21), 20..21);
        assert_eq!(p.range(5), 5..5);
    }

    #[test]
    fn test_active_filters_or_sort() {
        let mut state = TableState::default();
        assert!(!state.has_active_filters_or_sort());
        state.global_filter = "  ".into();
        assert!(!state.has_active_filters_or_sort());
        state.sorting.push(ColumnSort { id: "amount".into(), desc: false });
        assert!(state.has_active_filters_or_sort());
    }
}
