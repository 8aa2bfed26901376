//! FILENAME: core/table-engine/src/options.rs
//! PURPOSE: Table-level configuration.

use serde::{Deserialize, Serialize};

/// Page sizes offered by the pagination control.
pub const PAGE_SIZES: [usize; 5] = [10, 20, 30, 40, 50];

/// Skeleton rows shown while the row source is pending.
pub const PENDING_ROW_COUNT: usize = 5;

/// Side of the column list an injected column is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    #[default]
    Start,
    End,
}

/// How the row-actions column presents its actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum RowActionsDisplay {
    /// One icon button per action
    #[default]
    Inline,
    /// A single overflow menu
    Menu,
}

/// Options for one `DataTable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableOptions {
    pub title: Option<String>,

    /// Key under which sorting, filters, visibility and page size are persisted.
    pub storage_key: Option<String>,

    /// Show the checkbox column
    pub show_selection: bool,
    pub selection_side: Side,

    pub row_actions_side: Side,
    pub row_actions_display: RowActionsDisplay,

    /// Offer "expand all" in the expansion column header
    pub enable_expand_all: bool,

    pub show_pagination: bool,

    /// Initial page size. Must be one of `PAGE_SIZES`.
    ///
    /// Default: 10
    pub page_size: usize,

    /// Dot path of a stable row id. Rows are identified by index when unset.
    pub row_id_key: Option<String>,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            title: None,
            storage_key: None,
            show_selection: false,
            selection_side: Side::Start,
            row_actions_side: Side::End,
            row_actions_display: RowActionsDisplay::Inline,
            enable_expand_all: false,
            show_pagination: true,
            page_size: PAGE_SIZES[0],
            row_id_key: None,
        }
    }
}

impl TableOptions {
    /// The configured page size, falling back to the smallest allowed size.
    pub fn effective_page_size(&self) -> usize {
        if PAGE_SIZES.contains(&self.page_size) {
            self.page_size
        } else {
            PAGE_SIZES[0]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_options() {
        let options: TableOptions =
            serde_json::from_str(r#"{ "showSelection": true, "selectionSide": "end", "pageSize": 30 }"#)
                .unwrap();
        assert!(options.show_selection);
        assert_eq!(options.selection_side, Side::End);
        assert_eq!(options.row_actions_side, Side::End);
        assert_eq!(options.effective_page_size(), 30);
    }

    #[test]
    fn test_invalid_page_size_falls_back() {
        let options = TableOptions { page_size: 25, ..Default::default() };
        assert_eq!(options.effective_page_size(), 10);
    }
}
