//! FILENAME: core/table-engine/src/view.rs
//! PURPOSE: Render-ready view model produced by `DataTable::render`.
//! CONTEXT: Plain data only. A UI layer paints it without calling back into
//! the engine.

use crate::actions::ActionButton;
use crate::builder::ColumnRole;
use crate::column_type::CellContent;
use crate::options::Side;
use crate::state::{PageSelection, SortDirection};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub title: Option<String>,
    pub is_fullscreen: bool,
    pub header_actions: Vec<ActionButton>,
    pub headers: Vec<HeaderView>,
    pub body: TableBody,
    /// Present when a visible column has a summary and data is loaded
    pub footer: Option<Vec<FooterCell>>,
    pub pagination: Option<PaginationView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderView {
    pub id: String,
    pub role: ColumnRole,
    pub title: String,
    pub can_sort: bool,
    pub sort: Option<SortDirection>,
    /// Position in a multi-column sort
    pub sort_index: Option<usize>,
    pub can_filter: bool,
    pub filter_active: bool,
    pub can_hide: bool,
    pub can_group: bool,
    pub is_grouped: bool,
    pub sticky: Option<Side>,
    pub size: Option<u32>,
    /// Selection column header checkbox
    pub selection: Option<PageSelection>,
    /// Expansion column "expand all" toggle state
    pub all_expanded: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TableBody {
    /// Row source pending
    Skeleton { rows: usize, columns: usize },
    /// Row source failed
    Error { message: String },
    /// Loaded, nothing passes the filters
    Empty { message: String },
    Rows { rows: Vec<RowView> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RowView {
    Group(GroupRowView),
    Data(DataRowView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRowView {
    pub id: String,
    pub depth: usize,
    pub column_id: String,
    pub label: CellContent,
    pub count: usize,
    pub expanded: bool,
    /// Summary columns aggregated over the group
    pub aggregates: Vec<FooterCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRowView {
    pub id: String,
    /// Position in the source row list
    pub index: usize,
    pub depth: usize,
    pub selected: bool,
    pub expanded: bool,
    pub is_current: bool,
    pub class_name: Option<String>,
    pub cells: Vec<CellView>,
    /// Collapse content, when expanded
    pub collapse: Option<CellContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellView {
    pub column_id: String,
    pub content: CellContent,
    pub class_name: Option<String>,
    pub sticky: Option<Side>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterCell {
    pub column_id: String,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationView {
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub page_sizes: Vec<usize>,
    /// Leaf rows passing the filters
    pub total_rows: usize,
    pub selected_count: usize,
    pub can_previous: bool,
    pub can_next: bool,
}
