//! FILENAME: core/table-engine/src/builder.rs
//! PURPOSE: Turns declarative column configs into concrete column definitions.
//! CONTEXT: The builder is a pure function of its inputs. It resolves each
//! config's id, renderer and filter function, then injects the selection,
//! expansion and row-actions columns around the data columns. `ColumnMemo`
//! rebuilds only when the config list or the options change identity.

use crate::column::{CellContext, CellFn, ColumnConfig, ColumnMeta, ColumnType};
use crate::column_type::{self, CellContent};
use crate::filter::FilterFnKind;
use crate::options::{RowActionsDisplay, Side, TableOptions};
use engine::{log_debug, AccessorPath};
use serde_json::Value;
use std::sync::Arc;

pub const SELECT_COLUMN_ID: &str = "select";
pub const EXPAND_COLUMN_ID: &str = "expand";
pub const ACTIONS_COLUMN_ID: &str = "actions";

// ============================================================================
// DEFINITIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnRole {
    Data,
    Selection,
    Expansion,
    Actions,
}

/// Header capabilities of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDef {
    pub title: String,
    pub can_sort: bool,
    pub can_filter: bool,
    pub can_hide: bool,
    pub can_group: bool,
    /// Expansion column offers "expand all"
    pub expand_all: bool,
}

impl HeaderDef {
    fn fixed(title: impl Into<String>) -> Self {
        HeaderDef {
            title: title.into(),
            can_sort: false,
            can_filter: false,
            can_hide: false,
            can_group: false,
            expand_all: false,
        }
    }
}

#[derive(Clone)]
pub enum CellRenderer {
    /// Registry default for the column type
    Registry,
    Override(CellFn),
}

/// Data-column part of a definition.
#[derive(Clone)]
pub struct DataColumn {
    pub accessor: AccessorPath,
    pub column_type: ColumnType,
    pub renderer: CellRenderer,
    /// `None` when filtering is disabled
    pub filter_fn: Option<FilterFnKind>,
    /// Footer sums the filtered rows
    pub summary: bool,
    pub meta: ColumnMeta,
}

#[derive(Clone)]
pub struct ColumnDef {
    pub id: String,
    pub role: ColumnRole,
    pub header: HeaderDef,
    pub data: Option<DataColumn>,
    pub size: Option<u32>,
    pub min_size: Option<u32>,
    pub max_size: Option<u32>,
    pub sticky: Option<Side>,
}

impl ColumnDef {
    fn injected(id: &str, role: ColumnRole, title: impl Into<String>, sticky: Option<Side>) -> Self {
        ColumnDef {
            id: id.to_string(),
            role,
            header: HeaderDef::fixed(title),
            data: None,
            size: Some(40),
            min_size: None,
            max_size: None,
            sticky,
        }
    }

    pub fn is_data(&self) -> bool {
        self.role == ColumnRole::Data
    }

    /// Accessor result for `row`. Always `None` for injected columns.
    pub fn value<'a>(&self, row: &'a Value) -> Option<&'a Value> {
        self.data.as_ref().and_then(|d| d.accessor.resolve(row))
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        self.data.as_ref().map(|d| d.column_type)
    }

    pub fn filter_fn(&self) -> Option<&FilterFnKind> {
        self.data.as_ref().and_then(|d| d.filter_fn.as_ref())
    }

    pub fn has_summary(&self) -> bool {
        self.data.as_ref().is_some_and(|d| d.summary)
    }

    /// Render a data cell through the override or the registry.
    pub fn render_cell(&self, ctx: &CellContext<'_>) -> CellContent {
        match self.data.as_ref().map(|d| &d.renderer) {
            Some(CellRenderer::Override(f)) => f(ctx),
            _ => column_type::render_cell(ctx.column_type, ctx.value, &ctx.kind_context()),
        }
    }
}

impl std::fmt::Debug for ColumnDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("header", &self.header)
            .field("column_type", &self.column_type())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// BUILD OPTIONS
// ============================================================================

/// Table-level inputs of the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub show_selection: bool,
    pub selection_side: Side,
    pub has_row_actions: bool,
    pub row_actions_side: Side,
    pub row_actions_display: RowActionsDisplay,
    /// A collapse-content renderer was supplied
    pub expandable: bool,
    pub enable_expand_all: bool,
    pub actions_header: String,
}

impl BuildOptions {
    pub fn from_table(options: &TableOptions, has_row_actions: bool, expandable: bool, actions_header: &str) -> Self {
        BuildOptions {
            show_selection: options.show_selection,
            selection_side: options.selection_side,
            has_row_actions,
            row_actions_side: options.row_actions_side,
            row_actions_display: options.row_actions_display,
            expandable,
            enable_expand_all: options.enable_expand_all,
            actions_header: actions_header.to_string(),
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions::from_table(&TableOptions::default(), false, false, "")
    }
}

// ============================================================================
// BUILDER
// ============================================================================

fn data_column(config: &ColumnConfig) -> ColumnDef {
    let filter_fn = config.enable_filtering.then(|| {
        config
            .filter_fn
            .clone()
            .unwrap_or_else(|| column_type::kind(config.column_type).default_filter())
    });
    let renderer = match &config.cell {
        Some(f) => CellRenderer::Override(f.clone()),
        None => CellRenderer::Registry,
    };

    ColumnDef {
        id: config.id().to_string(),
        role: ColumnRole::Data,
        header: HeaderDef {
            title: config.header.clone(),
            can_sort: config.enable_sorting,
            can_filter: config.enable_filtering,
            can_hide: config.enable_hiding,
            can_group: config.enable_grouping,
            expand_all: false,
        },
        data: Some(DataColumn {
            accessor: config.accessor_key.clone(),
            column_type: config.column_type,
            renderer,
            filter_fn,
            summary: config.enable_summary,
            meta: config.meta.clone(),
        }),
        size: config.size,
        min_size: config.min_size,
        max_size: config.max_size,
        sticky: config.meta.sticky,
    }
}

/// Build the ordered column list.
pub fn build_columns(configs: &[ColumnConfig], options: &BuildOptions) -> Vec<ColumnDef> {
    let mut start = Vec::new();
    let mut end = Vec::new();

    if options.show_selection {
        let col = ColumnDef::injected(SELECT_COLUMN_ID, ColumnRole::Selection, "", Some(options.selection_side));
        match options.selection_side {
            Side::Start => start.push(col),
            Side::End => end.push(col),
        }
    }

    if options.expandable {
        let mut col = ColumnDef::injected(EXPAND_COLUMN_ID, ColumnRole::Expansion, "", None);
        col.header.expand_all = options.enable_expand_all;
        start.push(col);
    }

    if options.has_row_actions {
        let mut col = ColumnDef::injected(
            ACTIONS_COLUMN_ID,
            ColumnRole::Actions,
            options.actions_header.clone(),
            Some(options.row_actions_side),
        );
        col.size = None;
        match options.row_actions_side {
            Side::Start => start.push(col),
            Side::End => end.insert(0, col),
        }
    }

    let mut columns = start;
    columns.extend(configs.iter().map(data_column));
    columns.extend(end);

    log_debug!("TABLE", "built {} columns from {} configs", columns.len(), configs.len());
    columns
}

// ============================================================================
// MEMO
// ============================================================================

/// Caches the builder output, keyed on the identity of the config list.
#[derive(Default)]
pub struct ColumnMemo {
    last: Option<(Arc<Vec<ColumnConfig>>, BuildOptions, Arc<Vec<ColumnDef>>)>,
}

impl ColumnMemo {
    pub fn get(&mut self, configs: &Arc<Vec<ColumnConfig>>, options: &BuildOptions) -> Arc<Vec<ColumnDef>> {
        if let Some((last_configs, last_options, columns)) = &self.last {
            if Arc::ptr_eq(last_configs, configs) && last_options == options {
                return columns.clone();
            }
        }

        let columns = Arc::new(build_columns(configs, options));
        self.last = Some((configs.clone(), options.clone(), columns.clone()));
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use crate::filter::FilterValue;

    fn configs() -> Vec<ColumnConfig> {
        vec![
            ColumnConfig::new("name", ColumnType::Text, "שם"),
            ColumnConfig::new("amount", ColumnType::Currency, "סכום").with_summary(),
            ColumnConfig::new("active", ColumnType::BooleanBadge, "פעיל").without_filtering(),
        ]
    }

    fn ids(columns: &[ColumnDef]) -> Vec<&str> {
        columns.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_filter_fn_by_type() {
        let columns = build_columns(&configs(), &BuildOptions::default());
        assert!(matches!(columns[0].filter_fn(), Some(FilterFnKind::MultiSelect)));
        assert!(matches!(columns[1].filter_fn(), Some(FilterFnKind::Range)));
        assert!(columns[2].filter_fn().is_none());
        assert!(columns[1].has_summary());
        assert!(!columns[0].has_summary());
    }

    #[test]
    fn test_override_filter_fn() {
        let cfg = vec![ColumnConfig::new("amount", ColumnType::Number, "סכום").with_filter_fn(FilterFnKind::MultiSelect)];
        let columns = build_columns(&cfg, &BuildOptions::default());
        assert!(matches!(columns[0].filter_fn(), Some(FilterFnKind::MultiSelect)));
    }

    #[test]
    fn test_injected_columns_placement() {
        let options = BuildOptions {
            show_selection: true,
            selection_side: Side::End,
            has_row_actions: true,
            row_actions_side: Side::Start,
            expandable: true,
            enable_expand_all: true,
            ..Default::default()
        };
        let columns = build_columns(&configs(), &options);
        assert_eq!(ids(&columns), vec!["expand", "actions", "name", "amount", "active", "select"]);
        assert!(columns[0].header.expand_all);

        let columns = build_columns(&configs(), &BuildOptions { show_selection: true, ..Default::default() });
        assert_eq!(ids(&columns), vec!["select", "name", "amount", "active"]);
    }

    #[test]
    fn test_no_expansion_without_collapse_renderer() {
        let options = BuildOptions { enable_expand_all: true, ..Default::default() };
        let columns = build_columns(&configs(), &options);
        assert!(columns.iter().all(|c| c.role != ColumnRole::Expansion));
    }

    fn outputs(columns: &[ColumnDef], row: &Value) -> Vec<(String, Option<CellContent>, Option<bool>)> {
        let localization = engine::Localization::default();
        let filter = FilterValue::values(["false"]);
        columns
            .iter()
            .map(|column| {
                let content = column.data.as_ref().map(|data| {
                    column.render_cell(&CellContext {
                        row,
                        row_id: "0",
                        row_index: 0,
                        value: column.value(row),
                        column_type: data.column_type,
                        meta: &data.meta,
                        lookups: &lookup::NoLookups,
                        localization: &localization,
                    })
                });
                let cell = engine::CellValue::from_json(column.value(row));
                let passes = column.filter_fn().map(|f| f.matches(row, &column.id, &cell, &filter));
                (column.id.clone(), content, passes)
            })
            .collect()
    }

    #[test]
    fn test_build_is_deterministic() {
        let configs = vec![
            ColumnConfig::new("name", ColumnType::Text, "שם")
                .with_cell(|ctx| CellContent::text(format!("* {}", ctx.default_content().plain_text()))),
            ColumnConfig::new("amount", ColumnType::Currency, "סכום")
                .with_filter_fn(FilterFnKind::custom(|row, _, _| row["amount"].as_f64().is_some_and(|n| n > 10.0))),
            ColumnConfig::new("active", ColumnType::BooleanBadge, "פעיל"),
        ];
        let options = BuildOptions { show_selection: true, has_row_actions: true, ..Default::default() };
        let a = build_columns(&configs, &options);
        let b = build_columns(&configs, &options);
        assert_eq!(ids(&a), ids(&b));

        for row in [
            serde_json::json!({ "name": "דנה", "amount": 25, "active": false }),
            serde_json::json!({ "name": "יוסי", "amount": 5, "active": true }),
        ] {
            let first = outputs(&a, &row);
            assert_eq!(first, outputs(&b, &row));
            assert!(first.iter().any(|(id, content, _)| id == "name"
                && content.as_ref().is_some_and(|c| c.plain_text().starts_with("* "))));
        }

        let low = serde_json::json!({ "amount": 5 });
        let amount = outputs(&a, &low).into_iter().find(|(id, ..)| id == "amount").map(|(.., passes)| passes);
        assert_eq!(amount, Some(Some(false)));
    }

    #[test]
    fn test_memo_keys_on_identity() {
        let mut memo = ColumnMemo::default();
        let configs = Arc::new(configs());
        let options = BuildOptions::default();

        let first = memo.get(&configs, &options);
        let second = memo.get(&configs, &options);
        assert!(Arc::ptr_eq(&first, &second));

        let copy = Arc::new(configs.as_ref().clone());
        let third = memo.get(&copy, &options);
        assert!(!Arc::ptr_eq(&first, &third));

        let fourth = memo.get(&copy, &BuildOptions { show_selection: true, ..Default::default() });
        assert_eq!(fourth.len(), third.len() + 1);
    }
}
