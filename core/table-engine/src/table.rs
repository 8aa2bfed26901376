//! FILENAME: core/table-engine/src/table.rs
//! PURPOSE: The table engine. Owns rows, columns, status and `TableState`.
//! CONTEXT: Every state change goes through a method here. After any change
//! that can shrink the row model (new rows, filters, grouping, expansion,
//! page size) the page index and current-row pointer are clamped back into
//! range, and selections of rows that no longer exist are dropped.

use crate::actions::{
    default_header_actions, merge_header_actions, render_header_actions, render_row_actions, HeaderAction,
    HeaderActionKind, RowAction, RowContext, TableContext,
};
use crate::builder::{BuildOptions, ColumnDef, ColumnMemo, ColumnRole};
use crate::column::{CellContext, ClassNameFn, ColumnConfig};
use crate::column_type::{self, CellContent, KindContext};
use crate::error::TableError;
use crate::filter::FilterValue;
use crate::options::{TableOptions, PAGE_SIZES, PENDING_ROW_COUNT};
use crate::row_model::{column_sum, GroupRow, ModelContext, ModelRow, RowEntry, RowModel};
use crate::state::{ColumnSort, DataStatus, ExpandedState, PageSelection, PersistedState, TableState};
use crate::storage::StateStorage;
use crate::view::{
    CellView, DataRowView, FooterCell, GroupRowView, HeaderView, PaginationView, RowView, TableBody, TableView,
};
use engine::{log_debug, log_warn, AccessorPath, CellValue, Localization};
use lookup::{LookupSource, NoLookups};
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub type CollapseFn = Arc<dyn Fn(&RowContext) -> CellContent + Send + Sync>;
pub type SelectionHook = Arc<dyn Fn(&DataTable) + Send + Sync>;

static NULL_ROW: Value = Value::Null;

/// Result of clicking an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Handled,
    /// Built-in export: the caller should run the export engine
    ExportRequested,
    /// Built-in column visibility: the caller should open the column menu
    ColumnMenuRequested,
    Disabled,
    NotFound,
}

/// One distinct value of a column among the rows passing the other filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetValue {
    pub value: String,
    pub label: String,
    pub count: usize,
}

pub struct DataTable {
    configs: Arc<Vec<ColumnConfig>>,
    memo: ColumnMemo,
    columns: Arc<Vec<ColumnDef>>,
    rows: Vec<RowEntry>,
    status: DataStatus,
    state: TableState,
    options: TableOptions,
    localization: Localization,
    lookups: Arc<dyn LookupSource>,
    row_actions: Vec<RowAction>,
    custom_header_actions: Vec<HeaderAction>,
    collapse: Option<CollapseFn>,
    row_class_name: Option<ClassNameFn>,
    on_selected_change: Option<SelectionHook>,
    export_requested: bool,
}

impl DataTable {
    pub fn new(configs: impl Into<Arc<Vec<ColumnConfig>>>, options: TableOptions) -> Self {
        let state = TableState::with_page_size(options.effective_page_size());
        let mut table = DataTable {
            configs: configs.into(),
            memo: ColumnMemo::default(),
            columns: Arc::new(Vec::new()),
            rows: Vec::new(),
            status: DataStatus::Pending,
            state,
            options,
            localization: Localization::default(),
            lookups: Arc::new(NoLookups),
            row_actions: Vec::new(),
            custom_header_actions: Vec::new(),
            collapse: None,
            row_class_name: None,
            on_selected_change: None,
            export_requested: false,
        };
        table.rebuild_columns();
        table
    }

    // ------------------------------------------------------------------------
    // CONFIGURATION
    // ------------------------------------------------------------------------

    /// Loaded rows. Sets the status to `Success`.
    pub fn with_rows(mut self, rows: Vec<Value>) -> Self {
        self.set_rows(rows);
        self
    }

    pub fn with_lookups(mut self, lookups: Arc<dyn LookupSource>) -> Self {
        self.lookups = lookups;
        self
    }

    pub fn with_localization(mut self, localization: Localization) -> Self {
        self.localization = localization;
        self.rebuild_columns();
        self
    }

    pub fn with_row_actions(mut self, actions: Vec<RowAction>) -> Self {
        self.row_actions = actions;
        self.rebuild_columns();
        self
    }

    /// Caller header actions, merged into the built-in ones.
    pub fn with_header_actions(mut self, actions: Vec<HeaderAction>) -> Self {
        self.custom_header_actions = actions;
        self
    }

    /// Collapsible per-row content. Adds the expansion column.
    pub fn with_collapse_content<F>(mut self, f: F) -> Self
    where
        F: Fn(&RowContext) -> CellContent + Send + Sync + 'static,
    {
        self.collapse = Some(Arc::new(f));
        self.rebuild_columns();
        self
    }

    pub fn with_row_class_name<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.row_class_name = Some(Arc::new(f));
        self
    }

    /// Invoked after every selection change.
    pub fn on_selected_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&DataTable) + Send + Sync + 'static,
    {
        self.on_selected_change = Some(Arc::new(f));
        self
    }

    fn rebuild_columns(&mut self) {
        let options = BuildOptions::from_table(
            &self.options,
            !self.row_actions.is_empty(),
            self.collapse.is_some(),
            &self.localization.labels.actions_header,
        );
        self.columns = self.memo.get(&self.configs, &options);
    }

    // ------------------------------------------------------------------------
    // ACCESSORS
    // ------------------------------------------------------------------------

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.id == id)
    }

    fn data_column(&self, id: &str) -> Result<&ColumnDef, TableError> {
        self.columns
            .iter()
            .find(|c| c.id == id && c.is_data())
            .ok_or_else(|| TableError::UnknownColumn(id.to_string()))
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn status(&self) -> DataStatus {
        self.status
    }

    pub fn localization(&self) -> &Localization {
        &self.localization
    }

    pub fn lookups(&self) -> &dyn LookupSource {
        &*self.lookups
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    // ------------------------------------------------------------------------
    // DATA
    // ------------------------------------------------------------------------

    /// Replace the rows. Sets the status to `Success`.
    pub fn set_rows(&mut self, rows: Vec<Value>) {
        let id_path = self.options.row_id_key.as_deref().map(AccessorPath::new);
        self.rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, data)| {
                let id = id_path
                    .as_ref()
                    .map(|path| CellValue::from_json(path.resolve(&data)).display_value())
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| index.to_string());
                RowEntry { id, index, data: Arc::new(data) }
            })
            .collect();
        self.status = DataStatus::Success;
        log_debug!("TABLE", "set_rows count={}", self.rows.len());

        let before = self.state.row_selection.len();
        let rows = &self.rows;
        self.state.row_selection.retain(|id| rows.iter().any(|r| &r.id == id));
        self.clamp_indices();
        if self.state.row_selection.len() != before {
            self.notify_selection();
        }
    }

    pub fn set_status(&mut self, status: DataStatus) {
        self.status = status;
    }

    // ------------------------------------------------------------------------
    // ROW MODEL
    // ------------------------------------------------------------------------

    fn model_context(&self) -> ModelContext<'_> {
        ModelContext {
            rows: &self.rows,
            columns: &self.columns,
            state: &self.state,
            lookups: &*self.lookups,
            localization: &self.localization,
            expandable_leaves: self.collapse.is_some(),
        }
    }

    pub fn row_model(&self) -> RowModel {
        self.model_context().compute()
    }

    /// Rows passing every filter, sorted, across all pages, groups flattened.
    pub fn filtered_rows(&self) -> Vec<Arc<Value>> {
        self.row_model()
            .leaves
            .into_iter()
            .map(|i| self.rows[i].data.clone())
            .collect()
    }

    /// Visible data columns, in display order.
    pub fn export_columns(&self) -> Vec<&ColumnDef> {
        self.columns
            .iter()
            .filter(|c| c.is_data() && self.state.is_column_visible(&c.id))
            .collect()
    }

    fn clamp_indices(&mut self) {
        let model = self.row_model();
        let page_count = self.state.pagination.page_count(model.rows.len());
        if self.state.pagination.page_index >= page_count {
            self.state.pagination.page_index = page_count - 1;
        }
        if let Some(current) = self.state.current_row {
            self.state.current_row = match model.leaves.len() {
                0 => None,
                n => Some(current.min(n - 1)),
            };
        }
    }

    // ------------------------------------------------------------------------
    // SORTING
    // ------------------------------------------------------------------------

    /// Cycle none -> asc -> desc -> none. `multi` keeps the other sorted columns.
    pub fn toggle_sorting(&mut self, id: &str, multi: bool) -> Result<(), TableError> {
        if !self.data_column(id)?.header.can_sort {
            return Err(TableError::SortingDisabled(id.to_string()));
        }

        let current = self.state.sorting.iter().position(|s| s.id == id);
        let next = match current.map(|i| self.state.sorting[i].desc) {
            None => Some(false),
            Some(false) => Some(true),
            Some(true) => None,
        };

        if multi {
            match (current, next) {
                (Some(i), Some(desc)) => self.state.sorting[i].desc = desc,
                (Some(i), None) => {
                    self.state.sorting.remove(i);
                }
                (None, Some(desc)) => self.state.sorting.push(ColumnSort { id: id.to_string(), desc }),
                (None, None) => {}
            }
        } else {
            self.state.sorting = next
                .map(|desc| vec![ColumnSort { id: id.to_string(), desc }])
                .unwrap_or_default();
        }

        log_debug!("TABLE", "sorting={:?}", self.state.sorting);
        Ok(())
    }

    pub fn clear_sorting(&mut self) {
        self.state.sorting.clear();
    }

    // ------------------------------------------------------------------------
    // FILTERING
    // ------------------------------------------------------------------------

    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        self.state.global_filter = text.into();
        self.clamp_indices();
    }

    /// Set or clear a column filter. Inactive values are dropped, and a
    /// multi-select covering every available value is stored as no filter.
    pub fn set_column_filter(&mut self, id: &str, value: Option<FilterValue>) -> Result<(), TableError> {
        let filter_fn = self
            .data_column(id)?
            .filter_fn()
            .cloned()
            .ok_or_else(|| TableError::FilteringDisabled(id.to_string()))?;

        let normalized = match value {
            Some(v) if filter_fn.auto_remove(&v) => None,
            Some(FilterValue::Values(set)) if filter_fn.is_multi_select() && self.covers_all_facets(id, &set) => None,
            other => other,
        };

        log_debug!("FILTER", "column={} value={:?}", id, normalized);
        match normalized {
            Some(v) => {
                self.state.column_filters.insert(id.to_string(), v);
            }
            None => {
                self.state.column_filters.remove(id);
            }
        }
        self.clamp_indices();
        Ok(())
    }

    pub fn column_filter(&self, id: &str) -> Option<&FilterValue> {
        self.state.column_filters.get(id)
    }

    fn covers_all_facets(&self, id: &str, set: &[String]) -> bool {
        if set.is_empty() {
            return false;
        }
        match self.faceted_values(id) {
            Ok(facets) => !facets.is_empty() && facets.iter().all(|f| set.contains(&f.value)),
            Err(_) => false,
        }
    }

    /// Distinct values of a column with counts, over rows passing every other filter.
    pub fn faceted_values(&self, id: &str) -> Result<Vec<FacetValue>, TableError> {
        let column = self.data_column(id)?;
        let indices = self.model_context().filter(Some(id));

        let mut counts: FxHashMap<String, usize> = FxHashMap::default();
        for i in indices {
            for key in CellValue::from_json(column.value(&self.rows[i].data)).filter_keys() {
                if !key.is_empty() {
                    *counts.entry(key).or_insert(0) += 1;
                }
            }
        }

        let (Some(data), Some(column_type)) = (column.data.as_ref(), column.column_type()) else {
            return Ok(Vec::new());
        };
        let ctx = KindContext {
            row: &NULL_ROW,
            meta: &data.meta,
            lookups: &*self.lookups,
            localization: &self.localization,
        };
        let kind = column_type::kind(column_type);

        let mut facets: Vec<FacetValue> = counts
            .into_iter()
            .map(|(value, count)| FacetValue { label: kind.facet_label(&value, &ctx), value, count })
            .collect();
        facets.sort_by(|a, b| {
            CellValue::Text(a.label.clone())
                .compare(&CellValue::Text(b.label.clone()))
                .then_with(|| a.value.cmp(&b.value))
        });
        Ok(facets)
    }

    /// Numeric bounds of a column over rows passing every other filter.
    pub fn faceted_min_max(&self, id: &str) -> Result<Option<(f64, f64)>, TableError> {
        let column = self.data_column(id)?;
        let bounds = self
            .model_context()
            .filter(Some(id))
            .into_iter()
            .filter_map(|i| CellValue::from_json(column.value(&self.rows[i].data)).as_number())
            .fold(None, |acc: Option<(f64, f64)>, n| match acc {
                None => Some((n, n)),
                Some((lo, hi)) => Some((lo.min(n), hi.max(n))),
            });
        Ok(bounds)
    }

    pub fn has_active_filters_or_sort(&self) -> bool {
        self.state.has_active_filters_or_sort()
    }

    /// Clear column filters, the global filter and sorting.
    pub fn reset_filters_and_sorting(&mut self) {
        self.state.column_filters.clear();
        self.state.global_filter.clear();
        self.state.sorting.clear();
        log_debug!("TABLE", "filters and sorting reset");
        self.clamp_indices();
    }

    // ------------------------------------------------------------------------
    // GROUPING & EXPANSION
    // ------------------------------------------------------------------------

    pub fn toggle_grouping(&mut self, id: &str) -> Result<(), TableError> {
        if !self.data_column(id)?.header.can_group {
            return Err(TableError::GroupingDisabled(id.to_string()));
        }
        match self.state.grouping.iter().position(|g| g == id) {
            Some(i) => {
                self.state.grouping.remove(i);
            }
            None => self.state.grouping.push(id.to_string()),
        }
        self.clamp_indices();
        Ok(())
    }

    pub fn toggle_expanded(&mut self, row_id: &str) {
        if self.state.expanded.all {
            let expandable = self.row_model().expandable;
            self.state.expanded = ExpandedState { all: false, ids: expandable.into_iter().collect() };
        }
        let ids = &mut self.state.expanded.ids;
        if !ids.remove(row_id) {
            ids.insert(row_id.to_string());
        }
        self.clamp_indices();
    }

    pub fn toggle_all_expanded(&mut self) {
        self.state.expanded = if self.state.expanded.all {
            ExpandedState::default()
        } else {
            ExpandedState { all: true, ids: Default::default() }
        };
        self.clamp_indices();
    }

    pub fn is_all_expanded(&self) -> bool {
        self.state.expanded.all
    }

    // ------------------------------------------------------------------------
    // SELECTION
    // ------------------------------------------------------------------------

    fn notify_selection(&self) {
        if let Some(hook) = self.on_selected_change.clone() {
            hook(self);
        }
    }

    fn page_leaf_ids(&self, model: &RowModel) -> Vec<String> {
        let range = self.state.pagination.range(model.rows.len());
        model.rows[range]
            .iter()
            .filter_map(|r| match r {
                ModelRow::Leaf { index, .. } => Some(self.rows[*index].id.clone()),
                ModelRow::Group(_) => None,
            })
            .collect()
    }

    fn page_selection_for(&self, model: &RowModel) -> PageSelection {
        let ids = self.page_leaf_ids(model);
        let selected = ids.iter().filter(|id| self.state.row_selection.contains(*id)).count();
        match selected {
            0 => PageSelection::None,
            n if n == ids.len() => PageSelection::All,
            _ => PageSelection::Some,
        }
    }

    pub fn toggle_row_selected(&mut self, row_id: &str) -> Result<(), TableError> {
        if !self.rows.iter().any(|r| r.id == row_id) {
            return Err(TableError::UnknownRow(row_id.to_string()));
        }
        let selection = &mut self.state.row_selection;
        if !selection.remove(row_id) {
            selection.insert(row_id.to_string());
        }
        self.notify_selection();
        Ok(())
    }

    /// Select every leaf on the current page, or clear them if all are selected.
    pub fn toggle_page_selected(&mut self) {
        let model = self.row_model();
        let ids = self.page_leaf_ids(&model);
        if self.page_selection_for(&model) == PageSelection::All {
            for id in &ids {
                self.state.row_selection.remove(id);
            }
        } else {
            self.state.row_selection.extend(ids);
        }
        self.notify_selection();
    }

    /// All / Some / None over the leaf rows of the current page.
    pub fn page_selection_state(&self) -> PageSelection {
        self.page_selection_for(&self.row_model())
    }

    pub fn selected_rows(&self) -> Vec<Arc<Value>> {
        self.rows
            .iter()
            .filter(|r| self.state.row_selection.contains(&r.id))
            .map(|r| r.data.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.state.row_selection.len()
    }

    pub fn clear_selection(&mut self) {
        if !self.state.row_selection.is_empty() {
            self.state.row_selection.clear();
            self.notify_selection();
        }
    }

    // ------------------------------------------------------------------------
    // VISIBILITY
    // ------------------------------------------------------------------------

    pub fn set_column_visibility(&mut self, id: &str, visible: bool) -> Result<(), TableError> {
        if !self.data_column(id)?.header.can_hide {
            return Err(TableError::HidingDisabled(id.to_string()));
        }
        self.state.column_visibility.insert(id.to_string(), visible);
        self.clamp_indices();
        Ok(())
    }

    pub fn is_column_visible(&self, id: &str) -> bool {
        self.state.is_column_visible(id)
    }

    // ------------------------------------------------------------------------
    // PAGINATION & CURRENT ROW
    // ------------------------------------------------------------------------

    pub fn page_count(&self) -> usize {
        self.state.pagination.page_count(self.row_model().rows.len())
    }

    pub fn set_page_index(&mut self, index: usize) {
        self.state.pagination.page_index = index.min(self.page_count() - 1);
    }

    pub fn next_page(&mut self) {
        self.set_page_index(self.state.pagination.page_index + 1);
    }

    pub fn previous_page(&mut self) {
        self.set_page_index(self.state.pagination.page_index.saturating_sub(1));
    }

    /// Change the page size and go back to the first page.
    pub fn set_page_size(&mut self, size: usize) -> Result<(), TableError> {
        if !PAGE_SIZES.contains(&size) {
            return Err(TableError::InvalidPageSize(size));
        }
        self.state.pagination.page_size = size;
        self.state.pagination.page_index = 0;
        self.clamp_indices();
        Ok(())
    }

    /// Point at a filtered row (all pages). Clamped to the last row.
    pub fn set_current_row(&mut self, index: Option<usize>) {
        self.state.current_row = index;
        self.clamp_indices();
    }

    pub fn current_row(&self) -> Option<usize> {
        self.state.current_row
    }

    pub fn current_row_data(&self) -> Option<Arc<Value>> {
        let current = self.state.current_row?;
        let index = *self.row_model().leaves.get(current)?;
        Some(self.rows[index].data.clone())
    }

    // ------------------------------------------------------------------------
    // FULLSCREEN & RESET
    // ------------------------------------------------------------------------

    pub fn toggle_fullscreen(&mut self) {
        self.state.is_fullscreen = !self.state.is_fullscreen;
    }

    pub fn is_fullscreen(&self) -> bool {
        self.state.is_fullscreen
    }

    /// Back to the initial state.
    pub fn reset(&mut self) {
        let had_selection = !self.state.row_selection.is_empty();
        self.state = TableState::with_page_size(self.options.effective_page_size());
        if had_selection {
            self.notify_selection();
        }
    }

    // ------------------------------------------------------------------------
    // ACTIONS
    // ------------------------------------------------------------------------

    fn table_context_for(&self, model: &RowModel) -> TableContext {
        TableContext {
            title: self.options.title.clone(),
            is_fullscreen: self.state.is_fullscreen,
            has_active_filters_or_sort: self.has_active_filters_or_sort(),
            row_count: model.leaves.len(),
            selected_count: self.selected_count(),
        }
    }

    pub fn table_context(&self) -> TableContext {
        self.table_context_for(&self.row_model())
    }

    /// Built-in header actions with the caller's merged in.
    pub fn header_actions(&self) -> Vec<HeaderAction> {
        merge_header_actions(
            default_header_actions(&self.localization.labels),
            self.custom_header_actions.clone(),
        )
    }

    /// Run a header action: the caller's `on_click` if set, else the built-in behavior.
    pub fn click_header_action(&mut self, kind: &HeaderActionKind) -> ActionOutcome {
        let ctx = self.table_context();
        let kind = kind.clone().normalized();
        let Some(action) = self.header_actions().into_iter().find(|a| a.kind == kind) else {
            return ActionOutcome::NotFound;
        };
        if action.is_hidden(&ctx) || action.is_disabled(&ctx) {
            return ActionOutcome::Disabled;
        }
        if let Some(on_click) = &action.on_click {
            on_click(&ctx);
            return ActionOutcome::Handled;
        }

        match kind {
            HeaderActionKind::Fullscreen => {
                self.toggle_fullscreen();
                ActionOutcome::Handled
            }
            HeaderActionKind::Reset => {
                self.reset_filters_and_sorting();
                ActionOutcome::Handled
            }
            HeaderActionKind::Export => {
                self.export_requested = true;
                ActionOutcome::ExportRequested
            }
            HeaderActionKind::ColumnVisibility => ActionOutcome::ColumnMenuRequested,
            HeaderActionKind::Custom(_) => ActionOutcome::Handled,
        }
    }

    /// Whether export was requested since the last call.
    pub fn take_export_request(&mut self) -> bool {
        std::mem::take(&mut self.export_requested)
    }

    fn row_context(entry: &RowEntry) -> RowContext {
        RowContext { row: entry.data.clone(), row_id: entry.id.clone(), index: entry.index }
    }

    pub fn click_row_action(&self, row_id: &str, kind: &str) -> Result<ActionOutcome, TableError> {
        let entry = self
            .rows
            .iter()
            .find(|r| r.id == row_id)
            .ok_or_else(|| TableError::UnknownRow(row_id.to_string()))?;
        let ctx = Self::row_context(entry);

        let Some(action) = self.row_actions.iter().find(|a| a.kind == kind) else {
            return Ok(ActionOutcome::NotFound);
        };
        if action.is_hidden(&ctx) || action.is_disabled(&ctx) {
            return Ok(ActionOutcome::Disabled);
        }
        if let Some(on_click) = &action.on_click {
            on_click(&ctx);
        }
        Ok(ActionOutcome::Handled)
    }

    // ------------------------------------------------------------------------
    // PERSISTENCE
    // ------------------------------------------------------------------------

    /// Save sorting, filters, visibility, grouping and page size under the storage key.
    pub fn persist(&self, storage: &dyn StateStorage) -> Result<(), TableError> {
        let Some(key) = self.options.storage_key.as_deref() else {
            return Ok(());
        };
        let json = serde_json::to_string(&self.state.persisted())?;
        storage.set(key, &json)?;
        log_debug!("STORAGE", "persisted table state key={}", key);
        Ok(())
    }

    /// Load saved state. Entries for unknown columns are skipped.
    /// Returns whether anything was stored.
    pub fn restore(&mut self, storage: &dyn StateStorage) -> Result<bool, TableError> {
        let Some(key) = self.options.storage_key.clone() else {
            return Ok(false);
        };
        let Some(json) = storage.get(&key)? else {
            return Ok(false);
        };
        let saved: PersistedState = serde_json::from_str(&json)?;
        self.apply_persisted(saved);
        log_debug!("STORAGE", "restored table state key={}", key);
        Ok(true)
    }

    fn apply_persisted(&mut self, saved: PersistedState) {
        let columns = self.columns.clone();
        let find = |id: &str| columns.iter().find(|c| c.id == id && c.is_data());
        let known = |id: &str, keep: bool| {
            if !keep {
                log_warn!("STORAGE", "skipping saved state for column '{}'", id);
            }
            keep
        };

        self.state.sorting = saved
            .sorting
            .into_iter()
            .filter(|s| known(&s.id, find(&s.id).is_some_and(|c| c.header.can_sort)))
            .collect();
        self.state.column_filters = saved
            .column_filters
            .into_iter()
            .filter(|(id, value)| {
                let keep = find(id)
                    .and_then(|c| c.filter_fn())
                    .is_some_and(|f| !f.auto_remove(value));
                known(id, keep)
            })
            .collect();
        self.state.column_visibility = saved
            .column_visibility
            .into_iter()
            .filter(|(id, _)| known(id, find(id).is_some_and(|c| c.header.can_hide)))
            .collect();
        self.state.grouping = saved
            .grouping
            .into_iter()
            .filter(|id| known(id, find(id).is_some_and(|c| c.header.can_group)))
            .collect();
        if PAGE_SIZES.contains(&saved.page_size) {
            self.state.pagination.page_size = saved.page_size;
        }
        self.clamp_indices();
    }

    // ------------------------------------------------------------------------
    // RENDER
    // ------------------------------------------------------------------------

    fn kind_context<'a>(&'a self, row: &'a Value, column: &'a ColumnDef) -> Option<KindContext<'a>> {
        Some(KindContext {
            row,
            meta: &column.data.as_ref()?.meta,
            lookups: &*self.lookups,
            localization: &self.localization,
        })
    }

    fn summary_text(&self, column: &ColumnDef, indices: &[usize]) -> Option<String> {
        if !column.has_summary() {
            return None;
        }
        let sum = column_sum(column, &self.rows, indices);
        let ctx = self.kind_context(&NULL_ROW, column)?;
        Some(column_type::kind(column.column_type()?).format_summary(sum, &ctx))
    }

    fn header_view(&self, column: &ColumnDef, page_selection: PageSelection) -> HeaderView {
        let sort_position = self.state.sorting.iter().position(|s| s.id == column.id);
        HeaderView {
            id: column.id.clone(),
            role: column.role,
            title: column.header.title.clone(),
            can_sort: column.header.can_sort,
            sort: sort_position.map(|i| self.state.sorting[i].direction()),
            sort_index: sort_position.filter(|_| self.state.sorting.len() > 1),
            can_filter: column.header.can_filter,
            filter_active: self.state.column_filters.contains_key(&column.id),
            can_hide: column.header.can_hide,
            can_group: column.header.can_group,
            is_grouped: self.state.grouping.contains(&column.id),
            sticky: column.sticky,
            size: column.size,
            selection: (column.role == ColumnRole::Selection).then_some(page_selection),
            all_expanded: (column.role == ColumnRole::Expansion && column.header.expand_all)
                .then_some(self.state.expanded.all),
        }
    }

    fn group_view(&self, group: &GroupRow, visible: &[&ColumnDef]) -> GroupRowView {
        let label = match (self.column(&group.column_id), group.leaves.first()) {
            (Some(column), Some(&first)) => {
                let row = &self.rows[first].data;
                match (self.kind_context(row, column), column.column_type()) {
                    (Some(ctx), Some(t)) => column_type::render_cell(t, column.value(row), &ctx),
                    _ => CellContent::text(group.key.clone()),
                }
            }
            _ => CellContent::text(group.key.clone()),
        };

        GroupRowView {
            id: group.id.clone(),
            depth: group.depth,
            column_id: group.column_id.clone(),
            label,
            count: group.leaves.len(),
            expanded: group.expanded,
            aggregates: visible
                .iter()
                .filter(|c| c.has_summary())
                .map(|c| FooterCell { column_id: c.id.clone(), text: self.summary_text(c, &group.leaves) })
                .collect(),
        }
    }

    fn cell_content(&self, column: &ColumnDef, entry: &RowEntry, row_ctx: &RowContext, selected: bool, expanded: bool) -> CellContent {
        match column.role {
            ColumnRole::Selection => CellContent::Checkbox { checked: selected },
            ColumnRole::Expansion => CellContent::Chevron { expanded },
            ColumnRole::Actions => {
                CellContent::Actions(render_row_actions(&self.row_actions, row_ctx, self.options.row_actions_display))
            }
            ColumnRole::Data => {
                let (Some(data), Some(column_type)) = (column.data.as_ref(), column.column_type()) else {
                    return CellContent::text("");
                };
                let ctx = CellContext {
                    row: &entry.data,
                    row_id: &entry.id,
                    row_index: entry.index,
                    value: column.value(&entry.data),
                    column_type,
                    meta: &data.meta,
                    lookups: &*self.lookups,
                    localization: &self.localization,
                };
                column.render_cell(&ctx)
            }
        }
    }

    fn data_row_view(&self, index: usize, depth: usize, visible: &[&ColumnDef], model: &RowModel) -> DataRowView {
        let entry = &self.rows[index];
        let row_ctx = Self::row_context(entry);
        let selected = self.state.row_selection.contains(&entry.id);
        let expanded = self.collapse.is_some() && self.state.expanded.is_expanded(&entry.id);

        let cells = visible
            .iter()
            .map(|column| CellView {
                column_id: column.id.clone(),
                content: self.cell_content(column, entry, &row_ctx, selected, expanded),
                class_name: column
                    .data
                    .as_ref()
                    .and_then(|d| d.meta.class_name.as_ref())
                    .and_then(|f| f(entry.data.as_ref())),
                sticky: column.sticky,
            })
            .collect();

        DataRowView {
            id: entry.id.clone(),
            index: entry.index,
            depth,
            selected,
            expanded,
            is_current: self
                .state
                .current_row
                .is_some_and(|c| model.leaves.get(c) == Some(&index)),
            class_name: self.row_class_name.as_ref().and_then(|f| f(entry.data.as_ref())),
            cells,
            collapse: match (&self.collapse, expanded) {
                (Some(f), true) => Some(f(&row_ctx)),
                _ => None,
            },
        }
    }

    /// Produce the view model for the current state.
    pub fn render(&self) -> TableView {
        let model = self.row_model();
        let visible: Vec<&ColumnDef> = self
            .columns
            .iter()
            .filter(|c| self.state.is_column_visible(&c.id))
            .collect();
        let labels = &self.localization.labels;
        let page_selection = self.page_selection_for(&model);

        let body = match self.status {
            DataStatus::Pending => TableBody::Skeleton { rows: PENDING_ROW_COUNT, columns: visible.len() },
            DataStatus::Error => TableBody::Error { message: labels.load_failed.clone() },
            DataStatus::Success => {
                let range = self.state.pagination.range(model.rows.len());
                if range.is_empty() {
                    TableBody::Empty { message: labels.no_results.clone() }
                } else {
                    let rows = model.rows[range]
                        .iter()
                        .map(|r| match r {
                            ModelRow::Group(group) => RowView::Group(self.group_view(group, &visible)),
                            ModelRow::Leaf { index, depth } => {
                                RowView::Data(self.data_row_view(*index, *depth, &visible, &model))
                            }
                        })
                        .collect();
                    TableBody::Rows { rows }
                }
            }
        };

        let footer = (self.status == DataStatus::Success && visible.iter().any(|c| c.has_summary())).then(|| {
            visible
                .iter()
                .map(|c| FooterCell { column_id: c.id.clone(), text: self.summary_text(c, &model.leaves) })
                .collect()
        });

        let pagination = self.options.show_pagination.then(|| {
            let p = self.state.pagination;
            let page_count = p.page_count(model.rows.len());
            PaginationView {
                page_index: p.page_index,
                page_count,
                page_size: p.page_size,
                page_sizes: PAGE_SIZES.to_vec(),
                total_rows: model.leaves.len(),
                selected_count: self.selected_count(),
                can_previous: p.page_index > 0,
                can_next: p.page_index + 1 < page_count,
            }
        });

        TableView {
            title: self.options.title.clone(),
            is_fullscreen: self.state.is_fullscreen,
            header_actions: render_header_actions(&self.header_actions(), &self.table_context_for(&model)),
            headers: visible.iter().map(|c| self.header_view(c, page_selection)).collect(),
            body,
            footer,
            pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Icon;
    use crate::column::{ColumnType, Tone};
    use crate::storage::MemoryStorage;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn donation_columns() -> Vec<ColumnConfig> {
        vec![
            ColumnConfig::new("name", ColumnType::Text, "שם").with_grouping(),
            ColumnConfig::new("amount", ColumnType::Currency, "סכום").with_summary(),
            ColumnConfig::new("paid", ColumnType::BooleanBadge, "שולם"),
            ColumnConfig::new("city", ColumnType::Text, "עיר").without_hiding(),
        ]
    }

    fn amounts_table() -> DataTable {
        DataTable::new(donation_columns(), TableOptions::default()).with_rows(vec![
            json!({ "name": "a", "amount": 10, "paid": true, "city": "x" }),
            json!({ "name": "b", "amount": -5, "paid": false, "city": "y" }),
            json!({ "name": "c", "amount": 0, "paid": true, "city": "x" }),
            json!({ "name": "d", "amount": 20, "paid": null, "city": "z" }),
            json!({ "name": "e", "amount": null, "paid": true, "city": "x" }),
        ])
    }

    fn many_rows(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!({ "name": format!("n{}", i), "amount": i, "city": "x" })).collect()
    }

    fn names(table: &DataTable) -> Vec<String> {
        table
            .filtered_rows()
            .iter()
            .map(|r| r["name"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    fn footer_text(view: &TableView, id: &str) -> Option<String> {
        view.footer.as_ref()?.iter().find(|f| f.column_id == id)?.text.clone()
    }

    #[test]
    fn test_range_scenario_with_footer() {
        let mut table = amounts_table();
        table.set_column_filter("amount", Some(FilterValue::range("0", "20"))).unwrap();

        assert_eq!(names(&table), vec!["a", "c", "d"]);
        assert_eq!(footer_text(&table.render(), "amount").as_deref(), Some("30.00 ₪"));
    }

    #[test]
    fn test_empty_range_is_pruned() {
        let mut table = amounts_table();
        table.set_column_filter("amount", Some(FilterValue::range("", ""))).unwrap();
        assert!(table.column_filter("amount").is_none());
        assert_eq!(table.filtered_rows().len(), 5);
        assert!(!table.has_active_filters_or_sort());
    }

    #[test]
    fn test_boolean_badge_scenario() {
        let mut table = DataTable::new(
            vec![ColumnConfig::new("paid", ColumnType::BooleanBadge, "שולם")],
            TableOptions::default(),
        )
        .with_rows(vec![json!({ "paid": true }), json!({ "paid": false }), json!({ "paid": true }), json!({ "paid": null })]);

        table.set_column_filter("paid", Some(FilterValue::values(["true"]))).unwrap();
        let kept = table.filtered_rows();
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r["paid"] == json!(true)));
    }

    #[test]
    fn test_multi_select_full_selection_normalizes_to_none() {
        let mut table = amounts_table();
        table.set_column_filter("city", Some(FilterValue::values(["x", "y", "z"]))).unwrap();
        assert!(table.column_filter("city").is_none());
        assert!(!table.has_active_filters_or_sort());

        table.set_column_filter("city", Some(FilterValue::Values(vec![]))).unwrap();
        assert_eq!(table.column_filter("city"), Some(&FilterValue::Values(vec![])));
        assert!(table.filtered_rows().is_empty());
        assert!(matches!(table.render().body, TableBody::Empty { .. }));

        table.set_column_filter("city", Some(FilterValue::values(["x", "y"]))).unwrap();
        assert_eq!(table.filtered_rows().len(), 4);
    }

    #[test]
    fn test_full_selection_is_relative_to_other_filters() {
        let mut table = amounts_table();
        table.set_column_filter("paid", Some(FilterValue::values(["true"]))).unwrap();
        // Rows with paid=true only live in city "x"
        table.set_column_filter("city", Some(FilterValue::values(["x"]))).unwrap();
        assert!(table.column_filter("city").is_none());
    }

    #[test]
    fn test_values_filter_kept_while_loading() {
        let mut table = DataTable::new(donation_columns(), TableOptions::default());
        table.set_column_filter("city", Some(FilterValue::values(["x"]))).unwrap();
        assert_eq!(table.column_filter("city"), Some(&FilterValue::values(["x"])));

        table.set_rows(vec![
            json!({ "name": "a", "amount": 1, "city": "x" }),
            json!({ "name": "b", "amount": 2, "city": "y" }),
        ]);
        assert_eq!(names(&table), vec!["a"]);
    }

    #[test]
    fn test_values_filter_kept_when_other_filter_hides_all() {
        let mut table = amounts_table();
        table.set_column_filter("amount", Some(FilterValue::range("100", ""))).unwrap();
        assert!(table.filtered_rows().is_empty());

        table.set_column_filter("city", Some(FilterValue::values(["x"]))).unwrap();
        assert_eq!(table.column_filter("city"), Some(&FilterValue::values(["x"])));

        table.set_column_filter("amount", None).unwrap();
        assert_eq!(names(&table), vec!["a", "c", "e"]);
    }

    #[test]
    fn test_facets_and_min_max() {
        let mut table = amounts_table();
        table.set_column_filter("amount", Some(FilterValue::range("0", ""))).unwrap();

        let facets = table.faceted_values("city").unwrap();
        let pairs: Vec<(&str, usize)> = facets.iter().map(|f| (f.value.as_str(), f.count)).collect();
        assert_eq!(pairs, vec![("x", 2), ("z", 1)]);

        assert_eq!(table.faceted_min_max("amount").unwrap(), Some((-5.0, 20.0)));

        let paid = table.faceted_values("paid").unwrap();
        assert_eq!(paid[0].label, "כן");
    }

    #[test]
    fn test_sort_cycle() {
        let mut table = amounts_table();
        table.toggle_sorting("amount", false).unwrap();
        assert_eq!(names(&table), vec!["b", "c", "a", "d", "e"]);
        table.toggle_sorting("amount", false).unwrap();
        assert_eq!(names(&table), vec!["d", "a", "c", "b", "e"]);
        table.toggle_sorting("amount", false).unwrap();
        assert!(table.state().sorting.is_empty());
        assert!(matches!(table.toggle_sorting("missing", false), Err(TableError::UnknownColumn(_))));
    }

    #[test]
    fn test_multi_sort_appends() {
        let mut table = amounts_table();
        table.toggle_sorting("city", false).unwrap();
        table.toggle_sorting("amount", true).unwrap();
        assert_eq!(table.state().sorting.len(), 2);
        assert_eq!(names(&table), vec!["c", "a", "e", "b", "d"]);

        let view = table.render();
        let amount = view.headers.iter().find(|h| h.id == "amount").unwrap();
        assert_eq!(amount.sort_index, Some(1));
    }

    #[test]
    fn test_page_index_clamped_when_rows_shrink() {
        let mut table = DataTable::new(donation_columns(), TableOptions::default()).with_rows(many_rows(25));
        table.set_page_index(2);
        assert_eq!(table.state().pagination.page_index, 2);

        table.set_rows(many_rows(12));
        assert_eq!(table.state().pagination.page_index, 1);

        table.set_global_filter("n1");
        assert_eq!(table.state().pagination.page_index, 0);
    }

    #[test]
    fn test_current_row_clamped() {
        let mut table = DataTable::new(donation_columns(), TableOptions::default()).with_rows(many_rows(3));
        table.set_current_row(Some(2));
        assert_eq!(table.current_row(), Some(2));

        table.set_rows(many_rows(2));
        assert_eq!(table.current_row(), Some(1));

        table.set_rows(Vec::new());
        assert_eq!(table.current_row(), None);

        table.set_rows(many_rows(3));
        table.set_current_row(Some(10));
        assert_eq!(table.current_row(), Some(2));
        assert_eq!(table.current_row_data().unwrap()["name"], json!("n2"));
    }

    #[test]
    fn test_page_size_resets_page() {
        let mut table = DataTable::new(donation_columns(), TableOptions::default()).with_rows(many_rows(45));
        table.next_page();
        table.next_page();
        assert_eq!(table.state().pagination.page_index, 2);
        table.set_page_size(20).unwrap();
        assert_eq!(table.state().pagination.page_index, 0);
        assert_eq!(table.page_count(), 3);
        assert!(matches!(table.set_page_size(15), Err(TableError::InvalidPageSize(15))));
    }

    #[test]
    fn test_page_selection_tri_state() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let options = TableOptions { show_selection: true, ..Default::default() };
        let mut table = DataTable::new(donation_columns(), options)
            .with_rows(many_rows(15))
            .on_selected_change(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(table.page_selection_state(), PageSelection::None);
        table.toggle_row_selected("3").unwrap();
        assert_eq!(table.page_selection_state(), PageSelection::Some);

        table.toggle_page_selected();
        assert_eq!(table.page_selection_state(), PageSelection::All);
        assert_eq!(table.selected_count(), 10);

        // Next page has none of the selected rows
        table.next_page();
        assert_eq!(table.page_selection_state(), PageSelection::None);

        table.previous_page();
        table.toggle_page_selected();
        assert_eq!(table.selected_count(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_selection_pruned_when_row_removed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let options = TableOptions { row_id_key: Some("name".into()), ..Default::default() };
        let mut table = DataTable::new(donation_columns(), options)
            .with_rows(many_rows(3))
            .on_selected_change(move |t| {
                counter.store(t.selected_count(), Ordering::SeqCst);
            });

        table.toggle_row_selected("n2").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        table.set_rows(many_rows(2));
        assert!(table.selected_rows().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_visibility_honors_enable_hiding() {
        let mut table = amounts_table();
        table.set_column_visibility("paid", false).unwrap();
        assert!(!table.render().headers.iter().any(|h| h.id == "paid"));
        assert!(matches!(table.set_column_visibility("city", false), Err(TableError::HidingDisabled(_))));
        assert_eq!(table.export_columns().len(), 3);
    }

    #[test]
    fn test_status_bodies() {
        let mut table = DataTable::new(donation_columns(), TableOptions::default());
        assert_eq!(table.render().body, TableBody::Skeleton { rows: 5, columns: 4 });
        assert!(table.render().footer.is_none());

        table.set_status(DataStatus::Error);
        assert_eq!(table.render().body, TableBody::Error { message: "שגיאה בטעינת הנתונים".into() });
    }

    #[test]
    fn test_grouping_aggregates() {
        let mut table = DataTable::new(donation_columns(), TableOptions::default()).with_rows(vec![
            json!({ "name": "a", "amount": 5, "city": "x" }),
            json!({ "name": "b", "amount": 7, "city": "x" }),
            json!({ "name": "a", "amount": 1, "city": "y" }),
        ]);
        table.toggle_grouping("name").unwrap();
        assert!(matches!(table.toggle_grouping("amount"), Err(TableError::GroupingDisabled(_))));

        let TableBody::Rows { rows } = table.render().body else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 2);
        let RowView::Group(first) = &rows[0] else {
            panic!("expected group");
        };
        assert_eq!(first.count, 2);
        assert_eq!(first.aggregates[0].text.as_deref(), Some("6.00 ₪"));

        table.toggle_expanded("name:a");
        let TableBody::Rows { rows } = table.render().body else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_expand_all_then_collapse_one() {
        let mut table = DataTable::new(donation_columns(), TableOptions { enable_expand_all: true, ..Default::default() })
            .with_rows(many_rows(2))
            .with_collapse_content(|ctx| CellContent::text(format!("details {}", ctx.row_id)));

        table.toggle_all_expanded();
        assert!(table.is_all_expanded());
        table.toggle_expanded("0");
        assert!(!table.is_all_expanded());

        let view = table.render();
        let expand = view.headers.iter().find(|h| h.id == "expand").unwrap();
        assert_eq!(expand.all_expanded, Some(false));
        let TableBody::Rows { rows } = view.body else {
            panic!("expected rows");
        };
        let collapses: Vec<Option<CellContent>> = rows
            .iter()
            .map(|r| match r {
                RowView::Data(d) => d.collapse.clone(),
                RowView::Group(_) => None,
            })
            .collect();
        assert_eq!(collapses, vec![None, Some(CellContent::text("details 1"))]);
    }

    #[test]
    fn test_reset_filters_and_header_action() {
        let mut table = amounts_table();
        assert_eq!(table.click_header_action(&HeaderActionKind::Reset), ActionOutcome::Disabled);

        table.set_global_filter("a");
        table.toggle_sorting("amount", false).unwrap();
        assert!(table.has_active_filters_or_sort());
        assert_eq!(table.click_header_action(&HeaderActionKind::Reset), ActionOutcome::Handled);
        assert!(!table.has_active_filters_or_sort());

        assert_eq!(table.click_header_action(&HeaderActionKind::Fullscreen), ActionOutcome::Handled);
        assert!(table.is_fullscreen());

        assert_eq!(table.click_header_action(&HeaderActionKind::Export), ActionOutcome::ExportRequested);
        assert!(table.take_export_request());
        assert!(!table.take_export_request());
    }

    #[test]
    fn test_caller_on_click_replaces_builtin() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut table = amounts_table().with_header_actions(vec![
            HeaderAction::new(HeaderActionKind::Fullscreen).on_click(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            HeaderAction::custom("add", "הוספה", Icon::Named("plus".into())),
        ]);

        assert_eq!(table.click_header_action(&HeaderActionKind::Fullscreen), ActionOutcome::Handled);
        assert!(!table.is_fullscreen());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let view = table.render();
        assert_eq!(view.header_actions[0].kind, "add");
        assert_eq!(view.header_actions.len(), 5);
    }

    #[test]
    fn test_row_actions_column() {
        let clicked = Arc::new(AtomicUsize::new(0));
        let counter = clicked.clone();
        let labels = engine::Labels::default();
        let table = amounts_table().with_row_actions(vec![
            RowAction::edit(&labels).on_click(move |ctx| {
                counter.store(ctx.index + 100, Ordering::SeqCst);
            }),
            RowAction::delete(&labels).disabled_when(|ctx| ctx.row["paid"] == json!(true)),
        ]);

        assert_eq!(table.columns().last().map(|c| c.id.as_str()), Some("actions"));
        assert_eq!(table.click_row_action("1", "edit").unwrap(), ActionOutcome::Handled);
        assert_eq!(clicked.load(Ordering::SeqCst), 101);
        assert_eq!(table.click_row_action("0", "delete").unwrap(), ActionOutcome::Disabled);
        assert!(table.click_row_action("99", "edit").is_err());

        let TableBody::Rows { rows } = table.render().body else {
            panic!("expected rows");
        };
        let RowView::Data(first) = &rows[0] else {
            panic!("expected data row");
        };
        let CellContent::Actions(bar) = &first.cells.last().unwrap().content else {
            panic!("expected actions cell");
        };
        assert!(bar.actions[1].disabled);
    }

    #[test]
    fn test_render_is_deterministic_across_builds() {
        let a = amounts_table().render();
        let b = amounts_table().render();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cells_render_through_registry_and_override() {
        let mut columns = donation_columns();
        columns[0] = ColumnConfig::new("name", ColumnType::Text, "שם")
            .with_cell(|ctx| CellContent::text(format!("#{} {}", ctx.row_index, ctx.default_content().plain_text())));
        let table = DataTable::new(columns, TableOptions::default()).with_rows(vec![json!({ "name": "a", "amount": 3, "paid": true })]);

        let TableBody::Rows { rows } = table.render().body else {
            panic!("expected rows");
        };
        let RowView::Data(row) = &rows[0] else {
            panic!("expected data row");
        };
        assert_eq!(row.cells[0].content, CellContent::text("#0 a"));
        assert_eq!(row.cells[1].content, CellContent::text("3.00 ₪"));
        assert_eq!(
            row.cells[2].content,
            CellContent::Badge(crate::column_type::Badge { label: "כן".into(), tone: Tone::Success })
        );
        assert_eq!(row.cells[3].content, CellContent::Placeholder { text: "-".into() });
    }

    #[test]
    fn test_persist_and_restore() {
        let storage = MemoryStorage::new();
        let options = TableOptions { storage_key: Some("donations".into()), ..Default::default() };

        let mut table = DataTable::new(donation_columns(), options.clone()).with_rows(many_rows(30));
        table.toggle_sorting("amount", false).unwrap();
        table.set_column_filter("amount", Some(FilterValue::range("5", ""))).unwrap();
        table.set_column_visibility("paid", false).unwrap();
        table.set_page_size(20).unwrap();
        table.persist(&storage).unwrap();

        let mut restored = DataTable::new(donation_columns(), options).with_rows(many_rows(30));
        assert!(restored.restore(&storage).unwrap());
        assert_eq!(restored.state().sorting, table.state().sorting);
        assert_eq!(restored.column_filter("amount"), Some(&FilterValue::range("5", "")));
        assert!(!restored.is_column_visible("paid"));
        assert_eq!(restored.state().pagination.page_size, 20);

        storage
            .set("donations", r#"{ "sorting": [{ "id": "gone", "desc": false }], "pageSize": 7 }"#)
            .unwrap();
        restored.restore(&storage).unwrap();
        assert!(restored.state().sorting.is_empty());
        assert_eq!(restored.state().pagination.page_size, 20);
    }

    #[test]
    fn test_reset_returns_to_defaults() {
        let mut table = amounts_table();
        table.toggle_fullscreen();
        table.toggle_row_selected("0").unwrap();
        table.set_global_filter("x");
        table.reset();
        assert_eq!(table.state(), &TableState::with_page_size(10));
    }
}
