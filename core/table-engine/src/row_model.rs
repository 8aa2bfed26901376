//! FILENAME: core/table-engine/src/row_model.rs
//! PURPOSE: Derives the row model from raw rows and table state.
//! CONTEXT: Pipeline is filter -> sort -> group -> flatten by expansion.
//! Pagination slices the flattened list. Rows are referenced by their index
//! in the source list throughout; nothing here clones row data.

use crate::builder::ColumnDef;
use crate::column_type::{self, KindContext};
use crate::state::TableState;
use engine::{CellValue, Localization};
use lookup::LookupSource;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

/// One source row with its stable id.
#[derive(Debug, Clone)]
pub struct RowEntry {
    pub id: String,
    pub index: usize,
    pub data: Arc<Value>,
}

/// A grouping bucket.
#[derive(Debug, Clone)]
pub struct GroupRow {
    /// `column:key`, nested groups joined with `>`
    pub id: String,
    pub column_id: String,
    pub key: String,
    pub depth: usize,
    /// Source indices of every leaf under this group
    pub leaves: Vec<usize>,
    pub expanded: bool,
}

/// One line of the flattened row model.
#[derive(Debug, Clone)]
pub enum ModelRow {
    Group(GroupRow),
    Leaf { index: usize, depth: usize },
}

enum RowNode {
    Group { row: GroupRow, children: Vec<RowNode> },
    Leaf(usize),
}

#[derive(Debug, Clone, Default)]
pub struct RowModel {
    /// Filtered, sorted leaves in display order (groups flattened, all pages)
    pub leaves: Vec<usize>,
    /// Visible lines after expansion, all pages
    pub rows: Vec<ModelRow>,
    /// Ids of every row that can expand
    pub expandable: Vec<String>,
}

/// Inputs of one row model computation.
pub(crate) struct ModelContext<'a> {
    pub rows: &'a [RowEntry],
    pub columns: &'a [ColumnDef],
    pub state: &'a TableState,
    pub lookups: &'a dyn LookupSource,
    pub localization: &'a Localization,
    /// Leaf rows carry collapse content
    pub expandable_leaves: bool,
}

impl<'a> ModelContext<'a> {
    fn column(&self, id: &str) -> Option<&'a ColumnDef> {
        self.columns.iter().find(|c| c.id == id && c.is_data())
    }

    fn kind_ctx(&self, row: &'a Value, column: &'a ColumnDef) -> Option<KindContext<'a>> {
        let data = column.data.as_ref()?;
        Some(KindContext {
            row,
            meta: &data.meta,
            lookups: self.lookups,
            localization: self.localization,
        })
    }

    // ------------------------------------------------------------------------
    // FILTER
    // ------------------------------------------------------------------------

    /// Source indices passing every column filter (except `exclude`) and the global filter.
    pub fn filter(&self, exclude: Option<&str>) -> Vec<usize> {
        let active: Vec<_> = self
            .state
            .column_filters
            .iter()
            .filter(|(id, _)| Some(id.as_str()) != exclude)
            .filter_map(|(id, value)| {
                let column = self.column(id)?;
                Some((column, column.filter_fn()?, value))
            })
            .collect();

        let needle = self.state.global_filter.trim().to_lowercase();

        self.rows
            .iter()
            .filter(|entry| {
                active.iter().all(|(column, filter_fn, value)| {
                    let cell = CellValue::from_json(column.value(&entry.data));
                    filter_fn.matches(&entry.data, &column.id, &cell, value)
                })
            })
            .filter(|entry| needle.is_empty() || self.matches_global(&entry.data, &needle))
            .map(|entry| entry.index)
            .collect()
    }

    fn matches_global(&self, row: &'a Value, needle: &str) -> bool {
        self.columns
            .iter()
            .filter(|c| c.is_data() && self.state.is_column_visible(&c.id))
            .any(|column| {
                let value = column.value(row);
                if CellValue::from_json(value).is_empty() {
                    return false;
                }
                let (Some(ctx), Some(t)) = (self.kind_ctx(row, column), column.column_type()) else {
                    return false;
                };
                column_type::render_cell(t, value, &ctx)
                    .plain_text()
                    .to_lowercase()
                    .contains(needle)
            })
    }

    // ------------------------------------------------------------------------
    // SORT
    // ------------------------------------------------------------------------

    /// Stable multi-column sort. Blank values go last in either direction.
    pub fn sort(&self, indices: &mut [usize]) {
        let specs: Vec<(&ColumnDef, bool)> = self
            .state
            .sorting
            .iter()
            .filter_map(|s| Some((self.column(&s.id)?, s.desc)))
            .collect();
        if specs.is_empty() {
            return;
        }

        let keys: FxHashMap<usize, Vec<Option<CellValue>>> = indices
            .iter()
            .map(|&i| {
                let row = &self.rows[i].data;
                let key = specs
                    .iter()
                    .map(|(column, _)| self.sort_key(row, column))
                    .collect();
                (i, key)
            })
            .collect();

        indices.sort_by(|a, b| {
            let (ka, kb) = (&keys[a], &keys[b]);
            for (n, (_, desc)) in specs.iter().enumerate() {
                let ord = match (&ka[n], &kb[n]) {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Greater,
                    (Some(_), None) => Ordering::Less,
                    (Some(x), Some(y)) => {
                        let ord = x.compare(y);
                        if *desc {
                            ord.reverse()
                        } else {
                            ord
                        }
                    }
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }

    fn sort_key(&self, row: &'a Value, column: &'a ColumnDef) -> Option<CellValue> {
        let value = column.value(row)?;
        if CellValue::from_json(Some(value)).is_empty() {
            return None;
        }
        let ctx = self.kind_ctx(row, column)?;
        Some(column_type::kind(column.column_type()?).sort_value(value, &ctx))
    }

    // ------------------------------------------------------------------------
    // GROUP
    // ------------------------------------------------------------------------

    fn group(&self, indices: Vec<usize>, level: usize, parent: Option<&str>) -> Vec<RowNode> {
        let Some(column) = self.state.grouping.get(level).and_then(|id| self.column(id)) else {
            return indices.into_iter().map(RowNode::Leaf).collect();
        };

        // Buckets in order of first appearance
        let mut slots: FxHashMap<String, usize> = FxHashMap::default();
        let mut buckets: Vec<(String, Vec<usize>)> = Vec::new();
        for i in indices {
            let key = CellValue::from_json(column.value(&self.rows[i].data)).filter_key();
            match slots.get(&key) {
                Some(&slot) => buckets[slot].1.push(i),
                None => {
                    slots.insert(key.clone(), buckets.len());
                    buckets.push((key, vec![i]));
                }
            }
        }

        buckets
            .into_iter()
            .map(|(key, leaves)| {
                let own = format!("{}:{}", column.id, key);
                let id = match parent {
                    Some(p) => format!("{}>{}", p, own),
                    None => own,
                };
                let children = self.group(leaves.clone(), level + 1, Some(&id));
                RowNode::Group {
                    row: GroupRow {
                        id,
                        column_id: column.id.clone(),
                        key,
                        depth: level,
                        leaves,
                        expanded: false,
                    },
                    children,
                }
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // COMPUTE
    // ------------------------------------------------------------------------

    pub fn compute(&self) -> RowModel {
        let mut filtered = self.filter(None);
        self.sort(&mut filtered);
        let tree = self.group(filtered, 0, None);

        let mut model = RowModel::default();
        self.flatten(tree, &mut model);
        model
    }

    fn flatten(&self, nodes: Vec<RowNode>, model: &mut RowModel) {
        let depth = self.state.grouping.len();
        for node in nodes {
            match node {
                RowNode::Group { mut row, children } => {
                    row.expanded = self.state.expanded.is_expanded(&row.id);
                    model.expandable.push(row.id.clone());
                    let expanded = row.expanded;
                    model.rows.push(ModelRow::Group(row));
                    if expanded {
                        self.flatten(children, model);
                    } else {
                        self.collect_hidden(children, model);
                    }
                }
                RowNode::Leaf(index) => {
                    model.leaves.push(index);
                    if self.expandable_leaves {
                        model.expandable.push(self.rows[index].id.clone());
                    }
                    model.rows.push(ModelRow::Leaf { index, depth });
                }
            }
        }
    }

    /// Record leaves and expandable ids under a collapsed group.
    fn collect_hidden(&self, nodes: Vec<RowNode>, model: &mut RowModel) {
        for node in nodes {
            match node {
                RowNode::Group { row, children } => {
                    model.expandable.push(row.id);
                    self.collect_hidden(children, model);
                }
                RowNode::Leaf(index) => {
                    model.leaves.push(index);
                    if self.expandable_leaves {
                        model.expandable.push(self.rows[index].id.clone());
                    }
                }
            }
        }
    }
}

/// Sum of a column over `indices`. Non-numeric cells count as zero.
pub fn column_sum(column: &ColumnDef, rows: &[RowEntry], indices: &[usize]) -> f64 {
    indices
        .iter()
        .map(|&i| CellValue::from_json(column.value(&rows[i].data)).sum_contribution())
        .sum()
}
