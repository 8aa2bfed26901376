//! FILENAME: core/table-engine/src/lib.rs
//! Headless data table.
//!
//! A `DataTable` takes declarative column configs and a list of JSON rows and
//! produces a render-ready `TableView`. It depends on `engine` for value
//! normalization and formatting, and on `lookup` for id-to-label datasets.
//!
//! Layers:
//! - `column` / `column_type`: What a column IS and how each type renders
//! - `builder`: Config list to concrete column definitions
//! - `filter` / `row_model`: Filter, sort, group, expand
//! - `actions`: Row and header actions
//! - `table`: State owner and operations
//! - `view`: Output for the UI layer

pub mod actions;
pub mod builder;
pub mod column;
pub mod column_type;
pub mod error;
pub mod filter;
pub mod options;
pub mod row_model;
pub mod state;
pub mod storage;
pub mod table;
pub mod view;

pub use actions::{
    default_header_actions, merge_header_actions, ActionButton, ActionVariant, Dynamic, HeaderAction,
    HeaderActionKind, Icon, RowAction, RowActionBar, RowContext, TableContext,
};
pub use builder::{build_columns, BuildOptions, ColumnDef, ColumnRole};
pub use column::{CellContext, ColumnConfig, ColumnMeta, ColumnType, LookupVariant, OptionItem, Tone};
pub use column_type::{export_cell, render_cell, Badge, CellContent, ExportValue, KindContext};
pub use error::{StorageError, TableError};
pub use filter::{FilterFnKind, FilterValue};
pub use options::{RowActionsDisplay, Side, TableOptions, PAGE_SIZES};
pub use row_model::{RowEntry, RowModel};
pub use state::{DataStatus, PageSelection, SortDirection, TableState};
pub use storage::{JsonFileStorage, MemoryStorage, ScopedStorage, StateStorage};
pub use table::{ActionOutcome, DataTable, FacetValue};
pub use view::{RowView, TableBody, TableView};
