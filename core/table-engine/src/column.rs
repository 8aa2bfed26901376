//! FILENAME: core/table-engine/src/column.rs
//! PURPOSE: Declarative column configuration supplied by the caller.
//! CONTEXT: A page constructs its `ColumnConfig`s once and hands them to the
//! column builder. Configs are immutable for the lifetime of the table.

use crate::column_type::{self, CellContent, KindContext};
use crate::filter::FilterFnKind;
use crate::options::Side;
use engine::{AccessorPath, Localization};
use lookup::LookupSource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// COLUMN TYPE
// ============================================================================

/// Semantic type of a column. Drives rendering, export and the default filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    Text,
    TextLong,
    TextCopy,
    Lookup,
    LookupMulti,
    Boolean,
    BooleanBadge,
    BooleanIcon,
    Options,
    Number,
    Currency,
    Percent,
    Date,
    Datetime,
    HebDate,
    HebDatetime,
    UserAvatar,
    Status,
    LiveStatus,
    Custom,
}

impl ColumnType {
    pub const ALL: [ColumnType; 20] = [
        ColumnType::Text,
        ColumnType::TextLong,
        ColumnType::TextCopy,
        ColumnType::Lookup,
        ColumnType::LookupMulti,
        ColumnType::Boolean,
        ColumnType::BooleanBadge,
        ColumnType::BooleanIcon,
        ColumnType::Options,
        ColumnType::Number,
        ColumnType::Currency,
        ColumnType::Percent,
        ColumnType::Date,
        ColumnType::Datetime,
        ColumnType::HebDate,
        ColumnType::HebDatetime,
        ColumnType::UserAvatar,
        ColumnType::Status,
        ColumnType::LiveStatus,
        ColumnType::Custom,
    ];

    pub fn is_numeric(self) -> bool {
        column_type::kind(self).is_numeric()
    }

    pub fn is_lookup(self) -> bool {
        matches!(self, ColumnType::Lookup | ColumnType::LookupMulti)
    }
}

// ============================================================================
// META
// ============================================================================

/// Color family of a badge or status pill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Tone {
    #[default]
    Neutral,
    Success,
    Warning,
    Danger,
    Info,
}

/// One entry of an `options` / `status` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionItem {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub tone: Tone,
}

impl OptionItem {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        OptionItem { value: value.into(), label: label.into(), tone: Tone::Neutral }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }
}

/// How a lookup column displays its translated label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum LookupVariant {
    #[default]
    Text,
    Badge,
}

pub type ClassNameFn = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// Type-specific settings of a column.
#[derive(Clone)]
pub struct ColumnMeta {
    /// Registered lookup key for `lookup` / `lookup-multi` columns
    pub lookup_key: Option<String>,
    pub lookup_variant: LookupVariant,

    /// Decimal places for number, currency and percent columns
    pub decimals: u8,

    /// ISO currency code used when `currency_accessor` is unset or empty.
    ///
    /// Default: "ILS"
    pub currency: String,

    /// Per-row currency code (e.g. `currency.code`)
    pub currency_accessor: Option<AccessorPath>,

    pub sticky: Option<Side>,

    /// Value/label pairs for `options` and `status` columns
    pub options: Vec<OptionItem>,

    /// Character limit before `text-long` truncates.
    ///
    /// Default: 50
    pub max_length: usize,

    /// Extra class name for each cell of this column
    pub class_name: Option<ClassNameFn>,
}

impl Default for ColumnMeta {
    fn default() -> Self {
        ColumnMeta {
            lookup_key: None,
            lookup_variant: LookupVariant::Text,
            decimals: 2,
            currency: "ILS".to_string(),
            currency_accessor: None,
            sticky: None,
            options: Vec::new(),
            max_length: 50,
            class_name: None,
        }
    }
}

impl fmt::Debug for ColumnMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnMeta")
            .field("lookup_key", &self.lookup_key)
            .field("lookup_variant", &self.lookup_variant)
            .field("decimals", &self.decimals)
            .field("currency", &self.currency)
            .field("sticky", &self.sticky)
            .field("options", &self.options.len())
            .finish_non_exhaustive()
    }
}

impl ColumnMeta {
    pub fn option(&self, value: &str) -> Option<&OptionItem> {
        self.options.iter().find(|o| o.value == value)
    }
}

// ============================================================================
// CELL CONTEXT
// ============================================================================

/// What a cell renderer sees.
pub struct CellContext<'a> {
    pub row: &'a Value,
    pub row_id: &'a str,
    pub row_index: usize,
    /// Accessor result for this column
    pub value: Option<&'a Value>,
    pub column_type: ColumnType,
    pub meta: &'a ColumnMeta,
    pub lookups: &'a dyn LookupSource,
    pub localization: &'a Localization,
}

impl CellContext<'_> {
    /// What the type registry would render. Lets overrides decorate the default.
    pub fn default_content(&self) -> CellContent {
        column_type::render_cell(self.column_type, self.value, &self.kind_context())
    }

    pub(crate) fn kind_context(&self) -> KindContext<'_> {
        KindContext {
            row: self.row,
            meta: self.meta,
            lookups: self.lookups,
            localization: self.localization,
        }
    }
}

pub type CellFn = Arc<dyn Fn(&CellContext<'_>) -> CellContent + Send + Sync>;

// ============================================================================
// COLUMN CONFIG
// ============================================================================

/// Declarative description of one data column.
#[derive(Clone)]
pub struct ColumnConfig {
    pub accessor_key: AccessorPath,
    /// Defaults to the accessor key
    pub id: Option<String>,
    pub column_type: ColumnType,
    pub header: String,
    pub cell: Option<CellFn>,

    pub size: Option<u32>,
    pub min_size: Option<u32>,
    pub max_size: Option<u32>,

    pub enable_sorting: bool,
    pub enable_hiding: bool,
    pub enable_filtering: bool,
    pub enable_summary: bool,
    pub enable_grouping: bool,

    /// Replaces the filter chosen by column type
    pub filter_fn: Option<FilterFnKind>,

    pub meta: ColumnMeta,
}

impl ColumnConfig {
    pub fn new(accessor_key: impl Into<String>, column_type: ColumnType, header: impl Into<String>) -> Self {
        ColumnConfig {
            accessor_key: AccessorPath::new(accessor_key),
            id: None,
            column_type,
            header: header.into(),
            cell: None,
            size: None,
            min_size: None,
            max_size: None,
            enable_sorting: true,
            enable_hiding: true,
            enable_filtering: true,
            enable_summary: false,
            enable_grouping: false,
            filter_fn: None,
            meta: ColumnMeta::default(),
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_else(|| self.accessor_key.as_str())
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_cell<F>(mut self, cell: F) -> Self
    where
        F: Fn(&CellContext<'_>) -> CellContent + Send + Sync + 'static,
    {
        self.cell = Some(Arc::new(cell));
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_summary(mut self) -> Self {
        self.enable_summary = true;
        self
    }

    pub fn with_grouping(mut self) -> Self {
        self.enable_grouping = true;
        self
    }

    pub fn without_sorting(mut self) -> Self {
        self.enable_sorting = false;
        self
    }

    pub fn without_hiding(mut self) -> Self {
        self.enable_hiding = false;
        self
    }

    pub fn without_filtering(mut self) -> Self {
        self.enable_filtering = false;
        self
    }

    pub fn with_filter_fn(mut self, filter_fn: FilterFnKind) -> Self {
        self.filter_fn = Some(filter_fn);
        self
    }

    pub fn with_lookup(mut self, key: impl Into<String>) -> Self {
        self.meta.lookup_key = Some(key.into());
        self
    }

    pub fn with_meta(mut self, meta: ColumnMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_options(mut self, options: Vec<OptionItem>) -> Self {
        self.meta.options = options;
        self
    }
}

impl fmt::Debug for ColumnConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnConfig")
            .field("id", &self.id())
            .field("column_type", &self.column_type)
            .field("header", &self.header)
            .field("custom_cell", &self.cell.is_some())
            .field("enable_summary", &self.enable_summary)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_serde_names() {
        let t: ColumnType = serde_json::from_str("\"boolean-badge\"").unwrap();
        assert_eq!(t, ColumnType::BooleanBadge);
        assert_eq!(serde_json::to_string(&ColumnType::HebDatetime).unwrap(), "\"heb-datetime\"");
    }

    #[test]
    fn test_id_defaults_to_accessor() {
        let col = ColumnConfig::new("donor.name", ColumnType::Text, "שם");
        assert_eq!(col.id(), "donor.name");
        assert_eq!(col.with_id("donor").id(), "donor");
    }
}
