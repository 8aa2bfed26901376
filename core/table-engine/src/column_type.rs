//! FILENAME: core/table-engine/src/column_type.rs
//! PURPOSE: Column type registry.
//! CONTEXT: Every `ColumnType` maps to one `ColumnKind` that owns the type's
//! rendering, export formatting, default filter and sort key. The registry is
//! a static table indexed by the enum, so adding a type means adding one
//! entry here rather than touching a dispatch switch in every consumer.
//!
//! Blank values (missing, `null`, empty string, empty list) never reach a
//! kind: `render_cell` turns them into the empty-value placeholder first, so a
//! blank lookup shows "-" even while its dataset is still loading.

use crate::actions::RowActionBar;
use crate::column::{ColumnMeta, ColumnType, Tone};
use crate::filter::FilterFnKind;
use engine::number_format::presets;
use engine::{
    currency_format, format_date, format_datetime, format_number, parse_date_value, spreadsheet_format,
    CellValue, Localization, NumberFormat,
};
use lookup::{LookupSource, LookupState};
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// OUTPUT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub label: String,
    pub tone: Tone,
}

/// Render-ready content of one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CellContent {
    Text { text: String },
    /// Shortened text; `full` goes in the tooltip
    Truncated { text: String, full: String },
    /// Text with a copy-to-clipboard affordance
    Copyable { text: String },
    Badge(Badge),
    Badges { badges: Vec<Badge> },
    Icon { name: String, tone: Tone, label: String },
    Avatar { name: String, image_url: Option<String> },
    LiveStatus { live: bool, label: String },
    /// Blank value
    Placeholder { text: String },
    /// Lookup dataset still loading
    Loading { text: String },
    /// Lookup dataset failed
    Error { text: String },
    Checkbox { checked: bool },
    Chevron { expanded: bool },
    Actions(RowActionBar),
}

impl CellContent {
    pub fn text(text: impl Into<String>) -> Self {
        CellContent::Text { text: text.into() }
    }

    /// Plain text of the content, as searched by the global filter.
    pub fn plain_text(&self) -> String {
        match self {
            CellContent::Text { text }
            | CellContent::Copyable { text }
            | CellContent::Placeholder { text }
            | CellContent::Loading { text }
            | CellContent::Error { text } => text.clone(),
            CellContent::Truncated { full, .. } => full.clone(),
            CellContent::Badge(badge) => badge.label.clone(),
            CellContent::Badges { badges } => badges
                .iter()
                .map(|b| b.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            CellContent::Icon { label, .. } | CellContent::LiveStatus { label, .. } => label.clone(),
            CellContent::Avatar { name, .. } => name.clone(),
            CellContent::Checkbox { .. } | CellContent::Chevron { .. } | CellContent::Actions(_) => String::new(),
        }
    }
}

/// Value written to a spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportValue {
    Empty,
    Text(String),
    /// Numeric cell with a spreadsheet number format and its on-screen text
    Number { value: f64, num_format: String, text: String },
}

impl ExportValue {
    /// Length of the formatted value, used for column width sizing.
    pub fn display_len(&self) -> usize {
        match self {
            ExportValue::Empty => 0,
            ExportValue::Text(s) => s.chars().count(),
            ExportValue::Number { text, .. } => text.chars().count(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ExportValue::Number { .. })
    }
}

/// Everything a kind may consult besides the value itself.
pub struct KindContext<'a> {
    /// Whole row; `Value::Null` when rendering outside a row (facets, footers)
    pub row: &'a Value,
    pub meta: &'a ColumnMeta,
    pub lookups: &'a dyn LookupSource,
    pub localization: &'a Localization,
}

// ============================================================================
// COLUMN KIND TRAIT
// ============================================================================

/// Behavior of one column type. `value` is never blank.
pub trait ColumnKind: Sync {
    fn render(&self, value: &Value, ctx: &KindContext<'_>) -> CellContent;

    fn export(&self, value: &Value, ctx: &KindContext<'_>) -> ExportValue {
        ExportValue::Text(self.render(value, ctx).plain_text())
    }

    fn default_filter(&self) -> FilterFnKind {
        FilterFnKind::MultiSelect
    }

    /// Key used for sorting. Defaults to the normalized value.
    fn sort_value(&self, value: &Value, _ctx: &KindContext<'_>) -> CellValue {
        CellValue::from_json(Some(value))
    }

    /// Display label of a facet key.
    fn facet_label(&self, key: &str, _ctx: &KindContext<'_>) -> String {
        key.to_string()
    }

    fn is_numeric(&self) -> bool {
        false
    }

    /// Footer / group aggregate text for a column sum.
    fn format_summary(&self, sum: f64, _ctx: &KindContext<'_>) -> String {
        format_number(sum, &NumberFormat::General)
    }
}

// ============================================================================
// TEXT KINDS
// ============================================================================

struct TextKind;

impl ColumnKind for TextKind {
    fn render(&self, value: &Value, _ctx: &KindContext<'_>) -> CellContent {
        CellContent::text(CellValue::from_json(Some(value)).display_value())
    }
}

struct TextLongKind;

impl ColumnKind for TextLongKind {
    fn render(&self, value: &Value, ctx: &KindContext<'_>) -> CellContent {
        let full = CellValue::from_json(Some(value)).display_value();
        let limit = ctx.meta.max_length;
        if full.chars().count() <= limit {
            return CellContent::text(full);
        }
        let text: String = full.chars().take(limit).collect::<String>() + "…";
        CellContent::Truncated { text, full }
    }

    fn export(&self, value: &Value, _ctx: &KindContext<'_>) -> ExportValue {
        ExportValue::Text(CellValue::from_json(Some(value)).display_value())
    }
}

struct TextCopyKind;

impl ColumnKind for TextCopyKind {
    fn render(&self, value: &Value, _ctx: &KindContext<'_>) -> CellContent {
        CellContent::Copyable { text: CellValue::from_json(Some(value)).display_value() }
    }
}

// ============================================================================
// LOOKUP KINDS
// ============================================================================

struct LookupKind {
    multi: bool,
}

impl LookupKind {
    fn labels(&self, value: &Value, table: &lookup::LookupTable) -> Vec<String> {
        CellValue::from_json(Some(value))
            .filter_keys()
            .iter()
            .filter_map(|id| table.label(id))
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl ColumnKind for LookupKind {
    fn render(&self, value: &Value, ctx: &KindContext<'_>) -> CellContent {
        let labels = &ctx.localization.labels;
        let Some(key) = ctx.meta.lookup_key.as_deref() else {
            return CellContent::text(CellValue::from_json(Some(value)).display_value());
        };

        let table = match ctx.lookups.lookup(key) {
            LookupState::Ready(table) => table,
            LookupState::Loading => return CellContent::Loading { text: labels.lookup_loading.clone() },
            LookupState::Failed => return CellContent::Error { text: labels.lookup_error.clone() },
        };

        let found = self.labels(value, &table);
        if found.is_empty() {
            return CellContent::Placeholder { text: labels.empty_value.clone() };
        }

        let badge_variant = ctx.meta.lookup_variant == crate::column::LookupVariant::Badge;
        if self.multi {
            CellContent::Badges {
                badges: found.into_iter().map(|label| Badge { label, tone: Tone::Neutral }).collect(),
            }
        } else if badge_variant {
            CellContent::Badge(Badge { label: found.join(", "), tone: Tone::Neutral })
        } else {
            CellContent::text(found.join(", "))
        }
    }

    fn export(&self, value: &Value, ctx: &KindContext<'_>) -> ExportValue {
        let Some(key) = ctx.meta.lookup_key.as_deref() else {
            return ExportValue::Text(CellValue::from_json(Some(value)).display_value());
        };
        match ctx.lookups.lookup(key) {
            LookupState::Ready(table) => ExportValue::Text(self.labels(value, &table).join(", ")),
            _ => ExportValue::Text(ctx.localization.labels.lookup_error.clone()),
        }
    }

    fn sort_value(&self, value: &Value, ctx: &KindContext<'_>) -> CellValue {
        match ctx.meta.lookup_key.as_deref().map(|key| ctx.lookups.lookup(key)) {
            Some(LookupState::Ready(table)) => CellValue::Text(self.labels(value, &table).join(", ")),
            _ => CellValue::from_json(Some(value)),
        }
    }

    fn facet_label(&self, key: &str, ctx: &KindContext<'_>) -> String {
        match ctx.meta.lookup_key.as_deref().map(|k| ctx.lookups.lookup(k)) {
            Some(LookupState::Ready(table)) => table.label(key).unwrap_or(key).to_string(),
            Some(LookupState::Loading) => ctx.localization.labels.lookup_loading.clone(),
            Some(LookupState::Failed) => ctx.localization.labels.lookup_error.clone(),
            None => key.to_string(),
        }
    }
}

// ============================================================================
// BOOLEAN KINDS
// ============================================================================

#[derive(Clone, Copy, PartialEq)]
enum BooleanStyle {
    Text,
    Badge,
    Icon,
}

struct BooleanKind {
    style: BooleanStyle,
}

impl ColumnKind for BooleanKind {
    fn render(&self, value: &Value, ctx: &KindContext<'_>) -> CellContent {
        let labels = &ctx.localization.labels;
        let Some(b) = CellValue::from_json(Some(value)).as_bool() else {
            return CellContent::Placeholder { text: labels.empty_value.clone() };
        };
        let label = labels.boolean(b).to_string();

        match self.style {
            BooleanStyle::Text => CellContent::text(label),
            BooleanStyle::Badge => CellContent::Badge(Badge {
                label,
                tone: if b { Tone::Success } else { Tone::Neutral },
            }),
            BooleanStyle::Icon => CellContent::Icon {
                name: if b { "check" } else { "x" }.to_string(),
                tone: if b { Tone::Success } else { Tone::Danger },
                label,
            },
        }
    }

    fn export(&self, value: &Value, ctx: &KindContext<'_>) -> ExportValue {
        match CellValue::from_json(Some(value)).as_bool() {
            Some(b) => ExportValue::Text(ctx.localization.labels.boolean(b).to_string()),
            None => ExportValue::Empty,
        }
    }

    fn default_filter(&self) -> FilterFnKind {
        FilterFnKind::BooleanSet
    }

    fn facet_label(&self, key: &str, ctx: &KindContext<'_>) -> String {
        match key {
            "true" => ctx.localization.labels.yes.clone(),
            "false" => ctx.localization.labels.no.clone(),
            other => other.to_string(),
        }
    }
}

struct LiveStatusKind;

impl ColumnKind for LiveStatusKind {
    fn render(&self, value: &Value, ctx: &KindContext<'_>) -> CellContent {
        let labels = &ctx.localization.labels;
        match CellValue::from_json(Some(value)).as_bool() {
            Some(live) => CellContent::LiveStatus {
                live,
                label: if live { labels.live.clone() } else { labels.offline.clone() },
            },
            None => CellContent::Placeholder { text: labels.empty_value.clone() },
        }
    }

    fn default_filter(&self) -> FilterFnKind {
        FilterFnKind::BooleanSet
    }

    fn facet_label(&self, key: &str, ctx: &KindContext<'_>) -> String {
        match key {
            "true" => ctx.localization.labels.live.clone(),
            "false" => ctx.localization.labels.offline.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// OPTION KINDS
// ============================================================================

struct OptionsKind {
    as_badge: bool,
}

impl ColumnKind for OptionsKind {
    fn render(&self, value: &Value, ctx: &KindContext<'_>) -> CellContent {
        let key = CellValue::from_json(Some(value)).filter_key();
        let (label, tone) = match ctx.meta.option(&key) {
            Some(item) => (item.label.clone(), item.tone),
            None => (key, Tone::Neutral),
        };
        if self.as_badge {
            CellContent::Badge(Badge { label, tone })
        } else {
            CellContent::text(label)
        }
    }

    fn facet_label(&self, key: &str, ctx: &KindContext<'_>) -> String {
        ctx.meta.option(key).map(|o| o.label.clone()).unwrap_or_else(|| key.to_string())
    }
}

// ============================================================================
// NUMERIC KINDS
// ============================================================================

#[derive(Clone, Copy, PartialEq)]
enum NumericStyle {
    Number,
    Currency,
    Percent,
}

struct NumericKind {
    style: NumericStyle,
}

impl NumericKind {
    fn format(&self, ctx: &KindContext<'_>) -> NumberFormat {
        let decimals = ctx.meta.decimals;
        match self.style {
            NumericStyle::Number => presets::number(decimals),
            NumericStyle::Percent => presets::percentage(decimals),
            NumericStyle::Currency => {
                let row_code = ctx
                    .meta
                    .currency_accessor
                    .as_ref()
                    .map(|path| CellValue::from_json(path.resolve(ctx.row)).display_value())
                    .filter(|code| !code.is_empty());
                currency_format(row_code.as_deref().unwrap_or(&ctx.meta.currency), decimals)
            }
        }
    }
}

impl ColumnKind for NumericKind {
    fn render(&self, value: &Value, ctx: &KindContext<'_>) -> CellContent {
        let cell = CellValue::from_json(Some(value));
        match cell.as_number() {
            Some(n) => CellContent::text(format_number(n, &self.format(ctx))),
            None => CellContent::text(cell.display_value()),
        }
    }

    fn export(&self, value: &Value, ctx: &KindContext<'_>) -> ExportValue {
        let cell = CellValue::from_json(Some(value));
        let Some(n) = cell.as_number() else {
            return ExportValue::Text(cell.display_value());
        };
        let format = self.format(ctx);
        let value = if self.style == NumericStyle::Percent { n / 100.0 } else { n };
        ExportValue::Number { value, num_format: spreadsheet_format(&format), text: format_number(n, &format) }
    }

    fn default_filter(&self) -> FilterFnKind {
        FilterFnKind::Range
    }

    fn is_numeric(&self) -> bool {
        true
    }

    fn format_summary(&self, sum: f64, ctx: &KindContext<'_>) -> String {
        format_number(sum, &self.format(ctx))
    }
}

// ============================================================================
// DATE KINDS
// ============================================================================

struct DateKind {
    with_time: bool,
    hebrew: bool,
}

impl DateKind {
    fn format(&self, value: &Value, ctx: &KindContext<'_>) -> String {
        let Some(dt) = parse_date_value(value) else {
            return CellValue::from_json(Some(value)).display_value();
        };
        let hebrew = &ctx.localization.hebrew;
        match (self.hebrew, self.with_time) {
            (false, false) => format_date(&dt),
            (false, true) => format_datetime(&dt),
            (true, false) => hebrew.format_date(dt.date()),
            (true, true) => hebrew.format_datetime(dt),
        }
    }
}

impl ColumnKind for DateKind {
    fn render(&self, value: &Value, ctx: &KindContext<'_>) -> CellContent {
        CellContent::text(self.format(value, ctx))
    }

    fn export(&self, value: &Value, ctx: &KindContext<'_>) -> ExportValue {
        ExportValue::Text(self.format(value, ctx))
    }

    fn sort_value(&self, value: &Value, _ctx: &KindContext<'_>) -> CellValue {
        match parse_date_value(value) {
            Some(dt) => CellValue::Number(dt.and_utc().timestamp_millis() as f64),
            None => CellValue::from_json(Some(value)),
        }
    }
}

// ============================================================================
// OTHER KINDS
// ============================================================================

struct UserAvatarKind;

impl ColumnKind for UserAvatarKind {
    fn render(&self, value: &Value, _ctx: &KindContext<'_>) -> CellContent {
        let image_url = ["image", "imageUrl", "avatarUrl"]
            .iter()
            .find_map(|k| value.get(*k))
            .and_then(Value::as_str)
            .map(str::to_string);
        CellContent::Avatar { name: CellValue::from_json(Some(value)).display_value(), image_url }
    }
}

struct CustomKind;

impl ColumnKind for CustomKind {
    fn render(&self, value: &Value, _ctx: &KindContext<'_>) -> CellContent {
        CellContent::text(CellValue::from_json(Some(value)).display_value())
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Kinds in `ColumnType` declaration order.
static REGISTRY: [&dyn ColumnKind; 20] = [
    &TextKind,
    &TextLongKind,
    &TextCopyKind,
    &LookupKind { multi: false },
    &LookupKind { multi: true },
    &BooleanKind { style: BooleanStyle::Text },
    &BooleanKind { style: BooleanStyle::Badge },
    &BooleanKind { style: BooleanStyle::Icon },
    &OptionsKind { as_badge: false },
    &NumericKind { style: NumericStyle::Number },
    &NumericKind { style: NumericStyle::Currency },
    &NumericKind { style: NumericStyle::Percent },
    &DateKind { with_time: false, hebrew: false },
    &DateKind { with_time: true, hebrew: false },
    &DateKind { with_time: false, hebrew: true },
    &DateKind { with_time: true, hebrew: true },
    &UserAvatarKind,
    &OptionsKind { as_badge: true },
    &LiveStatusKind,
    &CustomKind,
];

/// The registered kind for a column type.
pub fn kind(column_type: ColumnType) -> &'static dyn ColumnKind {
    REGISTRY[column_type as usize]
}

/// Render a cell, substituting the empty-value placeholder for blanks.
pub fn render_cell(column_type: ColumnType, value: Option<&Value>, ctx: &KindContext<'_>) -> CellContent {
    match value {
        Some(v) if !CellValue::from_json(Some(v)).is_empty() => kind(column_type).render(v, ctx),
        _ => CellContent::Placeholder { text: ctx.localization.labels.empty_value.clone() },
    }
}

/// Export a cell. Blanks become empty cells.
pub fn export_cell(column_type: ColumnType, value: Option<&Value>, ctx: &KindContext<'_>) -> ExportValue {
    match value {
        Some(v) if !CellValue::from_json(Some(v)).is_empty() => kind(column_type).export(v, ctx),
        _ => ExportValue::Empty,
    }
}
