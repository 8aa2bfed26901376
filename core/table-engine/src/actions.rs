//! FILENAME: core/table-engine/src/actions.rs
//! PURPOSE: Header and row action bars.
//! CONTEXT: Actions are declared once and resolved on every render. Titles
//! and icons may be literals or functions of the current row/table; hidden
//! actions are dropped and disabled ones are marked, never removed.

use crate::options::RowActionsDisplay;
use engine::Labels;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// DYNAMIC VALUES
// ============================================================================

/// A literal, or a function of the render context evaluated at the point of use.
pub enum Dynamic<C, T> {
    Static(T),
    Computed(Arc<dyn Fn(&C) -> T + Send + Sync>),
}

impl<C, T: Clone> Dynamic<C, T> {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&C) -> T + Send + Sync + 'static,
    {
        Dynamic::Computed(Arc::new(f))
    }

    pub fn resolve(&self, ctx: &C) -> T {
        match self {
            Dynamic::Static(value) => value.clone(),
            Dynamic::Computed(f) => f(ctx),
        }
    }
}

impl<C, T: Clone> Clone for Dynamic<C, T> {
    fn clone(&self) -> Self {
        match self {
            Dynamic::Static(value) => Dynamic::Static(value.clone()),
            Dynamic::Computed(f) => Dynamic::Computed(f.clone()),
        }
    }
}

impl<C, T: fmt::Debug> fmt::Debug for Dynamic<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Dynamic::Computed(_) => f.write_str("Computed"),
        }
    }
}

// ============================================================================
// CONTEXTS
// ============================================================================

/// Row an action is rendered for.
#[derive(Debug, Clone)]
pub struct RowContext {
    pub row: Arc<Value>,
    pub row_id: String,
    /// Position in the source row list
    pub index: usize,
}

/// Table snapshot header actions are rendered against.
#[derive(Debug, Clone, Default)]
pub struct TableContext {
    pub title: Option<String>,
    pub is_fullscreen: bool,
    pub has_active_filters_or_sort: bool,
    /// Rows passing the current filters, all pages
    pub row_count: usize,
    pub selected_count: usize,
}

// ============================================================================
// SHARED TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Icon {
    Maximize,
    Minimize,
    Download,
    RotateCcw,
    Columns,
    Pencil,
    Trash,
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ActionVariant {
    #[default]
    Ghost,
    Outline,
    Default,
    Destructive,
}

/// A resolved action, ready to paint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionButton {
    pub kind: String,
    pub title: String,
    pub icon: Icon,
    pub disabled: bool,
    pub variant: ActionVariant,
}

type Predicate<C> = Arc<dyn Fn(&C) -> bool + Send + Sync>;
type Handler<C> = Arc<dyn Fn(&C) + Send + Sync>;

// ============================================================================
// ROW ACTIONS
// ============================================================================

#[derive(Clone)]
pub struct RowAction {
    /// "edit", "delete" or any caller-defined kind
    pub kind: String,
    pub title: Dynamic<RowContext, String>,
    pub icon: Dynamic<RowContext, Icon>,
    pub on_click: Option<Handler<RowContext>>,
    pub disable_fn: Option<Predicate<RowContext>>,
    pub hidden_fn: Option<Predicate<RowContext>>,
    pub variant: ActionVariant,
}

impl RowAction {
    pub fn new(kind: impl Into<String>, title: impl Into<String>, icon: Icon) -> Self {
        RowAction {
            kind: kind.into(),
            title: Dynamic::Static(title.into()),
            icon: Dynamic::Static(icon),
            on_click: None,
            disable_fn: None,
            hidden_fn: None,
            variant: ActionVariant::Ghost,
        }
    }

    pub fn edit(labels: &Labels) -> Self {
        RowAction::new("edit", labels.edit.clone(), Icon::Pencil)
    }

    pub fn delete(labels: &Labels) -> Self {
        RowAction::new("delete", labels.delete.clone(), Icon::Trash).with_variant(ActionVariant::Destructive)
    }

    pub fn with_title(mut self, title: Dynamic<RowContext, String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_icon(mut self, icon: Dynamic<RowContext, Icon>) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_variant(mut self, variant: ActionVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn on_click<F: Fn(&RowContext) + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.on_click = Some(Arc::new(f));
        self
    }

    pub fn disabled_when<F: Fn(&RowContext) -> bool + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.disable_fn = Some(Arc::new(f));
        self
    }

    pub fn hidden_when<F: Fn(&RowContext) -> bool + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.hidden_fn = Some(Arc::new(f));
        self
    }

    pub fn is_hidden(&self, ctx: &RowContext) -> bool {
        self.hidden_fn.as_ref().is_some_and(|f| f(ctx))
    }

    pub fn is_disabled(&self, ctx: &RowContext) -> bool {
        self.disable_fn.as_ref().is_some_and(|f| f(ctx))
    }
}

/// Resolved row actions for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowActionBar {
    pub display: RowActionsDisplay,
    pub actions: Vec<ActionButton>,
}

pub fn render_row_actions(actions: &[RowAction], ctx: &RowContext, display: RowActionsDisplay) -> RowActionBar {
    let actions = actions
        .iter()
        .filter(|action| !action.is_hidden(ctx))
        .map(|action| ActionButton {
            kind: action.kind.clone(),
            title: action.title.resolve(ctx),
            icon: action.icon.resolve(ctx),
            disabled: action.is_disabled(ctx),
            variant: action.variant,
        })
        .collect();
    RowActionBar { display, actions }
}

// ============================================================================
// HEADER ACTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HeaderActionKind {
    Fullscreen,
    Export,
    Reset,
    ColumnVisibility,
    Custom(String),
}

impl HeaderActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            HeaderActionKind::Fullscreen => "fullscreen",
            HeaderActionKind::Export => "export",
            HeaderActionKind::Reset => "reset",
            HeaderActionKind::ColumnVisibility => "columnVisibility",
            HeaderActionKind::Custom(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, HeaderActionKind::Custom(_))
    }

    /// Kind for a name. Built-in names always map to the built-in kind.
    pub fn from_name(name: &str) -> Self {
        match name {
            "fullscreen" => HeaderActionKind::Fullscreen,
            "export" => HeaderActionKind::Export,
            "reset" => HeaderActionKind::Reset,
            "columnVisibility" => HeaderActionKind::ColumnVisibility,
            other => HeaderActionKind::Custom(other.to_string()),
        }
    }

    /// `Custom` carrying a built-in name becomes that built-in kind.
    pub fn normalized(self) -> Self {
        match self {
            HeaderActionKind::Custom(name) => HeaderActionKind::from_name(&name),
            builtin => builtin,
        }
    }
}

/// A header action. Unset fields inherit from the built-in action of the
/// same kind when merged.
#[derive(Clone)]
pub struct HeaderAction {
    pub kind: HeaderActionKind,
    pub title: Option<Dynamic<TableContext, String>>,
    pub icon: Option<Dynamic<TableContext, Icon>>,
    pub on_click: Option<Handler<TableContext>>,
    pub disable_fn: Option<Predicate<TableContext>>,
    pub hidden_fn: Option<Predicate<TableContext>>,
    pub variant: Option<ActionVariant>,
}

impl HeaderAction {
    pub fn new(kind: HeaderActionKind) -> Self {
        HeaderAction {
            kind,
            title: None,
            icon: None,
            on_click: None,
            disable_fn: None,
            hidden_fn: None,
            variant: None,
        }
    }

    pub fn custom(name: impl Into<String>, title: impl Into<String>, icon: Icon) -> Self {
        let name: String = name.into();
        HeaderAction::new(HeaderActionKind::from_name(&name))
            .with_title(Dynamic::Static(title.into()))
            .with_icon(Dynamic::Static(icon))
    }

    pub fn with_title(mut self, title: Dynamic<TableContext, String>) -> Self {
        self.title = Some(title);
        self
    }

    pub fn with_icon(mut self, icon: Dynamic<TableContext, Icon>) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_variant(mut self, variant: ActionVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn on_click<F: Fn(&TableContext) + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.on_click = Some(Arc::new(f));
        self
    }

    pub fn disabled_when<F: Fn(&TableContext) -> bool + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.disable_fn = Some(Arc::new(f));
        self
    }

    pub fn hidden_when<F: Fn(&TableContext) -> bool + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.hidden_fn = Some(Arc::new(f));
        self
    }

    /// Shallow merge: fields set on `self` win over `base`.
    fn merged_over(self, base: HeaderAction) -> HeaderAction {
        HeaderAction {
            kind: self.kind,
            title: self.title.or(base.title),
            icon: self.icon.or(base.icon),
            on_click: self.on_click.or(base.on_click),
            disable_fn: self.disable_fn.or(base.disable_fn),
            hidden_fn: self.hidden_fn.or(base.hidden_fn),
            variant: self.variant.or(base.variant),
        }
    }

    pub fn is_hidden(&self, ctx: &TableContext) -> bool {
        self.hidden_fn.as_ref().is_some_and(|f| f(ctx))
    }

    pub fn is_disabled(&self, ctx: &TableContext) -> bool {
        // Reset is derived from table state whatever the caller declared
        if self.kind == HeaderActionKind::Reset && !ctx.has_active_filters_or_sort {
            return true;
        }
        self.disable_fn.as_ref().is_some_and(|f| f(ctx))
    }
}

impl fmt::Debug for HeaderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderAction")
            .field("kind", &self.kind)
            .field("title", &self.title)
            .field("on_click", &self.on_click.is_some())
            .finish_non_exhaustive()
    }
}

/// Built-in header actions: fullscreen, export, reset, column visibility.
pub fn default_header_actions(labels: &Labels) -> Vec<HeaderAction> {
    let fullscreen = labels.fullscreen.clone();
    let exit_fullscreen = labels.exit_fullscreen.clone();

    vec![
        HeaderAction::new(HeaderActionKind::Fullscreen)
            .with_title(Dynamic::computed(move |ctx: &TableContext| {
                if ctx.is_fullscreen {
                    exit_fullscreen.clone()
                } else {
                    fullscreen.clone()
                }
            }))
            .with_icon(Dynamic::computed(|ctx: &TableContext| {
                if ctx.is_fullscreen {
                    Icon::Minimize
                } else {
                    Icon::Maximize
                }
            })),
        HeaderAction::new(HeaderActionKind::Export)
            .with_title(Dynamic::Static(labels.export.clone()))
            .with_icon(Dynamic::Static(Icon::Download))
            .disabled_when(|ctx| ctx.row_count == 0),
        HeaderAction::new(HeaderActionKind::Reset)
            .with_title(Dynamic::Static(labels.reset.clone()))
            .with_icon(Dynamic::Static(Icon::RotateCcw))
            .disabled_when(|ctx| !ctx.has_active_filters_or_sort),
        HeaderAction::new(HeaderActionKind::ColumnVisibility)
            .with_title(Dynamic::Static(labels.columns.clone()))
            .with_icon(Dynamic::Static(Icon::Columns)),
    ]
}

/// Merge caller actions into the defaults. Same kind: shallow merge, caller
/// wins. Other kinds are placed ahead of the defaults in caller order.
pub fn merge_header_actions(defaults: Vec<HeaderAction>, custom: Vec<HeaderAction>) -> Vec<HeaderAction> {
    let mut merged = defaults;
    let mut prepended = Vec::new();

    for mut action in custom {
        action.kind = action.kind.normalized();
        match merged.iter().position(|d| d.kind == action.kind) {
            Some(i) => {
                let base = merged[i].clone();
                merged[i] = action.merged_over(base);
            }
            None => prepended.push(action),
        }
    }

    prepended.extend(merged);
    prepended
}

pub fn render_header_actions(actions: &[HeaderAction], ctx: &TableContext) -> Vec<ActionButton> {
    actions
        .iter()
        .filter(|action| !action.is_hidden(ctx))
        .map(|action| ActionButton {
            kind: action.kind.as_str().to_string(),
            title: action
                .title
                .as_ref()
                .map(|t| t.resolve(ctx))
                .unwrap_or_else(|| action.kind.as_str().to_string()),
            icon: action
                .icon
                .as_ref()
                .map(|i| i.resolve(ctx))
                .unwrap_or_else(|| Icon::Named(action.kind.as_str().to_string())),
            disabled: action.is_disabled(ctx),
            variant: action.variant.unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row_ctx(paid: bool) -> RowContext {
        RowContext { row: Arc::new(json!({ "paid": paid })), row_id: "7".into(), index: 7 }
    }

    #[test]
    fn test_dynamic_is_resolved_per_context() {
        let title: Dynamic<RowContext, String> = Dynamic::computed(|ctx: &RowContext| format!("row {}", ctx.row_id));
        assert_eq!(title.resolve(&row_ctx(true)), "row 7");
        assert_eq!(Dynamic::<RowContext, String>::Static("x".into()).resolve(&row_ctx(true)), "x");
    }

    #[test]
    fn test_row_actions_hidden_and_disabled() {
        let labels = Labels::default();
        let actions = vec![
            RowAction::edit(&labels).disabled_when(|ctx| ctx.row["paid"] == json!(true)),
            RowAction::delete(&labels).hidden_when(|ctx| ctx.row["paid"] == json!(true)),
        ];

        let bar = render_row_actions(&actions, &row_ctx(true), RowActionsDisplay::Menu);
        assert_eq!(bar.display, RowActionsDisplay::Menu);
        assert_eq!(bar.actions.len(), 1);
        assert!(bar.actions[0].disabled);

        let bar = render_row_actions(&actions, &row_ctx(false), RowActionsDisplay::Inline);
        assert_eq!(bar.actions.len(), 2);
        assert!(!bar.actions[0].disabled);
        assert_eq!(bar.actions[1].variant, ActionVariant::Destructive);
    }

    #[test]
    fn test_merge_same_kind_caller_wins() {
        let labels = Labels::default();
        let custom = vec![HeaderAction::new(HeaderActionKind::Export).with_title(Dynamic::Static("CSV".into()))];
        let merged = merge_header_actions(default_header_actions(&labels), custom);

        assert_eq!(merged.len(), 4);
        let buttons = render_header_actions(&merged, &TableContext { row_count: 3, ..Default::default() });
        let export = buttons.iter().find(|b| b.kind == "export").unwrap();
        assert_eq!(export.title, "CSV");
        assert_eq!(export.icon, Icon::Download);
    }

    #[test]
    fn test_unknown_kinds_are_prepended() {
        let labels = Labels::default();
        let custom = vec![
            HeaderAction::custom("add", "הוספה", Icon::Named("plus".into())),
            HeaderAction::custom("import", "ייבוא", Icon::Named("upload".into())),
        ];
        let merged = merge_header_actions(default_header_actions(&labels), custom);
        let kinds: Vec<&str> = merged.iter().map(|a| a.kind.as_str()).collect();
        assert_eq!(kinds, vec!["add", "import", "fullscreen", "export", "reset", "columnVisibility"]);
    }

    #[test]
    fn test_custom_action_with_builtin_name_merges_into_builtin() {
        let labels = Labels::default();
        let custom = vec![
            HeaderAction::new(HeaderActionKind::Custom("export".into())).with_title(Dynamic::Static("CSV".into())),
            HeaderAction::custom("reset", "איפוס הכל", Icon::RotateCcw),
        ];
        let merged = merge_header_actions(default_header_actions(&labels), custom);

        assert_eq!(merged.len(), 4);
        assert!(merged.iter().all(|a| a.kind.is_builtin()));
        let buttons = render_header_actions(&merged, &TableContext { row_count: 1, ..Default::default() });
        let exports: Vec<&ActionButton> = buttons.iter().filter(|b| b.kind == "export").collect();
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].title, "CSV");
        assert_eq!(HeaderActionKind::from_name("add"), HeaderActionKind::Custom("add".into()));
    }

    #[test]
    fn test_reset_disabled_is_derived() {
        let labels = Labels::default();
        let custom = vec![HeaderAction::new(HeaderActionKind::Reset).disabled_when(|_| false)];
        let merged = merge_header_actions(default_header_actions(&labels), custom);

        let idle = render_header_actions(&merged, &TableContext::default());
        assert!(idle.iter().find(|b| b.kind == "reset").unwrap().disabled);

        let active = TableContext { has_active_filters_or_sort: true, ..Default::default() };
        let buttons = render_header_actions(&merged, &active);
        assert!(!buttons.iter().find(|b| b.kind == "reset").unwrap().disabled);
    }

    #[test]
    fn test_fullscreen_title_follows_state() {
        let labels = Labels::default();
        let actions = default_header_actions(&labels);
        let on = TableContext { is_fullscreen: true, ..Default::default() };
        let buttons = render_header_actions(&actions, &on);
        assert_eq!(buttons[0].title, labels.exit_fullscreen);
        assert_eq!(buttons[0].icon, Icon::Minimize);
    }
}
