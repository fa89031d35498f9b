//! Navigation-action descriptors handed to the host action executor

use serde::{Deserialize, Serialize};
use std::fmt;

/// Odoo action type for window actions
pub const ACT_WINDOW: &str = "ir.actions.act_window";

/// Model holding field visits
pub const VISIT_MODEL: &str = "wfm.visit";

/// Model holding clients and partners
pub const PARTNER_MODEL: &str = "res.partner";

/// Kind of view an action can open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Kanban board
    Kanban,
    /// List view
    List,
    /// Legacy name of the list view
    Tree,
    /// Single-record form
    Form,
    /// Calendar
    Calendar,
    /// Pivot table
    Pivot,
    /// Graph
    Graph,
    /// Activity view
    Activity,
    /// Gantt chart
    Gantt,
    /// Map
    Map,
    /// Search panel
    Search,
}

impl ViewKind {
    /// Wire name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kanban => "kanban",
            Self::List => "list",
            Self::Tree => "tree",
            Self::Form => "form",
            Self::Calendar => "calendar",
            Self::Pivot => "pivot",
            Self::Graph => "graph",
            Self::Activity => "activity",
            Self::Gantt => "gantt",
            Self::Map => "map",
            Self::Search => "search",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// View record reference; Odoo writes `false` for "the default view"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewId {
    /// A specific `ir.ui.view` record
    Id(i64),
    /// Always `false` on the wire
    Default(bool),
}

/// One `[view_id, view_kind]` pair of an action's `views`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRef(pub ViewId, pub ViewKind);

impl ViewRef {
    /// Default view of the given kind
    pub const fn default_of(kind: ViewKind) -> Self {
        Self(ViewId::Default(false), kind)
    }

    /// View kind
    pub const fn kind(&self) -> ViewKind {
        self.1
    }
}

/// Window action (`ir.actions.act_window`) descriptor
///
/// Fields this crate does not know are kept in `extra` and serialized back
/// unchanged, so descriptors resolved by the backend pass through intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowAction {
    /// Breadcrumb title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Action type
    #[serde(rename = "type", default = "default_action_type")]
    pub action_type: String,

    /// Target model
    pub res_model: String,

    /// Comma-separated view kinds
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub view_mode: String,

    /// Views in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<ViewRef>,

    /// Record to open in form view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub res_id: Option<i64>,

    /// Record filter in Odoo domain notation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Vec<serde_json::Value>>,

    /// Default context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Map<String, serde_json::Value>>,

    /// Where to open (`current`, `new`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Unrecognised fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_action_type() -> String {
    ACT_WINDOW.to_string()
}

impl WindowAction {
    /// Start a descriptor for `res_model` showing `views` in order
    pub fn new(res_model: impl Into<String>, views: &[ViewKind]) -> Self {
        Self {
            name: None,
            action_type: default_action_type(),
            res_model: res_model.into(),
            view_mode: views
                .iter()
                .map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(","),
            views: views.iter().copied().map(ViewRef::default_of).collect(),
            res_id: None,
            domain: None,
            context: None,
            target: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the title
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Open a single record
    #[must_use]
    pub const fn with_res_id(mut self, id: i64) -> Self {
        self.res_id = Some(id);
        self
    }

    /// Add a `[field, operator, value]` leaf to the domain
    #[must_use]
    pub fn with_domain_leaf(
        mut self,
        field: &str,
        operator: &str,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.domain
            .get_or_insert_with(Vec::new)
            .push(serde_json::json!([field, operator, value.into()]));
        self
    }

    /// Add a default-context entry
    #[must_use]
    pub fn with_context(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.context
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Set the open target
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Drop the explicit view list, leaving only `view_mode`
    #[must_use]
    pub fn without_views(mut self) -> Self {
        self.views.clear();
        self
    }

    /// View kinds listed in `views`
    pub fn view_kinds(&self) -> Vec<ViewKind> {
        self.views.iter().map(ViewRef::kind).collect()
    }
}

/// Anything the host action executor accepts
///
/// Descriptors that fit neither a reference nor a [`WindowAction`] (client
/// actions, string domains, custom view kinds) are kept as [`ActionRequest::Raw`]
/// and handed on unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionRequest {
    /// A server-side action identified by its external id
    Reference(String),
    /// A fully described window action
    Window(WindowAction),
    /// Any other descriptor, passed through verbatim
    Raw(serde_json::Value),
}

impl ActionRequest {
    /// Server-side action by external id, e.g. `wfm_core.action_sepe_export_wizard`
    pub fn reference(xml_id: impl Into<String>) -> Self {
        Self::Reference(xml_id.into())
    }

    /// Window action, if this is one
    pub const fn as_window(&self) -> Option<&WindowAction> {
        match self {
            Self::Window(action) => Some(action),
            Self::Reference(_) | Self::Raw(_) => None,
        }
    }

    /// Short description for logs
    pub fn summary(&self) -> String {
        match self {
            Self::Reference(xml_id) => xml_id.clone(),
            Self::Window(action) => action
                .name
                .clone()
                .unwrap_or_else(|| format!("{} ({})", action.res_model, action.view_mode)),
            Self::Raw(value) => ["name", "tag", "type"]
                .iter()
                .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
                .unwrap_or("action")
                .to_string(),
        }
    }
}

impl From<WindowAction> for ActionRequest {
    fn from(action: WindowAction) -> Self {
        Self::Window(action)
    }
}
