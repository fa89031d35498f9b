//! Navigation shortcuts and the dispatcher handing actions to the executor

use crate::backend::DashboardBackend;
use crate::dashboard::DashboardKind;
use crate::executor::ActionExecutor;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use wfm_core::action::{PARTNER_MODEL, VISIT_MODEL};
use wfm_core::{ActionRequest, Error, FilterKey, Result, ViewKind, WindowAction};

/// Client-side navigation shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    /// Visit kanban grouped by stage
    Pipeline,
    /// Visit calendar
    Calendar,
    /// Client partners
    Clients,
    /// Field partners
    Partners,
    /// SEPE export wizard
    SepeExport,
    /// Billing overview
    BillingOverview,
    /// Partner performance and churn
    PartnerPerformance,
}

impl Shortcut {
    /// Every shortcut
    pub const ALL: [Self; 7] = [
        Self::Pipeline,
        Self::Calendar,
        Self::Clients,
        Self::Partners,
        Self::SepeExport,
        Self::BillingOverview,
        Self::PartnerPerformance,
    ];

    /// Shortcut name as typed on the command line
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pipeline => "pipeline",
            Self::Calendar => "calendar",
            Self::Clients => "clients",
            Self::Partners => "partners",
            Self::SepeExport => "sepe_export",
            Self::BillingOverview => "billing_overview",
            Self::PartnerPerformance => "partner_performance",
        }
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shortcut {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|shortcut| shortcut.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| Error::configuration(format!("unknown shortcut {s:?}")))
    }
}

fn unsupported(shortcut: &str, kind: DashboardKind) -> Error {
    Error::UnsupportedShortcut {
        shortcut: shortcut.to_string(),
        kind: kind.to_string(),
    }
}

/// Visit pipeline grouped by stage
pub fn pipeline_action(name: &str) -> WindowAction {
    WindowAction::new(
        VISIT_MODEL,
        &[
            ViewKind::Kanban,
            ViewKind::List,
            ViewKind::Form,
            ViewKind::Calendar,
        ],
    )
    .with_name(name)
    .with_context("search_default_group_by_stage", 1)
}

/// Visit calendar
pub fn calendar_action() -> WindowAction {
    WindowAction::new(
        VISIT_MODEL,
        &[
            ViewKind::Calendar,
            ViewKind::Kanban,
            ViewKind::List,
            ViewKind::Form,
        ],
    )
    .with_name("Visit Calendar")
}

/// Partners flagged with `flag`
/// Partner list filtered on a boolean flag, opened by `view_mode` alone
fn partner_action(name: &str, flag: &str) -> WindowAction {
    WindowAction::new(PARTNER_MODEL, &[ViewKind::List, ViewKind::Form])
        .without_views()
        .with_name(name)
        .with_domain_leaf(flag, "=", true)
}

/// Form view of one visit
pub fn visit_action(visit_id: i64) -> WindowAction {
    WindowAction::new(VISIT_MODEL, &[ViewKind::Form])
        .with_res_id(visit_id)
        .with_target("current")
}

/// Descriptor a dashboard of `kind` opens for `shortcut`
///
/// # Errors
///
/// Returns [`Error::UnsupportedShortcut`] if `kind` does not offer `shortcut`.
pub fn shortcut_action(kind: DashboardKind, shortcut: Shortcut) -> Result<ActionRequest> {
    if !kind.shortcuts().contains(&shortcut) {
        return Err(unsupported(shortcut.as_str(), kind));
    }

    let action = match shortcut {
        Shortcut::Pipeline => pipeline_action(kind.pipeline_name()).into(),
        Shortcut::Calendar => calendar_action().into(),
        Shortcut::Clients => partner_action("Clients", "is_wfm_client").into(),
        Shortcut::Partners => partner_action("Partners", "is_wfm_partner").into(),
        Shortcut::SepeExport => ActionRequest::reference("wfm_core.action_sepe_export_wizard"),
        Shortcut::BillingOverview => ActionRequest::reference("wfm_core.action_billing_overview"),
        Shortcut::PartnerPerformance => ActionRequest::reference("wfm_fsm.action_churn_dashboard"),
    };
    Ok(action)
}

/// Descriptor a dashboard of `kind` opens for one visit
///
/// # Errors
///
/// Returns [`Error::UnsupportedShortcut`] for the basic dashboard.
pub fn open_visit_action(kind: DashboardKind, visit_id: i64) -> Result<ActionRequest> {
    if !kind.opens_visits() {
        return Err(unsupported("visit", kind));
    }
    Ok(visit_action(visit_id).into())
}

/// Resolves navigation intents and hands them to the executor
///
/// Nothing is handled here: backend and executor failures go back to the caller.
#[derive(Clone)]
pub struct Navigator {
    kind: DashboardKind,
    backend: Arc<dyn DashboardBackend>,
    executor: Arc<dyn ActionExecutor>,
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("kind", &self.kind)
            .field("backend", &self.backend.name())
            .finish_non_exhaustive()
    }
}

impl Navigator {
    /// Create a dispatcher for a dashboard of `kind`
    pub fn new(
        kind: DashboardKind,
        backend: Arc<dyn DashboardBackend>,
        executor: Arc<dyn ActionExecutor>,
    ) -> Self {
        Self {
            kind,
            backend,
            executor,
        }
    }

    /// Ask the backend for the visit list behind `filter` and open it
    ///
    /// # Errors
    ///
    /// Returns the backend error if the descriptor cannot be resolved, or the
    /// executor error if it cannot be opened.
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub async fn open_visits(&self, filter: FilterKey) -> Result<()> {
        let action = self.backend.get_visits_action(filter).await?;
        debug!(action = %action.summary(), "Resolved visits action");
        self.execute(action).await
    }

    /// Open a client-side shortcut
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedShortcut`] or the executor error.
    pub async fn open_shortcut(&self, shortcut: Shortcut) -> Result<()> {
        let action = shortcut_action(self.kind, shortcut)?;
        self.execute(action).await
    }

    /// Open the form of one visit
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedShortcut`] or the executor error.
    pub async fn open_visit(&self, visit_id: i64) -> Result<()> {
        let action = open_visit_action(self.kind, visit_id)?;
        self.execute(action).await
    }

    async fn execute(&self, action: ActionRequest) -> Result<()> {
        info!(kind = %self.kind, action = %action.summary(), "Opening action");
        self.executor.execute_action(action).await
    }
}
