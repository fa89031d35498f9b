//! Dashboard variants and the view-model tying loaders, state and navigation together

use crate::activity_feed::ActivityFeed;
use crate::backend::{DashboardBackend, RemoteOperation};
use crate::executor::ActionExecutor;
use crate::navigation::{Navigator, Shortcut};
use crate::state::{DashboardState, StateStore};
use crate::status_board::StatusBoard;
use futures::future::OptionFuture;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use wfm_core::config::DashboardConfig;
use wfm_core::{Error, FilterKey, Result, StatusCard};

/// Dashboard variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum DashboardKind {
    /// Management view with financial and operational metrics
    Admin,
    /// Coordinator view with calendar and activity feed
    Coordinator,
    /// Status cards and shortcuts only
    Basic,
}

impl DashboardKind {
    /// Every variant
    pub const ALL: [Self; 3] = [Self::Admin, Self::Coordinator, Self::Basic];

    /// Lowercase name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Coordinator => "coordinator",
            Self::Basic => "basic",
        }
    }

    /// Operation fetching this variant's counters
    pub const fn metrics_operation(self) -> RemoteOperation {
        match self {
            Self::Admin => RemoteOperation::GetAdminDashboardData,
            Self::Coordinator | Self::Basic => RemoteOperation::GetDashboardData,
        }
    }

    /// Activity entries requested per fetch, `None` without a feed
    pub const fn activity_limit(self, config: &DashboardConfig) -> Option<u32> {
        match self {
            Self::Admin => Some(config.admin_activity_limit),
            Self::Coordinator => Some(config.coordinator_activity_limit),
            Self::Basic => None,
        }
    }

    /// Whether this variant shows an activity feed
    pub const fn has_activity_feed(self) -> bool {
        !matches!(self, Self::Basic)
    }

    /// Title of the pipeline shortcut
    pub const fn pipeline_name(self) -> &'static str {
        match self {
            Self::Admin => "Visit Pipeline",
            Self::Coordinator | Self::Basic => "Coordinator Pipeline",
        }
    }

    /// Shortcuts offered by this variant
    pub const fn shortcuts(self) -> &'static [Shortcut] {
        match self {
            Self::Admin => &[
                Shortcut::Pipeline,
                Shortcut::Clients,
                Shortcut::Partners,
                Shortcut::SepeExport,
                Shortcut::BillingOverview,
                Shortcut::PartnerPerformance,
            ],
            Self::Coordinator | Self::Basic => &[Shortcut::Pipeline, Shortcut::Calendar],
        }
    }

    /// Whether single visits can be opened from the feed
    pub const fn opens_visits(self) -> bool {
        matches!(self, Self::Admin | Self::Coordinator)
    }
}

impl fmt::Display for DashboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::configuration(format!(
                    "unknown dashboard {s:?}, expected admin, coordinator or basic"
                ))
            })
    }
}

/// Lifecycle of a [`Dashboard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardStatus {
    /// Created, not started
    Idle,
    /// Started; the feed timer is running
    Running,
    /// Stopped; no further state changes
    Stopped,
}

impl fmt::Display for DashboardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopped => "stopped",
        })
    }
}

/// View-model of one dashboard
pub struct Dashboard {
    kind: DashboardKind,
    store: StateStore,
    token: CancellationToken,
    status_board: StatusBoard,
    feed: Option<ActivityFeed>,
    navigator: Navigator,
    refresh_interval: Duration,
    status: RwLock<DashboardStatus>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("kind", &self.kind)
            .field("status", &*self.status.read())
            .field("feed", &self.feed)
            .field("refresh_interval", &self.refresh_interval)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Create an idle dashboard of `kind`
    pub fn new(
        kind: DashboardKind,
        backend: Arc<dyn DashboardBackend>,
        executor: Arc<dyn ActionExecutor>,
        config: &DashboardConfig,
    ) -> Self {
        let token = CancellationToken::new();
        let store = StateStore::new(token.clone());

        let status_board = StatusBoard::new(
            Arc::clone(&backend),
            store.clone(),
            kind.metrics_operation(),
        );
        let feed = kind
            .activity_limit(config)
            .map(|limit| ActivityFeed::new(Arc::clone(&backend), store.clone(), limit));
        let navigator = Navigator::new(kind, backend, executor);

        Self {
            kind,
            store,
            token,
            status_board,
            feed,
            navigator,
            refresh_interval: config.activity_refresh_interval(),
            status: RwLock::new(DashboardStatus::Idle),
            poller: Mutex::new(None),
        }
    }

    /// Variant of this dashboard
    pub const fn kind(&self) -> DashboardKind {
        self.kind
    }

    /// Current lifecycle status
    pub fn status(&self) -> DashboardStatus {
        *self.status.read()
    }

    /// Whether this variant shows an activity feed
    pub const fn has_activity_feed(&self) -> bool {
        self.kind.has_activity_feed()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.store.subscribe()
    }

    /// Copy of the current state
    pub fn state(&self) -> DashboardState {
        self.store.snapshot()
    }

    /// Start the feed timer, then load counters and feed
    ///
    /// Returns once both initial fetches have settled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLifecycle`] unless the dashboard is idle.
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub async fn start(&self) -> Result<()> {
        {
            let mut status = self.status.write();
            if *status != DashboardStatus::Idle {
                return Err(Error::invalid_lifecycle(format!(
                    "cannot start a {status} {} dashboard",
                    self.kind
                )));
            }
            *status = DashboardStatus::Running;
        }

        if let Some(feed) = &self.feed {
            *self.poller.lock() = Some(feed.spawn_poller(self.refresh_interval));
        }
        info!(
            feed = self.feed.is_some(),
            interval_secs = self.refresh_interval.as_secs(),
            "Dashboard started"
        );

        self.load_all().await;
        Ok(())
    }

    /// Reload counters and feed now
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLifecycle`] once the dashboard is stopped.
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub async fn refresh(&self) -> Result<()> {
        if self.status() == DashboardStatus::Stopped {
            return Err(Error::invalid_lifecycle(format!(
                "cannot refresh a stopped {} dashboard",
                self.kind
            )));
        }

        self.store
            .update(|state| !std::mem::replace(&mut state.loading, true));
        self.load_all().await;
        Ok(())
    }

    /// Cancel the feed timer and discard everything still in flight
    ///
    /// Calling it again does nothing.
    pub fn stop(&self) {
        let previous = std::mem::replace(&mut *self.status.write(), DashboardStatus::Stopped);
        if previous == DashboardStatus::Stopped {
            return;
        }

        self.token.cancel();
        // the poller exits on cancellation; its handle is not awaited
        drop(self.poller.lock().take());
        info!(kind = %self.kind, %previous, "Dashboard stopped");
    }

    /// Open the visit list behind `filter`
    ///
    /// # Errors
    ///
    /// Returns the backend or executor error unchanged.
    pub async fn open_visits(&self, filter: FilterKey) -> Result<()> {
        self.navigator.open_visits(filter).await
    }

    /// Open the visit list behind a status card
    ///
    /// # Errors
    ///
    /// Returns the backend or executor error unchanged.
    pub async fn open_card(&self, card: StatusCard) -> Result<()> {
        self.navigator.open_visits(card.filter).await
    }

    /// Open a navigation shortcut
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedShortcut`] or the executor error.
    pub async fn open_shortcut(&self, shortcut: Shortcut) -> Result<()> {
        self.navigator.open_shortcut(shortcut).await
    }

    /// Open the form of one visit
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedShortcut`] or the executor error.
    pub async fn open_visit(&self, visit_id: i64) -> Result<()> {
        self.navigator.open_visit(visit_id).await
    }

    async fn load_all(&self) {
        let feed = OptionFuture::from(self.feed.as_ref().map(ActivityFeed::load));
        futures::join!(self.status_board.load(), feed);
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        if self.status() == DashboardStatus::Running {
            warn!(kind = %self.kind, "Dashboard dropped while still running");
            self.stop();
        }
    }
}
