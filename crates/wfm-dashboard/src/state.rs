//! Observable dashboard state

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use wfm_core::{ActivityEntry, MetricsSnapshot};

/// Everything a dashboard displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    /// Last known counters
    pub metrics: MetricsSnapshot,
    /// Activity feed, most recent first
    pub activities: Vec<ActivityEntry>,
    /// A metrics fetch has not finished yet
    pub loading: bool,
    /// An activity feed fetch is in flight
    pub activities_loading: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            metrics: MetricsSnapshot::new(),
            activities: Vec::new(),
            loading: true,
            activities_loading: false,
        }
    }
}

/// Shared handle to a dashboard's state
///
/// Cloning yields another handle to the same state. Once the token is
/// cancelled every update is dropped and [`StateStore::guard`] resolves
/// immediately.
#[derive(Debug, Clone)]
pub struct StateStore {
    sender: Arc<watch::Sender<DashboardState>>,
    token: CancellationToken,
}

impl StateStore {
    /// Create a store holding [`DashboardState::default`]
    pub fn new(token: CancellationToken) -> Self {
        Self {
            sender: Arc::new(watch::Sender::new(DashboardState::default())),
            token,
        }
    }

    /// Receiver notified on every change
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.sender.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> DashboardState {
        self.sender.borrow().clone()
    }

    /// Apply `modify` unless the store is closed
    ///
    /// `modify` returns whether it changed anything; subscribers are only
    /// notified when it did. Returns `false` when nothing was applied.
    pub fn update<F>(&self, modify: F) -> bool
    where
        F: FnOnce(&mut DashboardState) -> bool,
    {
        if self.token.is_cancelled() {
            return false;
        }
        self.sender.send_if_modified(modify)
    }

    /// Run `fut` until it completes or the store closes
    pub async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.token.cancelled() => None,
            output = fut => Some(output),
        }
    }

    /// Whether the owning dashboard has stopped
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token closing this store
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }
}
