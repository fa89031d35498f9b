//! Activity feed loader and its refresh timer

use crate::backend::DashboardBackend;
use crate::state::StateStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

/// Fetches the most recent activity entries into the state store
#[derive(Clone)]
pub struct ActivityFeed {
    backend: Arc<dyn DashboardBackend>,
    store: StateStore,
    limit: u32,
}

impl std::fmt::Debug for ActivityFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityFeed")
            .field("backend", &self.backend.name())
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl ActivityFeed {
    /// Create a loader requesting `limit` entries per fetch
    pub fn new(backend: Arc<dyn DashboardBackend>, store: StateStore, limit: u32) -> Self {
        Self {
            backend,
            store,
            limit,
        }
    }

    /// Entries requested per fetch
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Fetch the feed once
    ///
    /// Success replaces the whole feed; failure logs and keeps the previous
    /// one. Fetches are not serialised, so the last one to resolve wins.
    pub async fn load(&self) {
        self.store
            .update(|state| !std::mem::replace(&mut state.activities_loading, true));

        let fetch = self.backend.get_activity_feed(self.limit);
        let Some(result) = self.store.guard(fetch).await else {
            debug!(limit = self.limit, "Dashboard stopped, activity fetch discarded");
            return;
        };

        match result {
            Ok(mut entries) => {
                let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
                if entries.len() > limit {
                    warn!(
                        received = entries.len(),
                        limit, "Backend returned more activity entries than requested"
                    );
                    entries.truncate(limit);
                }
                let count = entries.len();
                self.store.update(|state| {
                    state.activities = entries;
                    state.activities_loading = false;
                    true
                });
                info!(count, "Activity feed loaded");
            }
            Err(e) => {
                error!(limit = self.limit, error = %e, "Failed to load activity feed");
                self.store
                    .update(|state| std::mem::replace(&mut state.activities_loading, false));
            }
        }
    }

    /// Spawn the task reloading the feed every `period`
    ///
    /// The first reload happens one period from now. Each tick runs its fetch
    /// in a separate task, so a slow backend never delays the next tick. The
    /// task ends when the store's token is cancelled.
    pub fn spawn_poller(&self, period: Duration) -> JoinHandle<()> {
        let feed = self.clone();
        let token = self.store.token().clone();

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!(period_secs = period.as_secs(), "Activity poller started");

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let feed = feed.clone();
                        tokio::spawn(async move { feed.load().await });
                    }
                }
            }

            debug!("Activity poller stopped");
        })
    }
}
