//! Metrics loader behind the status cards

use crate::backend::{DashboardBackend, RemoteOperation};
use crate::state::StateStore;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Fetches dashboard counters into the state store
#[derive(Clone)]
pub struct StatusBoard {
    backend: Arc<dyn DashboardBackend>,
    store: StateStore,
    operation: RemoteOperation,
}

impl std::fmt::Debug for StatusBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusBoard")
            .field("backend", &self.backend.name())
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}

impl StatusBoard {
    /// Create a loader calling `operation`
    ///
    /// `operation` is either [`RemoteOperation::GetDashboardData`] or
    /// [`RemoteOperation::GetAdminDashboardData`].
    pub fn new(
        backend: Arc<dyn DashboardBackend>,
        store: StateStore,
        operation: RemoteOperation,
    ) -> Self {
        Self {
            backend,
            store,
            operation,
        }
    }

    /// Remote operation this loader calls
    pub const fn operation(&self) -> RemoteOperation {
        self.operation
    }

    /// Fetch counters once
    ///
    /// Success merges the response into the current counters. Failure is
    /// logged and leaves them as they were. Both clear `loading`.
    pub async fn load(&self) {
        let fetch = async {
            match self.operation {
                RemoteOperation::GetAdminDashboardData => {
                    self.backend.get_admin_dashboard_data().await
                }
                _ => self.backend.get_dashboard_data().await,
            }
        };

        let Some(result) = self.store.guard(fetch).await else {
            debug!(operation = %self.operation, "Dashboard stopped, metrics fetch discarded");
            return;
        };

        match result {
            Ok(update) => {
                let keys = update.len();
                self.store.update(|state| {
                    let changed = state.metrics.merge(&update);
                    let was_loading = std::mem::replace(&mut state.loading, false);
                    changed || was_loading
                });
                info!(operation = %self.operation, keys, "Metrics loaded");
            }
            Err(e) => {
                error!(operation = %self.operation, error = %e, "Failed to load dashboard data");
                self.store
                    .update(|state| std::mem::replace(&mut state.loading, false));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use pretty_assertions::assert_eq;
    use tokio_util::sync::CancellationToken;
    use wfm_core::{Metric, MetricsSnapshot};

    fn board(backend: &Arc<MockBackend>, operation: RemoteOperation) -> (StatusBoard, StateStore) {
        let store = StateStore::new(CancellationToken::new());
        let board = StatusBoard::new(
            Arc::clone(backend) as Arc<dyn DashboardBackend>,
            store.clone(),
            operation,
        );
        (board, store)
    }

    #[tokio::test]
    async fn test_success_merges_and_clears_loading() {
        let backend = Arc::new(MockBackend::new().with_dashboard_data(
            [(Metric::Green, 5.0), (Metric::Red, 1.0)].into_iter().collect(),
        ));
        let (board, store) = board(&backend, RemoteOperation::GetDashboardData);
        store.update(|s| {
            s.metrics.set(Metric::Today.as_str(), 9.0);
            s.metrics.set(Metric::Green.as_str(), 2.0);
            true
        });

        board.load().await;

        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.metrics.get(Metric::Green), 5.0);
        assert_eq!(state.metrics.get(Metric::Red), 1.0);
        assert_eq!(state.metrics.get(Metric::Today), 9.0);
    }

    #[tokio::test]
    async fn test_failure_keeps_values_and_clears_loading() {
        let backend = Arc::new(MockBackend::new());
        let (board, store) = board(&backend, RemoteOperation::GetDashboardData);
        store.update(|s| {
            s.metrics.set(Metric::Green.as_str(), 2.0);
            true
        });
        let before = store.snapshot().metrics;
        backend.set_dashboard_data(Err("connection reset".to_string()));

        board.load().await;

        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.metrics, before);
    }

    #[tokio::test]
    async fn test_admin_board_calls_admin_operation() {
        let backend = Arc::new(MockBackend::new().with_admin_data(
            [(Metric::MonthlyRevenue, 1234.6)].into_iter().collect(),
        ));
        let (board, store) = board(&backend, RemoteOperation::GetAdminDashboardData);

        board.load().await;

        assert_eq!(backend.calls(), vec![crate::mock::MockCall::AdminDashboardData]);
        assert_eq!(store.snapshot().metrics.get(Metric::MonthlyRevenue), 1234.6);
    }

    #[tokio::test]
    async fn test_stopped_board_discards_result() {
        let backend = Arc::new(MockBackend::new());
        let (board, store) = board(&backend, RemoteOperation::GetDashboardData);
        store.token().cancel();

        board.load().await;

        let state = store.snapshot();
        assert!(state.loading);
        assert_eq!(state.metrics, MetricsSnapshot::new());
    }
}
