//! In-memory backend for tests and offline demos

use crate::backend::{DashboardBackend, RemoteOperation};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::{Notify, oneshot};
use tokio::time::{Duration, sleep};
use wfm_core::action::{VISIT_MODEL, ViewKind, WindowAction};
use wfm_core::{ActionRequest, ActivityEntry, Error, FilterKey, Metric, MetricsSnapshot, Result};

/// A call received by [`MockBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCall {
    /// `get_dashboard_data()`
    DashboardData,
    /// `get_admin_dashboard_data()`
    AdminDashboardData,
    /// `get_activity_feed(limit)`
    ActivityFeed {
        /// Requested limit
        limit: u32,
    },
    /// `get_visits_action(filter)`
    VisitsAction(FilterKey),
}

/// An activity feed call parked until the test resolves it
struct HeldFeedCall {
    limit: u32,
    reply: oneshot::Sender<Result<Vec<ActivityEntry>>>,
}

#[derive(Debug, Clone)]
struct MockState {
    dashboard_data: std::result::Result<MetricsSnapshot, String>,
    admin_data: std::result::Result<MetricsSnapshot, String>,
    activity: std::result::Result<Vec<ActivityEntry>, String>,
    visits_action_failure: Option<String>,
    delay: Option<Duration>,
    hold_feed: bool,
}

/// Mock dashboard backend
///
/// Answers from canned data, records every call and can park activity feed
/// calls so tests decide the order in which they resolve.
pub struct MockBackend {
    state: Mutex<MockState>,
    calls: Mutex<Vec<MockCall>>,
    held: Mutex<VecDeque<HeldFeedCall>>,
    held_changed: Notify,
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("state", &*self.state.lock())
            .field("calls", &self.calls.lock().len())
            .field("held", &self.held.lock().len())
            .finish()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a mock serving [`sample_visit_metrics`], [`sample_admin_metrics`]
    /// and [`sample_activity`]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                dashboard_data: Ok(sample_visit_metrics()),
                admin_data: Ok(sample_admin_metrics()),
                activity: Ok(sample_activity(10)),
                visits_action_failure: None,
                delay: None,
                hold_feed: false,
            }),
            calls: Mutex::new(Vec::new()),
            held: Mutex::new(VecDeque::new()),
            held_changed: Notify::new(),
        }
    }

    /// Serve `metrics` from `get_dashboard_data`
    #[must_use]
    pub fn with_dashboard_data(self, metrics: MetricsSnapshot) -> Self {
        self.set_dashboard_data(Ok(metrics));
        self
    }

    /// Serve `metrics` from `get_admin_dashboard_data`
    #[must_use]
    pub fn with_admin_data(self, metrics: MetricsSnapshot) -> Self {
        self.set_admin_data(Ok(metrics));
        self
    }

    /// Serve `entries` verbatim from `get_activity_feed`, ignoring the limit
    #[must_use]
    pub fn with_activity(self, entries: Vec<ActivityEntry>) -> Self {
        self.set_activity(Ok(entries));
        self
    }

    /// Sleep before answering every call
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().delay = Some(delay);
        self
    }

    /// Replace the `get_dashboard_data` answer; `Err` fails the call
    pub fn set_dashboard_data(&self, data: std::result::Result<MetricsSnapshot, String>) {
        self.state.lock().dashboard_data = data;
    }

    /// Replace the `get_admin_dashboard_data` answer; `Err` fails the call
    pub fn set_admin_data(&self, data: std::result::Result<MetricsSnapshot, String>) {
        self.state.lock().admin_data = data;
    }

    /// Replace the `get_activity_feed` answer; `Err` fails the call
    pub fn set_activity(&self, data: std::result::Result<Vec<ActivityEntry>, String>) {
        self.state.lock().activity = data;
    }

    /// Make `get_visits_action` fail with `message`, or succeed again with `None`
    pub fn set_visits_action_failure(&self, message: Option<String>) {
        self.state.lock().visits_action_failure = message;
    }

    /// Park activity feed calls until [`Self::resolve_held`] answers them
    pub fn hold_activity_calls(&self, hold: bool) {
        self.state.lock().hold_feed = hold;
    }

    /// Number of parked activity feed calls
    pub fn held_count(&self) -> usize {
        self.held.lock().len()
    }

    /// Wait until at least `count` activity feed calls are parked
    pub async fn wait_for_held(&self, count: usize) {
        loop {
            let notified = self.held_changed.notified();
            if self.held_count() >= count {
                return;
            }
            notified.await;
        }
    }

    /// Answer the parked call at `index` (0 is the oldest)
    ///
    /// Returns the limit that call requested, or `None` if there is no such call.
    pub fn resolve_held(&self, index: usize, result: Result<Vec<ActivityEntry>>) -> Option<u32> {
        let call = self.held.lock().remove(index)?;
        // the caller may have gone away; that is what some tests check
        let _ = call.reply.send(result);
        Some(call.limit)
    }

    /// Every call received so far, in arrival order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Number of `get_activity_feed` calls received
    pub fn activity_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, MockCall::ActivityFeed { .. }))
            .count()
    }

    /// Number of metrics calls received, either flavour
    pub fn metrics_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, MockCall::DashboardData | MockCall::AdminDashboardData))
            .count()
    }

    async fn record(&self, call: MockCall) -> MockState {
        self.calls.lock().push(call);
        let state = self.state.lock().clone();
        if let Some(delay) = state.delay {
            sleep(delay).await;
        }
        state
    }
}

fn fail(operation: RemoteOperation, message: String) -> Error {
    Error::remote_call(operation.method(), message)
}

#[async_trait]
impl DashboardBackend for MockBackend {
    async fn get_dashboard_data(&self) -> Result<MetricsSnapshot> {
        let state = self.record(MockCall::DashboardData).await;
        state
            .dashboard_data
            .map_err(|m| fail(RemoteOperation::GetDashboardData, m))
    }

    async fn get_admin_dashboard_data(&self) -> Result<MetricsSnapshot> {
        let state = self.record(MockCall::AdminDashboardData).await;
        state
            .admin_data
            .map_err(|m| fail(RemoteOperation::GetAdminDashboardData, m))
    }

    async fn get_activity_feed(&self, limit: u32) -> Result<Vec<ActivityEntry>> {
        let state = self.record(MockCall::ActivityFeed { limit }).await;

        if state.hold_feed {
            let (reply, answer) = oneshot::channel();
            self.held.lock().push_back(HeldFeedCall { limit, reply });
            self.held_changed.notify_waiters();
            return answer.await.unwrap_or_else(|_| {
                Err(fail(
                    RemoteOperation::GetActivityFeed,
                    "held call dropped".to_string(),
                ))
            });
        }

        state
            .activity
            .map_err(|m| fail(RemoteOperation::GetActivityFeed, m))
    }

    async fn get_visits_action(&self, filter: FilterKey) -> Result<ActionRequest> {
        let state = self.record(MockCall::VisitsAction(filter)).await;
        if let Some(message) = state.visits_action_failure {
            return Err(fail(RemoteOperation::GetVisitsAction, message));
        }
        Ok(visits_action(filter).into())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Descriptor shaped like the one the backend returns for `filter`
pub fn visits_action(filter: FilterKey) -> WindowAction {
    let today = chrono::Utc::now().date_naive().to_string();
    let action = WindowAction::new(VISIT_MODEL, &[ViewKind::Kanban, ViewKind::List, ViewKind::Form])
        .with_domain_leaf("active", "=", true)
        .with_context("search_default_group_by_stage", 1)
        .with_target("current");

    match filter {
        FilterKey::Green => action
            .with_name("Completed Visits")
            .with_domain_leaf("state", "=", "done"),
        FilterKey::Yellow => action
            .with_name("Upcoming Visits")
            .with_domain_leaf("state", "in", serde_json::json!(["assigned", "confirmed"]))
            .with_domain_leaf("visit_date", ">=", today),
        FilterKey::Orange => action
            .with_name("In Progress")
            .with_domain_leaf("state", "=", "in_progress"),
        FilterKey::Red => action
            .with_name("Overdue Visits")
            .with_domain_leaf("state", "not in", serde_json::json!(["done", "cancelled"]))
            .with_domain_leaf("visit_date", "<", today),
        FilterKey::Today => action
            .with_name("Today's Visits")
            .with_domain_leaf("visit_date", "=", today),
        FilterKey::Unassigned => action
            .with_name("Unassigned Visits")
            .with_domain_leaf("state", "=", "draft")
            .with_domain_leaf("partner_id", "=", false),
    }
}

/// Plausible visit status counters
pub fn sample_visit_metrics() -> MetricsSnapshot {
    [
        (Metric::Green, 124.0),
        (Metric::Yellow, 37.0),
        (Metric::Orange, 9.0),
        (Metric::Red, 4.0),
        (Metric::Total, 181.0),
        (Metric::Today, 12.0),
        (Metric::Unassigned, 7.0),
        (Metric::ThisWeek, 58.0),
    ]
    .into_iter()
    .collect()
}

/// Plausible admin counters, a superset of [`sample_visit_metrics`]
pub fn sample_admin_metrics() -> MetricsSnapshot {
    let mut metrics = sample_visit_metrics();
    let extra: MetricsSnapshot = [
        (Metric::MonthlyRevenue, 48_213.49),
        (Metric::OutstandingInvoices, 12_040.0),
        (Metric::PartnerPaymentsDue, 6_380.5),
        (Metric::ProfitMargin, 31.27),
        (Metric::ActiveClients, 86.0),
        (Metric::ActivePartners, 23.0),
        (Metric::SepePending, 3.0),
        (Metric::PartnerUtilization, 74.5),
    ]
    .into_iter()
    .collect();
    metrics.merge(&extra);
    metrics
}

/// `count` activity entries, most recent first, five minutes apart
pub fn sample_activity(count: usize) -> Vec<ActivityEntry> {
    let now = chrono::Utc::now();
    (0..count)
        .map(|i| {
            let minutes = i64::try_from(i).unwrap_or(i64::MAX).saturating_mul(5);
            let at = now - chrono::Duration::minutes(minutes);
            let mut fields = serde_json::Map::new();
            fields.insert("id".into(), serde_json::json!(i + 1));
            fields.insert(
                "date".into(),
                serde_json::json!(at.format("%Y-%m-%d %H:%M:%S").to_string()),
            );
            fields.insert(
                "message".into(),
                serde_json::json!(format!("Visit VIS-{:04} updated", 1000 + i)),
            );
            ActivityEntry::new(fields)
        })
        .collect()
}
