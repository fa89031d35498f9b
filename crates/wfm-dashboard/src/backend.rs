//! Backend operations consumed by the dashboards

use async_trait::async_trait;
use std::fmt;
use wfm_core::{ActionRequest, ActivityEntry, FilterKey, MetricsSnapshot, Result};

/// Named backend operations on the visit model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    /// Visit status counters
    GetDashboardData,
    /// Visit status plus financial and operational counters
    GetAdminDashboardData,
    /// Most recent activity entries
    GetActivityFeed,
    /// Navigation action for a filter key
    GetVisitsAction,
}

impl RemoteOperation {
    /// Method name on the backend model
    pub const fn method(self) -> &'static str {
        match self {
            Self::GetDashboardData => "get_dashboard_data",
            Self::GetAdminDashboardData => "get_admin_dashboard_data",
            Self::GetActivityFeed => "get_activity_feed",
            Self::GetVisitsAction => "get_visits_action",
        }
    }
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// Remote calls the dashboards depend on
///
/// Implementations perform exactly one request per call; retrying, caching
/// and merging results are left to the caller.
#[async_trait]
pub trait DashboardBackend: Send + Sync {
    /// Visit status counters: green, yellow, orange, red, total, today, unassigned, this_week
    async fn get_dashboard_data(&self) -> Result<MetricsSnapshot>;

    /// Visit status counters plus the admin financial and operational counters
    async fn get_admin_dashboard_data(&self) -> Result<MetricsSnapshot>;

    /// Up to `limit` activity entries, most recent first
    async fn get_activity_feed(&self, limit: u32) -> Result<Vec<ActivityEntry>>;

    /// Navigation action listing the visits behind `filter`
    async fn get_visits_action(&self, filter: FilterKey) -> Result<ActionRequest>;

    /// Backend name for logs
    fn name(&self) -> &str;
}
