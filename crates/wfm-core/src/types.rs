//! Core data types for the WFM dashboards

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Named counters reported by the dashboard backend operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Completed visits
    Green,
    /// Assigned or confirmed visits scheduled from today on
    Yellow,
    /// Visits in progress
    Orange,
    /// Overdue visits
    Red,
    /// All active visits
    Total,
    /// Visits scheduled today
    Today,
    /// Draft visits without a partner
    Unassigned,
    /// Visits in the next seven days
    ThisWeek,
    /// Revenue invoiced this month
    MonthlyRevenue,
    /// Open customer invoices
    OutstandingInvoices,
    /// Amount owed to partners
    PartnerPaymentsDue,
    /// Profit margin in percent
    ProfitMargin,
    /// Clients with an active contract
    ActiveClients,
    /// Partners currently working
    ActivePartners,
    /// Records waiting for SEPE export
    SepePending,
    /// Partner utilization in percent
    PartnerUtilization,
}

impl Metric {
    /// Counters returned by `get_dashboard_data`
    pub const VISIT_STATUS: [Self; 8] = [
        Self::Green,
        Self::Yellow,
        Self::Orange,
        Self::Red,
        Self::Total,
        Self::Today,
        Self::Unassigned,
        Self::ThisWeek,
    ];

    /// Financial counters added by `get_admin_dashboard_data`
    pub const FINANCIAL: [Self; 4] = [
        Self::MonthlyRevenue,
        Self::OutstandingInvoices,
        Self::PartnerPaymentsDue,
        Self::ProfitMargin,
    ];

    /// Operational counters added by `get_admin_dashboard_data`
    pub const OPERATIONAL: [Self; 4] = [
        Self::ActiveClients,
        Self::ActivePartners,
        Self::SepePending,
        Self::PartnerUtilization,
    ];

    /// Wire key of the counter
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Total => "total",
            Self::Today => "today",
            Self::Unassigned => "unassigned",
            Self::ThisWeek => "this_week",
            Self::MonthlyRevenue => "monthly_revenue",
            Self::OutstandingInvoices => "outstanding_invoices",
            Self::PartnerPaymentsDue => "partner_payments_due",
            Self::ProfitMargin => "profit_margin",
            Self::ActiveClients => "active_clients",
            Self::ActivePartners => "active_partners",
            Self::SepePending => "sepe_pending",
            Self::PartnerUtilization => "partner_utilization",
        }
    }

    /// Human-readable label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "Completed",
            Self::Yellow => "Assigned",
            Self::Orange => "In Progress",
            Self::Red => "Action Required",
            Self::Total => "Total Visits",
            Self::Today => "Today's Visits",
            Self::Unassigned => "Unassigned",
            Self::ThisWeek => "This Week",
            Self::MonthlyRevenue => "Monthly Revenue",
            Self::OutstandingInvoices => "Outstanding Invoices",
            Self::PartnerPaymentsDue => "Partner Payments Due",
            Self::ProfitMargin => "Profit Margin",
            Self::ActiveClients => "Active Clients",
            Self::ActivePartners => "Active Partners",
            Self::SepePending => "SEPE Pending",
            Self::PartnerUtilization => "Partner Utilization",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known values of the dashboard counters
///
/// Keys are kept as strings so counters added by the backend survive a fetch
/// even when this crate has no [`Metric`] for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsSnapshot(BTreeMap<String, f64>);

impl MetricsSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a backend JSON object
    ///
    /// Returns `None` if `value` is not an object. Non-numeric values are
    /// skipped, including the `false` and `null` Odoo sends for empty fields.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;

        let mut snapshot = Self::new();
        for (key, value) in object {
            match value.as_f64() {
                Some(number) => {
                    snapshot.0.insert(key.clone(), number);
                }
                None => tracing::debug!(key = %key, %value, "Skipping non-numeric metric"),
            }
        }
        Some(snapshot)
    }

    /// Value for a known metric, zero when absent
    pub fn get(&self, metric: Metric) -> f64 {
        self.value(metric.as_str()).unwrap_or(0.0)
    }

    /// Value for an arbitrary key
    pub fn value(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Set a value
    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    /// Object-merge `update` into `self`: present keys overwrite, absent keys stay
    ///
    /// Returns `true` when any value changed.
    pub fn merge(&mut self, update: &Self) -> bool {
        let mut changed = false;
        for (key, value) in &update.0 {
            let previous = self.0.insert(key.clone(), *value);
            changed |= previous.is_none_or(|p| p.to_bits() != value.to_bits());
        }
        changed
    }

    /// Number of keys present
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no key is present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(Metric, f64)> for MetricsSnapshot {
    fn from_iter<I: IntoIterator<Item = (Metric, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(metric, value)| (metric.as_str().to_string(), value))
                .collect(),
        )
    }
}

/// Visit subsets the backend can build a navigation action for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    /// Completed visits
    Green,
    /// Upcoming assigned visits
    Yellow,
    /// Visits in progress
    Orange,
    /// Overdue visits
    Red,
    /// Visits scheduled today
    Today,
    /// Unassigned draft visits
    Unassigned,
}

impl FilterKey {
    /// Every filter key, in card order
    pub const ALL: [Self; 6] = [
        Self::Green,
        Self::Yellow,
        Self::Orange,
        Self::Red,
        Self::Today,
        Self::Unassigned,
    ];

    /// Wire token sent to `get_visits_action`
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Today => "today",
            Self::Unassigned => "unassigned",
        }
    }

    /// Counter shown next to this filter
    pub const fn metric(self) -> Metric {
        match self {
            Self::Green => Metric::Green,
            Self::Yellow => Metric::Yellow,
            Self::Orange => Metric::Orange,
            Self::Red => Metric::Red,
            Self::Today => Metric::Today,
            Self::Unassigned => Metric::Unassigned,
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                crate::Error::configuration(format!(
                    "unknown filter {s:?}, expected one of green, yellow, orange, red, today, unassigned"
                ))
            })
    }
}

/// One of the four color-coded status cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCard {
    /// Filter opened when the card is clicked
    pub filter: FilterKey,
    /// Card title
    pub label: &'static str,
}

impl StatusCard {
    /// The cards shown on every dashboard, in display order
    pub const CARDS: [Self; 4] = [
        Self {
            filter: FilterKey::Green,
            label: "Completed",
        },
        Self {
            filter: FilterKey::Yellow,
            label: "Assigned",
        },
        Self {
            filter: FilterKey::Orange,
            label: "In Progress",
        },
        Self {
            filter: FilterKey::Red,
            label: "Action Required",
        },
    ];

    /// Counter displayed on the card
    pub const fn metric(&self) -> Metric {
        self.filter.metric()
    }

    /// Color name of the card
    pub const fn color(&self) -> &'static str {
        self.filter.as_str()
    }
}

/// Field names probed, in order, for an activity timestamp
const TIMESTAMP_FIELDS: [&str; 4] = ["timestamp", "date", "create_date", "write_date"];

/// One entry of the activity feed
///
/// The backend decides the fields; only the timestamp is interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityEntry(serde_json::Map<String, serde_json::Value>);

impl ActivityEntry {
    /// Wrap raw fields
    pub const fn new(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(fields)
    }

    /// Raw field lookup
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.0.get(field)
    }

    /// String field lookup; Odoo's `false` reads as absent
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(serde_json::Value::as_str)
    }

    /// Record id, if the backend sent one
    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(serde_json::Value::as_i64)
    }

    /// Timestamp string of the entry
    pub fn timestamp(&self) -> Option<&str> {
        TIMESTAMP_FIELDS
            .iter()
            .find_map(|field| self.get_str(field))
    }

    /// All fields
    pub const fn fields(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.0
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for ActivityEntry {
    fn from(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(fields)
    }
}
