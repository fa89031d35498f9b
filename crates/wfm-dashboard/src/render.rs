//! Plain-text rendering of a dashboard state

use crate::dashboard::DashboardKind;
use crate::state::DashboardState;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use wfm_core::format::{format_currency, format_percent, format_time_ago};
use wfm_core::{ActivityEntry, Metric, StatusCard};

/// Fields tried, in order, for the text of an activity entry
const MESSAGE_FIELDS: [&str; 5] = ["message", "description", "name", "body", "summary"];

const LABEL_WIDTH: usize = 22;

/// How a metric value is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Count,
    Currency,
    Percent,
}

const fn unit(metric: Metric) -> Unit {
    match metric {
        Metric::MonthlyRevenue | Metric::OutstandingInvoices | Metric::PartnerPaymentsDue => {
            Unit::Currency
        }
        Metric::ProfitMargin | Metric::PartnerUtilization => Unit::Percent,
        _ => Unit::Count,
    }
}

/// Value of `metric` as shown on screen
pub fn format_metric(state: &DashboardState, metric: Metric) -> String {
    let value = state.metrics.value(metric.as_str());
    match unit(metric) {
        Unit::Currency => format_currency(value),
        Unit::Percent => format_percent(value),
        // counters are small integers
        #[allow(clippy::cast_possible_truncation)]
        Unit::Count => format!("{}", value.unwrap_or(0.0).round() as i64),
    }
}

/// Text shown for an activity entry
pub fn activity_text(entry: &ActivityEntry) -> String {
    MESSAGE_FIELDS
        .iter()
        .find_map(|field| entry.get_str(field))
        .map_or_else(
            || match entry.id() {
                Some(id) => format!("Activity #{id}"),
                None => "Activity".to_string(),
            },
            str::to_string,
        )
}

fn title(kind: DashboardKind) -> &'static str {
    match kind {
        DashboardKind::Admin => "Admin Dashboard",
        DashboardKind::Coordinator => "Coordinator Dashboard",
        DashboardKind::Basic => "Field Service Dashboard",
    }
}

fn section(out: &mut String, heading: &str, state: &DashboardState, metrics: &[Metric]) {
    let _ = writeln!(out, "\n{heading}");
    for metric in metrics {
        let _ = writeln!(
            out,
            "  {:<LABEL_WIDTH$}{:>12}",
            metric.label(),
            format_metric(state, *metric)
        );
    }
}

/// Render `state` as the dashboard of `kind` would show it at `now`
pub fn render_dashboard(kind: DashboardKind, state: &DashboardState, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    let _ = write!(out, "{}", title(kind));
    if state.loading {
        out.push_str("  (loading)");
    }
    out.push('\n');

    let _ = writeln!(out, "\nStatus");
    for card in StatusCard::CARDS {
        let _ = writeln!(
            out,
            "  [{:<6}] {:<LABEL_WIDTH$}{:>5}",
            card.color(),
            card.label,
            format_metric(state, card.metric())
        );
    }

    section(
        &mut out,
        "Overview",
        state,
        &[
            Metric::Total,
            Metric::Today,
            Metric::Unassigned,
            Metric::ThisWeek,
        ],
    );

    if kind == DashboardKind::Admin {
        section(&mut out, "Financial", state, &Metric::FINANCIAL);
        section(&mut out, "Operations", state, &Metric::OPERATIONAL);
    }

    if kind.has_activity_feed() {
        let _ = write!(out, "\nRecent Activity");
        if state.activities_loading {
            out.push_str("  (refreshing)");
        }
        out.push('\n');

        if state.activities.is_empty() {
            out.push_str("  No recent activity\n");
        }
        for entry in &state.activities {
            let _ = writeln!(
                out,
                "  {:>10}  {}",
                format_time_ago(entry.timestamp(), now),
                activity_text(entry)
            );
        }
    }

    let shortcuts: Vec<&str> = kind.shortcuts().iter().map(|s| s.as_str()).collect();
    let _ = writeln!(out, "\nShortcuts: {}", shortcuts.join(", "));

    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::{sample_admin_metrics, sample_visit_metrics};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn entry(value: serde_json::Value) -> ActivityEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_admin_render_includes_financials() {
        let state = DashboardState {
            metrics: sample_admin_metrics(),
            loading: false,
            ..DashboardState::default()
        };

        let text = render_dashboard(DashboardKind::Admin, &state, now());

        assert!(text.starts_with("Admin Dashboard\n"));
        assert!(text.contains("Monthly Revenue"));
        assert!(text.contains("48.213\u{a0}€"));
        assert!(text.contains("31.3%"));
        assert!(text.contains("No recent activity"));
        assert!(text.contains("Shortcuts: pipeline, clients, partners"));
    }

    #[test]
    fn test_basic_render_has_no_feed_or_financials() {
        let state = DashboardState {
            metrics: sample_visit_metrics(),
            ..DashboardState::default()
        };

        let text = render_dashboard(DashboardKind::Basic, &state, now());

        assert!(text.contains("(loading)"));
        assert!(text.contains("Action Required"));
        assert!(!text.contains("Financial"));
        assert!(!text.contains("Recent Activity"));
    }

    #[test]
    fn test_feed_lines_use_time_ago() {
        let state = DashboardState {
            activities: vec![
                entry(json!({"id": 1, "date": "2024-03-01 11:55:00", "message": "Visit started"})),
                entry(json!({"id": 2, "create_date": "2024-02-28 12:00:00"})),
            ],
            loading: false,
            ..DashboardState::default()
        };

        let text = render_dashboard(DashboardKind::Coordinator, &state, now());

        assert!(text.contains("5m ago  Visit started"));
        assert!(text.contains("2d ago  Activity #2"));
    }

    #[test]
    fn test_count_metrics_are_integers() {
        let state = DashboardState {
            metrics: [(Metric::Green, 12.0)].into_iter().collect(),
            ..DashboardState::default()
        };
        assert_eq!(format_metric(&state, Metric::Green), "12");
        assert_eq!(format_metric(&state, Metric::Red), "0");
        assert_eq!(format_metric(&state, Metric::MonthlyRevenue), "0\u{a0}€");
    }
}
