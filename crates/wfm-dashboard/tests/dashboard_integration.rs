//! Dashboard lifecycle end to end

#![allow(clippy::unwrap_used, clippy::float_cmp)]

mod common;

use common::{activity, backend_config, mount_login, mount_method, rpc_result};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wfm_core::config::DashboardConfig;
use wfm_core::{ActionRequest, Config, FilterKey, Metric, StatusCard};
use wfm_dashboard::{
    ActionExecutor, Dashboard, DashboardBackend, DashboardKind, MockBackend, RecordingExecutor,
    Shortcut,
};
use wiremock::MockServer;

fn dashboard(
    kind: DashboardKind,
    backend: &Arc<MockBackend>,
    executor: &Arc<RecordingExecutor>,
) -> Dashboard {
    Dashboard::new(
        kind,
        Arc::clone(backend) as Arc<dyn DashboardBackend>,
        Arc::clone(executor) as Arc<dyn ActionExecutor>,
        &DashboardConfig::default(),
    )
}

#[tokio::test]
async fn test_coordinator_against_json_rpc_backend() {
    let server = MockServer::start().await;
    mount_login(&server, json!(5)).await;
    mount_method(
        &server,
        "get_dashboard_data",
        rpc_result(json!({
            "green": 10, "yellow": 4, "orange": 2, "red": 1,
            "total": 17, "today": 3, "unassigned": 2, "this_week": 8,
        })),
    )
    .await;
    mount_method(
        &server,
        "get_activity_feed",
        rpc_result(json!([
            {"id": 9, "date": "2024-03-01 11:00:00", "message": "Visit VIS-0009 completed"},
            {"id": 8, "date": "2024-03-01 10:00:00", "message": "Visit VIS-0008 started"},
        ])),
    )
    .await;

    let config = Config {
        backend: backend_config(&server),
        ..Config::default()
    };
    let executor = Arc::new(RecordingExecutor::new());
    let dash = wfm_dashboard::connect(
        &config,
        DashboardKind::Coordinator,
        Arc::clone(&executor) as Arc<dyn ActionExecutor>,
    )
    .unwrap();

    dash.start().await.unwrap();

    let state = dash.state();
    assert!(!state.loading);
    assert_eq!(state.metrics.get(Metric::Total), 17.0);
    assert_eq!(state.activities.len(), 2);
    assert_eq!(state.activities[0].id(), Some(9));

    dash.open_shortcut(Shortcut::Calendar).await.unwrap();
    let opened = executor.last().unwrap();
    assert_eq!(
        opened.as_window().unwrap().name.as_deref(),
        Some("Visit Calendar")
    );
    dash.stop();
}

#[tokio::test]
async fn test_unreachable_backend_leaves_dashboard_usable() {
    let config = Config {
        backend: wfm_core::config::BackendConfig {
            url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: Some(1),
            ..wfm_core::config::BackendConfig::default()
        },
        ..Config::default()
    };
    let dash = wfm_dashboard::connect(
        &config,
        DashboardKind::Admin,
        Arc::new(RecordingExecutor::new()),
    )
    .unwrap();

    dash.start().await.unwrap();

    let state = dash.state();
    assert!(!state.loading);
    assert!(!state.activities_loading);
    assert!(state.metrics.is_empty());
    assert!(dash.open_visits(FilterKey::Red).await.unwrap_err().is_remote());
    dash.stop();
}

#[tokio::test]
async fn test_admin_feed_capped_at_fifteen() {
    let entries = (0..40)
        .map(|i| activity(i, "2024-03-01 10:00:00", "Visit updated"))
        .collect();
    let backend = Arc::new(MockBackend::new().with_activity(entries));
    let executor = Arc::new(RecordingExecutor::new());

    let admin = dashboard(DashboardKind::Admin, &backend, &executor);
    admin.start().await.unwrap();
    assert_eq!(admin.state().activities.len(), 15);
    admin.stop();

    let coordinator = dashboard(DashboardKind::Coordinator, &backend, &executor);
    coordinator.start().await.unwrap();
    assert_eq!(coordinator.state().activities.len(), 20);
    coordinator.stop();
}

#[tokio::test]
async fn test_metrics_failure_keeps_previous_values() {
    let backend = Arc::new(MockBackend::new());
    let executor = Arc::new(RecordingExecutor::new());
    let dash = dashboard(DashboardKind::Admin, &backend, &executor);
    dash.start().await.unwrap();
    let before = dash.state().metrics;

    backend.set_admin_data(Err("database locked".to_string()));
    dash.refresh().await.unwrap();

    let state = dash.state();
    assert!(!state.loading);
    assert_eq!(state.metrics, before);
    dash.stop();
}

#[tokio::test]
async fn test_partial_metrics_update_keeps_absent_keys() {
    let backend = Arc::new(MockBackend::new());
    let executor = Arc::new(RecordingExecutor::new());
    let dash = dashboard(DashboardKind::Admin, &backend, &executor);
    dash.start().await.unwrap();

    backend.set_admin_data(Ok([
        (Metric::Red, 0.0),
        (Metric::MonthlyRevenue, 51_000.0),
    ]
    .into_iter()
    .collect()));
    dash.refresh().await.unwrap();

    let metrics = dash.state().metrics;
    assert_eq!(metrics.get(Metric::Red), 0.0);
    assert_eq!(metrics.get(Metric::MonthlyRevenue), 51_000.0);
    assert_eq!(metrics.get(Metric::Green), 124.0);
    assert_eq!(metrics.get(Metric::SepePending), 3.0);
    dash.stop();
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_refresh_resolving_last_wins() {
    let backend = Arc::new(MockBackend::new());
    let executor = Arc::new(RecordingExecutor::new());
    let dash = Arc::new(dashboard(DashboardKind::Coordinator, &backend, &executor));
    dash.start().await.unwrap();
    backend.hold_activity_calls(true);

    let manual = tokio::spawn({
        let dash = Arc::clone(&dash);
        async move { dash.refresh().await }
    });
    backend.wait_for_held(1).await;

    tokio::time::sleep(Duration::from_secs(31)).await;
    backend.wait_for_held(2).await;

    let manual_feed = vec![activity(1, "2024-03-01 10:00:00", "manual")];
    let scheduled_feed = vec![activity(2, "2024-03-01 10:00:30", "scheduled")];

    backend.resolve_held(0, Ok(manual_feed));
    manual.await.unwrap().unwrap();
    assert_eq!(dash.state().activities[0].get_str("message"), Some("manual"));

    backend.resolve_held(0, Ok(scheduled_feed));
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;

    let state = dash.state();
    assert_eq!(state.activities.len(), 1);
    assert_eq!(state.activities[0].get_str("message"), Some("scheduled"));
    assert!(!state.activities_loading);
    dash.stop();
}

#[tokio::test(start_paused = true)]
async fn test_manual_refresh_resolving_last_wins() {
    let backend = Arc::new(MockBackend::new());
    let executor = Arc::new(RecordingExecutor::new());
    let dash = Arc::new(dashboard(DashboardKind::Coordinator, &backend, &executor));
    dash.start().await.unwrap();
    backend.hold_activity_calls(true);

    let manual = tokio::spawn({
        let dash = Arc::clone(&dash);
        async move { dash.refresh().await }
    });
    backend.wait_for_held(1).await;
    tokio::time::sleep(Duration::from_secs(31)).await;
    backend.wait_for_held(2).await;

    // the scheduled fetch resolves first, the earlier manual one last
    backend.resolve_held(1, Ok(vec![activity(2, "2024-03-01 10:00:30", "scheduled")]));
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert_eq!(
        dash.state().activities[0].get_str("message"),
        Some("scheduled")
    );

    backend.resolve_held(0, Ok(vec![activity(1, "2024-03-01 10:00:00", "manual")]));
    manual.await.unwrap().unwrap();

    assert_eq!(
        dash.state().activities[0].get_str("message"),
        Some("manual")
    );
    dash.stop();
}

#[tokio::test(start_paused = true)]
async fn test_no_fetch_after_stop() {
    let backend = Arc::new(MockBackend::new());
    let executor = Arc::new(RecordingExecutor::new());
    let dash = dashboard(DashboardKind::Coordinator, &backend, &executor);
    dash.start().await.unwrap();

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(backend.activity_calls(), 2);

    dash.stop();
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(backend.activity_calls(), 2);
}

#[tokio::test]
async fn test_subscribers_see_loading_transitions() {
    let backend = Arc::new(MockBackend::new().with_delay(Duration::from_millis(20)));
    let executor = Arc::new(RecordingExecutor::new());
    let dash = dashboard(DashboardKind::Basic, &backend, &executor);
    let mut rx = dash.subscribe();
    assert!(rx.borrow().loading);

    dash.start().await.unwrap();

    rx.changed().await.unwrap();
    let state = rx.borrow_and_update().clone();
    assert!(!state.loading);
    assert_eq!(state.metrics.get(Metric::Yellow), 37.0);
    dash.stop();
}

#[tokio::test]
async fn test_navigation_hands_actions_to_executor() {
    let backend = Arc::new(MockBackend::new());
    let executor = Arc::new(RecordingExecutor::new());
    let dash = dashboard(DashboardKind::Admin, &backend, &executor);

    dash.open_card(StatusCard::CARDS[0]).await.unwrap();
    dash.open_shortcut(Shortcut::SepeExport).await.unwrap();
    dash.open_visit(42).await.unwrap();

    let actions = executor.actions();
    assert_eq!(actions.len(), 3);
    assert_eq!(
        actions[0].as_window().unwrap().name.as_deref(),
        Some("Completed Visits")
    );
    assert_eq!(
        actions[1],
        ActionRequest::reference("wfm_core.action_sepe_export_wizard")
    );
    assert_eq!(actions[2].as_window().unwrap().res_id, Some(42));

    assert!(dash.open_shortcut(Shortcut::Calendar).await.is_err());
    assert_eq!(executor.actions().len(), 3);
}
