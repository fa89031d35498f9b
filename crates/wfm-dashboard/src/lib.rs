//! Dashboard view-models for the WFM field-service backend
//!
//! Three variants share one machinery: a [`StatusBoard`] loading counters, an
//! [`ActivityFeed`] reloaded on a timer (admin and coordinator only) and a
//! [`Navigator`] turning clicks into actions for an injected
//! [`ActionExecutor`]. State is published through a `tokio::sync::watch`
//! channel; see [`Dashboard::subscribe`].

pub mod activity_feed;
pub mod backend;
pub mod dashboard;
pub mod executor;
pub mod mock;
pub mod navigation;
pub mod render;
pub mod rpc;
pub mod state;
pub mod status_board;

pub use activity_feed::ActivityFeed;
pub use backend::{DashboardBackend, RemoteOperation};
pub use dashboard::{Dashboard, DashboardKind, DashboardStatus};
pub use executor::{ActionExecutor, JsonLinesExecutor, RecordingExecutor};
pub use mock::MockBackend;
pub use navigation::{Navigator, Shortcut};
pub use render::render_dashboard;
pub use rpc::OdooRpcClient;
pub use state::{DashboardState, StateStore};
pub use status_board::StatusBoard;

use std::sync::Arc;
use wfm_core::{Config, Result};

/// Build a dashboard of `kind` talking to the configured backend
///
/// Nothing is fetched until [`Dashboard::start`].
///
/// # Errors
///
/// Returns a configuration error if the HTTP client cannot be built.
pub fn connect(
    config: &Config,
    kind: DashboardKind,
    executor: Arc<dyn ActionExecutor>,
) -> Result<Dashboard> {
    let backend = OdooRpcClient::new(&config.backend)?;
    Ok(Dashboard::new(
        kind,
        Arc::new(backend),
        executor,
        &config.dashboard,
    ))
}
