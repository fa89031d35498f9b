//! Core types and utilities for the WFM dashboards

pub mod action;
pub mod config;
pub mod error;
pub mod format;
pub mod types;

// Re-export commonly used types
pub use action::{ActionRequest, ViewKind, WindowAction};
pub use config::Config;
pub use error::{Error, Result};
pub use types::{ActivityEntry, FilterKey, Metric, MetricsSnapshot, StatusCard};

/// Initialize the logging system
///
/// `RUST_LOG` overrides the configured level when set. Output goes to stderr
/// so rendered dashboards on stdout stay clean.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(logging: &config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| Error::configuration(format!("logging already initialized: {e}")))
}
