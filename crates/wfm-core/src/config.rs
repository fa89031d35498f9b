//! Configuration management for the WFM dashboards

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Dashboard behaviour
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend (Odoo JSON-RPC) connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend, without the `/jsonrpc` suffix
    #[serde(default = "default_url")]
    pub url: String,

    /// Database name
    #[serde(default = "default_database")]
    pub database: String,

    /// Login used for authentication
    #[serde(default = "default_login")]
    pub login: String,

    /// Password or API key
    #[serde(default = "default_password")]
    pub password: String,

    /// HTTP request timeout in seconds; `None` waits indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

/// Dashboard polling and sizing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Seconds between scheduled activity feed refreshes
    #[serde(default = "default_activity_refresh_interval")]
    pub activity_refresh_interval_secs: u64,

    /// Activity entries requested by the admin dashboard
    #[serde(default = "default_admin_activity_limit")]
    pub admin_activity_limit: u32,

    /// Activity entries requested by the coordinator dashboard
    #[serde(default = "default_coordinator_activity_limit")]
    pub coordinator_activity_limit: u32,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_url() -> String {
    "http://localhost:8069".to_string()
}

fn default_database() -> String {
    "odoo".to_string()
}

fn default_login() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "admin".to_string()
}

const fn default_activity_refresh_interval() -> u64 {
    30
}

const fn default_admin_activity_limit() -> u32 {
    15
}

const fn default_coordinator_activity_limit() -> u32 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            database: default_database(),
            login: default_login(),
            password: default_password(),
            request_timeout_secs: None,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            activity_refresh_interval_secs: default_activity_refresh_interval(),
            admin_activity_limit: default_admin_activity_limit(),
            coordinator_activity_limit: default_coordinator_activity_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl BackendConfig {
    /// Request timeout as a duration, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl DashboardConfig {
    /// Interval between scheduled activity feed refreshes
    pub const fn activity_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.activity_refresh_interval_secs)
    }
}

impl Config {
    /// Load configuration from `wfm.toml` (if present) and `WFM_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration from an explicit file and an explicit environment map
    ///
    /// `path` replaces the default optional `wfm.toml`. When `env` is `None` the
    /// process environment is used. Environment keys use the `WFM_` prefix and a
    /// double underscore between nested keys, e.g. `WFM_BACKEND__URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed, or if validation fails.
    pub fn load_from(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> crate::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("wfm").required(false),
        };

        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("WFM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| crate::Error::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot constrain
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first invalid field.
    pub fn validate(&self) -> crate::Result<()> {
        let url = self.backend.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(crate::Error::configuration(format!(
                "backend.url must be an http(s) URL, got {url:?}"
            )));
        }
        if self.backend.database.trim().is_empty() {
            return Err(crate::Error::configuration("backend.database is empty"));
        }
        if self.dashboard.activity_refresh_interval_secs == 0 {
            return Err(crate::Error::configuration(
                "dashboard.activity_refresh_interval_secs must be positive",
            ));
        }
        if self.dashboard.admin_activity_limit == 0 || self.dashboard.coordinator_activity_limit == 0
        {
            return Err(crate::Error::configuration(
                "dashboard activity limits must be positive",
            ));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(crate::Error::configuration(format!(
                "logging.format must be json or pretty, got {:?}",
                self.logging.format
            )));
        }
        Ok(())
    }
}
