//! WFM dashboard command line client
//!
//! Renders the admin, coordinator and basic dashboards in the terminal and
//! prints the navigation actions they would open.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use wfm_core::{Config, FilterKey, Result};
use wfm_dashboard::navigation::{self, Shortcut};
use wfm_dashboard::{Dashboard, DashboardKind, JsonLinesExecutor, render_dashboard};

/// Command line interface for the WFM dashboards
#[derive(Parser)]
#[command(
    name = "wfm-dashboard",
    version = env!("CARGO_PKG_VERSION"),
    about = "Terminal client for the WFM field-service dashboards"
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error), overrides the configuration
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Output of the `snapshot` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Rendered dashboard text
    Text,
    /// Dashboard state as JSON
    Json,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Show a dashboard and keep it up to date until Ctrl+C
    Watch {
        /// Dashboard variant
        #[arg(short, long, value_enum, default_value_t = DashboardKind::Coordinator)]
        kind: DashboardKind,
    },

    /// Load a dashboard once and print it
    Snapshot {
        /// Dashboard variant
        #[arg(short, long, value_enum, default_value_t = DashboardKind::Coordinator)]
        kind: DashboardKind,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the action listing the visits behind a filter
    Open {
        /// green, yellow, orange, red, today or unassigned
        #[arg(value_name = "FILTER")]
        filter: FilterKey,
    },

    /// Print the action of a navigation shortcut
    Shortcut {
        /// Shortcut name, e.g. pipeline or sepe_export
        #[arg(value_name = "NAME")]
        name: Shortcut,

        /// Dashboard variant
        #[arg(short, long, value_enum, default_value_t = DashboardKind::Coordinator)]
        kind: DashboardKind,
    },

    /// Inspect the configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();

    let mut config = Config::load_from(cli.config.as_deref(), None)?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }
    wfm_core::init_logging(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = %config.backend.url,
        database = %config.backend.database,
        "WFM dashboard starting"
    );

    match cli.command {
        Commands::Watch { kind } => watch(&config, kind).await,
        Commands::Snapshot { kind, format } => snapshot(&config, kind, format).await,
        Commands::Open { filter } => open(&config, filter).await,
        Commands::Shortcut { name, kind } => {
            let action = navigation::shortcut_action(kind, name)?;
            println!("{}", serde_json::to_string_pretty(&action)?);
            Ok(())
        }
        Commands::Config { show } => show_config(&config, show),
    }
}

fn build(config: &Config, kind: DashboardKind) -> Result<Dashboard> {
    wfm_dashboard::connect(config, kind, Arc::new(JsonLinesExecutor::stdout()))
}

/// Re-render on every state change until Ctrl+C
async fn watch(config: &Config, kind: DashboardKind) -> Result<()> {
    let dashboard = build(config, kind)?;
    let mut changes = dashboard.subscribe();

    let renderer = tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let state = changes.borrow_and_update().clone();
            println!("{}", render_dashboard(kind, &state, chrono::Utc::now()));
        }
    });

    dashboard.start().await?;
    info!(%kind, "Dashboard is running. Press Ctrl+C to stop.");

    signal::ctrl_c().await?;
    info!("Received Ctrl+C, shutting down");

    dashboard.stop();
    renderer.abort();
    Ok(())
}

async fn snapshot(config: &Config, kind: DashboardKind, format: OutputFormat) -> Result<()> {
    let dashboard = build(config, kind)?;
    dashboard.start().await?;
    dashboard.stop();

    let state = dashboard.state();
    match format {
        OutputFormat::Text => print!("{}", render_dashboard(kind, &state, chrono::Utc::now())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state)?),
    }
    Ok(())
}

async fn open(config: &Config, filter: FilterKey) -> Result<()> {
    let dashboard = build(config, DashboardKind::Coordinator)?;
    dashboard.open_visits(filter).await
}

fn show_config(config: &Config, show: bool) -> Result<()> {
    if show {
        let mut shown = config.clone();
        shown.backend.password = "********".to_string();
        let rendered = toml::to_string_pretty(&shown)
            .map_err(|e| wfm_core::Error::configuration(e.to_string()))?;
        println!("{rendered}");
    } else {
        println!("Configuration is valid");
    }
    Ok(())
}
