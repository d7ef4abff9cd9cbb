//! Homeboard - display state receiver
//!
//! Holds what the household screen should show and serves it over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use homeboard::api::{self, ApiState};
use homeboard::config::{AppConfig, ConfigWatcher};
use homeboard::display::DisplayController;
use homeboard::paths::AppPaths;
use homeboard::prefs::PrefsStore;
use homeboard::templates::TemplateStore;

/// Homeboard - receiver for a shared household display
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: detected per install mode)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit JSON log lines on stdout
    #[arg(long)]
    log_json: bool,

    /// Address to listen on (overrides server.host)
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long, env = "HOMEBOARD_PORT")]
    port: Option<u16>,

    /// Directory for templates and display preferences
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut paths = AppPaths::detect();
    if let Some(config) = &args.config {
        paths = paths.with_config(config);
    }
    if let Some(dir) = &args.data_dir {
        paths = paths.with_data_dir(dir);
    }
    paths.ensure_directories()?;

    let _log_guard = init_logging(&args.log_level, args.log_json, &paths)?;

    info!("Starting Homeboard v{}...", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", paths.config.display());

    // Leave an editable file behind on first run
    if !paths.config.exists() {
        match AppConfig::default().save(&paths.config).await {
            Ok(()) => info!("Wrote default configuration to {}", paths.config.display()),
            Err(e) => warn!("Could not write default configuration: {:#}", e),
        }
    }

    let (config_watcher, initial_config) = ConfigWatcher::new(paths.config.clone()).await?;

    // CLI flag wins over the config file
    if args.data_dir.is_none() {
        if let Some(dir) = &initial_config.storage.data_dir {
            paths = paths.with_data_dir(dir);
            paths.ensure_directories()?;
        }
    }
    info!("Data directory: {}", paths.data_dir.display());

    let mut addr = initial_config.server.socket_addr();
    if let Some(host) = args.host {
        addr.set_ip(host);
    }
    if let Some(port) = args.port {
        addr.set_port(port);
    }

    let controller = Arc::new(DisplayController::new(
        initial_config.display.timezone,
    ));
    let prefs = PrefsStore::open(paths.prefs_file()).await;
    info!("Display preferences: {}", prefs.path().display());

    let state = Arc::new(ApiState {
        controller: Arc::clone(&controller),
        prefs: Arc::new(prefs),
        templates: TemplateStore::new(paths.templates_dir()),
    });

    run_app(state, addr, (*initial_config).clone(), config_watcher).await?;

    info!("Homeboard shutdown complete");
    Ok(())
}

async fn run_app(
    state: Arc<ApiState>,
    addr: std::net::SocketAddr,
    mut config: AppConfig,
    mut config_watcher: ConfigWatcher,
) -> Result<()> {
    let controller = Arc::clone(&state.controller);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let mut server = tokio::spawn(api::start_server(state, addr, async {
        shutdown_rx.await.ok();
    }));

    info!("✅ Display receiver ready");

    loop {
        tokio::select! {
            Some(new_config) = config_watcher.next_config() => {
                if new_config.display.timezone != config.display.timezone {
                    controller.set_timezone(new_config.display.timezone);
                }
                if new_config.server != config.server || new_config.storage != config.storage {
                    warn!("Server and storage changes take effect after a restart");
                }
                config = new_config;
            }
            result = &mut server => {
                // Server stopped on its own, usually a bind failure
                return result.context("API server task panicked")?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    shutdown_tx.send(()).ok();
    server.await.context("API server task panicked")??;
    Ok(())
}

fn init_logging(level: &str, json: bool, paths: &AppPaths) -> Result<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stdout_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    let file_appender = tracing_appender::rolling::daily(&paths.logs_dir, "homeboard.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}
