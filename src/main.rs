//! # TerraDrive Dash
//!
//! Live analog instrument cluster for the TerraDrive simulator.
//!
//! The telemetry listener runs on a tokio runtime while the dashboard window
//! owns the main thread; they share only the state store and the shutdown
//! signal.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use terradrive_dash::config::{Config, LoggingConfig};
use terradrive_dash::dashboard::DashboardApp;
use terradrive_dash::server::TelemetryServer;
use terradrive_dash::shutdown::ShutdownSignal;
use terradrive_dash::telemetry::StateStore;

/// Log file name prefix inside `logging.directory`
const LOG_FILE_PREFIX: &str = "terradrive-dash.log";

/// How long pending runtime tasks get after the listener has stopped
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "terradrive-dash", version)]
#[command(about = "Live instrument cluster for TerraDrive simulator telemetry", long_about = None)]
struct Cli {
    /// TOML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Override `server.port`
    #[arg(short, long)]
    port: Option<u16>,
}

impl Cli {
    fn load_config(&self) -> terradrive_dash::error::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Set up stderr logging plus an optional daily rolling log file.
///
/// `RUST_LOG` takes precedence over `logging.level`. The returned guard
/// flushes the file writer when dropped and must live until exit.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level: tracing::Level = config.level.parse()?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

/// Main entry point for TerraDrive Dash
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration and apply CLI overrides
///    - Set up logging
///    - Build both gauges (invalid dial configuration is fatal here)
///    - Bind the telemetry listener
///
/// 2. **Run**
///    - Telemetry listener on the tokio runtime
///    - Dashboard window on the main thread, repainting every `frame_period_ms`
///
/// 3. **Graceful Shutdown**
///    - Window close or Ctrl+C sets the shutdown signal
///    - The listener notices within one poll interval and stops
///
/// # Examples
///
/// ```bash
/// cargo run --release -- --config config/default.toml
/// ```
///
/// Then, in the simulator console: `/wsConnect localhost:8765`
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    let _log_guard = init_logging(&config.logging)?;

    info!("TerraDrive Dash v{} starting...", env!("CARGO_PKG_VERSION"));

    let store = StateStore::new();
    let shutdown = ShutdownSignal::new();
    let app = DashboardApp::new(&config, store.clone(), shutdown.clone())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("telemetry")
        .build()?;

    let server = runtime.block_on(TelemetryServer::bind(&config.server, store, shutdown.clone()))?;
    info!(
        "In the simulator console run `/wsConnect {}:{}`",
        config.server.host, config.server.port
    );
    let server_task = runtime.spawn(server.run());

    let ctrl_c = shutdown.clone();
    let repaint = app.repaint_handle();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() && ctrl_c.trigger() {
            info!("Received Ctrl+C, shutting down...");
            // The window only closes from its own update
            repaint.request_repaint();
        }
    });

    let gui_result = app.run(&config.display);

    shutdown.trigger();
    runtime.block_on(server_task)?;
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);

    gui_result?;
    info!("TerraDrive Dash stopped");
    Ok(())
}
