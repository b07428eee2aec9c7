//! ParkDesk - command-line client for the parking administration portal.
//!
//! Signs administrators in and out, keeps the session token between runs,
//! and prints bookings, parking areas and reports for the signed-in admin.

mod app;
mod commands;
mod output;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use parkdesk_core::config::Config;

use app::App;
use commands::{Cli, Command};

/// Log file prefix inside `<cache>/logs`
const LOG_FILE_PREFIX: &str = "parkdesk.log";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard must stay alive for the file writer to flush.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    let mut config = Config::load_file()?;
    let cache_dir = config
        .cache_dir()
        .unwrap_or_else(|_| PathBuf::from("./cache"));

    let log_dir = config.log_to_file.then(|| cache_dir.join("logs"));
    let _log_guard = init_tracing(log_dir.as_deref());

    // Env overrides are applied after the subscriber exists so rejections get logged
    for rejected in config.apply_env() {
        warn!("{}", rejected);
    }
    info!(api = %config.api_base_url, "ParkDesk starting");

    let mut app = App::new(config, &cache_dir).await?;
    app.run(command).await
}
