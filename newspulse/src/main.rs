/*
newspulse - single-binary main.rs
This binary starts the Rocket HTTP server and runs the background updater inside the same process.
*/

use anyhow::{Context, Result};
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newspulse::relay::ChatRelay;
use newspulse::server::{launch_rocket, AppState};
use newspulse::store::NewsStore;
use newspulse::updater::run_updater;

#[derive(Parser, Debug)]
#[command(name = "newspulse", about = "NewsPulse dashboard server + updater")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable the background updater (serve seed data unchanged)
    #[arg(long)]
    no_updater: bool,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let config = Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref(),
    )
    .await
    .context("failed to load configuration")?;
    info!(default = ?default_path, override = ?override_path, "configuration loaded");

    let store = Arc::new(NewsStore::seeded());
    info!(articles = store.article_count(), "news store seeded");

    let relay = Arc::new(ChatRelay::from_settings(&config.chat_settings()));

    let mut updater_settings = config.updater_settings();
    if args.no_updater {
        info!("Background updater disabled via CLI (--no-updater)");
        updater_settings.enabled = false;
    }

    let shutdown_notify = Arc::new(Notify::new());
    let mut updater_handle = None;
    if updater_settings.enabled {
        info!("Spawning background updater task");
        let u_store = store.clone();
        let u_shutdown = shutdown_notify.clone();
        let u_settings = updater_settings;
        updater_handle = Some(tokio::spawn(async move {
            if let Err(e) = run_updater(u_store, u_settings, u_shutdown).await {
                error!(%e, "background updater failed");
                Err(e)
            } else {
                Ok(())
            }
        }));
    }

    let state = AppState::new(store, relay, updater_settings.enabled);

    info!("Launching Rocket HTTP server");
    if let Err(e) = launch_rocket(state, &config).await {
        error!(%e, "Rocket server failed");
    }

    info!("HTTP server stopped; notifying updater to shutdown");
    // notify_one keeps a permit, so the updater sees it even if it is mid-tick
    shutdown_notify.notify_one();

    if let Some(handle) = updater_handle {
        match tokio::time::timeout(Duration::from_secs(20), handle).await {
            Ok(join_res) => match join_res {
                Ok(Ok(_)) => info!("updater exited cleanly"),
                Ok(Err(e)) => error!(%e, "updater task returned an error"),
                Err(join_err) => error!(%join_err, "updater task panicked"),
            },
            Err(_) => {
                info!("Timed out waiting for updater to exit; continuing shutdown");
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}
