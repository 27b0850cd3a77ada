//! # lsriders-backend
//!
//! Server binary: loads settings, opens the event database, and serves the
//! REST resource until Ctrl-C or SIGTERM.

#![deny(unsafe_code)]

mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lsriders_events::sqlite::new_file;
use lsriders_events::{ConnectionConfig, EventStore, EventStoreConfig, SqliteEventRepository};
use lsriders_server::{EventServer, ServerOptions};
use lsriders_settings::LsridersSettings;
use tokio::net::TcpListener;
use tracing::info;

/// lsriders event server.
#[derive(Parser, Debug)]
#[command(name = "lsriders-backend", about = "lsriders event server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings; 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Settings file (default `~/.lsriders/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Keep events in memory only; nothing is written to disk.
    #[arg(long)]
    in_memory: bool,
}

impl Cli {
    /// Apply flag overrides on top of loaded settings.
    fn apply(&self, settings: &mut LsridersSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(path) = &self.db_path {
            settings.database.path = path.to_string_lossy().into_owned();
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Build the event store described by `settings`.
fn open_store(settings: &LsridersSettings, in_memory: bool) -> Result<EventStore> {
    let config =
        EventStoreConfig::from_settings(&settings.events).context("Invalid events settings")?;

    if in_memory {
        info!("using in-memory event store");
        return Ok(EventStore::in_memory(config));
    }

    let db_path = Path::new(&settings.database.path);
    ensure_parent_dir(db_path)?;
    let pool = new_file(
        &settings.database.path,
        &ConnectionConfig::from(&settings.database),
    )
    .context("Failed to open database")?;
    let repo = SqliteEventRepository::initialize(pool).context("Failed to run migrations")?;
    info!(path = %db_path.display(), "event database ready");
    Ok(EventStore::new(Arc::new(repo), config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings_path = args
        .settings
        .clone()
        .unwrap_or_else(lsriders_settings::settings_path);
    let mut settings = lsriders_settings::load_settings_from_path(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    args.apply(&mut settings);

    logging::init_subscriber(&settings.logging);
    info!(path = %settings_path.display(), "settings loaded");

    let store = open_store(&settings, args.in_memory)?;

    let metrics = lsriders_server::metrics::install_recorder()
        .context("Failed to install metrics recorder")?;
    let options = ServerOptions::default()
        .with_principal_header(&settings.auth.principal_header)
        .context("Invalid auth.principalHeader")?
        .with_metrics(metrics);

    let server = EventServer::new(store, options);
    let listener = TcpListener::bind((settings.server.host.as_str(), settings.server.port))
        .await
        .context("Failed to bind server")?;

    let shutdown = Arc::clone(server.shutdown());
    let signals = tokio::spawn(async move { shutdown.wait_for_signal().await });

    server.serve(listener).await.context("Server error")?;
    signals.abort();

    info!("shutdown complete");
    Ok(())
}
