//! `alertbridge`
//!
//! Watches Slide for backup alerts, opens ConnectWise tickets for them, and
//! closes both sides once the alert is resolved.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use alertbridge_daemon::cmd::{self, Command, Context};
use alertbridge_daemon::storage::Database;
use alertbridge_daemon::sync::Monitor;

#[derive(Parser, Debug)]
#[command(name = "alertbridge")]
#[command(version, about = "Slide backup alerts to ConnectWise tickets")]
struct Cli {
    /// Settings file layered over the global one
    #[arg(long, env = "ALERTBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Database file path
    #[arg(long, env = "ALERTBRIDGE_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Log level filter (e.g. "info", "debug", "warn"); overrides the settings file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "ALERTBRIDGE_LOG_JSON")]
    log_json: bool,

    /// Print command results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = alertbridge_core::config::load_config(cli.config.as_deref())?;
    if let Some(path) = cli.db_path {
        config.service.database_path = Some(path);
    }
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.service.log_level.clone());
    alertbridge_core::tracing_init::init_tracing(&level, cli.log_json);

    let db_path = config
        .database_path()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory for the database"))?;
    info!(path = %db_path.display(), "Opening database");
    let db = match Database::open(&db_path).await {
        Ok(db) => db,
        Err(e) => {
            error!(path = %db_path.display(), error = %e, "Failed to open database");
            return Err(e.into());
        }
    };

    let ctx = Context::new(config, db, cli.json);
    let result = match cli.command {
        Command::Run => run_monitor(&ctx).await,
        command => cmd::run(&ctx, command, &mut io::stdout()).await,
    };
    ctx.db.close().await;
    result
}

async fn run_monitor(ctx: &Context) -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "Starting alertbridge");

    let engine = Arc::new(ctx.engine()?);
    let handle = Monitor::new(engine).spawn();

    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    #[cfg(unix)]
    sd_notify::notify(true, &[sd_notify::NotifyState::Ready])?;

    #[cfg(unix)]
    let sigterm_future = sigterm.recv();
    #[cfg(not(unix))]
    let sigterm_future = std::future::pending::<Option<()>>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C shutdown signal");
        }
        _ = sigterm_future => {
            info!("Received SIGTERM shutdown signal");
        }
    }

    handle.shutdown().await;
    info!("alertbridge stopped");
    Ok(())
}
