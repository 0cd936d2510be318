//! Operator subcommands.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

mod alert_cmd;
mod config_cmd;
mod mapping_cmd;

#[cfg(test)]
mod tests;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use alertbridge_core::Config;
use clap::Subcommand;
use serde::Serialize;

use crate::connectwise::{ConnectWiseClient, ConnectWiseConfig};
use crate::external::ApiError;
use crate::slide::{SlideClient, SlideConfig};
use crate::storage::Database;
use crate::sync::{AlertEngine, DEFAULT_MAPPING_LIMIT};

/// Operator subcommands. `run` is handled by the binary itself.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the monitor loop until interrupted
    Run,
    /// Run one monitor tick and exit
    SyncOnce,
    /// Automatically map unmapped Slide clients to ConnectWise companies
    MapClients,
    /// List Slide clients and their mappings
    ShowMappings,
    /// Map a Slide client to a ConnectWise company by hand
    Map {
        /// Slide client ID
        source_org_id: String,
        /// ConnectWise company ID
        target_org_id: i64,
        /// Slide client name (looked up when omitted)
        #[arg(long)]
        source_name: Option<String>,
        /// ConnectWise company name (looked up when omitted)
        #[arg(long)]
        target_name: Option<String>,
    },
    /// Remove the mapping of one Slide client
    Unmap {
        /// Slide client ID
        source_org_id: String,
    },
    /// Remove every client mapping
    ClearMappings {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Show the active ticketing configuration
    ShowConfig,
    /// Save a ticketing configuration from a JSON file
    SetConfig {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// List ConnectWise boards, priorities, and members
    Catalog {
        /// Also list statuses and types of this board
        #[arg(long)]
        board: Option<i64>,
    },
    /// List alerts with resolved client and ticket
    Alerts {
        /// Only show unresolved alerts
        #[arg(long)]
        unresolved: bool,
    },
    /// List alert-ticket mappings with live ticket status
    Tickets {
        /// Maximum number of rows
        #[arg(short, long, default_value_t = DEFAULT_MAPPING_LIMIT)]
        limit: u32,
    },
    /// Close an alert and its ticket
    CloseAlert {
        /// Slide alert ID
        alert_id: String,
    },
    /// Reopen an alert-ticket mapping so the closure sync checks it again
    ResetMapping {
        /// Slide alert ID
        alert_id: String,
    },
    /// Show alert, client, and ticket counters
    Status,
}

/// Everything a subcommand needs. API clients are built on demand so
/// store-only commands work without credentials.
pub struct Context {
    pub config: Config,
    pub db: Database,
    /// Emit JSON instead of tables.
    pub json: bool,
}

impl Context {
    pub const fn new(config: Config, db: Database, json: bool) -> Self {
        Self { config, db, json }
    }

    pub fn slide(&self) -> Result<SlideClient, ApiError> {
        SlideClient::new(&SlideConfig {
            base_url: self.config.slide.base_url.clone(),
            api_key: self.config.slide.api_key.clone(),
            timeout: self.config.http_timeout(),
        })
    }

    pub fn connectwise(&self) -> Result<ConnectWiseClient, ApiError> {
        let cw = &self.config.connectwise;
        ConnectWiseClient::new(&ConnectWiseConfig {
            base_url: cw.base_url.clone(),
            company_id: cw.company_id.clone(),
            public_key: cw.public_key.clone(),
            private_key: cw.private_key.clone(),
            client_id: cw.client_id.clone(),
            timeout: self.config.http_timeout(),
        })
    }

    pub fn engine(&self) -> Result<AlertEngine, ApiError> {
        Ok(AlertEngine::new(
            Arc::new(self.slide()?),
            Arc::new(self.connectwise()?),
            self.db.clone(),
        ))
    }
}

/// Execute a one-shot subcommand.
pub async fn run<W: Write>(ctx: &Context, command: Command, out: &mut W) -> anyhow::Result<()> {
    match command {
        Command::Run => anyhow::bail!("`run` is handled by the binary"),
        Command::SyncOnce => alert_cmd::sync_once(ctx, out).await,
        Command::MapClients => mapping_cmd::map_clients(ctx, out).await,
        Command::ShowMappings => mapping_cmd::show_mappings(ctx, out).await,
        Command::Map {
            source_org_id,
            target_org_id,
            source_name,
            target_name,
        } => {
            mapping_cmd::map(
                ctx,
                out,
                &source_org_id,
                target_org_id,
                source_name,
                target_name,
            )
            .await
        }
        Command::Unmap { source_org_id } => mapping_cmd::unmap(ctx, out, &source_org_id).await,
        Command::ClearMappings { yes } => mapping_cmd::clear(ctx, out, yes).await,
        Command::ShowConfig => config_cmd::show(ctx, out).await,
        Command::SetConfig { file } => config_cmd::set(ctx, out, &file).await,
        Command::Catalog { board } => config_cmd::catalog(ctx, out, board).await,
        Command::Alerts { unresolved } => alert_cmd::alerts(ctx, out, unresolved).await,
        Command::Tickets { limit } => alert_cmd::tickets(ctx, out, limit).await,
        Command::CloseAlert { alert_id } => alert_cmd::close_alert(ctx, out, &alert_id).await,
        Command::ResetMapping { alert_id } => alert_cmd::reset_mapping(ctx, out, &alert_id).await,
        Command::Status => alert_cmd::status(ctx, out).await,
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Truncate to `max` characters, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn format_unix(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map_or_else(|| ts.to_string(), crate::sync::template::format_timestamp)
}
