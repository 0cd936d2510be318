//! Alert and ticket subcommands.

use std::io::Write;

use serde::Serialize;
use tracing::info;

use crate::sync::{Monitor, TickSummary};

use super::{Context, format_unix, truncate, write_json};

pub(super) async fn sync_once<W: Write>(ctx: &Context, out: &mut W) -> anyhow::Result<()> {
    let monitor = Monitor::new(std::sync::Arc::new(ctx.engine()?));
    let summary = monitor.run_once().await;

    if ctx.json {
        return write_json(out, &summary);
    }
    write_tick_summary(out, &summary)
}

pub(super) fn write_tick_summary<W: Write>(
    out: &mut W,
    summary: &TickSummary,
) -> anyhow::Result<()> {
    if summary.alert_listing_failed {
        writeln!(out, "Alert listing failed; see logs.")?;
    }
    writeln!(out, "Alerts seen:       {}", summary.alerts_seen)?;
    writeln!(out, "Already resolved:  {}", summary.skipped_resolved)?;
    writeln!(out, "Alerts closed:     {}", summary.alerts_closed)?;
    writeln!(out, "Tickets created:   {}", summary.tickets_created)?;
    writeln!(out, "Tickets existing:  {}", summary.tickets_existing)?;
    writeln!(out, "Alert failures:    {}", summary.alert_failures)?;
    writeln!(
        out,
        "Closure sync:      {} checked, {} closed, {} failed",
        summary.closure.checked, summary.closure.closed, summary.closure.failed
    )?;
    Ok(())
}

pub(super) async fn alerts<W: Write>(
    ctx: &Context,
    out: &mut W,
    unresolved_only: bool,
) -> anyhow::Result<()> {
    let mut alerts = ctx.engine()?.enriched_alerts().await?;
    if unresolved_only {
        alerts.retain(|a| !a.resolved);
    }

    if ctx.json {
        return write_json(out, &alerts);
    }
    if alerts.is_empty() {
        writeln!(out, "No alerts found.")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<20}  {:<16}  {:<24}  {:<18}  {:<13}  {:<8}  {:<8}",
        "ID", "TYPE", "CLIENT", "DEVICE", "MATCHED BY", "STATE", "TICKET"
    )?;
    for a in &alerts {
        writeln!(
            out,
            "{:<20}  {:<16}  {:<24}  {:<18}  {:<13}  {:<8}  {:<8}",
            truncate(&a.id, 20),
            truncate(&a.alert_type, 16),
            truncate(&a.client_name, 24),
            truncate(&a.device_name, 18),
            a.match_method,
            if a.resolved { "resolved" } else { "open" },
            a.ticket_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
        )?;
    }
    writeln!(out, "\n{} alert(s)", alerts.len())?;
    Ok(())
}

pub(super) async fn tickets<W: Write>(ctx: &Context, out: &mut W, limit: u32) -> anyhow::Result<()> {
    let rows = ctx.engine()?.ticket_mapping_statuses(limit).await?;

    if ctx.json {
        return write_json(out, &rows);
    }
    if rows.is_empty() {
        writeln!(out, "No ticket mappings found.")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<20}  {:<8}  {:<19}  {:<19}  {:<20}  {:<5}",
        "ALERT", "TICKET", "CREATED", "CLOSED", "LIVE STATUS", "SYNC"
    )?;
    let mut needs_sync = 0;
    for r in &rows {
        if r.needs_sync {
            needs_sync += 1;
        }
        writeln!(
            out,
            "{:<20}  {:<8}  {:<19}  {:<19}  {:<20}  {:<5}",
            truncate(&r.alert_id, 20),
            r.ticket_id,
            format_unix(r.created_at),
            r.closed_at.map_or_else(|| "-".to_string(), format_unix),
            truncate(r.status_name.as_deref().unwrap_or("Unknown"), 20),
            if r.needs_sync { "yes" } else { "" },
        )?;
    }
    if needs_sync > 0 {
        writeln!(
            out,
            "\n{needs_sync} ticket(s) closed in ConnectWise await the next closure sync."
        )?;
    }
    Ok(())
}

pub(super) async fn close_alert<W: Write>(
    ctx: &Context,
    out: &mut W,
    alert_id: &str,
) -> anyhow::Result<()> {
    let outcome = ctx.engine()?.close_alert(alert_id).await?;

    if ctx.json {
        return write_json(out, &outcome);
    }
    match outcome.ticket_id {
        Some(ticket_id) if outcome.ticket_closed => {
            writeln!(out, "Alert {alert_id} closed; ticket {ticket_id} closed.")?;
        }
        Some(ticket_id) => {
            writeln!(
                out,
                "Alert {alert_id} closed; closing ticket {ticket_id} failed (see logs)."
            )?;
        }
        None => writeln!(out, "Alert {alert_id} closed; no linked ticket.")?,
    }
    Ok(())
}

#[derive(Serialize)]
struct ResetOutcome<'a> {
    alert_id: &'a str,
    reset: bool,
}

pub(super) async fn reset_mapping<W: Write>(
    ctx: &Context,
    out: &mut W,
    alert_id: &str,
) -> anyhow::Result<()> {
    let reset = ctx.db.reset_alert_ticket_mapping(alert_id).await?;
    if reset {
        info!(alert_id, "Alert-ticket mapping reset");
    }

    if ctx.json {
        return write_json(out, &ResetOutcome { alert_id, reset });
    }
    if reset {
        writeln!(
            out,
            "Mapping for alert {alert_id} reset; the next closure sync will re-check its ticket."
        )?;
    } else {
        writeln!(out, "No ticket mapping for alert {alert_id}.")?;
    }
    Ok(())
}

pub(super) async fn status<W: Write>(ctx: &Context, out: &mut W) -> anyhow::Result<()> {
    let summary = ctx.engine()?.dashboard_summary().await?;

    if ctx.json {
        return write_json(out, &summary);
    }
    writeln!(
        out,
        "Alerts:  {} unresolved of {}",
        summary.unresolved_alerts, summary.total_alerts
    )?;
    writeln!(
        out,
        "Clients: {} mapped of {}",
        summary.mapped_clients, summary.total_clients
    )?;
    writeln!(out, "Tickets: {} open", summary.open_tickets)?;
    Ok(())
}
