//! Ticketing configuration subcommands.

use std::io::Write;
use std::path::Path;

use crate::storage::{TicketingConfig, TicketingConfigParams};

use super::{Context, format_unix, write_json};

pub(super) async fn show<W: Write>(ctx: &Context, out: &mut W) -> anyhow::Result<()> {
    let Some(config) = ctx.db.get_ticketing_config().await? else {
        if ctx.json {
            return write_json(out, &serde_json::Value::Null);
        }
        writeln!(
            out,
            "No ticketing configuration. Save one with `alertbridge set-config <file>`."
        )?;
        return Ok(());
    };

    if ctx.json {
        return write_json(out, &config);
    }
    write_config(out, &config)
}

pub(super) async fn set<W: Write>(ctx: &Context, out: &mut W, file: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", file.display()))?;
    let params: TicketingConfigParams = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("Invalid ticketing configuration {}: {e}", file.display()))?;
    if params.auto_assign_tech && params.technician_id.is_none() {
        anyhow::bail!("auto_assign_tech requires technician_id");
    }

    let saved = ctx.db.save_ticketing_config(&params).await?;
    if ctx.json {
        return write_json(out, &saved);
    }
    writeln!(out, "Ticketing configuration saved.")?;
    write_config(out, &saved)
}

pub(super) async fn catalog<W: Write>(
    ctx: &Context,
    out: &mut W,
    board: Option<i64>,
) -> anyhow::Result<()> {
    let cw = ctx.connectwise()?;
    let boards = cw.list_boards().await?;
    let priorities = cw.list_priorities().await?;
    let members = cw.list_members().await?;
    let (statuses, types) = match board {
        Some(board_id) => (
            cw.list_statuses(board_id).await?,
            cw.list_types(board_id).await?,
        ),
        None => (Vec::new(), Vec::new()),
    };

    if ctx.json {
        return write_json(
            out,
            &serde_json::json!({
                "boards": boards,
                "statuses": statuses,
                "priorities": priorities,
                "types": types,
                "members": members,
            }),
        );
    }

    writeln!(out, "Boards:")?;
    for b in &boards {
        writeln!(out, "  {:>6}  {}", b.id, b.name)?;
    }
    if let Some(board_id) = board {
        writeln!(out, "\nStatuses (board {board_id}):")?;
        for s in &statuses {
            let closed = if s.closed_status { "  [closed]" } else { "" };
            writeln!(out, "  {:>6}  {}{closed}", s.id, s.name)?;
        }
        writeln!(out, "\nTypes (board {board_id}):")?;
        for t in &types {
            writeln!(out, "  {:>6}  {}", t.id, t.name)?;
        }
    }
    writeln!(out, "\nPriorities:")?;
    for p in &priorities {
        writeln!(out, "  {:>6}  {}", p.id, p.name)?;
    }
    writeln!(out, "\nMembers:")?;
    for m in &members {
        writeln!(out, "  {:>6}  {:<16}  {}", m.id, m.identifier, m.display_name())?;
    }
    if board.is_none() {
        writeln!(out, "\nPass --board <id> to list its statuses and types.")?;
    }
    Ok(())
}

fn write_config<W: Write>(out: &mut W, config: &TicketingConfig) -> anyhow::Result<()> {
    writeln!(out, "  Board:      {} ({})", config.board_name, config.board_id)?;
    writeln!(out, "  Status:     {} ({})", config.status_name, config.status_id)?;
    writeln!(
        out,
        "  Priority:   {} ({})",
        config.priority_name, config.priority_id
    )?;
    writeln!(out, "  Type:       {} ({})", config.type_name, config.type_id)?;
    if config.auto_assign_tech {
        writeln!(
            out,
            "  Technician: {} ({})",
            config.technician_name.as_deref().unwrap_or("-"),
            config
                .technician_id
                .map_or_else(|| "-".to_string(), |id| id.to_string())
        )?;
    } else {
        writeln!(out, "  Technician: (not auto-assigned)")?;
    }
    writeln!(out, "  Updated:    {}", format_unix(config.updated_at))?;
    writeln!(out, "  Summary:    {}", config.ticket_summary)?;
    writeln!(out, "  Template:")?;
    for line in config.ticket_template.lines() {
        writeln!(out, "    {line}")?;
    }
    Ok(())
}
