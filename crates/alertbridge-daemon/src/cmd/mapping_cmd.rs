//! Client mapping subcommands.

use std::io::Write;

use crate::external::{SourceSystem, TargetSystem};
use crate::storage::NewClientMapping;
use crate::sync::ClientReconciler;

use super::{Context, truncate, write_json};

pub(super) async fn map_clients<W: Write>(ctx: &Context, out: &mut W) -> anyhow::Result<()> {
    let sources = ctx.slide()?.list_organizations().await?;
    let targets = ctx.connectwise()?.list_organizations().await?;
    let summary = ClientReconciler::new(ctx.db.clone())
        .reconcile_all(&sources, &targets)
        .await?;

    if ctx.json {
        return write_json(out, &summary);
    }
    writeln!(out, "Created:        {}", summary.created)?;
    writeln!(out, "Already mapped: {}", summary.already_mapped)?;
    writeln!(out, "Unmatched:      {}", summary.unmatched)?;
    if summary.unmatched > 0 {
        writeln!(out, "\nMap the rest by hand with `alertbridge map`.")?;
    }
    Ok(())
}

pub(super) async fn show_mappings<W: Write>(ctx: &Context, out: &mut W) -> anyhow::Result<()> {
    let reconciler = ClientReconciler::new(ctx.db.clone());
    let sources = ctx.slide()?.list_organizations().await?;
    let overview = reconciler.mapping_overview(&sources).await?;

    if ctx.json {
        return write_json(out, &overview);
    }
    if overview.is_empty() {
        writeln!(out, "No Slide clients found.")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<24}  {:<30}  {:<10}  {:<30}",
        "SLIDE ID", "SLIDE CLIENT", "CW ID", "CW COMPANY"
    )?;
    let mut mapped = 0;
    for row in &overview {
        let (cw_id, cw_name) = match &row.mapping {
            Some(m) => {
                mapped += 1;
                (m.target_org_id.to_string(), m.target_org_name.as_str())
            }
            None => ("-".to_string(), "(unmapped)"),
        };
        writeln!(
            out,
            "{:<24}  {:<30}  {:<10}  {:<30}",
            truncate(&row.source.id, 24),
            truncate(&row.source.name, 30),
            cw_id,
            truncate(cw_name, 30),
        )?;
    }
    writeln!(out, "\n{mapped} of {} client(s) mapped", overview.len())?;
    Ok(())
}

pub(super) async fn map<W: Write>(
    ctx: &Context,
    out: &mut W,
    source_org_id: &str,
    target_org_id: i64,
    source_name: Option<String>,
    target_name: Option<String>,
) -> anyhow::Result<()> {
    let source_org_name = match source_name {
        Some(name) => name,
        None => ctx
            .slide()?
            .list_organizations()
            .await?
            .into_iter()
            .find(|c| c.id == source_org_id)
            .map(|c| c.name)
            .ok_or_else(|| anyhow::anyhow!("Unknown Slide client '{source_org_id}'"))?,
    };
    let target_org_name = match target_name {
        Some(name) => name,
        None => ctx
            .connectwise()?
            .list_organizations()
            .await?
            .into_iter()
            .find(|c| c.id == target_org_id)
            .map(|c| c.name)
            .ok_or_else(|| anyhow::anyhow!("Unknown ConnectWise company {target_org_id}"))?,
    };

    let saved = ClientReconciler::new(ctx.db.clone())
        .create_mapping(&NewClientMapping {
            source_org_id: source_org_id.to_string(),
            source_org_name,
            target_org_id,
            target_org_name,
        })
        .await?;

    if ctx.json {
        return write_json(out, &saved);
    }
    writeln!(
        out,
        "Mapped {} ({}) -> {} ({})",
        saved.source_org_name, saved.source_org_id, saved.target_org_name, saved.target_org_id
    )?;
    Ok(())
}

pub(super) async fn unmap<W: Write>(
    ctx: &Context,
    out: &mut W,
    source_org_id: &str,
) -> anyhow::Result<()> {
    let removed = ClientReconciler::new(ctx.db.clone())
        .delete_mapping(source_org_id)
        .await?;
    if removed {
        writeln!(out, "Mapping for {source_org_id} removed.")?;
    } else {
        writeln!(out, "No mapping for {source_org_id}.")?;
    }
    Ok(())
}

pub(super) async fn clear<W: Write>(ctx: &Context, out: &mut W, yes: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("Refusing to delete every client mapping without --yes");
    }
    let removed = ClientReconciler::new(ctx.db.clone())
        .clear_mappings()
        .await?;
    writeln!(out, "{removed} mapping(s) removed.")?;
    Ok(())
}
