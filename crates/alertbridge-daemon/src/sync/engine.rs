//! Alert resolution engine.
//!
//! Turns one source alert into at most one target ticket, closes both sides
//! once either side resolves, and drives a full monitor tick.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::error::SyncError;
use super::resolver::{OwningOrganization, SourceSnapshot, resolve_owning_organization};
use super::template::{TemplateContext, format_timestamp, render};
use crate::connectwise::{CompanyRef, MemberRef, NamedRef, TicketCreateRequest};
use crate::external::{SourceSystem, TargetSystem};
use crate::slide::{Alert, Backup};
use crate::storage::{ClientMapping, Database, TicketingConfig};

/// Status name requested when closing a target ticket.
pub const CLOSED_STATUS: &str = "Closed";

/// Result of [`AlertEngine::ensure_ticket`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EnsureOutcome {
    /// A mapping already existed; nothing was created.
    Existing { ticket_id: i64 },
    /// A ticket was created. `recorded` is false when saving the mapping
    /// failed after creation.
    Created { ticket_id: i64, recorded: bool },
}

impl EnsureOutcome {
    pub const fn ticket_id(&self) -> i64 {
        match self {
            Self::Existing { ticket_id } | Self::Created { ticket_id, .. } => *ticket_id,
        }
    }
}

/// What a tick did with one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertAction {
    Closed,
    Ticket(EnsureOutcome),
}

/// Result of [`AlertEngine::close_alert`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CloseOutcome {
    /// Ticket linked to the alert, if any.
    pub ticket_id: Option<i64>,
    /// Whether the ticket status update succeeded.
    pub ticket_closed: bool,
}

/// Result of one closure-sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClosureSummary {
    pub checked: usize,
    pub closed: usize,
    pub failed: usize,
}

/// Result of one monitor tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    pub alerts_seen: usize,
    pub skipped_resolved: usize,
    pub alerts_closed: usize,
    pub tickets_created: usize,
    pub tickets_existing: usize,
    pub alert_failures: usize,
    pub alert_listing_failed: bool,
    pub closure: ClosureSummary,
}

/// Per-alert reconciliation between the source and target systems.
pub struct AlertEngine {
    pub(super) source: Arc<dyn SourceSystem>,
    pub(super) target: Arc<dyn TargetSystem>,
    pub(super) db: Database,
}

impl AlertEngine {
    pub fn new(source: Arc<dyn SourceSystem>, target: Arc<dyn TargetSystem>, db: Database) -> Self {
        Self { source, target, db }
    }

    pub const fn database(&self) -> &Database {
        &self.db
    }

    /// Fetch devices and organizations. A failed listing is logged and left
    /// empty, which only weakens owner resolution.
    pub async fn snapshot(&self) -> SourceSnapshot {
        let devices = self.source.list_devices().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list devices; device lookups disabled for this pass");
            Vec::new()
        });
        let organizations = self.source.list_organizations().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list organizations; name matching disabled for this pass");
            Vec::new()
        });
        SourceSnapshot {
            devices,
            organizations,
        }
    }

    /// Resolve the organization that owns `alert` against a fresh snapshot.
    pub async fn resolve_owning_organization(&self, alert: &Alert) -> OwningOrganization {
        let snapshot = self.snapshot().await;
        resolve_owning_organization(alert, &snapshot)
    }

    // =========================================================================
    // Resolution detection
    // =========================================================================

    /// Whether a successful backup of the alert's agent finished after the
    /// alert was raised. Only backup alert types ever resolve.
    pub async fn is_resolved(&self, alert: &Alert) -> bool {
        if !alert.is_backup_alert() {
            return false;
        }
        match self.source.list_backups().await {
            Ok(backups) => is_resolved_by(alert, &backups),
            Err(e) => {
                warn!(alert_id = %alert.id, error = %e, "Failed to list backups; treating alert as unresolved");
                false
            }
        }
    }

    // =========================================================================
    // Ticket creation
    // =========================================================================

    /// Make sure `alert` has a ticket, creating one if needed.
    #[instrument(skip(self, alert), fields(alert_id = %alert.id))]
    pub async fn ensure_ticket(&self, alert: &Alert) -> Result<EnsureOutcome, SyncError> {
        if let Some(existing) = self.db.get_alert_ticket_mapping(&alert.id).await? {
            return Ok(EnsureOutcome::Existing {
                ticket_id: existing.ticket_id,
            });
        }
        let snapshot = self.snapshot().await;
        self.create_ticket(alert, &snapshot).await
    }

    /// [`Self::ensure_ticket`] against an already fetched snapshot.
    pub async fn ensure_ticket_with(
        &self,
        alert: &Alert,
        snapshot: &SourceSnapshot,
    ) -> Result<EnsureOutcome, SyncError> {
        if let Some(existing) = self.db.get_alert_ticket_mapping(&alert.id).await? {
            debug!(alert_id = %alert.id, ticket_id = existing.ticket_id, "Ticket already exists");
            return Ok(EnsureOutcome::Existing {
                ticket_id: existing.ticket_id,
            });
        }
        self.create_ticket(alert, snapshot).await
    }

    async fn create_ticket(
        &self,
        alert: &Alert,
        snapshot: &SourceSnapshot,
    ) -> Result<EnsureOutcome, SyncError> {
        let owner = resolve_owning_organization(alert, snapshot);
        let mapping = self
            .db
            .get_client_mapping(&owner.org_id)
            .await?
            .ok_or_else(|| SyncError::NotMapped(owner.org_id.clone()))?;
        let config = self
            .db
            .get_ticketing_config()
            .await?
            .ok_or(SyncError::ConfigMissing)?;

        let ctx = self.template_context(alert, &owner, &mapping, snapshot).await;
        let request = ticket_request(&config, &mapping, &ctx);
        let ticket = self.target.create_ticket(&request).await?;

        info!(
            alert_id = %alert.id,
            ticket_id = ticket.id,
            org_id = %owner.org_id,
            method = %owner.method,
            target_org_id = mapping.target_org_id,
            "Created ticket for alert"
        );

        let recorded = match self.db.save_alert_ticket_mapping(&alert.id, ticket.id).await {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    alert_id = %alert.id,
                    ticket_id = ticket.id,
                    error = %e,
                    "Failed to record alert-ticket mapping"
                );
                false
            }
        };

        Ok(EnsureOutcome::Created {
            ticket_id: ticket.id,
            recorded,
        })
    }

    async fn template_context(
        &self,
        alert: &Alert,
        owner: &OwningOrganization,
        mapping: &ClientMapping,
        snapshot: &SourceSnapshot,
    ) -> TemplateContext {
        let client_name = first_non_empty([
            mapping.target_org_name.clone(),
            alert.parsed_org_name(),
            owner.org_id.clone(),
        ]);

        let mut device_name = alert.parsed_device_name();
        if device_name.is_empty() && !alert.device_id.is_empty() {
            device_name = match snapshot.device(&alert.device_id) {
                Some(device) => device.name.clone(),
                None => match self.source.get_device(&alert.device_id).await {
                    Ok(device) => device.name,
                    Err(e) => {
                        warn!(alert_id = %alert.id, device_id = %alert.device_id, error = %e, "Device lookup failed");
                        String::new()
                    }
                },
            };
        }

        TemplateContext {
            alert_id: alert.id.clone(),
            alert_type: alert.alert_type.clone(),
            alert_message: alert.parsed_message(),
            alert_timestamp: format_timestamp(alert.timestamp),
            client_id: owner.org_id.clone(),
            client_name,
            device_id: alert.device_id.clone(),
            device_name: first_non_empty([device_name, alert.device_id.clone()]),
            agent_name: first_non_empty([alert.parsed_agent_name(), alert.agent_id.clone()]),
            agent_hostname: alert.parsed_agent_hostname(),
        }
    }

    // =========================================================================
    // Closing
    // =========================================================================

    /// Close an alert in the source system and its ticket, if any.
    ///
    /// Closing the ticket is best-effort; the mapping is stamped closed
    /// either way.
    #[instrument(skip(self))]
    pub async fn close_alert(&self, alert_id: &str) -> Result<CloseOutcome, SyncError> {
        self.source.close_alert(alert_id).await?;

        let Some(mapping) = self.db.get_alert_ticket_mapping(alert_id).await? else {
            info!(alert_id, "Alert closed; no linked ticket");
            return Ok(CloseOutcome::default());
        };

        let ticket_closed = match self
            .target
            .update_ticket_status(mapping.ticket_id, CLOSED_STATUS)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(alert_id, ticket_id = mapping.ticket_id, error = %e, "Failed to close ticket");
                false
            }
        };
        self.db.mark_alert_ticket_mapping_closed(alert_id).await?;

        info!(alert_id, ticket_id = mapping.ticket_id, ticket_closed, "Alert closed");
        Ok(CloseOutcome {
            ticket_id: Some(mapping.ticket_id),
            ticket_closed,
        })
    }

    /// Close source alerts whose tickets were closed in the target system.
    ///
    /// Per-row failures are logged and counted; the row stays open and is
    /// retried next pass.
    #[instrument(skip(self))]
    pub async fn sync_closed_tickets(&self) -> Result<ClosureSummary, SyncError> {
        let open = self.db.list_open_alert_ticket_mappings().await?;
        let mut summary = ClosureSummary {
            checked: open.len(),
            ..ClosureSummary::default()
        };

        for mapping in open {
            let ticket = match self.target.get_ticket(mapping.ticket_id).await {
                Ok(ticket) => ticket,
                Err(e) => {
                    warn!(ticket_id = mapping.ticket_id, error = %e, "Failed to fetch ticket status");
                    summary.failed += 1;
                    continue;
                }
            };
            if !ticket.is_closed() {
                continue;
            }

            info!(
                alert_id = %mapping.alert_id,
                ticket_id = mapping.ticket_id,
                status = %ticket.status.name,
                closed_flag = ticket.status.closed_status,
                "Ticket closed in target; closing alert"
            );
            if let Err(e) = self.source.close_alert(&mapping.alert_id).await {
                warn!(alert_id = %mapping.alert_id, error = %e, "Failed to close alert");
                summary.failed += 1;
                continue;
            }
            match self.db.mark_alert_ticket_mapping_closed(&mapping.alert_id).await {
                Ok(_) => summary.closed += 1,
                Err(e) => {
                    warn!(alert_id = %mapping.alert_id, error = %e, "Failed to stamp mapping closed");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Close `alert` if a backup resolved it, otherwise make sure it has a
    /// ticket.
    pub async fn process_alert(
        &self,
        alert: &Alert,
        snapshot: &SourceSnapshot,
        backups: &[Backup],
    ) -> Result<AlertAction, SyncError> {
        if is_resolved_by(alert, backups) {
            info!(alert_id = %alert.id, "Alert resolved by later backup");
            self.close_alert(&alert.id).await?;
            return Ok(AlertAction::Closed);
        }
        self.ensure_ticket_with(alert, snapshot)
            .await
            .map(AlertAction::Ticket)
    }

    /// One monitor tick: process every unresolved alert, then run the
    /// closure sync. Never fails; problems are logged and counted.
    #[instrument(skip(self))]
    pub async fn run_tick(&self) -> TickSummary {
        let mut summary = TickSummary::default();

        match self.source.list_alerts().await {
            Ok(alerts) => self.process_alerts(&alerts, &mut summary).await,
            Err(e) => {
                warn!(error = %e, "Failed to list alerts");
                summary.alert_listing_failed = true;
            }
        }

        match self.sync_closed_tickets().await {
            Ok(closure) => summary.closure = closure,
            Err(e) => warn!(error = %e, "Closure sync failed"),
        }

        summary
    }

    async fn process_alerts(&self, alerts: &[Alert], summary: &mut TickSummary) {
        summary.alerts_seen = alerts.len();
        let pending: Vec<&Alert> = alerts.iter().filter(|a| !a.resolved).collect();
        summary.skipped_resolved = alerts.len() - pending.len();
        if pending.is_empty() {
            return;
        }

        let snapshot = self.snapshot().await;
        let backups = if pending.iter().any(|a| a.is_backup_alert()) {
            self.source.list_backups().await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to list backups; no alert auto-resolves this tick");
                Vec::new()
            })
        } else {
            Vec::new()
        };

        for alert in pending {
            match self.process_alert(alert, &snapshot, &backups).await {
                Ok(AlertAction::Closed) => summary.alerts_closed += 1,
                Ok(AlertAction::Ticket(EnsureOutcome::Created { .. })) => {
                    summary.tickets_created += 1;
                }
                Ok(AlertAction::Ticket(EnsureOutcome::Existing { .. })) => {
                    summary.tickets_existing += 1;
                }
                Err(e) => {
                    warn!(alert_id = %alert.id, error = %e, "Failed to process alert");
                    summary.alert_failures += 1;
                }
            }
        }
    }
}

/// Backup evidence check against an already fetched backup list.
///
/// True for backup alert types when a successful backup of the alert's agent
/// completed strictly after the alert was raised.
pub fn is_resolved_by(alert: &Alert, backups: &[Backup]) -> bool {
    if !alert.is_backup_alert() {
        return false;
    }
    let agent_id = alert.parsed_agent_id();
    if agent_id.is_empty() {
        return false;
    }
    backups
        .iter()
        .any(|b| b.agent_id == agent_id && b.succeeded_after(alert.timestamp))
}

fn first_non_empty<const N: usize>(candidates: [String; N]) -> String {
    candidates
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn ticket_request(
    config: &TicketingConfig,
    mapping: &ClientMapping,
    ctx: &TemplateContext,
) -> TicketCreateRequest {
    let owner = config
        .auto_assign_tech
        .then_some(config.technician_id)
        .flatten()
        .map(|id| MemberRef { id });

    TicketCreateRequest {
        summary: render(&config.ticket_summary, ctx),
        company: CompanyRef {
            id: mapping.target_org_id,
            name: String::new(),
        },
        board: NamedRef::new(config.board_id, &config.board_name),
        status: NamedRef::new(config.status_id, &config.status_name),
        priority: NamedRef::new(config.priority_id, &config.priority_name),
        ticket_type: NamedRef::new(config.type_id, &config.type_name),
        initial_description: render(&config.ticket_template, ctx),
        owner,
    }
}
