//! Read-side views for operators: enriched alerts, ticket mapping status,
//! and the dashboard counters.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use super::engine::AlertEngine;
use super::error::SyncError;
use super::resolver::{MatchMethod, resolve_owning_organization};

/// Mapping rows shown by [`AlertEngine::ticket_mapping_statuses`] by default.
pub const DEFAULT_MAPPING_LIMIT: u32 = 100;

/// An alert with its resolved owner and linked ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedAlert {
    pub id: String,
    pub alert_type: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub resolved: bool,
    pub device_id: String,
    pub device_name: String,
    pub client_id: String,
    /// Target name when mapped, else the source name.
    pub client_name: String,
    pub source_client_name: String,
    pub match_method: MatchMethod,
    pub ticket_id: Option<i64>,
}

/// An alert-ticket mapping with the ticket's live status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketMappingStatus {
    pub alert_id: String,
    pub ticket_id: i64,
    pub created_at: i64,
    pub closed_at: Option<i64>,
    /// `None` when the live lookup failed.
    pub status_name: Option<String>,
    pub closed: bool,
    pub closed_flag: bool,
    /// Ticket closed in the target but the mapping is still open.
    pub needs_sync: bool,
}

/// Headline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub unresolved_alerts: usize,
    pub total_alerts: usize,
    pub mapped_clients: usize,
    pub total_clients: usize,
    pub open_tickets: i64,
}

impl AlertEngine {
    /// All alerts with owner resolution and ticket linkage applied.
    pub async fn enriched_alerts(&self) -> Result<Vec<EnrichedAlert>, SyncError> {
        let alerts = self.source.list_alerts().await?;
        let snapshot = self.snapshot().await;

        let mut enriched = Vec::with_capacity(alerts.len());
        for alert in alerts {
            let owner = resolve_owning_organization(&alert, &snapshot);
            let target_name = if owner.org_id.is_empty() {
                None
            } else {
                self.db
                    .get_client_mapping(&owner.org_id)
                    .await?
                    .map(|m| m.target_org_name)
                    .filter(|name| !name.is_empty())
            };
            let ticket_id = self
                .db
                .get_alert_ticket_mapping(&alert.id)
                .await?
                .map(|m| m.ticket_id);

            enriched.push(EnrichedAlert {
                message: alert.parsed_message(),
                device_name: alert.parsed_device_name(),
                client_name: target_name.unwrap_or_else(|| owner.org_name.clone()),
                source_client_name: owner.org_name,
                client_id: owner.org_id,
                match_method: owner.method,
                ticket_id,
                id: alert.id,
                alert_type: alert.alert_type,
                timestamp: alert.timestamp,
                resolved: alert.resolved,
                device_id: alert.device_id,
            });
        }
        Ok(enriched)
    }

    /// Most recent mappings with the live status of each ticket. A failed
    /// lookup marks that row unknown rather than failing the listing.
    pub async fn ticket_mapping_statuses(
        &self,
        limit: u32,
    ) -> Result<Vec<TicketMappingStatus>, SyncError> {
        let mappings = self.db.list_alert_ticket_mappings(limit).await?;

        let mut statuses = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            let mut status = TicketMappingStatus {
                alert_id: mapping.alert_id,
                ticket_id: mapping.ticket_id,
                created_at: mapping.created_at,
                closed_at: mapping.closed_at,
                status_name: None,
                closed: false,
                closed_flag: false,
                needs_sync: false,
            };
            match self.target.get_ticket(mapping.ticket_id).await {
                Ok(ticket) => {
                    status.closed = ticket.is_closed();
                    status.closed_flag = ticket.status.closed_status;
                    status.needs_sync = status.closed && mapping.closed_at.is_none();
                    status.status_name = Some(ticket.status.name);
                }
                Err(e) => {
                    warn!(ticket_id = mapping.ticket_id, error = %e, "Failed to fetch ticket status");
                }
            }
            statuses.push(status);
        }
        Ok(statuses)
    }

    /// Counts of alerts, mapped clients, and open tickets.
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, SyncError> {
        let alerts = self.source.list_alerts().await?;
        let clients = self.source.list_organizations().await?;

        let mut mapped_clients = 0;
        for client in &clients {
            if self.db.get_client_mapping(&client.id).await?.is_some() {
                mapped_clients += 1;
            }
        }

        Ok(DashboardSummary {
            unresolved_alerts: alerts.iter().filter(|a| !a.resolved).count(),
            total_alerts: alerts.len(),
            mapped_clients,
            total_clients: clients.len(),
            open_tickets: self.db.count_open_alert_ticket_mappings().await?,
        })
    }
}
