//! Database models for the alertbridge mapping store.

use serde::{Deserialize, Serialize};

/// Default ticket summary template.
pub const DEFAULT_TICKET_SUMMARY: &str = "Slide Alert: {{alert_type}} for {{client_name}}";

/// Default ticket description template.
pub const DEFAULT_TICKET_TEMPLATE: &str = "Alert Details:\n\n\
Client: {{client_name}}\n\
Device: {{device_name}}\n\
Alert Type: {{alert_type}}\n\
Message: {{alert_message}}\n\
Timestamp: {{alert_timestamp}}\n\n\
This ticket was automatically created by the Slide-ConnectWise integration.";

/// Source organization to target organization pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClientMapping {
    pub source_org_id: String,
    pub source_org_name: String,
    pub target_org_id: i64,
    pub target_org_name: String,
    pub created_at: i64,
}

/// Fields supplied when creating or replacing a client mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClientMapping {
    pub source_org_id: String,
    pub source_org_name: String,
    pub target_org_id: i64,
    pub target_org_name: String,
}

/// Alert to ticket record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AlertTicketMapping {
    pub alert_id: String,
    pub ticket_id: i64,
    pub created_at: i64,
    pub closed_at: Option<i64>,
}

impl AlertTicketMapping {
    /// `closed_at` is the only open/closed marker.
    pub const fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }
}

/// Active ticketing configuration row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketingConfig {
    pub id: i64,
    pub board_id: i64,
    pub board_name: String,
    pub status_id: i64,
    pub status_name: String,
    pub priority_id: i64,
    pub priority_name: String,
    pub type_id: i64,
    pub type_name: String,
    pub ticket_summary: String,
    pub ticket_template: String,
    pub auto_assign_tech: bool,
    pub technician_id: Option<i64>,
    pub technician_name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Operator-supplied ticketing configuration.
///
/// Empty templates fall back to [`DEFAULT_TICKET_SUMMARY`] and
/// [`DEFAULT_TICKET_TEMPLATE`] when saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketingConfigParams {
    pub board_id: i64,
    pub board_name: String,
    pub status_id: i64,
    pub status_name: String,
    pub priority_id: i64,
    pub priority_name: String,
    pub type_id: i64,
    pub type_name: String,
    #[serde(default)]
    pub ticket_summary: String,
    #[serde(default)]
    pub ticket_template: String,
    #[serde(default)]
    pub auto_assign_tech: bool,
    #[serde(default)]
    pub technician_id: Option<i64>,
    #[serde(default)]
    pub technician_name: Option<String>,
}

impl TicketingConfigParams {
    pub(crate) fn summary_or_default(&self) -> &str {
        if self.ticket_summary.trim().is_empty() {
            DEFAULT_TICKET_SUMMARY
        } else {
            &self.ticket_summary
        }
    }

    pub(crate) fn template_or_default(&self) -> &str {
        if self.ticket_template.trim().is_empty() {
            DEFAULT_TICKET_TEMPLATE
        } else {
            &self.ticket_template
        }
    }
}
