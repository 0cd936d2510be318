//! ConnectWise Manage API types.

use alertbridge_core::NamedOrganization;
use serde::{Deserialize, Serialize};

/// Status names treated as closed regardless of the `closedStatus` flag.
const CLOSED_STATUS_NAMES: [&str; 8] = [
    "closed",
    "cancelled",
    "canceled",
    "completed",
    "resolved",
    "done",
    "finished",
    "complete",
];

/// A ConnectWise company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

impl NamedOrganization for Company {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A service ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub company: CompanyRef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStatus {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub closed_status: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
    pub id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Ticket {
    /// Closed flag set, or the status name reads as a closed state once
    /// `>` markers and whitespace are stripped.
    pub fn is_closed(&self) -> bool {
        if self.status.closed_status {
            return true;
        }
        let name = self
            .status
            .name
            .trim()
            .trim_start_matches('>')
            .trim()
            .to_lowercase();
        CLOSED_STATUS_NAMES.contains(&name.as_str())
    }
}

/// Reference to a board, status, priority, or type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
}

impl NamedRef {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id: (id > 0).then_some(id),
            name: name.to_string(),
        }
    }
}

/// Reference to the member a ticket is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: i64,
}

/// Body of `POST /service/tickets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCreateRequest {
    pub summary: String,
    pub company: CompanyRef,
    pub board: NamedRef,
    pub status: NamedRef,
    pub priority: NamedRef,
    #[serde(rename = "type")]
    pub ticket_type: NamedRef,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub initial_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<MemberRef>,
}

// =============================================================================
// Catalog records
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "inactiveFlag")]
    pub inactive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardStatus {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub board_id: i64,
    #[serde(default)]
    pub closed_status: bool,
    #[serde(default, rename = "inactiveFlag")]
    pub inactive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "inactiveFlag")]
    pub inactive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketType {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub board_id: i64,
    #[serde(default, rename = "inactiveFlag")]
    pub inactive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, rename = "inactiveFlag")]
    pub inactive: bool,
}

impl Member {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
