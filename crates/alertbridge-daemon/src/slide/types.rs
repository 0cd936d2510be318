//! Slide API response types.

use alertbridge_core::NamedOrganization;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Alert types that a later successful backup resolves.
pub const BACKUP_ALERT_TYPES: [&str; 2] = ["backup_failed", "backup_error"];

/// Slide wraps every list endpoint as `{"data": [...]}`.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Treat JSON `null` like a missing string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A protected device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    #[serde(alias = "device_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Owning client; blank for devices registered on the MSP account.
    #[serde(default, rename = "client_id", deserialize_with = "null_as_empty")]
    pub owning_org_id: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_empty")]
    pub device_type: String,
}

/// A Slide client organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "client_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

impl NamedOrganization for Client {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A backup alert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "alert_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub device_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub agent_id: String,
    /// May name the MSP parent account rather than the end client.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub client_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub alert_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(default, rename = "created_at")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(default)]
    pub resolved: bool,
    /// Embedded payload, either a JSON object or a string holding one.
    #[serde(default)]
    pub alert_fields: serde_json::Value,
}

/// Parsed `alert_fields` payload. Every field defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AlertFields {
    pub account: AccountFields,
    #[serde(deserialize_with = "null_as_empty")]
    pub backup_error_message: String,
    pub agent: AgentFields,
    pub device: DeviceFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccountFields {
    #[serde(deserialize_with = "null_as_empty")]
    pub account_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AgentFields {
    #[serde(deserialize_with = "null_as_empty")]
    pub agent_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub hostname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceFields {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub hostname: String,
}

impl Alert {
    /// Parse the embedded payload. Absent or malformed payloads yield the
    /// empty default.
    pub fn fields(&self) -> AlertFields {
        match &self.alert_fields {
            serde_json::Value::String(raw) if !raw.trim().is_empty() => {
                serde_json::from_str(raw).unwrap_or_default()
            }
            serde_json::Value::Object(_) => {
                AlertFields::deserialize(&self.alert_fields).unwrap_or_default()
            }
            _ => AlertFields::default(),
        }
    }

    /// Organization id: top-level id, else the payload's account id.
    pub fn parsed_org_id(&self) -> String {
        if self.client_id.is_empty() {
            self.fields().account.account_id
        } else {
            self.client_id.clone()
        }
    }

    /// Message: top-level message, else the payload's backup error.
    pub fn parsed_message(&self) -> String {
        if self.message.is_empty() {
            self.fields().backup_error_message
        } else {
            self.message.clone()
        }
    }

    pub fn parsed_org_name(&self) -> String {
        self.fields().account.name
    }

    pub fn parsed_device_name(&self) -> String {
        self.fields().device.name
    }

    pub fn parsed_agent_name(&self) -> String {
        self.fields().agent.name
    }

    pub fn parsed_agent_hostname(&self) -> String {
        self.fields().agent.hostname
    }

    /// Agent id: top-level id, else the payload's agent id.
    pub fn parsed_agent_id(&self) -> String {
        if self.agent_id.is_empty() {
            self.fields().agent.agent_id
        } else {
            self.agent_id.clone()
        }
    }

    /// Whether a successful backup can auto-resolve this alert.
    pub fn is_backup_alert(&self) -> bool {
        BACKUP_ALERT_TYPES.contains(&self.alert_type.as_str())
    }
}

/// A backup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    #[serde(alias = "backup_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub device_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub agent_id: String,
    #[serde(default, rename = "client_id", deserialize_with = "null_as_empty")]
    pub owning_org_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Backup {
    /// Successful and finished strictly after `after`.
    pub fn succeeded_after(&self, after: DateTime<Utc>) -> bool {
        self.success && self.completed_at.is_some_and(|done| done > after)
    }
}
