//! Owning-organization resolution.
//!
//! Alerts raised on an MSP account carry the MSP's id, not the end client's.
//! Resolution walks an ordered list of tiers and takes the first hit; the
//! alert's own account is the final fallback, so resolution never fails.

use std::fmt;

use alertbridge_core::match_device_prefix;
use serde::Serialize;

use crate::slide::{Alert, Client, Device};

/// Which tier produced an [`OwningOrganization`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    DeviceId,
    DeviceName,
    AlertAccount,
}

impl MatchMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeviceId => "device_id",
            Self::DeviceName => "device_name",
            Self::AlertAccount => "alert_account",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The source organization an alert belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwningOrganization {
    pub org_id: String,
    /// Display name; empty when the tier could not supply one.
    pub org_name: String,
    pub method: MatchMethod,
}

/// Devices and organizations fetched once per pass.
#[derive(Debug, Clone, Default)]
pub struct SourceSnapshot {
    pub devices: Vec<Device>,
    pub organizations: Vec<Client>,
}

impl SourceSnapshot {
    pub fn device(&self, device_id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == device_id)
    }

    pub fn organization_name(&self, org_id: &str) -> Option<&str> {
        self.organizations
            .iter()
            .find(|c| c.id == org_id)
            .map(|c| c.name.as_str())
    }
}

type Tier = fn(&Alert, &SourceSnapshot) -> Option<OwningOrganization>;

const TIERS: [Tier; 2] = [by_device_id, by_device_name];

/// Resolve the organization that owns `alert`.
pub fn resolve_owning_organization(alert: &Alert, snapshot: &SourceSnapshot) -> OwningOrganization {
    TIERS
        .iter()
        .find_map(|tier| tier(alert, snapshot))
        .unwrap_or_else(|| by_alert_account(alert))
}

fn by_device_id(alert: &Alert, snapshot: &SourceSnapshot) -> Option<OwningOrganization> {
    if alert.device_id.is_empty() {
        return None;
    }
    let device = snapshot.device(&alert.device_id)?;
    let org_id = device.owning_org_id.trim();
    if org_id.is_empty() {
        return None;
    }
    Some(OwningOrganization {
        org_id: org_id.to_string(),
        org_name: snapshot
            .organization_name(org_id)
            .unwrap_or_default()
            .to_string(),
        method: MatchMethod::DeviceId,
    })
}

fn by_device_name(alert: &Alert, snapshot: &SourceSnapshot) -> Option<OwningOrganization> {
    let device_name = alert.parsed_device_name();
    let org = match_device_prefix(&device_name, &snapshot.organizations)?;
    Some(OwningOrganization {
        org_id: org.id.clone(),
        org_name: org.name.clone(),
        method: MatchMethod::DeviceName,
    })
}

fn by_alert_account(alert: &Alert) -> OwningOrganization {
    OwningOrganization {
        org_id: alert.parsed_org_id(),
        org_name: alert.parsed_org_name(),
        method: MatchMethod::AlertAccount,
    }
}
