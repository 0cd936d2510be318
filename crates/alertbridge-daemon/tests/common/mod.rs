//! In-memory stand-ins for the Slide and ConnectWise APIs.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Notify;

use alertbridge_daemon::connectwise::{
    Company, CompanyRef, Ticket, TicketCreateRequest, TicketStatus,
};
use alertbridge_daemon::external::{ApiError, SourceSystem, TargetSystem};
use alertbridge_daemon::slide::{Alert, Backup, Client, Device};
use alertbridge_daemon::storage::{Database, NewClientMapping, TicketingConfigParams};
use alertbridge_daemon::sync::AlertEngine;

fn unavailable(what: &str) -> ApiError {
    ApiError::Api {
        status: 503,
        message: format!("{what} unavailable"),
    }
}

// =============================================================================
// Source
// =============================================================================

#[derive(Default)]
pub struct FakeSource {
    pub alerts: Mutex<Vec<Alert>>,
    pub devices: Mutex<Vec<Device>>,
    pub organizations: Mutex<Vec<Client>>,
    pub backups: Mutex<Vec<Backup>>,
    pub closed_alerts: Mutex<Vec<String>>,
    pub fail_list_alerts: AtomicBool,
    pub fail_close_alert: AtomicBool,
    pub list_alerts_calls: AtomicUsize,
    pub list_backups_calls: AtomicUsize,
    /// When set, `list_alerts` signals `list_alerts_entered` and then waits
    /// for `release_list_alerts`.
    pub hold_list_alerts: AtomicBool,
    pub list_alerts_entered: Notify,
    pub release_list_alerts: Notify,
}

impl FakeSource {
    pub fn closed(&self) -> Vec<String> {
        self.closed_alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceSystem for FakeSource {
    async fn list_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.list_alerts_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_list_alerts.load(Ordering::SeqCst) {
            self.list_alerts_entered.notify_one();
            self.release_list_alerts.notified().await;
        }
        if self.fail_list_alerts.load(Ordering::SeqCst) {
            return Err(unavailable("alerts"));
        }
        Ok(self.alerts.lock().unwrap().clone())
    }

    async fn list_devices(&self) -> Result<Vec<Device>, ApiError> {
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn get_device(&self, device_id: &str) -> Result<Device, ApiError> {
        self.devices
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == device_id)
            .cloned()
            .ok_or_else(|| ApiError::Api {
                status: 404,
                message: format!("device {device_id} not found"),
            })
    }

    async fn list_backups(&self) -> Result<Vec<Backup>, ApiError> {
        self.list_backups_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.backups.lock().unwrap().clone())
    }

    async fn list_organizations(&self) -> Result<Vec<Client>, ApiError> {
        Ok(self.organizations.lock().unwrap().clone())
    }

    async fn close_alert(&self, alert_id: &str) -> Result<(), ApiError> {
        if self.fail_close_alert.load(Ordering::SeqCst) {
            return Err(unavailable("alert close"));
        }
        self.closed_alerts.lock().unwrap().push(alert_id.to_string());
        if let Some(alert) = self
            .alerts
            .lock()
            .unwrap()
            .iter_mut()
            .find(|a| a.id == alert_id)
        {
            alert.resolved = true;
        }
        Ok(())
    }
}

// =============================================================================
// Target
// =============================================================================

pub struct FakeTarget {
    pub companies: Mutex<Vec<Company>>,
    pub tickets: Mutex<BTreeMap<i64, Ticket>>,
    pub created: Mutex<Vec<TicketCreateRequest>>,
    pub status_updates: Mutex<Vec<(i64, String)>>,
    next_id: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_get: AtomicBool,
}

impl Default for FakeTarget {
    fn default() -> Self {
        Self {
            companies: Mutex::default(),
            tickets: Mutex::default(),
            created: Mutex::default(),
            status_updates: Mutex::default(),
            next_id: AtomicUsize::new(500),
            fail_create: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
            fail_get: AtomicBool::new(false),
        }
    }
}

impl FakeTarget {
    pub fn created_requests(&self) -> Vec<TicketCreateRequest> {
        self.created.lock().unwrap().clone()
    }

    /// Set a ticket's status as a technician would in the ticketing UI.
    pub fn set_status(&self, ticket_id: i64, name: &str, closed_flag: bool) {
        let mut tickets = self.tickets.lock().unwrap();
        let ticket = tickets.get_mut(&ticket_id).unwrap();
        ticket.status.name = name.to_string();
        ticket.status.closed_status = closed_flag;
    }
}

#[async_trait]
impl TargetSystem for FakeTarget {
    async fn list_organizations(&self) -> Result<Vec<Company>, ApiError> {
        Ok(self.companies.lock().unwrap().clone())
    }

    async fn create_ticket(&self, request: &TicketCreateRequest) -> Result<Ticket, ApiError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(unavailable("ticket create"));
        }
        let id = i64::try_from(self.next_id.fetch_add(1, Ordering::SeqCst)).unwrap();
        let ticket = Ticket {
            id,
            summary: request.summary.clone(),
            status: TicketStatus {
                id: request.status.id.unwrap_or_default(),
                name: request.status.name.clone(),
                closed_status: false,
            },
            company: CompanyRef {
                id: request.company.id,
                name: String::new(),
            },
        };
        self.created.lock().unwrap().push(request.clone());
        self.tickets.lock().unwrap().insert(id, ticket.clone());
        Ok(ticket)
    }

    async fn get_ticket(&self, ticket_id: i64) -> Result<Ticket, ApiError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(unavailable("ticket lookup"));
        }
        self.tickets
            .lock()
            .unwrap()
            .get(&ticket_id)
            .cloned()
            .ok_or_else(|| ApiError::Api {
                status: 404,
                message: format!("ticket {ticket_id} not found"),
            })
    }

    async fn update_ticket_status(&self, ticket_id: i64, status: &str) -> Result<(), ApiError> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(unavailable("ticket update"));
        }
        self.status_updates
            .lock()
            .unwrap()
            .push((ticket_id, status.to_string()));
        if let Some(ticket) = self.tickets.lock().unwrap().get_mut(&ticket_id) {
            ticket.status.name = status.to_string();
        }
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub struct Harness {
    pub source: Arc<FakeSource>,
    pub target: Arc<FakeTarget>,
    pub engine: Arc<AlertEngine>,
}

impl Harness {
    pub async fn new() -> Self {
        let source = Arc::new(FakeSource::default());
        let target = Arc::new(FakeTarget::default());
        let db = Database::open_in_memory().await.unwrap();
        let engine = Arc::new(AlertEngine::new(source.clone(), target.clone(), db));
        Self {
            source,
            target,
            engine,
        }
    }

    /// Harness with Acme (and its NAS) mapped to company 42 and a ticketing
    /// config saved.
    pub async fn configured() -> Self {
        let harness = Self::new().await;
        harness.map_acme().await;
        harness.save_config(false).await;
        harness
    }

    pub fn db(&self) -> &Database {
        self.engine.database()
    }

    pub async fn map_acme(&self) {
        self.source.organizations.lock().unwrap().push(Client {
            id: "c_acme".into(),
            name: "Acme LLC".into(),
        });
        self.source.devices.lock().unwrap().push(acme_device());
        self.db()
            .save_client_mapping(&NewClientMapping {
                source_org_id: "c_acme".into(),
                source_org_name: "Acme LLC".into(),
                target_org_id: 42,
                target_org_name: "ACME Corp".into(),
            })
            .await
            .unwrap();
    }

    pub async fn save_config(&self, auto_assign: bool) {
        self.db()
            .save_ticketing_config(&TicketingConfigParams {
                board_id: 1,
                board_name: "Service Desk".into(),
                status_id: 10,
                status_name: "New".into(),
                priority_id: 3,
                priority_name: "Priority 3 - Normal".into(),
                type_id: 7,
                type_name: "Backup".into(),
                ticket_summary: "{{alert_type}} on {{device_name}} for {{client_name}}".into(),
                ticket_template: String::new(),
                auto_assign_tech: auto_assign,
                technician_id: auto_assign.then_some(77),
                technician_name: auto_assign.then(|| "Jo Tech".to_string()),
            })
            .await
            .unwrap();
    }

    pub fn push_alert(&self, alert: Alert) {
        self.source.alerts.lock().unwrap().push(alert);
    }
}

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
}

/// Backup-failure alert for the Acme client raised at 10:00.
pub fn acme_backup_alert(id: &str) -> Alert {
    Alert {
        id: id.into(),
        device_id: "d_acme".into(),
        agent_id: "ag_acme".into(),
        client_id: "c_acme".into(),
        alert_type: "backup_failed".into(),
        message: "Snapshot failed".into(),
        timestamp: at(10),
        ..Alert::default()
    }
}

pub fn acme_device() -> Device {
    Device {
        id: "d_acme".into(),
        name: "ACME-NAS01".into(),
        owning_org_id: "c_acme".into(),
        ..Device::default()
    }
}

pub fn successful_backup(agent_id: &str, hour: u32) -> Backup {
    Backup {
        id: format!("b_{agent_id}_{hour}"),
        agent_id: agent_id.into(),
        success: true,
        completed_at: Some(at(hour)),
        ..Backup::default()
    }
}
