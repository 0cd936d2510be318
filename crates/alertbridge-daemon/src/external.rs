//! Seams to the two external systems.
//!
//! The sync engine only talks to [`SourceSystem`] and [`TargetSystem`]; the
//! REST clients in [`crate::slide`] and [`crate::connectwise`] implement them,
//! and tests substitute in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;

use crate::connectwise::{Company, Ticket, TicketCreateRequest};
use crate::slide::{Alert, Backup, Client, Device};

/// Errors shared by both REST clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure, including timeouts.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// The backup-monitoring platform that raises alerts.
#[async_trait]
pub trait SourceSystem: Send + Sync {
    async fn list_alerts(&self) -> Result<Vec<Alert>, ApiError>;

    async fn list_devices(&self) -> Result<Vec<Device>, ApiError>;

    async fn get_device(&self, device_id: &str) -> Result<Device, ApiError>;

    async fn list_backups(&self) -> Result<Vec<Backup>, ApiError>;

    async fn list_organizations(&self) -> Result<Vec<Client>, ApiError>;

    /// Mark an alert resolved.
    async fn close_alert(&self, alert_id: &str) -> Result<(), ApiError>;
}

/// The ticketing platform that receives tickets.
#[async_trait]
pub trait TargetSystem: Send + Sync {
    async fn list_organizations(&self) -> Result<Vec<Company>, ApiError>;

    async fn create_ticket(&self, request: &TicketCreateRequest) -> Result<Ticket, ApiError>;

    async fn get_ticket(&self, ticket_id: i64) -> Result<Ticket, ApiError>;

    /// Move a ticket to the named status.
    async fn update_ticket_status(&self, ticket_id: i64, status: &str) -> Result<(), ApiError>;
}
