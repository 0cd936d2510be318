//! Sync error types.

use thiserror::Error;

use crate::external::ApiError;
use crate::storage::DatabaseError;

/// Errors from reconciling clients or alerts.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The owning organization has no client mapping yet. Retried next tick.
    #[error("No client mapping for source organization '{0}'")]
    NotMapped(String),

    #[error("No ticketing configuration found; save one with `set-config` first")]
    ConfigMissing,

    #[error("External call failed: {0}")]
    ExternalCallFailed(#[from] ApiError),

    #[error("Persistence failed: {0}")]
    PersistenceFailed(#[from] DatabaseError),
}
