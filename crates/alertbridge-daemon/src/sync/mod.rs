//! Alert-to-ticket synchronization.
//!
//! - [`reconcile`]: pairs source organizations with target organizations
//! - [`resolver`]: finds the organization an alert belongs to
//! - [`engine`]: creates, closes, and syncs tickets for alerts
//! - [`monitor`]: runs the engine on a fixed interval

pub mod engine;
mod error;
pub mod monitor;
pub mod reconcile;
mod report;
pub mod resolver;
pub mod template;

pub use engine::{
    AlertAction, AlertEngine, CLOSED_STATUS, CloseOutcome, ClosureSummary, EnsureOutcome,
    TickSummary, is_resolved_by,
};
pub use error::SyncError;
pub use monitor::{CHECK_INTERVAL, Monitor, MonitorHandle};
pub use reconcile::{ClientReconciler, MappingOverview, ReconcileSummary};
pub use report::{DEFAULT_MAPPING_LIMIT, DashboardSummary, EnrichedAlert, TicketMappingStatus};
pub use resolver::{MatchMethod, OwningOrganization, SourceSnapshot, resolve_owning_organization};
pub use template::{TemplateContext, render};
