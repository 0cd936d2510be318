//! Alertbridge Daemon Library
//!
//! Keeps Slide backup alerts and ConnectWise service tickets in step:
//! - REST clients for both systems behind the [`external`] traits
//! - `SQLite` storage for client mappings, alert-ticket mappings, and the
//!   ticketing configuration
//! - The alert resolution engine and the periodic monitor loop
//! - Operator subcommands

pub mod cmd;
pub mod connectwise;
pub mod external;
pub mod slide;
pub mod storage;
pub mod sync;
