//! `alertbridge` Core Library
//!
//! Shared functionality for `alertbridge` components:
//! - Organization identity matching (name and device-prefix heuristics)
//! - Configuration resolution and hierarchy
//! - `SQLite` pool helpers shared by the storage layer
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod matching;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use matching::{NamedOrganization, match_device_prefix, match_organization};
