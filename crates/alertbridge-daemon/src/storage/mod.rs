//! `SQLite` mapping store for the alertbridge daemon.
//!
//! Persists client mappings, alert-to-ticket mappings, and the ticketing
//! configuration.

mod config_queries;
mod db;
mod models;
mod queries;


pub use db::{Database, DatabaseError};
pub use models::*;
