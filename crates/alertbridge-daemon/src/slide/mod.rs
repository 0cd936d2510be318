//! Slide backup platform integration.
//!
//! Provides a reqwest-based client for the Slide REST API and the alert,
//! device, backup, and client types it returns.

mod client;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::{SlideClient, SlideConfig};
pub use types::{Alert, AlertFields, Backup, Client, Device};
