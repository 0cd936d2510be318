//! ConnectWise Manage integration.
//!
//! Provides a reqwest-based client for the ConnectWise REST API covering
//! companies, service tickets, and the board/status/priority/type/member
//! catalog used to build a ticketing configuration.

mod client;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::{ConnectWiseClient, ConnectWiseConfig, PAGE_SIZE};
pub use types::{
    Board, BoardStatus, Company, CompanyRef, Member, MemberRef, NamedRef, Priority, Ticket,
    TicketCreateRequest, TicketStatus, TicketType,
};
