//! Tests for the ConnectWise API client and types.

use std::time::Duration;

use super::client::{ConnectWiseClient, ConnectWiseConfig};
use super::types::{
    BoardStatus, CompanyRef, Member, NamedRef, Ticket, TicketCreateRequest, TicketStatus,
};
use crate::external::ApiError;

fn config() -> ConnectWiseConfig {
    ConnectWiseConfig {
        base_url: "https://na.myconnectwise.net/v4_6_release/apis/3.0/".into(),
        company_id: "acme".into(),
        public_key: "pub".into(),
        private_key: "priv".into(),
        client_id: "0000-client".into(),
        timeout: Duration::from_secs(30),
    }
}

fn ticket_with_status(name: &str, closed_status: bool) -> Ticket {
    Ticket {
        id: 1,
        status: TicketStatus {
            id: 0,
            name: name.into(),
            closed_status,
        },
        ..Ticket::default()
    }
}

// =============================================================================
// Client construction tests
// =============================================================================

#[test]
fn missing_credentials_return_config_error() {
    let mut cfg = config();
    cfg.private_key = String::new();
    let err = ConnectWiseClient::new(&cfg).unwrap_err();
    assert!(matches!(err, ApiError::Config(ref msg) if msg.contains("private_key")));
}

#[test]
fn client_id_is_optional() {
    let mut cfg = config();
    cfg.client_id = String::new();
    assert!(ConnectWiseClient::new(&cfg).is_ok());
}

#[test]
fn page_url_appends_pagination() {
    let client = ConnectWiseClient::new(&config()).unwrap();
    assert_eq!(
        client.page_url("/service/priorities", 2),
        "https://na.myconnectwise.net/v4_6_release/apis/3.0/service/priorities?page=2&pageSize=1000"
    );
    assert_eq!(
        client.page_url("/company/companies?conditions=deletedFlag=false&orderBy=name", 1),
        "https://na.myconnectwise.net/v4_6_release/apis/3.0/company/companies?conditions=deletedFlag=false&orderBy=name&page=1&pageSize=1000"
    );
}

// =============================================================================
// Ticket status
// =============================================================================

#[test]
fn closed_flag_wins() {
    assert!(ticket_with_status("In Progress", true).is_closed());
}

#[test]
fn closed_names_are_normalized() {
    assert!(ticket_with_status(" >Closed ", false).is_closed());
    assert!(ticket_with_status(">>Resolved", false).is_closed());
    assert!(ticket_with_status("CANCELED", false).is_closed());
    assert!(ticket_with_status("complete", false).is_closed());
}

#[test]
fn open_names_are_not_closed() {
    assert!(!ticket_with_status("In Progress", false).is_closed());
    assert!(!ticket_with_status("New", false).is_closed());
    assert!(!ticket_with_status("Closed - Pending", false).is_closed());
    assert!(!ticket_with_status("", false).is_closed());
}

// =============================================================================
// Serialization tests
// =============================================================================

#[test]
fn deserialize_ticket() {
    let json = r#"{
        "id": 5001,
        "summary": "Slide Alert: backup_failed for Acme",
        "status": {"id": 16, "name": ">Closed", "closedStatus": false},
        "company": {"id": 250, "name": "Acme", "identifier": "Acme"},
        "board": {"id": 1, "name": "Service Desk"}
    }"#;
    let ticket: Ticket = serde_json::from_str(json).unwrap();
    assert_eq!(ticket.id, 5001);
    assert_eq!(ticket.company.id, 250);
    assert!(!ticket.status.closed_status);
    assert!(ticket.is_closed());
}

#[test]
fn ticket_request_uses_connectwise_field_names() {
    let request = TicketCreateRequest {
        summary: "Backup failed".into(),
        company: CompanyRef {
            id: 250,
            name: String::new(),
        },
        board: NamedRef::new(1, "Service Desk"),
        status: NamedRef::new(0, "New"),
        priority: NamedRef::new(3, "Normal"),
        ticket_type: NamedRef::new(7, "Backup"),
        initial_description: "details".into(),
        owner: None,
    };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["initialDescription"], "details");
    assert_eq!(value["type"]["name"], "Backup");
    assert_eq!(value["company"], serde_json::json!({ "id": 250 }));
    assert!(value["status"].get("id").is_none());
    assert!(value.get("owner").is_none());
}

#[test]
fn deserialize_catalog_records() {
    let status: BoardStatus = serde_json::from_str(
        r#"{"id": 3, "name": ">Closed", "boardId": 1, "closedStatus": true, "inactiveFlag": false}"#,
    )
    .unwrap();
    assert_eq!(status.board_id, 1);
    assert!(status.closed_status);

    let member: Member =
        serde_json::from_str(r#"{"id": 9, "identifier": "jdoe", "firstName": "Jane", "lastName": "Doe"}"#)
            .unwrap();
    assert_eq!(member.display_name(), "Jane Doe");
    assert!(!member.inactive);
}
