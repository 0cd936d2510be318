//! Tests for the Slide API client and types.

use std::time::Duration;

use chrono::{TimeZone, Utc};

use super::client::{SlideClient, SlideConfig};
use super::types::{Alert, Backup, Client, Device, ListResponse};
use crate::external::ApiError;

fn config(base_url: &str, api_key: &str) -> SlideConfig {
    SlideConfig {
        base_url: base_url.into(),
        api_key: api_key.into(),
        timeout: Duration::from_secs(30),
    }
}

fn alert_with(client_id: &str, fields: serde_json::Value) -> Alert {
    Alert {
        id: "al_1".into(),
        client_id: client_id.into(),
        alert_fields: fields,
        ..Alert::default()
    }
}

// =============================================================================
// Client construction tests
// =============================================================================

#[test]
fn empty_base_url_returns_config_error() {
    let err = SlideClient::new(&config("", "tk")).unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
}

#[test]
fn empty_api_key_returns_config_error() {
    let err = SlideClient::new(&config("https://api.slide.tech", "")).unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
}

#[test]
fn api_url_strips_trailing_slash() {
    let client = SlideClient::new(&config("https://api.slide.tech/", "tk_1")).unwrap();
    assert_eq!(
        client.api_url("/alert/al_1"),
        "https://api.slide.tech/v1/alert/al_1"
    );
}

// =============================================================================
// Deserialization tests
// =============================================================================

#[test]
fn deserialize_alert_list() {
    let json = r#"{"data": [{
        "alert_id": "al_9",
        "device_id": "d_1",
        "agent_id": "a_1",
        "client_id": null,
        "alert_type": "backup_failed",
        "message": "",
        "created_at": "2026-03-01T10:15:00Z",
        "resolved": false,
        "alert_fields": "{\"account\":{\"account_id\":\"c_msp\",\"name\":\"MSP\"},\"backup_error_message\":\"disk full\"}"
    }]}"#;
    let list: ListResponse<Alert> = serde_json::from_str(json).unwrap();
    let alert = &list.data[0];
    assert_eq!(alert.id, "al_9");
    assert!(alert.client_id.is_empty());
    assert_eq!(alert.parsed_org_id(), "c_msp");
    assert_eq!(alert.parsed_message(), "disk full");
    assert_eq!(
        alert.timestamp,
        Utc.with_ymd_and_hms(2026, 3, 1, 10, 15, 0).unwrap()
    );
    assert!(alert.is_backup_alert());
}

#[test]
fn deserialize_minimal_entities() {
    let device: Device = serde_json::from_str(r#"{"device_id": "d_1", "name": "CVC-S5TB"}"#).unwrap();
    assert_eq!(device.id, "d_1");
    assert!(device.owning_org_id.is_empty());

    let client: Client = serde_json::from_str(r#"{"client_id": "c_1", "name": "Acme"}"#).unwrap();
    assert_eq!(client.id, "c_1");

    let backup: Backup = serde_json::from_str(r#"{"id": "b_1", "success": true}"#).unwrap();
    assert!(backup.completed_at.is_none());
}

#[test]
fn empty_list_body_is_empty() {
    let list: ListResponse<Device> = serde_json::from_str("{}").unwrap();
    assert!(list.data.is_empty());
}

// =============================================================================
// Parsed accessors
// =============================================================================

#[test]
fn payload_account_used_when_top_level_id_empty() {
    let alert = alert_with(
        "",
        serde_json::json!({ "account": { "account_id": "A1", "name": "Acme" } }),
    );
    assert_eq!(alert.parsed_org_id(), "A1");
    assert_eq!(alert.parsed_org_name(), "Acme");
}

#[test]
fn top_level_id_wins_over_payload() {
    let alert = alert_with(
        "T1",
        serde_json::json!({ "account": { "account_id": "A1" } }),
    );
    assert_eq!(alert.parsed_org_id(), "T1");
}

#[test]
fn malformed_payload_yields_empty_values() {
    let alert = alert_with("", serde_json::Value::String("{not json".into()));
    assert_eq!(alert.parsed_org_id(), "");
    assert_eq!(alert.parsed_device_name(), "");
    assert_eq!(alert.parsed_message(), "");

    let alert = alert_with("", serde_json::Value::Null);
    assert_eq!(alert.parsed_agent_hostname(), "");
}

#[test]
fn payload_names_are_read_from_nested_objects() {
    let alert = alert_with(
        "",
        serde_json::json!({
            "agent": { "agent_id": "a_7", "name": "FileServer", "hostname": "fs01.local" },
            "device": { "name": "CVC-S5TB", "hostname": "cvc-box" }
        }),
    );
    assert_eq!(alert.parsed_agent_name(), "FileServer");
    assert_eq!(alert.parsed_agent_hostname(), "fs01.local");
    assert_eq!(alert.parsed_agent_id(), "a_7");
    assert_eq!(alert.parsed_device_name(), "CVC-S5TB");
}

#[test]
fn top_level_message_wins() {
    let mut alert = alert_with("", serde_json::json!({ "backup_error_message": "payload" }));
    alert.message = "top".into();
    assert_eq!(alert.parsed_message(), "top");
}

#[test]
fn backup_success_must_be_strictly_later() {
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let backup = Backup {
        id: "b_1".into(),
        success: true,
        completed_at: Some(at),
        ..Backup::default()
    };
    assert!(!backup.succeeded_after(at));
    assert!(backup.succeeded_after(at - chrono::Duration::seconds(1)));

    let failed = Backup {
        success: false,
        ..backup
    };
    assert!(!failed.succeeded_after(at - chrono::Duration::seconds(1)));
}
