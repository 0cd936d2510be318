//! Tests for the operator subcommands that only touch the local store.

use std::io::Write as _;

use alertbridge_core::Config;

use super::*;
use crate::storage::NewClientMapping;

async fn test_context(json: bool) -> Context {
    let db = Database::open_in_memory().await.unwrap();
    Context::new(Config::default(), db, json)
}

async fn run_to_string(ctx: &Context, command: Command) -> anyhow::Result<String> {
    let mut out = Vec::new();
    run(ctx, command, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

fn write_config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const CONFIG_JSON: &str = r#"{
    "board_id": 1,
    "board_name": "Service Desk",
    "status_id": 10,
    "status_name": "New",
    "priority_id": 3,
    "priority_name": "Priority 3 - Normal",
    "type_id": 7,
    "type_name": "Backup"
}"#;

// =============================================================================
// Helpers
// =============================================================================

#[test]
fn truncate_keeps_short_strings() {
    assert_eq!(truncate("Acme", 10), "Acme");
    assert_eq!(truncate("Acme", 4), "Acme");
}

#[test]
fn truncate_marks_the_cut() {
    assert_eq!(truncate("Acme Corporation", 8), "Acme Co…");
    assert_eq!(truncate("Ünïcødé names", 5).chars().count(), 5);
}

#[test]
fn format_unix_renders_utc() {
    assert_eq!(format_unix(0), "1970-01-01 00:00:00");
    assert_eq!(format_unix(1_700_000_000), "2023-11-14 22:13:20");
}

// =============================================================================
// Ticketing configuration
// =============================================================================

#[tokio::test]
async fn show_config_without_configuration() {
    let ctx = test_context(false).await;
    let out = run_to_string(&ctx, Command::ShowConfig).await.unwrap();
    assert!(out.contains("No ticketing configuration"));
}

#[tokio::test]
async fn show_config_json_without_configuration_is_null() {
    let ctx = test_context(true).await;
    let out = run_to_string(&ctx, Command::ShowConfig).await.unwrap();
    assert_eq!(out.trim(), "null");
}

#[tokio::test]
async fn set_config_applies_default_templates() {
    let ctx = test_context(false).await;
    let file = write_config_file(CONFIG_JSON);

    let out = run_to_string(
        &ctx,
        Command::SetConfig {
            file: file.path().to_path_buf(),
        },
    )
    .await
    .unwrap();
    assert!(out.contains("Ticketing configuration saved."));
    assert!(out.contains("Service Desk (1)"));
    assert!(out.contains("(not auto-assigned)"));

    let saved = ctx.db.get_ticketing_config().await.unwrap().unwrap();
    assert_eq!(saved.ticket_summary, crate::storage::DEFAULT_TICKET_SUMMARY);
    assert_eq!(saved.ticket_template, crate::storage::DEFAULT_TICKET_TEMPLATE);

    let shown = run_to_string(&ctx, Command::ShowConfig).await.unwrap();
    assert!(shown.contains("Priority 3 - Normal (3)"));
}

#[tokio::test]
async fn set_config_requires_technician_for_auto_assign() {
    let ctx = test_context(false).await;
    let file = write_config_file(
        r#"{
            "board_id": 1, "board_name": "Service Desk",
            "status_id": 10, "status_name": "New",
            "priority_id": 3, "priority_name": "Normal",
            "type_id": 7, "type_name": "Backup",
            "auto_assign_tech": true
        }"#,
    );

    let err = run_to_string(
        &ctx,
        Command::SetConfig {
            file: file.path().to_path_buf(),
        },
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("technician_id"));
    assert!(ctx.db.get_ticketing_config().await.unwrap().is_none());
}

#[tokio::test]
async fn set_config_rejects_malformed_file() {
    let ctx = test_context(false).await;
    let file = write_config_file("{ \"board_id\": ");

    let err = run_to_string(
        &ctx,
        Command::SetConfig {
            file: file.path().to_path_buf(),
        },
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Invalid ticketing configuration"));
}

// =============================================================================
// Client mappings
// =============================================================================

#[tokio::test]
async fn unmap_reports_whether_a_mapping_existed() {
    let ctx = test_context(false).await;
    ctx.db
        .save_client_mapping(&NewClientMapping {
            source_org_id: "c_acme".into(),
            source_org_name: "Acme LLC".into(),
            target_org_id: 42,
            target_org_name: "ACME".into(),
        })
        .await
        .unwrap();

    let out = run_to_string(
        &ctx,
        Command::Unmap {
            source_org_id: "c_acme".into(),
        },
    )
    .await
    .unwrap();
    assert!(out.contains("removed"));

    let out = run_to_string(
        &ctx,
        Command::Unmap {
            source_org_id: "c_acme".into(),
        },
    )
    .await
    .unwrap();
    assert!(out.contains("No mapping for c_acme"));
}

#[tokio::test]
async fn clear_mappings_requires_confirmation() {
    let ctx = test_context(false).await;
    ctx.db
        .save_client_mapping(&NewClientMapping {
            source_org_id: "c_acme".into(),
            source_org_name: "Acme LLC".into(),
            target_org_id: 42,
            target_org_name: "ACME".into(),
        })
        .await
        .unwrap();

    assert!(
        run_to_string(&ctx, Command::ClearMappings { yes: false })
            .await
            .is_err()
    );
    assert_eq!(ctx.db.list_client_mappings().await.unwrap().len(), 1);

    let out = run_to_string(&ctx, Command::ClearMappings { yes: true })
        .await
        .unwrap();
    assert!(out.contains("1 mapping(s) removed."));
    assert!(ctx.db.list_client_mappings().await.unwrap().is_empty());
}

// =============================================================================
// Alert-ticket mappings
// =============================================================================

#[tokio::test]
async fn reset_mapping_reopens_a_closed_row() {
    let ctx = test_context(false).await;
    ctx.db.save_alert_ticket_mapping("a_1", 501).await.unwrap();
    ctx.db.mark_alert_ticket_mapping_closed("a_1").await.unwrap();

    let out = run_to_string(
        &ctx,
        Command::ResetMapping {
            alert_id: "a_1".into(),
        },
    )
    .await
    .unwrap();
    assert!(out.contains("reset"));

    let row = ctx.db.get_alert_ticket_mapping("a_1").await.unwrap().unwrap();
    assert!(row.is_open());
}

#[tokio::test]
async fn reset_mapping_unknown_alert() {
    let ctx = test_context(false).await;
    let out = run_to_string(
        &ctx,
        Command::ResetMapping {
            alert_id: "a_missing".into(),
        },
    )
    .await
    .unwrap();
    assert!(out.contains("No ticket mapping for alert a_missing"));
}

#[tokio::test]
async fn reset_mapping_json_reports_outcome() {
    let ctx = test_context(true).await;
    ctx.db.save_alert_ticket_mapping("a_1", 501).await.unwrap();
    ctx.db.mark_alert_ticket_mapping_closed("a_1").await.unwrap();

    for (alert_id, expected) in [("a_1", true), ("a_missing", false)] {
        let out = run_to_string(
            &ctx,
            Command::ResetMapping {
                alert_id: alert_id.into(),
            },
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["alert_id"], alert_id);
        assert_eq!(value["reset"], expected);
    }
}

// =============================================================================
// Commands that need API credentials
// =============================================================================

#[tokio::test]
async fn api_commands_fail_without_credentials() {
    let ctx = test_context(false).await;
    assert!(run_to_string(&ctx, Command::Status).await.is_err());
    assert!(
        run_to_string(&ctx, Command::Alerts { unresolved: true })
            .await
            .is_err()
    );
    assert!(run_to_string(&ctx, Command::MapClients).await.is_err());
}

#[tokio::test]
async fn run_is_not_a_one_shot_command() {
    let ctx = test_context(false).await;
    assert!(run_to_string(&ctx, Command::Run).await.is_err());
}
