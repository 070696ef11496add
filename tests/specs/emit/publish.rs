//! Successful emit specs

use crate::prelude::*;

fn emit(project: &Project, args: &[&str]) -> Vec<serde_json::Value> {
    let mut full = vec!["emit"];
    full.extend_from_slice(args);
    full.extend_from_slice(&["--catalog", "catalog.toml"]);
    project.herald().args(&full).passes().events()
}

#[test]
fn user_created_is_published_once() {
    let project = Project::with_catalog();

    let events = emit(
        &project,
        &[
            "user.created",
            "--payload",
            r#"{"userId":"u1","username":"alice"}"#,
        ],
    );

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event["name"], "user.created");
    assert_eq!(event["category"], "application");
    assert_eq!(event["schemaVersion"], "1.0.0");
    assert_eq!(event["source"], "herald");
    assert_eq!(event["environment"], "development");
    assert_eq!(event["payload"], json!({"userId": "u1", "username": "alice"}));
    assert_eq!(event["metadata"]["message"], "User alice created");
    assert_eq!(event["searchableFields"]["username"], "alice");
    assert_eq!(event["correlationId"], event["id"]);
    assert!(event.get("causationId").is_none());
    assert!(event["hostInfo"]["processId"].is_u64());
}

#[test]
fn explicit_correlation_and_actor_are_kept() {
    let project = Project::with_catalog();

    let events = emit(
        &project,
        &[
            "payment.made",
            "--payload",
            r#"{"amount":12.5}"#,
            "--correlation-id",
            "order-7",
            "--actor",
            "u1",
            "--tag",
            "web",
        ],
    );

    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["correlationId"], "order-7");
    assert_eq!(events[0]["actorId"], "u1");
    assert_eq!(events[0]["tags"], json!(["billing", "web"]));
}

#[test]
fn category_is_inferred_from_the_name() {
    let project = Project::with_catalog();

    let events = emit(
        &project,
        &["security.login.failed", "--payload", r#"{"username":"bob"}"#],
    );

    assert_eq!(events[0]["category"], "security");
    assert_eq!(events[0]["severity"], "warning");
}

#[test]
fn category_flag_overrides_the_template() {
    let project = Project::with_catalog();

    let events = emit(
        &project,
        &[
            "security.login.failed",
            "--category",
            "integration",
            "--severity",
            "critical",
        ],
    );

    assert_eq!(events[0]["category"], "integration");
    assert_eq!(events[0]["severity"], "critical");
}

#[test]
fn no_validate_publishes_a_rejected_payload() {
    let project = Project::with_catalog();

    let events = emit(
        &project,
        &["payment.made", "--payload", r#"{"amount":-5}"#, "--no-validate"],
    );

    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["name"], "payment.made");
    assert_eq!(events[0]["payload"]["amount"], -5);
}
