//! Failed emit specs
//!
//! A failed emit exits non-zero, and the system event reporting the
//! failure is still printed.

use crate::prelude::*;

#[test]
fn unknown_template_prints_a_bypass_event() {
    let project = Project::with_catalog();

    let run = project
        .herald()
        .args(&[
            "emit",
            "order.shipped",
            "--catalog",
            "catalog.toml",
            "--correlation-id",
            "req-1",
        ])
        .fails()
        .stderr_has("event template not found: order.shipped");

    let events = run.events();
    assert_eq!(events.len(), 1);
    let report = &events[0];
    assert_eq!(report["name"], "system.event.template_not_found");
    assert_eq!(report["category"], "system");
    assert_eq!(report["severity"], "error");
    assert_eq!(report["payload"]["attemptedEventName"], "order.shipped");
    assert_eq!(report["correlationId"], "req-1");
    assert_eq!(
        report["metadata"]["message"],
        "No event template registered for 'order.shipped'"
    );
    let tags = report["tags"].as_array().unwrap();
    assert!(tags.contains(&json!("system-error")));
}

#[test]
fn invalid_payment_reports_validation_failure_only() {
    let project = Project::with_catalog();

    let run = project
        .herald()
        .args(&[
            "emit",
            "payment.made",
            "--catalog",
            "catalog.toml",
            "--payload",
            r#"{"amount":-5}"#,
        ])
        .fails()
        .stderr_has("failed validation");

    let events = run.events();
    assert_eq!(events.len(), 1, "the rejected event must not be published");
    let report = &events[0];
    assert_eq!(report["name"], "system.event.validation_failed");
    assert_eq!(report["payload"]["eventName"], "payment.made");
    assert_eq!(report["payload"]["schemaVersion"], "2.1.0");
    assert!(report.get("causationId").is_none());
    assert_eq!(report["correlationId"], report["payload"]["eventId"]);

    let errors = report["payload"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0]
        .as_str()
        .unwrap()
        .contains("must be greater than 0"));
}

#[test]
fn missing_required_field_is_reported() {
    let project = Project::with_catalog();

    let run = project
        .herald()
        .args(&[
            "emit",
            "user.created",
            "--catalog",
            "catalog.toml",
            "--payload",
            r#"{"userId":"u1"}"#,
        ])
        .fails();

    let events = run.events();
    assert_eq!(events.len(), 1);
    let errors = events[0]["payload"]["errors"].as_array().unwrap();
    assert!(errors[0].as_str().unwrap().contains("username"));
}
