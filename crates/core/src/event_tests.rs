// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use yare::parameterized;

fn sample_event() -> Event {
    Event {
        id: EventId::new("evt-1"),
        name: "user.created".to_string(),
        category: EventCategory::Application,
        schema_version: "1.0.0".to_string(),
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        source: "admin".to_string(),
        payload: json!({"username": "alice"}),
        host_info: HostInfo::new("box-1", 7),
        environment: "test".to_string(),
        correlation_id: None,
        causation_id: None,
        actor_id: None,
        severity: None,
        duration_ms: None,
        trace_id: None,
        span_id: None,
        source_ip: None,
        session_id: None,
        request_path: None,
        tags: Vec::new(),
        metadata: Map::new(),
        searchable_fields: Map::new(),
        error_detail: None,
        stack_trace: None,
    }
}

#[parameterized(
    security_prefix = { "security.login.failed", EventCategory::Security },
    auth_segment = { "user.auth.token_expired", EventCategory::Security },
    system_prefix = { "system.cache.cleared", EventCategory::System },
    startup_segment = { "app.startup.complete", EventCategory::System },
    shutdown_segment = { "worker.shutdown.requested", EventCategory::System },
    perf_prefix = { "perf.query.slow", EventCategory::Performance },
    performance_segment = { "db.performance.degraded", EventCategory::Performance },
    integration_prefix = { "integration.sms.sent", EventCategory::Integration },
    external_segment = { "billing.external.timeout", EventCategory::Integration },
    plain = { "order.created", EventCategory::Application },
    auth_without_dots = { "authorization", EventCategory::Application },
)]
fn category_inference(name: &str, expected: EventCategory) {
    assert_eq!(EventCategory::infer(name), expected);
}

#[test]
fn security_wins_over_system() {
    assert_eq!(
        EventCategory::infer("system.auth.reset"),
        EventCategory::Security
    );
}

#[parameterized(
    debug = { "debug", Severity::Debug },
    info = { "info", Severity::Info },
    warning = { "warning", Severity::Warning },
    error = { "error", Severity::Error },
    critical = { "critical", Severity::Critical },
)]
fn severity_parses(input: &str, expected: Severity) {
    assert_eq!(input.parse::<Severity>().unwrap(), expected);
    assert_eq!(expected.to_string(), input);
}

#[test]
fn unknown_category_is_rejected() {
    let err = "metrics".parse::<EventCategory>().unwrap_err();
    assert_eq!(err.to_string(), "unknown category 'metrics'");
}

#[test]
fn severity_is_ordered() {
    assert!(Severity::Debug < Severity::Info);
    assert!(Severity::Error < Severity::Critical);
}

#[test]
fn correlation_root_falls_back_to_id() {
    let mut event = sample_event();
    assert_eq!(event.correlation_root(), &EventId::new("evt-1"));
    assert!(event.is_correlation_root());

    event.correlation_id = Some(EventId::new("evt-0"));
    assert_eq!(event.correlation_root(), &EventId::new("evt-0"));
    assert!(!event.is_correlation_root());
}

#[test]
fn serializes_as_flat_camel_case_record() {
    let mut event = sample_event();
    event.trace_id = Some("trace-9".to_string());
    let json = serde_json::to_value(&event).unwrap();

    assert_eq!(json["schemaVersion"], "1.0.0");
    assert_eq!(json["hostInfo"]["processId"], 7);
    assert_eq!(json["traceId"], "trace-9");
    assert!(json.get("spanId").is_none());
    assert!(json.get("tags").is_none());
}

#[test]
fn deserialization_ignores_unknown_fields_and_defaults_optionals() {
    let json = json!({
        "id": "evt-3",
        "name": "order.created",
        "category": "application",
        "schemaVersion": "2.1.0",
        "createdAt": "2026-01-01T00:00:00Z",
        "source": "shop",
        "payload": {"orderId": 12},
        "hostInfo": {"hostname": "h", "processId": 1},
        "environment": "prod",
        "someFutureField": {"nested": true}
    });

    let event: Event = serde_json::from_value(json).unwrap();
    assert_eq!(event.id, EventId::new("evt-3"));
    assert!(event.correlation_id.is_none());
    assert!(event.tags.is_empty());
    assert_eq!(event.effective_severity(), Severity::Info);
}

#[test]
fn log_fields_include_identity() {
    let mut event = sample_event();
    event.causation_id = Some(EventId::new("evt-0"));
    let fields = event.log_fields();
    assert!(fields.contains(&("event_name", "user.created".to_string())));
    assert!(fields.contains(&("causation_id", "evt-0".to_string())));
}
