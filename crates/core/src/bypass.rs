// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validator-free publication of pipeline failures.
//!
//! [`BypassPublisher`] holds no validator and publishes straight to the bus,
//! so reporting a failure can never trigger another validation. Building a
//! system-error event cannot fail: any internal error degrades to a minimal
//! hand-built event.

use crate::catalog::{PIPELINE_ERROR_EVENT, TEMPLATE_NOT_FOUND_EVENT, VALIDATION_FAILED_EVENT};
use crate::clock::{Clock, SystemClock};
use crate::error::ValidationFailure;
use crate::event::{Event, EventCategory, Severity};
use crate::events::EventBus;
use crate::id::{EventId, IdGen, UuidIdGen};
use crate::message::render_message;
use crate::options::EventOptions;
use crate::registry::TemplateRegistry;
use crate::schema::type_name;
use crate::stamp::EventStamp;
use serde_json::{json, Map, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;
use tracing::{error, warn};

/// Schema version of events built without a template
pub const MINIMAL_SCHEMA_VERSION: &str = "0.0.0";

/// Tag carried by every system-error event
pub const SYSTEM_ERROR_TAG: &str = "system-error";

/// Description of a pipeline-internal failure
#[derive(Debug, Clone, PartialEq)]
pub struct SystemErrorParams {
    /// Event name, `system.event.pipeline_error` when absent
    pub name: Option<String>,
    pub message: String,
    /// Extra payload fields; must be an object (or null)
    pub payload: Value,
    pub severity: Option<Severity>,
    pub correlation_id: Option<EventId>,
    pub causation_id: Option<EventId>,
    pub error_detail: Option<String>,
    pub tags: Vec<String>,
}

impl SystemErrorParams {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: None,
            message: message.into(),
            payload: Value::Null,
            severity: None,
            correlation_id: None,
            causation_id: None,
            error_detail: None,
            tags: Vec::new(),
        }
    }

    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(message)
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<EventId>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_causation_id(mut self, id: impl Into<EventId>) -> Self {
        self.causation_id = Some(id.into());
        self
    }

    pub fn with_error_detail(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = Some(detail.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn event_name(&self) -> &str {
        self.name.as_deref().unwrap_or(PIPELINE_ERROR_EVENT)
    }
}

#[derive(Debug, Error)]
enum BypassConstructionError {
    #[error("system error payload must be an object, got {0}")]
    PayloadNotObject(&'static str),

    #[error("system error construction panicked")]
    Panicked,
}

/// Second, restricted entry point onto the bus.
///
/// Has no access to a validator, so nothing it does can re-enter validation.
pub struct BypassPublisher<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    stamp: EventStamp<C, I>,
    registry: TemplateRegistry,
    bus: EventBus,
}

impl<C: Clock, I: IdGen> BypassPublisher<C, I> {
    pub fn new(stamp: EventStamp<C, I>, registry: TemplateRegistry, bus: EventBus) -> Self {
        Self {
            stamp,
            registry,
            bus,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Build a system-error event. Never fails.
    pub fn create_system_error(&self, params: &SystemErrorParams) -> Event {
        let built = catch_unwind(AssertUnwindSafe(|| self.build(params)))
            .unwrap_or(Err(BypassConstructionError::Panicked));

        match built {
            Ok(event) => event,
            Err(e) => {
                error!(event_name = params.event_name(), error = %e, "falling back to minimal system error event");
                self.minimal(params)
            }
        }
    }

    /// Build a system-error event and hand it straight to the bus.
    ///
    /// Returns false only when the bus refuses the event.
    pub fn publish_system_error(&self, params: &SystemErrorParams) -> bool {
        let event = self.create_system_error(params);
        warn!(
            event_id = %event.id,
            event_name = %event.name,
            message = %params.message,
            "publishing pipeline failure"
        );

        match self.bus.publish(event) {
            Ok(_) => true,
            Err(e) => {
                error!(event_name = params.event_name(), error = %e, "system error event dropped");
                false
            }
        }
    }

    /// Report a lookup for an unregistered event name
    pub fn report_template_not_found(&self, name: &str, options: &EventOptions) -> bool {
        let mut params = SystemErrorParams::named(
            TEMPLATE_NOT_FOUND_EVENT,
            format!("No event template registered for '{name}'"),
        )
        .with_payload(json!({ "attemptedEventName": name }));
        params.correlation_id.clone_from(&options.correlation_id);
        params.causation_id.clone_from(&options.causation_id);
        self.publish_system_error(&params)
    }

    /// Report an event the validator rejected
    pub fn report_validation_failure(&self, event: &Event, failure: &ValidationFailure) -> bool {
        let params = SystemErrorParams::named(VALIDATION_FAILED_EVENT, failure.to_string())
            .with_payload(json!({
                "eventId": event.id,
                "eventName": event.name,
                "schemaVersion": event.schema_version,
                "errors": failure.errors,
            }))
            .with_correlation_id(event.correlation_root().clone())
            .with_error_detail(failure.errors.join("; "));
        self.publish_system_error(&params)
    }

    fn build(&self, params: &SystemErrorParams) -> Result<Event, BypassConstructionError> {
        let payload = match &params.payload {
            Value::Object(fields) => Value::Object(fields.clone()),
            Value::Null => Value::Object(Map::new()),
            other => return Err(BypassConstructionError::PayloadNotObject(type_name(other))),
        };

        let name = params.event_name();
        let template = self.registry.get(name);
        let (version, category, severity, mut tags) = match &template {
            Some(t) => (
                t.version.clone(),
                t.default_category(),
                t.severity,
                t.tags.clone(),
            ),
            None => (
                MINIMAL_SCHEMA_VERSION.to_string(),
                EventCategory::System,
                Severity::Error,
                Vec::new(),
            ),
        };
        merge_tags(&mut tags, &[SYSTEM_ERROR_TAG.to_string()]);
        merge_tags(&mut tags, &params.tags);

        let message = match &template {
            Some(t) if params.message.is_empty() => render_message(&t.message, &payload),
            _ => params.message.clone(),
        };
        let mut metadata = Map::new();
        metadata.insert("message".to_string(), Value::String(message));

        let id = self.stamp.next_id();
        Ok(Event {
            correlation_id: Some(params.correlation_id.clone().unwrap_or_else(|| id.clone())),
            id,
            name: name.to_string(),
            category,
            schema_version: version,
            created_at: self.stamp.now(),
            source: self.stamp.source().to_string(),
            payload,
            host_info: self.stamp.host().clone(),
            environment: self.stamp.environment().to_string(),
            causation_id: params.causation_id.clone(),
            actor_id: None,
            severity: Some(params.severity.unwrap_or(severity)),
            duration_ms: None,
            trace_id: None,
            span_id: None,
            source_ip: None,
            session_id: None,
            request_path: None,
            tags,
            metadata,
            searchable_fields: Map::new(),
            error_detail: params.error_detail.clone(),
            stack_trace: None,
        })
    }

    /// Hand-built event with no registry or rendering involved
    fn minimal(&self, params: &SystemErrorParams) -> Event {
        let id = self.stamp.next_id();
        let payload = if params.payload.is_object() {
            params.payload.clone()
        } else {
            json!({ "message": params.message })
        };
        let mut tags = vec![SYSTEM_ERROR_TAG.to_string()];
        merge_tags(&mut tags, &params.tags);
        let mut metadata = Map::new();
        metadata.insert("message".to_string(), Value::String(params.message.clone()));

        Event {
            correlation_id: Some(params.correlation_id.clone().unwrap_or_else(|| id.clone())),
            id,
            name: params.event_name().to_string(),
            category: EventCategory::System,
            schema_version: MINIMAL_SCHEMA_VERSION.to_string(),
            created_at: self.stamp.now(),
            source: self.stamp.source().to_string(),
            payload,
            host_info: self.stamp.host().clone(),
            environment: self.stamp.environment().to_string(),
            causation_id: params.causation_id.clone(),
            actor_id: None,
            severity: Some(params.severity.unwrap_or(Severity::Error)),
            duration_ms: None,
            trace_id: None,
            span_id: None,
            source_ip: None,
            session_id: None,
            request_path: None,
            tags,
            metadata,
            searchable_fields: Map::new(),
            error_detail: params.error_detail.clone(),
            stack_trace: None,
        }
    }
}

impl<C: Clock, I: IdGen> Clone for BypassPublisher<C, I> {
    fn clone(&self) -> Self {
        Self {
            stamp: self.stamp.clone(),
            registry: self.registry.clone(),
            bus: self.bus.clone(),
        }
    }
}

/// Append `extra` to `tags`, skipping duplicates and keeping order
pub(crate) fn merge_tags(tags: &mut Vec<String>, extra: &[String]) {
    for tag in extra {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
}

#[cfg(test)]
#[path = "bypass_tests.rs"]
mod tests;
