// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test doubles for pipeline collaborators

use crate::event::{Event, EventCategory};
use crate::events::EventReceiver;
use crate::host::HostInfo;
use crate::id::EventId;
use crate::validator::{EventValidator, ValidationReport};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A bare application event with fixed stamps
pub fn sample_event(name: &str, payload: Value) -> Event {
    Event {
        id: EventId::new("evt-test"),
        name: name.to_string(),
        category: EventCategory::Application,
        schema_version: "1.0.0".to_string(),
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        source: "test".to_string(),
        payload,
        host_info: HostInfo::new("test-host", 1),
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

/// Collect everything currently queued on a receiver
pub fn drain(rx: &mut EventReceiver) -> Vec<Arc<Event>> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Validator that records each call and returns a fixed verdict
#[derive(Clone, Default)]
pub struct CountingValidator {
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<String>>>,
    errors: Vec<String>,
}

impl CountingValidator {
    /// Accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects everything with the given messages
    pub fn failing<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            errors: errors.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Names of validated events, in call order
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl EventValidator for CountingValidator {
    fn validate(&self, event: &Event) -> ValidationReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.name.clone());
        ValidationReport {
            event_name: event.name.clone(),
            errors: self.errors.clone(),
        }
    }
}
