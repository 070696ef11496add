// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-supplied overrides for event construction

use crate::context::{AnonymousRoutes, RequestContext};
use crate::event::{EventCategory, Severity};
use crate::id::EventId;
use serde_json::{Map, Value};

/// Optional values applied when the factory builds an event.
///
/// Every field left as `None` (or empty) falls back to the template default
/// or stays absent on the event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventOptions {
    pub category: Option<EventCategory>,
    pub version: Option<String>,
    pub source: Option<String>,
    pub correlation_id: Option<EventId>,
    pub causation_id: Option<EventId>,
    pub actor_id: Option<String>,
    pub severity: Option<Severity>,
    pub duration_ms: Option<u64>,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub source_ip: Option<String>,
    pub session_id: Option<String>,
    pub request_path: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Map<String, Value>,
    pub searchable_fields: Map<String, Value>,
    pub error_detail: Option<String>,
    pub stack_trace: Option<String>,
}

impl EventOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: EventCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
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

    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_span_id(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }

    pub fn with_source_ip(mut self, ip: impl Into<String>) -> Self {
        self.source_ip = Some(ip.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_request_path(mut self, path: impl Into<String>) -> Self {
        self.request_path = Some(path.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_searchable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.searchable_fields.insert(key.into(), value.into());
        self
    }

    pub fn with_error_detail(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = Some(detail.into());
        self
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    /// Fill request-derived fields from `ctx`.
    ///
    /// Values already present on the options are kept. The actor is not
    /// taken from the context when the request path is an anonymous route.
    pub fn with_request(mut self, ctx: &RequestContext, anonymous: &AnonymousRoutes) -> Self {
        let anonymous_route = ctx
            .request_path
            .as_deref()
            .is_some_and(|path| anonymous.matches(path));

        if !anonymous_route {
            fill(&mut self.actor_id, &ctx.actor_id);
        }
        fill(&mut self.source_ip, &ctx.source_ip);
        fill(&mut self.request_path, &ctx.request_path);
        fill(&mut self.session_id, &ctx.session_id);
        fill(&mut self.trace_id, &ctx.trace_id);

        if let Some(agent) = &ctx.user_agent {
            self.metadata
                .entry("userAgent")
                .or_insert_with(|| Value::String(agent.clone()));
        }
        self
    }
}

/// Set `slot` from `value` unless it already holds something
pub(crate) fn fill<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RequestContext {
        RequestContext::new()
            .with_actor("admin-7")
            .with_source_ip("192.168.1.20")
            .with_session("sess-1")
            .with_user_agent("curl/8")
    }

    #[test]
    fn request_context_fills_missing_fields() {
        let ctx = request().with_path("/admin/users");
        let options = EventOptions::new().with_request(&ctx, &AnonymousRoutes::none());

        assert_eq!(options.actor_id.as_deref(), Some("admin-7"));
        assert_eq!(options.source_ip.as_deref(), Some("192.168.1.20"));
        assert_eq!(options.request_path.as_deref(), Some("/admin/users"));
        assert_eq!(options.session_id.as_deref(), Some("sess-1"));
        assert_eq!(options.metadata["userAgent"], "curl/8");
    }

    #[test]
    fn anonymous_route_skips_actor_only() {
        let ctx = request().with_path("/public/status");
        let routes = AnonymousRoutes::new(["/public/*"]);
        let options = EventOptions::new().with_request(&ctx, &routes);

        assert!(options.actor_id.is_none());
        assert_eq!(options.source_ip.as_deref(), Some("192.168.1.20"));
        assert_eq!(options.request_path.as_deref(), Some("/public/status"));
    }

    #[test]
    fn explicit_options_win_over_request() {
        let ctx = request().with_path("/admin");
        let options = EventOptions::new()
            .with_actor("system")
            .with_source_ip("127.0.0.1")
            .with_request(&ctx, &AnonymousRoutes::none());

        assert_eq!(options.actor_id.as_deref(), Some("system"));
        assert_eq!(options.source_ip.as_deref(), Some("127.0.0.1"));
    }
}
