// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event construction from registered templates.
//!
//! The factory fills every required field from its template and stamp, links
//! related and caused events into their correlation tree, and by default
//! validates what it builds. Construction failures are reported on the bus
//! through the bypass path before the error is returned.

use crate::bypass::{merge_tags, BypassPublisher, SystemErrorParams};
use crate::catalog::Template;
use crate::clock::{Clock, SystemClock};
use crate::error::PipelineError;
use crate::event::{Event, Severity};
use crate::events::EventBus;
use crate::id::{IdGen, UuidIdGen};
use crate::message::render_message;
use crate::options::{fill, EventOptions};
use crate::publisher::admit;
use crate::registry::TemplateRegistry;
use crate::stamp::EventStamp;
use crate::validator::{EventValidator, SchemaValidator};
use serde_json::{json, Map, Value};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::sync::Arc;
use tracing::debug;

/// Tag appended to events built from errors
pub const ERROR_TAG: &str = "error";

/// Metadata key holding the rendered message
pub const MESSAGE_KEY: &str = "message";

/// Error payload key for a non-object caller payload
pub const CONTEXT_KEY: &str = "context";

/// Builds events from the template registry
pub struct EventFactory<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    stamp: EventStamp<C, I>,
    registry: TemplateRegistry,
    bypass: BypassPublisher<C, I>,
    validator: Option<Arc<dyn EventValidator>>,
}

impl EventFactory<SystemClock, UuidIdGen> {
    pub fn new(
        source: impl Into<String>,
        environment: impl Into<String>,
        registry: TemplateRegistry,
        bus: EventBus,
    ) -> Self {
        Self::with_stamp(EventStamp::new(source, environment), registry, bus)
    }
}

impl<C: Clock, I: IdGen> EventFactory<C, I> {
    /// Factory validating against the registry's schemas
    pub fn with_stamp(stamp: EventStamp<C, I>, registry: TemplateRegistry, bus: EventBus) -> Self {
        let bypass = BypassPublisher::new(stamp.clone(), registry.clone(), bus);
        let validator: Arc<dyn EventValidator> = Arc::new(SchemaValidator::new(registry.clone()));
        Self {
            stamp,
            registry,
            bypass,
            validator: Some(validator),
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn EventValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Build events without validating them
    pub fn without_validation(mut self) -> Self {
        self.validator = None;
        self
    }

    pub fn validates(&self) -> bool {
        self.validator.is_some()
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn bypass(&self) -> &BypassPublisher<C, I> {
        &self.bypass
    }

    pub fn stamp(&self) -> &EventStamp<C, I> {
        &self.stamp
    }

    /// Build an event for `name`, validating it when validation is enabled.
    ///
    /// Unknown names and rejected payloads are reported on the bus before
    /// the error is returned.
    pub fn create(
        &self,
        name: &str,
        payload: Value,
        options: EventOptions,
    ) -> Result<Event, PipelineError> {
        let (event, template) = self.build(name, payload, options)?;
        if let Some(validator) = &self.validator {
            admit(validator.as_ref(), &self.bypass, &event, Some(&template))?;
        }
        Ok(event)
    }

    /// Create an event in `parent`'s correlation group.
    ///
    /// Trace, span, actor, session and source IP come from the parent unless
    /// `options` sets them.
    pub fn create_related(
        &self,
        parent: &Event,
        name: &str,
        payload: Value,
        options: EventOptions,
    ) -> Result<Event, PipelineError> {
        self.create(name, payload, related(parent, options))
    }

    /// Create an event directly caused by `parent`
    pub fn create_caused(
        &self,
        parent: &Event,
        name: &str,
        payload: Value,
        mut options: EventOptions,
    ) -> Result<Event, PipelineError> {
        options.causation_id = Some(parent.id.clone());
        self.create_related(parent, name, payload, options)
    }

    /// Create an error event describing `error` and its source chain.
    ///
    /// `message`, `name` and `causes` are merged into `payload`, replacing
    /// keys of the same name. A payload that is not an object is kept under
    /// `context`. `name` is the static type of `E`, so a boxed or `anyhow`
    /// error reports its wrapper; use [`create_error_as`](Self::create_error_as)
    /// to name the concrete type.
    pub fn create_error<E>(
        &self,
        name: &str,
        error: &E,
        payload: Value,
        options: EventOptions,
    ) -> Result<Event, PipelineError>
    where
        E: StdError + ?Sized,
    {
        self.create_error_as(name, error, short_type_name::<E>(), payload, options)
    }

    /// [`create_error`](Self::create_error) with an explicit error type name
    pub fn create_error_as<E>(
        &self,
        name: &str,
        error: &E,
        error_name: &str,
        payload: Value,
        mut options: EventOptions,
    ) -> Result<Event, PipelineError>
    where
        E: StdError + ?Sized,
    {
        let causes = error_chain(error);
        let mut fields = match payload {
            Value::Object(fields) => fields,
            Value::Null => Map::new(),
            other => Map::from_iter([(CONTEXT_KEY.to_string(), other)]),
        };
        fields.insert("message".to_string(), Value::String(error.to_string()));
        fields.insert("name".to_string(), Value::String(error_name.to_string()));
        fields.insert("causes".to_string(), json!(causes));

        options.severity.get_or_insert(Severity::Error);
        fill(&mut options.error_detail, &Some(error.to_string()));
        fill(
            &mut options.stack_trace,
            &Some(stack_trace(error, error_name, &causes)),
        );
        options.tags.push(ERROR_TAG.to_string());

        self.create(name, Value::Object(fields), options)
    }

    /// Bypass-path constructor; never fails
    pub fn create_system_error(&self, params: &SystemErrorParams) -> Event {
        self.bypass.create_system_error(params)
    }

    /// Look up the template and assemble the event without validating.
    ///
    /// The template is returned so validation applies the same schema even
    /// if the registry reloads in between.
    pub(crate) fn build(
        &self,
        name: &str,
        payload: Value,
        options: EventOptions,
    ) -> Result<(Event, Arc<Template>), PipelineError> {
        let Some(template) = self.registry.get(name) else {
            self.bypass.report_template_not_found(name, &options);
            return Err(PipelineError::TemplateNotFound(name.to_string()));
        };
        let event = self.assemble(&template, payload, options);
        Ok((event, template))
    }

    fn assemble(&self, template: &Template, payload: Value, options: EventOptions) -> Event {
        let id = self.stamp.next_id();

        let mut metadata = options.metadata;
        if !metadata.contains_key(MESSAGE_KEY) && !template.message.is_empty() {
            metadata.insert(
                MESSAGE_KEY.to_string(),
                Value::String(render_message(&template.message, &payload)),
            );
        }

        let mut searchable_fields = Map::new();
        for key in &template.searchable {
            if let Some(value) = payload.get(key) {
                searchable_fields.insert(key.clone(), value.clone());
            }
        }
        searchable_fields.extend(options.searchable_fields);

        let mut tags = template.tags.clone();
        merge_tags(&mut tags, &options.tags);

        let event = Event {
            correlation_id: Some(options.correlation_id.unwrap_or_else(|| id.clone())),
            id,
            name: template.name.clone(),
            category: options
                .category
                .unwrap_or_else(|| template.default_category()),
            schema_version: options
                .version
                .unwrap_or_else(|| template.version.clone()),
            created_at: self.stamp.now(),
            source: options
                .source
                .unwrap_or_else(|| self.stamp.source().to_string()),
            payload,
            host_info: self.stamp.host().clone(),
            environment: self.stamp.environment().to_string(),
            causation_id: options.causation_id,
            actor_id: options.actor_id,
            severity: Some(options.severity.unwrap_or(template.severity)),
            duration_ms: options.duration_ms,
            trace_id: options.trace_id,
            span_id: options.span_id,
            source_ip: options.source_ip,
            session_id: options.session_id,
            request_path: options.request_path,
            tags,
            metadata,
            searchable_fields,
            error_detail: options.error_detail,
            stack_trace: options.stack_trace,
        };

        debug!(event_id = %event.id, event_name = %event.name, "event created");
        event
    }
}

impl<C: Clock, I: IdGen> Clone for EventFactory<C, I> {
    fn clone(&self) -> Self {
        Self {
            stamp: self.stamp.clone(),
            registry: self.registry.clone(),
            bypass: self.bypass.clone(),
            validator: self.validator.clone(),
        }
    }
}

/// Options placing an event in `parent`'s correlation group
fn related(parent: &Event, mut options: EventOptions) -> EventOptions {
    options.correlation_id = Some(parent.correlation_root().clone());
    fill(&mut options.trace_id, &parent.trace_id);
    fill(&mut options.span_id, &parent.span_id);
    fill(&mut options.actor_id, &parent.actor_id);
    fill(&mut options.session_id, &parent.session_id);
    fill(&mut options.source_ip, &parent.source_ip);
    options
}

fn error_chain<E: StdError + ?Sized>(error: &E) -> Vec<String> {
    let mut causes = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes
}

/// The error chain, followed by a captured backtrace when enabled
fn stack_trace<E: StdError + ?Sized>(error: &E, error_name: &str, causes: &[String]) -> String {
    let mut trace = format!("{}: {}", error_name, error);
    for cause in causes {
        trace.push_str("\n  caused by: ");
        trace.push_str(cause);
    }

    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        trace.push('\n');
        trace.push_str(&backtrace.to_string());
    }
    trace
}

/// `std::io::Error` -> `Error`, `my::Wrapper<T>` -> `Wrapper`,
/// `dyn Error + Send` -> `Error`
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let full = full.strip_prefix("dyn ").unwrap_or(full);
    let base = full.split(['<', ' ']).next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
