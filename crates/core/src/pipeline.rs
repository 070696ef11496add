// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The assembled event pipeline
//!
//! [`Pipeline`] owns one registry, one bus, a factory and a validating
//! publisher wired to share them. Most callers only need
//! [`Pipeline::create_and_publish`] and
//! [`Pipeline::create_and_publish_system_error`].

use crate::bypass::SystemErrorParams;
use crate::catalog::{Catalog, CatalogError};
use crate::clock::{Clock, SystemClock};
use crate::config::{PipelineConfig, DEFAULT_ANONYMOUS_ROUTES, DEFAULT_ENVIRONMENT, DEFAULT_SOURCE};
use crate::context::{AnonymousRoutes, RequestContext};
use crate::error::PipelineError;
use crate::events::{BusSettings, EventBus};
use crate::factory::EventFactory;
use crate::host::HostInfo;
use crate::id::{EventId, IdGen, UuidIdGen};
use crate::options::EventOptions;
use crate::publisher::ValidatingPublisher;
use crate::registry::TemplateRegistry;
use crate::stamp::EventStamp;
use crate::validator::{EventValidator, SchemaValidator};
use serde_json::Value;
use std::sync::Arc;
use tracing::info_span;

/// Registry, bus, factory and publisher wired together
pub struct Pipeline<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    registry: TemplateRegistry,
    bus: EventBus,
    factory: EventFactory<C, I>,
    publisher: ValidatingPublisher<C, I>,
    anonymous: AnonymousRoutes,
}

impl Pipeline<SystemClock, UuidIdGen> {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Assemble a pipeline from configuration, loading its catalog if set
    pub fn from_config(config: &PipelineConfig) -> Result<Self, CatalogError> {
        let registry = match &config.catalog {
            Some(path) => TemplateRegistry::load(path)?,
            None => TemplateRegistry::with_builtins(),
        };
        Ok(Self::builder()
            .source(&config.source)
            .environment(&config.environment)
            .registry(registry)
            .validation(config.validation)
            .bus_settings(config.bus_settings())
            .anonymous_routes(config.anonymous_routes())
            .build())
    }
}

impl<C: Clock, I: IdGen> Pipeline<C, I> {
    /// Build, validate once, and publish.
    ///
    /// Returns the id of the published event. Unknown names and rejected
    /// payloads are reported on the bypass path before the error returns.
    pub fn create_and_publish(
        &self,
        name: &str,
        payload: Value,
        options: EventOptions,
    ) -> Result<EventId, PipelineError> {
        let _span = info_span!("create_and_publish", event_name = name).entered();

        let (event, template) = self.factory.build(name, payload, options)?;
        let id = event.id.clone();
        self.publisher.validate_against_and_publish(event, &template)?;
        Ok(id)
    }

    /// Report a pipeline failure on the bypass path.
    ///
    /// Returns whether the bus accepted the event, never a validation
    /// outcome.
    pub fn create_and_publish_system_error(&self, params: &SystemErrorParams) -> bool {
        self.factory.bypass().publish_system_error(params)
    }

    /// Options pre-filled from an inbound request
    pub fn request_options(&self, ctx: &RequestContext) -> EventOptions {
        EventOptions::new().with_request(ctx, &self.anonymous)
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn factory(&self) -> &EventFactory<C, I> {
        &self.factory
    }

    pub fn publisher(&self) -> &ValidatingPublisher<C, I> {
        &self.publisher
    }

    pub fn anonymous_routes(&self) -> &AnonymousRoutes {
        &self.anonymous
    }
}

/// Builder for [`Pipeline`]
pub struct PipelineBuilder<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    source: String,
    environment: String,
    registry: Option<TemplateRegistry>,
    validator: Option<Arc<dyn EventValidator>>,
    validation: bool,
    bus: Option<EventBus>,
    bus_settings: BusSettings,
    anonymous: AnonymousRoutes,
    host: Option<HostInfo>,
    clock: C,
    ids: I,
}

impl PipelineBuilder<SystemClock, UuidIdGen> {
    pub fn new() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            registry: None,
            validator: None,
            validation: true,
            bus: None,
            bus_settings: BusSettings::default(),
            anonymous: AnonymousRoutes::new(DEFAULT_ANONYMOUS_ROUTES),
            host: None,
            clock: SystemClock,
            ids: UuidIdGen,
        }
    }
}

impl Default for PipelineBuilder<SystemClock, UuidIdGen> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock, I: IdGen> PipelineBuilder<C, I> {
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn registry(mut self, registry: TemplateRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn catalog(self, catalog: Catalog) -> Self {
        self.registry(TemplateRegistry::new(catalog))
    }

    /// Replace the schema validator
    pub fn validator(mut self, validator: Arc<dyn EventValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Whether `factory().create` validates. Publication always validates.
    pub fn validation(mut self, enabled: bool) -> Self {
        self.validation = enabled;
        self
    }

    /// Publish onto an existing bus; bus settings are then ignored
    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn bus_settings(mut self, settings: BusSettings) -> Self {
        self.bus_settings = settings;
        self
    }

    pub fn anonymous_routes(mut self, routes: AnonymousRoutes) -> Self {
        self.anonymous = routes;
        self
    }

    pub fn host(mut self, host: HostInfo) -> Self {
        self.host = Some(host);
        self
    }

    pub fn clock<C2: Clock>(self, clock: C2) -> PipelineBuilder<C2, I> {
        PipelineBuilder {
            source: self.source,
            environment: self.environment,
            registry: self.registry,
            validator: self.validator,
            validation: self.validation,
            bus: self.bus,
            bus_settings: self.bus_settings,
            anonymous: self.anonymous,
            host: self.host,
            clock,
            ids: self.ids,
        }
    }

    pub fn ids<I2: IdGen>(self, ids: I2) -> PipelineBuilder<C, I2> {
        PipelineBuilder {
            source: self.source,
            environment: self.environment,
            registry: self.registry,
            validator: self.validator,
            validation: self.validation,
            bus: self.bus,
            bus_settings: self.bus_settings,
            anonymous: self.anonymous,
            host: self.host,
            clock: self.clock,
            ids,
        }
    }

    pub fn build(self) -> Pipeline<C, I> {
        let registry = self.registry.unwrap_or_default();
        let bus = self
            .bus
            .unwrap_or_else(|| EventBus::with_settings(self.bus_settings));

        let mut stamp = EventStamp::with_parts(self.source, self.environment, self.clock, self.ids);
        if let Some(host) = self.host {
            stamp = stamp.with_host(host);
        }

        let validator: Arc<dyn EventValidator> = match self.validator {
            Some(validator) => validator,
            None => Arc::new(SchemaValidator::new(registry.clone())),
        };

        let factory = EventFactory::with_stamp(stamp, registry.clone(), bus.clone());
        let factory = if self.validation {
            factory.with_validator(Arc::clone(&validator))
        } else {
            factory.without_validation()
        };
        let publisher = ValidatingPublisher::new(validator, bus.clone(), factory.bypass().clone());

        Pipeline {
            registry,
            bus,
            factory,
            publisher,
            anonymous: self.anonymous,
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
