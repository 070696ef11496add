// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! herald-core: event creation, validation and publication
//!
//! This crate provides:
//! - A hot-reloadable template registry loaded from a TOML catalog
//! - An event factory that builds causally linked events from templates
//! - Schema validation with dedicated checks for settings payloads
//! - An in-process event bus with isolated subscribers
//! - A validator-free bypass path for reporting pipeline failures

pub mod clock;
pub mod id;

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod events;
pub mod global;
pub mod host;
pub mod message;
pub mod options;
pub mod registry;
pub mod schema;
pub mod setting;
pub mod stamp;

// Publication path (order matters for dependencies)
pub mod validator;
pub mod bypass;
pub mod publisher;
pub mod factory;
pub mod pipeline;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

// Re-exports
pub use bypass::{BypassPublisher, SystemErrorParams};
pub use catalog::{Catalog, CatalogError, Template};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, PipelineConfig};
pub use context::{AnonymousRoutes, RequestContext};
pub use error::{PipelineError, ValidationFailure};
pub use event::{Event, EventCategory, Severity};
pub use events::{
    BusDeliveryError, BusError, BusSettings, DispatchReport, EventBus, EventFilter, EventHandler,
    EventPattern, EventReceiver, HandlerError, SubscriberId,
};
pub use factory::EventFactory;
pub use host::HostInfo;
pub use id::{EventId, IdGen, SequentialIdGen, UuidIdGen};
pub use options::EventOptions;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use publisher::ValidatingPublisher;
pub use registry::TemplateRegistry;
pub use schema::{CompiledSchema, SchemaError};
pub use stamp::EventStamp;
pub use validator::{EventValidator, SchemaValidator, ValidationReport};
