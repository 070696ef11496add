// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event validation against registered schemas.
//!
//! Validation is skipped for events whose template carries no schema.
//! Compiled schemas are cached per template name and recompiled when a
//! reload changes the template's version or schema.

use crate::catalog::Template;
use crate::error::{PipelineError, ValidationFailure};
use crate::event::Event;
use crate::registry::TemplateRegistry;
use crate::schema::{CompiledSchema, SchemaError};
use crate::setting::{SettingKind, VALUE_KEY};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Location reported for the payload root in error messages
const PAYLOAD_PATH: &str = "/payload";

/// Outcome of validating one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub event_name: String,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn valid(event_name: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            errors: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationFailure> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::new(self.event_name, self.errors))
        }
    }
}

/// Checks events before they may enter the bus
pub trait EventValidator: Send + Sync {
    fn validate(&self, event: &Event) -> ValidationReport;

    /// Validate against the template `event` was built from.
    ///
    /// A reload between building and validating does not change the schema
    /// applied to the event.
    fn validate_against(&self, event: &Event, _template: &Template) -> ValidationReport {
        self.validate(event)
    }

    /// Fail fast variant of [`validate`](Self::validate)
    fn assert_valid(&self, event: &Event) -> Result<(), PipelineError> {
        self.validate(event)
            .into_result()
            .map_err(PipelineError::ValidationFailed)
    }
}

struct CachedSchema {
    version: String,
    source: Value,
    compiled: Arc<CompiledSchema>,
}

impl CachedSchema {
    fn is_current(&self, template: &Template, schema: &Value) -> bool {
        self.version == template.version && &self.source == schema
    }
}

/// Validates payloads against the schemas held by a [`TemplateRegistry`]
pub struct SchemaValidator {
    registry: TemplateRegistry,
    cache: RwLock<HashMap<String, CachedSchema>>,
}

impl SchemaValidator {
    pub fn new(registry: TemplateRegistry) -> Self {
        Self {
            registry,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of compiled schemas held in the cache
    pub fn cached_schemas(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn compiled(
        &self,
        template: &Template,
        schema: &Value,
    ) -> Result<Arc<CompiledSchema>, SchemaError> {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = cache.get(&template.name) {
                if entry.is_current(template, schema) {
                    return Ok(Arc::clone(&entry.compiled));
                }
            }
        }

        // Compile outside the lock; a concurrent first use may compile twice
        let compiled = Arc::new(CompiledSchema::compile(schema)?);

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        match cache.get(&template.name) {
            Some(entry) if entry.is_current(template, schema) => Ok(Arc::clone(&entry.compiled)),
            _ => {
                debug!(template = %template.name, version = %template.version, "compiled event schema");
                cache.insert(
                    template.name.clone(),
                    CachedSchema {
                        version: template.version.clone(),
                        source: schema.clone(),
                        compiled: Arc::clone(&compiled),
                    },
                );
                Ok(compiled)
            }
        }
    }
}

impl EventValidator for SchemaValidator {
    fn validate(&self, event: &Event) -> ValidationReport {
        let Some(template) = self.registry.get(&event.name) else {
            warn!(event_id = %event.id, event_name = %event.name, "event name not registered, skipping validation");
            return ValidationReport::valid(&event.name);
        };
        self.validate_against(event, &template)
    }

    fn validate_against(&self, event: &Event, template: &Template) -> ValidationReport {
        let Some(schema) = &template.schema else {
            return ValidationReport::valid(&event.name);
        };

        let compiled = match self.compiled(template, schema) {
            Ok(compiled) => compiled,
            Err(e) => {
                return ValidationReport {
                    event_name: event.name.clone(),
                    errors: vec![format!(
                        "schema for '{}' failed to compile: {}",
                        template.name, e
                    )],
                }
            }
        };

        let errors = match SettingKind::from_payload(&event.payload) {
            Some(kind) => {
                let mut errors = compiled.check_except(&event.payload, PAYLOAD_PATH, VALUE_KEY);
                let value_path = format!("{}/{}", PAYLOAD_PATH, VALUE_KEY);
                kind.check(event.payload.get(VALUE_KEY), &value_path, &mut errors);
                errors
            }
            None => compiled.check(&event.payload, PAYLOAD_PATH),
        };

        if !errors.is_empty() {
            debug!(event_id = %event.id, event_name = %event.name, errors = errors.len(), "event failed validation");
        }

        ValidationReport {
            event_name: event.name.clone(),
            errors,
        }
    }
}

impl<V: EventValidator + ?Sized> EventValidator for Arc<V> {
    fn validate(&self, event: &Event) -> ValidationReport {
        (**self).validate(event)
    }

    fn validate_against(&self, event: &Event, template: &Template) -> ValidationReport {
        (**self).validate_against(event, template)
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
