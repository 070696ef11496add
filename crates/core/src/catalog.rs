// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event templates and the catalog they are loaded from.
//!
//! A catalog is a TOML document with one `[[template]]` table per event
//! kind:
//!
//! ```toml
//! [[template]]
//! name = "payment.made"
//! version = "1.2.0"
//! category = "application"
//! severity = "info"
//! message = "Payment of {{ amount }} received"
//! searchable = ["orderId"]
//!
//! [template.schema]
//! type = "object"
//! required = ["amount"]
//! properties.amount = { type = "number", exclusiveMinimum = 0 }
//! ```
//!
//! Loading validates every entry up front (names, versions, schemas), so a
//! catalog that loads is safe to serve from the registry.

use crate::event::{EventCategory, Severity};
use crate::schema::{CompiledSchema, SchemaError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Reported when `create` is asked for an unregistered event name
pub const TEMPLATE_NOT_FOUND_EVENT: &str = "system.event.template_not_found";
/// Reported when an event fails validation
pub const VALIDATION_FAILED_EVENT: &str = "system.event.validation_failed";
/// Generic pipeline failure
pub const PIPELINE_ERROR_EVENT: &str = "system.event.pipeline_error";

/// Errors that can occur while building a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML syntax error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("template name must not be empty")]
    EmptyName,

    #[error("duplicate template '{0}'")]
    Duplicate(String),

    #[error("template '{name}' has invalid version '{version}': expected MAJOR.MINOR.PATCH")]
    InvalidVersion { name: String, version: String },

    #[error("template '{name}' has an invalid schema: {source}")]
    Schema {
        name: String,
        #[source]
        source: SchemaError,
    },

    #[error("template '{name}' has schema_json that is not valid JSON: {source}")]
    SchemaJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("template '{0}' defines both schema and schema_json")]
    ConflictingSchema(String),
}

/// Registered defaults for one event kind
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: String,
    pub version: String,
    /// When absent, the category is inferred from the event name
    pub category: Option<EventCategory>,
    pub severity: Severity,
    /// Default message; rendered against the payload
    pub message: String,
    pub schema: Option<Value>,
    /// Payload keys copied into `searchableFields`
    pub searchable: Vec<String>,
    pub tags: Vec<String>,
}

impl Template {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            category: None,
            severity: Severity::Info,
            message: String::new(),
            schema: None,
            searchable: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: EventCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_searchable(mut self, key: impl Into<String>) -> Self {
        self.searchable.push(key.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Category used when the caller does not pick one
    pub fn default_category(&self) -> EventCategory {
        self.category
            .unwrap_or_else(|| EventCategory::infer(&self.name))
    }

    pub fn has_schema(&self) -> bool {
        self.schema.is_some()
    }
}

/// An immutable set of templates keyed by name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: HashMap<String, Arc<Template>>,
}

impl Catalog {
    /// Empty catalog, without the pipeline's own templates
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding only the pipeline's own system templates
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.add_missing_builtins();
        catalog
    }

    /// Build a catalog from templates, adding builtins not already present
    pub fn from_templates<I>(templates: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = Template>,
    {
        let mut catalog = Self::new();
        for template in templates {
            catalog.insert(template)?;
        }
        catalog.add_missing_builtins();
        Ok(catalog)
    }

    /// Parse a TOML catalog document
    pub fn parse(toml_content: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = toml::from_str(toml_content)?;
        let templates = raw
            .template
            .into_iter()
            .map(RawTemplate::into_template)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_templates(templates)
    }

    /// Parse a TOML catalog file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Add a template after checking its name, version and schema
    pub fn insert(&mut self, template: Template) -> Result<(), CatalogError> {
        if template.name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if self.templates.contains_key(&template.name) {
            return Err(CatalogError::Duplicate(template.name));
        }
        if !is_semver(&template.version) {
            return Err(CatalogError::InvalidVersion {
                name: template.name,
                version: template.version,
            });
        }
        if let Some(schema) = &template.schema {
            if let Err(source) = CompiledSchema::compile(schema) {
                return Err(CatalogError::Schema {
                    name: template.name,
                    source,
                });
            }
        }

        self.templates
            .insert(template.name.clone(), Arc::new(template));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Template>> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Template names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Templates in name order
    pub fn templates(&self) -> Vec<&Arc<Template>> {
        let mut templates: Vec<&Arc<Template>> = self.templates.values().collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        templates
    }

    fn add_missing_builtins(&mut self) {
        for template in builtin_templates() {
            if !self.templates.contains_key(&template.name) {
                self.templates
                    .insert(template.name.clone(), Arc::new(template));
            }
        }
    }
}

/// The pipeline's own failure templates
pub fn builtin_templates() -> Vec<Template> {
    let system = |name: &str, message: &str| {
        Template::new(name, "1.0.0")
            .with_category(EventCategory::System)
            .with_severity(Severity::Error)
            .with_message(message)
            .with_tag("pipeline")
    };
    vec![
        system(
            TEMPLATE_NOT_FOUND_EVENT,
            "No event template registered for '{{ attemptedEventName }}'",
        ),
        system(
            VALIDATION_FAILED_EVENT,
            "Event '{{ eventName }}' failed validation",
        ),
        system(PIPELINE_ERROR_EVENT, "Event pipeline error"),
    ]
}

/// `MAJOR.MINOR.PATCH` with an optional `-prerelease` suffix
pub fn is_semver(version: &str) -> bool {
    let (core, prerelease) = match version.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (version, None),
    };
    let numeric = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    let parts: Vec<&str> = core.split('.').collect();
    let prerelease_ok = prerelease.map_or(true, |pre| {
        !pre.is_empty()
            && pre
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    });
    parts.len() == 3 && parts.iter().all(|p| numeric(p)) && prerelease_ok
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    #[serde(default)]
    template: Vec<RawTemplate>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTemplate {
    name: String,
    version: String,
    #[serde(default)]
    category: Option<EventCategory>,
    #[serde(default)]
    severity: Option<Severity>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    schema: Option<toml::Value>,
    #[serde(default)]
    schema_json: Option<String>,
    #[serde(default)]
    searchable: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl RawTemplate {
    fn into_template(self) -> Result<Template, CatalogError> {
        let schema = match (self.schema, self.schema_json) {
            (Some(_), Some(_)) => return Err(CatalogError::ConflictingSchema(self.name)),
            (Some(table), None) => Some(toml_to_json(table)),
            (None, Some(text)) => match serde_json::from_str(&text) {
                Ok(value) => Some(value),
                Err(source) => {
                    return Err(CatalogError::SchemaJson {
                        name: self.name,
                        source,
                    })
                }
            },
            (None, None) => None,
        };

        Ok(Template {
            name: self.name,
            version: self.version,
            category: self.category,
            severity: self.severity.unwrap_or(Severity::Info),
            message: self.message,
            schema,
            searchable: self.searchable,
            tags: self.tags,
        })
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
