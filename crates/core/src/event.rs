// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event record published on the bus.
//!
//! An [`Event`] is built once by the factory (or the bypass path) and is
//! never modified afterwards. The bus hands subscribers an `Arc<Event>`.

use crate::host::HostInfo;
use crate::id::EventId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Broad classification of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Application,
    System,
    Security,
    Integration,
    Performance,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        EventCategory::Application,
        EventCategory::System,
        EventCategory::Security,
        EventCategory::Integration,
        EventCategory::Performance,
    ];

    /// Infer a category from the dotted event name.
    ///
    /// Rules are checked in order; the first match wins:
    /// - `security.*` or contains `.auth.` -> security
    /// - `system.*`, `.startup.`, `.shutdown.` -> system
    /// - `perf.*` or `.performance.` -> performance
    /// - `integration.*` or `.external.` -> integration
    /// - anything else -> application
    pub fn infer(name: &str) -> Self {
        if name.starts_with("security.") || name.contains(".auth.") {
            EventCategory::Security
        } else if name.starts_with("system.")
            || name.contains(".startup.")
            || name.contains(".shutdown.")
        {
            EventCategory::System
        } else if name.starts_with("perf.") || name.contains(".performance.") {
            EventCategory::Performance
        } else if name.starts_with("integration.") || name.contains(".external.") {
            EventCategory::Integration
        } else {
            EventCategory::Application
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Application => "application",
            EventCategory::System => "system",
            EventCategory::Security => "security",
            EventCategory::Integration => "integration",
            EventCategory::Performance => "performance",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "category",
                value: s.to_string(),
            })
    }
}

/// Event severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "severity",
                value: s.to_string(),
            })
    }
}

/// Returned when parsing a category or severity name fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// An immutable audit/telemetry event.
///
/// Serialized as a flat camelCase record. Optional fields are omitted when
/// absent and default to absent when missing on input, so consumers reading
/// an older or newer record never fail on unknown optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub category: EventCategory,
    pub schema_version: String,
    pub created_at: DateTime<Utc>,
    pub source: String,
    #[serde(default)]
    pub payload: Value,
    pub host_info: HostInfo,
    pub environment: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub searchable_fields: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

impl Event {
    /// The id shared by every event in this event's causal tree
    pub fn correlation_root(&self) -> &EventId {
        self.correlation_id.as_ref().unwrap_or(&self.id)
    }

    pub fn is_correlation_root(&self) -> bool {
        self.correlation_root() == &self.id
    }

    /// Severity, treating an absent value as info
    pub fn effective_severity(&self) -> Severity {
        self.severity.unwrap_or(Severity::Info)
    }

    /// Rendered human-readable message, if any
    pub fn message(&self) -> Option<&str> {
        self.metadata.get("message").and_then(Value::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Key-value pairs for structured logging
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("event_id", self.id.to_string()),
            ("event_name", self.name.clone()),
            ("category", self.category.to_string()),
            ("correlation_id", self.correlation_root().to_string()),
        ];
        if let Some(cause) = &self.causation_id {
            fields.push(("causation_id", cause.to_string()));
        }
        if let Some(severity) = self.severity {
            fields.push(("severity", severity.to_string()));
        }
        fields
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
