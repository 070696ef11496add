// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event pattern matching and subscription filters

use crate::event::{Event, EventCategory, Severity};
use std::fmt;
use std::sync::Arc;

/// Pattern for matching dotted event names
/// Supports:
///   - Exact: "user.created"
///   - Single wildcard: "user.*" matches "user.created", "user.deleted"
///   - Prefix: "security.**" matches all security events
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventPattern(String);

impl EventPattern {
    pub fn new(pattern: &str) -> Self {
        Self(pattern.to_string())
    }

    /// Check if this pattern matches an event name
    pub fn matches(&self, event_name: &str) -> bool {
        // Empty pattern matches nothing
        if self.0.is_empty() {
            return false;
        }

        if self.0 == "**" {
            return true;
        }

        let pattern_parts: Vec<&str> = self.0.split('.').collect();
        let event_parts: Vec<&str> = event_name.split('.').collect();

        Self::match_segments(&pattern_parts, &event_parts)
    }

    fn match_segments(pattern: &[&str], event: &[&str]) -> bool {
        match (pattern.first(), event.first()) {
            (None, None) => true,
            (Some(&"**"), _) => true, // ** matches everything remaining
            (Some(&"*"), Some(_)) => Self::match_segments(&pattern[1..], &event[1..]),
            (Some(p), Some(e)) if *p == *e => Self::match_segments(&pattern[1..], &event[1..]),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Subscriber handle for unsubscribing
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Custom predicate evaluated after the name, category and severity checks
pub type Predicate = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Decides which events a subscriber receives.
///
/// Every configured condition must hold. An empty pattern or category list
/// places no restriction on that dimension.
#[derive(Clone, Default)]
pub struct EventFilter {
    patterns: Vec<EventPattern>,
    categories: Vec<EventCategory>,
    min_severity: Option<Severity>,
    predicate: Option<Predicate>,
}

impl EventFilter {
    /// Matches every event
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches event names against one pattern
    pub fn pattern(pattern: &str) -> Self {
        Self::default().with_pattern(pattern)
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(EventPattern::new(pattern));
        self
    }

    pub fn with_category(mut self, category: EventCategory) -> Self {
        self.categories.push(category);
        self
    }

    /// Events without a severity count as info
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = Some(severity);
        self
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        if !self.patterns.is_empty() && !self.patterns.iter().any(|p| p.matches(&event.name)) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&event.category) {
            return false;
        }
        if let Some(min) = self.min_severity {
            if event.effective_severity() < min {
                return false;
            }
        }
        self.predicate.as_ref().map_or(true, |p| p(event))
    }
}

impl fmt::Debug for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFilter")
            .field("patterns", &self.patterns)
            .field("categories", &self.categories)
            .field("min_severity", &self.min_severity)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// A registered subscription
#[derive(Clone, Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub filter: EventFilter,
    pub description: String,
}

impl Subscription {
    pub fn new(id: SubscriberId, filter: EventFilter, description: impl Into<String>) -> Self {
        Self {
            id,
            filter,
            description: description.into(),
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.filter.matches(event)
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
