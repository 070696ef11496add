// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types surfaced by the normal publication path

use crate::events::BusError;
use std::fmt;
use thiserror::Error;

/// An event that failed its schema or structural checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub event_name: String,
    pub errors: Vec<String>,
}

impl ValidationFailure {
    pub fn new(event_name: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            event_name: event_name.into(),
            errors,
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event '{}' failed validation with {} error(s): {}",
            self.event_name,
            self.errors.len(),
            self.errors.join("; ")
        )
    }
}

impl std::error::Error for ValidationFailure {}

/// Errors returned to callers of the normal (validated) path.
///
/// Template and validation failures have already been reported on the bus
/// through the bypass path by the time the caller sees them.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("event template not found: {0}")]
    TemplateNotFound(String),

    #[error(transparent)]
    ValidationFailed(#[from] ValidationFailure),

    #[error("event bus error: {0}")]
    Bus(#[from] BusError),
}

impl PipelineError {
    /// Validation messages, empty for other errors
    pub fn validation_errors(&self) -> &[String] {
        match self {
            PipelineError::ValidationFailed(failure) => &failure.errors,
            _ => &[],
        }
    }
}
