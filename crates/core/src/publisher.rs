// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The validated publication path.
//!
//! A rejected event is reported once through the [`BypassPublisher`], which
//! has no validator, and is never handed to the bus.

use crate::bypass::BypassPublisher;
use crate::catalog::Template;
use crate::clock::{Clock, SystemClock};
use crate::error::{PipelineError, ValidationFailure};
use crate::event::Event;
use crate::events::{DispatchReport, EventBus};
use crate::id::{IdGen, UuidIdGen};
use crate::validator::{EventValidator, ValidationReport};
use std::sync::Arc;
use tracing::debug;

/// Validate `event` exactly once, against `template` when the caller already
/// resolved it. A failure is reported on the bypass path.
pub(crate) fn admit<C: Clock, I: IdGen>(
    validator: &dyn EventValidator,
    bypass: &BypassPublisher<C, I>,
    event: &Event,
    template: Option<&Template>,
) -> Result<(), ValidationFailure> {
    let report = match template {
        Some(template) => validator.validate_against(event, template),
        None => validator.validate(event),
    };
    if report.is_ok() {
        return Ok(());
    }

    let failure = ValidationFailure::new(report.event_name, report.errors);
    bypass.report_validation_failure(event, &failure);
    Err(failure)
}

/// Validates events and forwards the accepted ones to the bus
pub struct ValidatingPublisher<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    validator: Arc<dyn EventValidator>,
    bus: EventBus,
    bypass: BypassPublisher<C, I>,
}

impl<C: Clock, I: IdGen> ValidatingPublisher<C, I> {
    pub fn new(
        validator: Arc<dyn EventValidator>,
        bus: EventBus,
        bypass: BypassPublisher<C, I>,
    ) -> Self {
        Self {
            validator,
            bus,
            bypass,
        }
    }

    pub fn validate(&self, event: &Event) -> ValidationReport {
        self.validator.validate(event)
    }

    /// Check without publishing or reporting
    pub fn assert_valid(&self, event: &Event) -> Result<(), PipelineError> {
        self.validator.assert_valid(event)
    }

    /// Publish `event` if it validates.
    ///
    /// On rejection exactly one validation-failure event goes out on the
    /// bypass path and the failure is returned.
    pub fn validate_and_publish(&self, event: Event) -> Result<DispatchReport, PipelineError> {
        self.admit_and_publish(event, None)
    }

    /// Publish `event` if it validates against the template it was built from
    pub fn validate_against_and_publish(
        &self,
        event: Event,
        template: &Template,
    ) -> Result<DispatchReport, PipelineError> {
        self.admit_and_publish(event, Some(template))
    }

    fn admit_and_publish(
        &self,
        event: Event,
        template: Option<&Template>,
    ) -> Result<DispatchReport, PipelineError> {
        admit(self.validator.as_ref(), &self.bypass, &event, template)?;
        let report = self.bus.publish(event)?;
        debug!(
            matched = report.matched,
            delivered = report.delivered,
            "validated event dispatched"
        );
        Ok(report)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn bypass(&self) -> &BypassPublisher<C, I> {
        &self.bypass
    }
}

impl<C: Clock, I: IdGen> Clone for ValidatingPublisher<C, I> {
    fn clone(&self) -> Self {
        Self {
            validator: Arc::clone(&self.validator),
            bus: self.bus.clone(),
            bypass: self.bypass.clone(),
        }
    }
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;
