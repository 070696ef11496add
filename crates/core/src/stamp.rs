// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-instance identity applied to every constructed event

use crate::clock::{Clock, SystemClock};
use crate::host::HostInfo;
use crate::id::{EventId, IdGen, UuidIdGen};
use chrono::{DateTime, Utc};

/// Source, environment, host, clock and id generator shared by the factory
/// and the bypass publisher.
///
/// Cloning is cheap and clones share the id sequence.
#[derive(Debug, Clone)]
pub struct EventStamp<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    source: String,
    environment: String,
    host: HostInfo,
    clock: C,
    ids: I,
}

impl EventStamp<SystemClock, UuidIdGen> {
    pub fn new(source: impl Into<String>, environment: impl Into<String>) -> Self {
        Self::with_parts(source, environment, SystemClock, UuidIdGen)
    }
}

impl<C: Clock, I: IdGen> EventStamp<C, I> {
    pub fn with_parts(
        source: impl Into<String>,
        environment: impl Into<String>,
        clock: C,
        ids: I,
    ) -> Self {
        Self {
            source: source.into(),
            environment: environment.into(),
            host: HostInfo::current().clone(),
            clock,
            ids,
        }
    }

    /// Replace the captured host identity
    pub fn with_host(mut self, host: HostInfo) -> Self {
        self.host = host;
        self
    }

    pub fn next_id(&self) -> EventId {
        self.ids.next()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn host(&self) -> &HostInfo {
        &self.host
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn ids(&self) -> &I {
        &self.ids
    }
}
